//! Statically declared constraint schema.
//!
//! A [`Schema`] maps bean properties to declarative constraints, taking
//! the place runtime annotation scanning would in a dynamic language.
//! Constraints read the property through an accessor closure, carry a
//! message, and may be restricted to named validation groups; a
//! constraint declared without groups belongs to [`DEFAULT_GROUP`].
//!
//! # Example
//!
//! ```
//! use formwork::schema::{Constraint, Schema};
//!
//! struct Person {
//!     name: Option<String>,
//!     email: String,
//! }
//!
//! let schema: Schema<Person> = Schema::builder()
//!     .constraint(
//!         "name",
//!         Constraint::not_null(|p: &Person| p.name.clone(), "Name is required"),
//!     )
//!     .constraint(
//!         "email",
//!         Constraint::email(|p: &Person| Some(p.email.clone()), "Invalid email"),
//!     )
//!     .build();
//! assert_eq!(schema.required_message("name"), Some("Name is required"));
//! ```

use std::sync::Arc;

use serde::Serialize;

/// Group a constraint belongs to when none is declared.
pub const DEFAULT_GROUP: &str = "default";

/// Identifies the category of a constraint, for error-target lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConstraintKind {
    /// Value must be present.
    NotNull,
    /// Value must be present and not blank.
    NotBlank,
    /// Character count must fall within bounds.
    Length,
    /// Value must match a regex pattern.
    Pattern,
    /// Value must be a valid email address.
    Email,
    /// User-defined predicate, identified by name.
    Custom(&'static str),
}

type Check<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// One declarative constraint on a bean property.
///
/// Accessor closures return `None` for an absent (null) value.
/// Constraints other than [`Constraint::not_null`] and
/// [`Constraint::not_blank`] pass on absent values; presence checks
/// belong to the presence constraints.
pub struct Constraint<T> {
    kind: ConstraintKind,
    message: String,
    groups: Vec<String>,
    check: Check<T>,
}

impl<T> Constraint<T> {
    fn new(kind: ConstraintKind, message: impl Into<String>, check: Check<T>) -> Self {
        Self {
            kind,
            message: message.into(),
            groups: Vec::new(),
            check,
        }
    }

    /// Require the property to be present.
    pub fn not_null<A>(access: A, message: impl Into<String>) -> Self
    where
        A: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        Self::new(
            ConstraintKind::NotNull,
            message,
            Arc::new(move |bean| access(bean).is_some()),
        )
    }

    /// Require the property to be present and not blank.
    pub fn not_blank<A>(access: A, message: impl Into<String>) -> Self
    where
        A: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        Self::new(
            ConstraintKind::NotBlank,
            message,
            Arc::new(move |bean| {
                access(bean).is_some_and(|value| !value.trim().is_empty())
            }),
        )
    }

    /// Require the property's character count to fall within `min..=max`.
    pub fn length<A>(access: A, min: usize, max: usize, message: impl Into<String>) -> Self
    where
        A: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        Self::new(
            ConstraintKind::Length,
            message,
            Arc::new(move |bean| match access(bean) {
                Some(value) => {
                    let count = value.chars().count();
                    count >= min && count <= max
                }
                None => true,
            }),
        )
    }

    /// Require the property to match a regex pattern.
    pub fn pattern<A>(access: A, pattern: &str, message: impl Into<String>) -> Self
    where
        A: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        let re = regex::Regex::new(pattern).expect("Invalid regex pattern");
        Self::new(
            ConstraintKind::Pattern,
            message,
            Arc::new(move |bean| match access(bean) {
                Some(value) => re.is_match(&value),
                None => true,
            }),
        )
    }

    /// Require the property to be a valid email address.
    pub fn email<A>(access: A, message: impl Into<String>) -> Self
    where
        A: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        Self::new(
            ConstraintKind::Email,
            message,
            Arc::new(move |bean| match access(bean) {
                Some(value) => {
                    value.is_empty() || email_address::EmailAddress::is_valid(&value)
                }
                None => true,
            }),
        )
    }

    /// User-defined predicate over the whole bean.
    pub fn custom<F>(name: &'static str, check: F, message: impl Into<String>) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::new(ConstraintKind::Custom(name), message, Arc::new(check))
    }

    /// Restrict this constraint to the given validation groups.
    pub fn in_groups(mut self, groups: &[&str]) -> Self {
        self.groups = groups.iter().map(|g| g.to_string()).collect();
        self
    }

    /// Get the constraint's category.
    pub fn kind(&self) -> ConstraintKind {
        self.kind
    }

    /// Get the constraint's message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check whether the constraint holds for the given bean.
    pub fn holds(&self, bean: &T) -> bool {
        (self.check)(bean)
    }

    /// Check whether this constraint participates in any requested group.
    pub(crate) fn matches_groups(&self, requested: &[String]) -> bool {
        if self.groups.is_empty() {
            requested.iter().any(|g| g == DEFAULT_GROUP)
        } else {
            self.groups.iter().any(|g| requested.contains(g))
        }
    }
}

impl<T> std::fmt::Debug for Constraint<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Constraint")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("groups", &self.groups)
            .finish()
    }
}

/// Declarative constraints for one bean type, keyed by property name.
pub struct Schema<T> {
    rules: Vec<(String, Constraint<T>)>,
}

impl<T> Schema<T> {
    /// Start building a schema.
    pub fn builder() -> SchemaBuilder<T> {
        SchemaBuilder { rules: Vec::new() }
    }

    /// Get the message of the property's `NotNull` constraint, if declared.
    ///
    /// Used to auto-configure the required flag on bound fields.
    pub fn required_message(&self, property: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|(prop, constraint)| {
                prop == property && constraint.kind() == ConstraintKind::NotNull
            })
            .map(|(_, constraint)| constraint.message())
    }

    /// Iterate all `(property, constraint)` rules in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &Constraint<T>)> {
        self.rules
            .iter()
            .map(|(prop, constraint)| (prop.as_str(), constraint))
    }

    /// Check if the schema declares no constraints.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Get the number of declared constraints.
    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

impl<T> std::fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("rule_count", &self.rules.len())
            .finish()
    }
}

/// Builder for [`Schema`].
pub struct SchemaBuilder<T> {
    rules: Vec<(String, Constraint<T>)>,
}

impl<T> SchemaBuilder<T> {
    /// Declare a constraint on a property.
    pub fn constraint(mut self, property: impl Into<String>, constraint: Constraint<T>) -> Self {
        self.rules.push((property.into(), constraint));
        self
    }

    /// Finish building.
    pub fn build(self) -> Schema<T> {
        Schema { rules: self.rules }
    }
}

impl<T> Default for SchemaBuilder<T> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}
