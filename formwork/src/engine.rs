//! Schema validation engine.
//!
//! Owns a [`Schema`] and evaluates it against a bean for a set of
//! requested validation groups. The engine is constructed explicitly and
//! shared via `Arc` by whoever composes the form group; there is no
//! hidden process-wide instance.

use std::collections::HashSet;

use crate::schema::{DEFAULT_GROUP, Schema};
use crate::violation::Violation;

/// Evaluates a declarative [`Schema`] against bean instances.
pub struct SchemaEngine<T> {
    schema: Schema<T>,
}

impl<T> SchemaEngine<T> {
    /// Create an engine over the given schema.
    pub fn new(schema: Schema<T>) -> Self {
        Self { schema }
    }

    /// Get the underlying schema.
    pub fn schema(&self) -> &Schema<T> {
        &self.schema
    }

    /// Validate the bean against all constraints participating in the
    /// requested groups. An empty request resolves to [`DEFAULT_GROUP`].
    pub fn validate(&self, bean: &T, groups: &[String]) -> HashSet<Violation> {
        let resolved;
        let requested: &[String] = if groups.is_empty() {
            resolved = [DEFAULT_GROUP.to_string()];
            &resolved
        } else {
            groups
        };

        self.schema
            .rules()
            .filter(|(_, constraint)| constraint.matches_groups(requested))
            .filter(|(_, constraint)| !constraint.holds(bean))
            .map(|(property, constraint)| {
                Violation::new(property, constraint.message(), constraint.kind())
            })
            .collect()
    }
}

impl<T> std::fmt::Debug for SchemaEngine<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaEngine")
            .field("schema", &self.schema)
            .finish()
    }
}
