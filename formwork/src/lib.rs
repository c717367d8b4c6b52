//! Headless form binding with eager field-level and cross-field
//! validation.
//!
//! `formwork` binds named properties of a backing object (the bean) to
//! UI-side input fields through the [`field::BoundField`] trait and
//! orchestrates three validation layers into one pass: per-field checks
//! delegated to the fields, user-supplied cross-field validators, and a
//! statically declared constraint [`schema::Schema`]. Failures land on
//! the field they belong to, on a registered error target, or in the
//! form-level (bean-level) collections, and premature validation noise on
//! pristine required fields can be suppressed until first edit.
//!
//! The crate is toolkit-agnostic: any widget that can implement
//! [`field::BoundField`] participates. [`fields::TextField`] is the
//! bundled in-memory implementation.

pub mod engine;
pub mod error;
pub mod event;
pub mod field;
pub mod fields;
pub mod group;
pub mod schema;
pub mod violation;

pub mod prelude {
    pub use crate::engine::SchemaEngine;
    pub use crate::error::InvalidValue;
    pub use crate::event::{SubscriptionId, Subscribers};
    pub use crate::field::{BoundField, TextChangeNotifier};
    pub use crate::fields::TextField;
    pub use crate::group::{CrossValidator, ErrorCategory, FormGroup, GroupListener};
    pub use crate::schema::{Constraint, ConstraintKind, DEFAULT_GROUP, Schema};
    pub use crate::violation::Violation;
}
