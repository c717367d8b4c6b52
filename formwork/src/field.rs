//! Field abstraction for data-bound input controls.
//!
//! A [`BoundField`] is the capability surface a host toolkit's input
//! widget must expose to participate in a form group: value access,
//! emptiness, the required flag, error display, validation visibility,
//! eager (immediate) mode and value-change subscription. Text-change
//! notification is an optional capability surfaced through
//! [`BoundField::as_text_change_notifier`].

use crate::error::InvalidValue;
use crate::event::{SubscriptionId, TextChangeHandler, ValueChangeHandler};

/// Trait for input controls that can be bound to a bean property.
pub trait BoundField: Send + Sync {
    /// Get the field's unique id (for focusing and diagnostics).
    fn id(&self) -> String;

    /// Get the current value, rendered as text.
    fn value(&self) -> String;

    /// Set the value. Implementations fire value-change notifications
    /// when the stored value actually changes.
    fn set_value(&self, value: &str);

    /// Check if the field currently holds no value.
    fn is_empty(&self) -> bool;

    /// Check if the field is marked required.
    fn is_required(&self) -> bool;

    /// Mark the field required or optional.
    fn set_required(&self, required: bool);

    /// Set the message reported when a required field is empty.
    fn set_required_message(&self, message: &str);

    /// Get the currently displayed error message (if any).
    fn error(&self) -> Option<String>;

    /// Display an error message on this field.
    fn set_error(&self, message: &str);

    /// Clear a previously displayed error message.
    fn clear_error(&self);

    /// Check if the field displays its validation state.
    fn is_validation_visible(&self) -> bool;

    /// Show or hide the field's validation state.
    fn set_validation_visible(&self, visible: bool);

    /// Make value changes propagate without an explicit commit.
    fn set_immediate(&self, immediate: bool);

    /// Run the field's own validation against its current value.
    ///
    /// Unlike [`BoundField::error`], this ignores validation visibility.
    fn validate(&self) -> Result<(), InvalidValue>;

    /// Register a handler for committed value changes.
    fn subscribe_value_change(&self, handler: ValueChangeHandler) -> SubscriptionId;

    /// Remove a value-change handler.
    fn unsubscribe_value_change(&self, id: SubscriptionId);

    /// Get the text-change capability, if this field supports it.
    fn as_text_change_notifier(&self) -> Option<&dyn TextChangeNotifier> {
        None
    }
}

/// Optional capability: fields that emit interim text while typing.
pub trait TextChangeNotifier {
    /// Register a handler for interim text updates.
    fn subscribe_text_change(&self, handler: TextChangeHandler) -> SubscriptionId;

    /// Remove a text-change handler.
    fn unsubscribe_text_change(&self, id: SubscriptionId);
}
