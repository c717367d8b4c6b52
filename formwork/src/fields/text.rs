//! In-memory text field, the reference [`BoundField`] implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::error::InvalidValue;
use crate::event::{Subscribers, SubscriptionId, TextChangeHandler, ValueChangeHandler};
use crate::field::{BoundField, TextChangeNotifier};

/// Type alias for per-field validation rule closures.
type Rule = Box<dyn Fn(&str) -> Result<(), String> + Send + Sync>;

struct TextFieldInner {
    id: String,
    value: RwLock<String>,
    error: RwLock<Option<String>>,
    required_message: RwLock<String>,
    required: AtomicBool,
    validation_visible: AtomicBool,
    immediate: AtomicBool,
    rules: RwLock<Vec<Rule>>,
    value_subs: Subscribers<ValueChangeHandler>,
    text_subs: Subscribers<TextChangeHandler>,
}

/// A single-line text field with per-field validation rules.
///
/// Cheap to clone; clones share the same underlying state, so a clone
/// kept by the host and a clone bound into a form group stay in sync.
///
/// # Example
///
/// ```
/// use formwork::field::BoundField;
/// use formwork::fields::TextField;
///
/// let email = TextField::new("email")
///     .required("Email is required")
///     .email("Please enter a valid email");
/// email.set_value("not-an-email");
/// assert!(email.validate().is_err());
/// ```
#[derive(Clone)]
pub struct TextField {
    inner: Arc<TextFieldInner>,
}

impl TextField {
    /// Create a new empty text field with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(TextFieldInner {
                id: id.into(),
                value: RwLock::new(String::new()),
                error: RwLock::new(None),
                required_message: RwLock::new("Required".into()),
                required: AtomicBool::new(false),
                validation_visible: AtomicBool::new(true),
                immediate: AtomicBool::new(false),
                rules: RwLock::new(Vec::new()),
                value_subs: Subscribers::new(),
                text_subs: Subscribers::new(),
            }),
        }
    }

    /// Mark the field required with the given message.
    pub fn required(self, message: impl Into<String>) -> Self {
        self.inner.required.store(true, Ordering::SeqCst);
        if let Ok(mut msg) = self.inner.required_message.write() {
            *msg = message.into();
        }
        self
    }

    /// Add a custom validation rule.
    pub fn rule<F>(self, f: F, msg: impl Into<String>) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        let msg = msg.into();
        if let Ok(mut rules) = self.inner.rules.write() {
            rules.push(Box::new(move |v| {
                if f(v) { Ok(()) } else { Err(msg.clone()) }
            }));
        }
        self
    }

    /// Require minimum length (in characters).
    pub fn min_length(self, min: usize, msg: impl Into<String>) -> Self {
        let msg = msg.into();
        self.rule(move |v| v.chars().count() >= min, msg)
    }

    /// Require maximum length (in characters).
    pub fn max_length(self, max: usize, msg: impl Into<String>) -> Self {
        let msg = msg.into();
        self.rule(move |v| v.chars().count() <= max, msg)
    }

    /// Require the value to match a regex pattern.
    pub fn pattern(self, pattern: &str, msg: impl Into<String>) -> Self {
        let msg = msg.into();
        let re = regex::Regex::new(pattern).expect("Invalid regex pattern");
        self.rule(move |v| re.is_match(v), msg)
    }

    /// Require a valid email address.
    pub fn email(self, msg: impl Into<String>) -> Self {
        let msg = msg.into();
        self.rule(
            |v| {
                if v.is_empty() {
                    true // Empty is valid; use required() for non-empty
                } else {
                    email_address::EmailAddress::is_valid(v)
                }
            },
            msg,
        )
    }

    /// Feed interim typed text to text-change subscribers.
    ///
    /// Hosts call this on keystrokes; the committed value is untouched
    /// until a subscriber (typically the form group) pushes the text back
    /// through [`BoundField::set_value`].
    pub fn type_text(&self, text: &str) {
        for handler in self.inner.text_subs.snapshot() {
            handler(text);
        }
    }

    /// Check if eager (immediate) mode is enabled.
    pub fn is_immediate(&self) -> bool {
        self.inner.immediate.load(Ordering::SeqCst)
    }

    fn required_message(&self) -> String {
        self.inner
            .required_message
            .read()
            .map(|msg| msg.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// First failing check for the current value, ignoring visibility.
    fn own_error(&self) -> Option<String> {
        if self.is_required() && self.is_empty() {
            return Some(self.required_message());
        }
        let value = self.value();
        if let Ok(rules) = self.inner.rules.read() {
            for rule in rules.iter() {
                if let Err(msg) = rule(&value) {
                    return Some(msg);
                }
            }
        }
        None
    }
}

impl BoundField for TextField {
    fn id(&self) -> String {
        self.inner.id.clone()
    }

    fn value(&self) -> String {
        self.inner
            .value
            .read()
            .map(|v| v.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    fn set_value(&self, value: &str) {
        {
            let mut current = match self.inner.value.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if *current == value {
                return;
            }
            *current = value.to_string();
        }
        for handler in self.inner.value_subs.snapshot() {
            handler();
        }
    }

    fn is_empty(&self) -> bool {
        self.inner
            .value
            .read()
            .map(|v| v.is_empty())
            .unwrap_or(true)
    }

    fn is_required(&self) -> bool {
        self.inner.required.load(Ordering::SeqCst)
    }

    fn set_required(&self, required: bool) {
        self.inner.required.store(required, Ordering::SeqCst);
    }

    fn set_required_message(&self, message: &str) {
        if let Ok(mut msg) = self.inner.required_message.write() {
            *msg = message.to_string();
        }
    }

    fn error(&self) -> Option<String> {
        let stored = self
            .inner
            .error
            .read()
            .map(|e| e.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone());
        if stored.is_some() {
            return stored;
        }
        if self.is_validation_visible() {
            self.own_error()
        } else {
            None
        }
    }

    fn set_error(&self, message: &str) {
        if let Ok(mut error) = self.inner.error.write() {
            *error = Some(message.to_string());
        }
    }

    fn clear_error(&self) {
        if let Ok(mut error) = self.inner.error.write() {
            *error = None;
        }
    }

    fn is_validation_visible(&self) -> bool {
        self.inner.validation_visible.load(Ordering::SeqCst)
    }

    fn set_validation_visible(&self, visible: bool) {
        self.inner.validation_visible.store(visible, Ordering::SeqCst);
    }

    fn set_immediate(&self, immediate: bool) {
        self.inner.immediate.store(immediate, Ordering::SeqCst);
    }

    fn validate(&self) -> Result<(), InvalidValue> {
        match self.own_error() {
            Some(msg) => Err(InvalidValue::new(msg)),
            None => Ok(()),
        }
    }

    fn subscribe_value_change(&self, handler: ValueChangeHandler) -> SubscriptionId {
        self.inner.value_subs.subscribe(handler)
    }

    fn unsubscribe_value_change(&self, id: SubscriptionId) {
        self.inner.value_subs.unsubscribe(id);
    }

    fn as_text_change_notifier(&self) -> Option<&dyn TextChangeNotifier> {
        Some(self)
    }
}

impl TextChangeNotifier for TextField {
    fn subscribe_text_change(&self, handler: TextChangeHandler) -> SubscriptionId {
        self.inner.text_subs.subscribe(handler)
    }

    fn unsubscribe_text_change(&self, id: SubscriptionId) {
        self.inner.text_subs.unsubscribe(id);
    }
}

impl std::fmt::Debug for TextField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextField")
            .field("id", &self.inner.id)
            .field("value", &self.value())
            .field("required", &self.is_required())
            .finish()
    }
}
