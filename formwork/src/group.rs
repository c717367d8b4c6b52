//! Form group: binds bean properties to fields and orchestrates
//! validation.
//!
//! A [`FormGroup`] owns the backing bean, the bindings between its
//! properties and [`BoundField`] handles, the cross-field validator
//! registry, the error-target registry, and the bookkeeping for
//! initial-error suppression and the modification flag.
//!
//! # Example
//!
//! ```ignore
//! let group = FormGroup::new(Person::default())
//!     .with_engine(Arc::new(SchemaEngine::new(schema)))
//!     .with_eager_validation(|group| {
//!         // form dirtied; enable the save button
//!     });
//! group.bind("name", Arc::new(name_field), read, write);
//! group.hide_initial_validation_errors();
//! if group.is_valid() {
//!     // submit
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Once, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use crate::engine::SchemaEngine;
use crate::error::InvalidValue;
use crate::event::SubscriptionId;
use crate::field::BoundField;
use crate::schema::{ConstraintKind, DEFAULT_GROUP};
use crate::violation::Violation;

/// Callback invoked once per accepted modification.
pub type GroupListener<T> = Arc<dyn Fn(&FormGroup<T>) + Send + Sync>;

/// Validator executed against the whole bean.
///
/// Per-property checks belong on the fields themselves; this hook exists
/// for rules spanning several properties (password confirmation, date
/// ranges and the like). Implemented for any matching closure.
pub trait CrossValidator<T>: Send + Sync {
    /// Validate the bean, failing with a message to display.
    fn validate(&self, bean: &T) -> Result<(), InvalidValue>;
}

impl<T, F> CrossValidator<T> for F
where
    F: Fn(&T) -> Result<(), InvalidValue> + Send + Sync,
{
    fn validate(&self, bean: &T) -> Result<(), InvalidValue> {
        self(bean)
    }
}

/// Category under which a default error-display target is registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Failures of the cross-field validator registered under this key.
    Validator(String),
    /// Schema violations of this constraint kind.
    Constraint(ConstraintKind),
}

/// Type alias for bean-to-text property read accessors.
pub type ReadAccessor<T> = Box<dyn Fn(&T) -> String + Send + Sync>;

/// Type alias for text-to-bean property write accessors.
pub type WriteAccessor<T> = Box<dyn Fn(&mut T, &str) + Send + Sync>;

struct Binding<T> {
    property: String,
    field: Arc<dyn BoundField>,
    write: WriteAccessor<T>,
    value_sub: Option<SubscriptionId>,
    text_sub: Option<SubscriptionId>,
}

struct ValidatorEntry<T> {
    key: String,
    validator: Arc<dyn CrossValidator<T>>,
    targets: Vec<Arc<dyn BoundField>>,
}

struct GroupState<T> {
    bean: T,
    bindings: Vec<Binding<T>>,
    suppressed: HashSet<String>,
    validators: Vec<ValidatorEntry<T>>,
    error_targets: HashMap<ErrorCategory, Arc<dyn BoundField>>,
    /// Fields that carry an explicitly attached cross-field error from the
    /// last pass. Cleared at the start of every pass.
    error_carriers: Vec<Arc<dyn BoundField>>,
    cross_violations: Vec<InvalidValue>,
    schema_violations: HashSet<Violation>,
    validation_groups: Vec<String>,
    listener: Option<GroupListener<T>>,
    engine: Option<Arc<SchemaEngine<T>>>,
}

struct GroupInner<T> {
    state: RwLock<GroupState<T>>,
    modified: AtomicBool,
}

static ENGINE_MISSING_NOTICE: Once = Once::new();

/// Form group over a backing bean of type `T`.
///
/// Cheap to clone; clones share state, so the handle captured by event
/// subscriptions and the handle kept by the host are the same group.
///
/// Validation is synchronous and not reentrant: calling [`is_valid`]
/// from inside a validator callback is unsupported.
///
/// [`is_valid`]: FormGroup::is_valid
pub struct FormGroup<T> {
    inner: Arc<GroupInner<T>>,
}

impl<T> Clone for FormGroup<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + Sync + 'static> FormGroup<T> {
    /// Create a group over the given bean, with no schema engine.
    pub fn new(bean: T) -> Self {
        Self {
            inner: Arc::new(GroupInner {
                state: RwLock::new(GroupState {
                    bean,
                    bindings: Vec::new(),
                    suppressed: HashSet::new(),
                    validators: Vec::new(),
                    error_targets: HashMap::new(),
                    error_carriers: Vec::new(),
                    cross_violations: Vec::new(),
                    schema_violations: HashSet::new(),
                    validation_groups: Vec::new(),
                    listener: None,
                    engine: None,
                }),
                modified: AtomicBool::new(false),
            }),
        }
    }

    /// Attach a schema engine for declarative validation.
    pub fn with_engine(self, engine: Arc<SchemaEngine<T>>) -> Self {
        self.write().engine = Some(engine);
        self
    }

    fn read(&self) -> RwLockReadGuard<'_, GroupState<T>> {
        self.inner
            .state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, GroupState<T>> {
        self.inner
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Get a clone of the backing bean.
    pub fn bean(&self) -> T
    where
        T: Clone,
    {
        self.read().bean.clone()
    }

    /// Bind a field to a bean property.
    ///
    /// Seeds the field's value from the bean through `read`; `write`
    /// propagates accepted value changes back into the bean. Binding the
    /// same property again replaces the previous binding. Bind fields
    /// before calling [`with_eager_validation`]; later bindings are not
    /// wired retroactively.
    ///
    /// [`with_eager_validation`]: FormGroup::with_eager_validation
    pub fn bind(
        &self,
        property: impl Into<String>,
        field: Arc<dyn BoundField>,
        read: ReadAccessor<T>,
        write: WriteAccessor<T>,
    ) -> &Self {
        let property = property.into();
        let old = {
            let mut state = self.write();
            let index = state.bindings.iter().position(|b| b.property == property);
            index.map(|index| state.bindings.remove(index))
        };
        if let Some(old) = old {
            release_binding(&old);
        }
        // Seed outside the lock: setting the value may notify subscribers.
        let seed = read(&self.read().bean);
        field.set_value(&seed);
        let mut state = self.write();
        state.bindings.push(Binding {
            property,
            field,
            write,
            value_sub: None,
            text_sub: None,
        });
        self
    }

    /// Configure fields for some better defaults: properties with a
    /// `NotNull` schema constraint get the required flag and the
    /// constraint's message. Properties without a schema entry are skipped.
    pub fn configure_defaults(&self) -> &Self {
        let state = self.read();
        let Some(engine) = state.engine.clone() else {
            return self;
        };
        for binding in &state.bindings {
            match engine.schema().required_message(&binding.property) {
                Some(message) => {
                    binding.field.set_required(true);
                    binding.field.set_required_message(message);
                }
                None => {
                    log::debug!(
                        "no schema constraint declared for property '{}'",
                        binding.property
                    );
                }
            }
        }
        self
    }

    /// Hide validation errors on required fields until each field has been
    /// changed for the first time.
    ///
    /// Scans all bound fields; a field currently showing an error while
    /// required, empty and displaying its validation state gets the
    /// display turned off and its property recorded. The first
    /// value-change on such a field turns the display back on permanently.
    /// Suppressed properties are available from [`suppressed_fields`] so
    /// they can be emphasized in the UI.
    ///
    /// [`suppressed_fields`]: FormGroup::suppressed_fields
    pub fn hide_initial_validation_errors(&self) {
        let mut state = self.write();
        let state = &mut *state;
        state.suppressed.clear();
        for binding in &state.bindings {
            let field = &binding.field;
            if field.error().is_some()
                && field.is_required()
                && field.is_empty()
                && field.is_validation_visible()
            {
                field.set_validation_visible(false);
                state.suppressed.insert(binding.property.clone());
            }
        }
    }

    /// Get the properties whose validation display is currently suppressed.
    pub fn suppressed_fields(&self) -> HashSet<String> {
        self.read().suppressed.clone()
    }

    /// Set the validation groups used by schema validation.
    ///
    /// Groups only affect schema (bean-level) validation, not per-field or
    /// cross-field validators.
    pub fn set_validation_groups(&self, groups: &[&str]) -> &Self {
        self.write().validation_groups = groups.iter().map(|g| g.to_string()).collect();
        self
    }

    /// Get the validation groups, resolved to the default group when none
    /// are configured.
    pub fn validation_groups(&self) -> Vec<String> {
        let state = self.read();
        if state.validation_groups.is_empty() {
            vec![DEFAULT_GROUP.to_string()]
        } else {
            state.validation_groups.clone()
        }
    }

    /// Register a cross-field validator under an identity key.
    ///
    /// `targets` are the fields a failure message is shown on; with no
    /// targets the failure falls back to the key's registered error target
    /// or, absent that, to the bean-level collection. Re-registering an
    /// existing key replaces the validator but keeps its position in the
    /// execution order.
    pub fn add_validator(
        &self,
        key: impl Into<String>,
        validator: impl CrossValidator<T> + 'static,
        targets: Vec<Arc<dyn BoundField>>,
    ) -> &Self {
        let key = key.into();
        let validator: Arc<dyn CrossValidator<T>> = Arc::new(validator);
        let mut state = self.write();
        match state.validators.iter_mut().find(|e| e.key == key) {
            Some(entry) => {
                entry.validator = validator;
                entry.targets = targets;
            }
            None => {
                state.validators.push(ValidatorEntry {
                    key,
                    validator,
                    targets,
                });
            }
        }
        self
    }

    /// Remove the cross-field validator registered under `key`.
    pub fn remove_validator(&self, key: &str) -> &Self {
        self.write().validators.retain(|e| e.key != key);
        self
    }

    /// Remove all cross-field validators.
    pub fn clear_validators(&self) -> &Self {
        self.write().validators.clear();
        self
    }

    /// Set the field on which errors of the given category are shown when
    /// the failing validator has no explicit targets. Last registration
    /// wins.
    pub fn set_error_target(&self, category: ErrorCategory, field: Arc<dyn BoundField>) -> &Self {
        self.write().error_targets.insert(category, field);
        self
    }

    /// Get the schema violations left bean-level by the last pass.
    pub fn constraint_violations(&self) -> HashSet<Violation> {
        self.read().schema_violations.clone()
    }

    /// Get the cross-field failures left bean-level by the last pass.
    pub fn cross_field_violations(&self) -> Vec<InvalidValue> {
        self.read().cross_violations.clone()
    }

    /// Flatten both bean-level collections into display messages.
    pub fn bean_level_messages(&self) -> Vec<String> {
        let state = self.read();
        let mut messages: Vec<String> = state
            .schema_violations
            .iter()
            .map(|v| v.message.clone())
            .collect();
        messages.extend(state.cross_violations.iter().map(|e| e.message.clone()));
        messages
    }

    /// Check if any bound field has been modified.
    pub fn is_modified(&self) -> bool {
        self.inner.modified.load(Ordering::SeqCst)
    }

    /// Set or reset the modification flag.
    pub fn set_modified(&self, modified: bool) {
        self.inner.modified.store(modified, Ordering::SeqCst);
    }

    /// Wire eager validation: every bound field becomes immediate and the
    /// group subscribes to its value-change (and, where supported,
    /// text-change) events. Interim typed text is pushed into the field
    /// value so feedback updates as the user types. `listener` is invoked
    /// once per accepted modification.
    pub fn with_eager_validation(
        self,
        listener: impl Fn(&FormGroup<T>) + Send + Sync + 'static,
    ) -> Self {
        {
            let mut state = self.write();
            state.listener = Some(Arc::new(listener));
            let weak = Arc::downgrade(&self.inner);
            for binding in &mut state.bindings {
                binding.field.set_immediate(true);
                if binding.value_sub.is_none() {
                    let property = binding.property.clone();
                    let weak = Weak::clone(&weak);
                    binding.value_sub =
                        Some(binding.field.subscribe_value_change(Arc::new(move || {
                            if let Some(inner) = weak.upgrade() {
                                FormGroup { inner }.handle_value_change(&property);
                            }
                        })));
                }
                if binding.text_sub.is_none()
                    && let Some(notifier) = binding.field.as_text_change_notifier()
                {
                    let field = Arc::clone(&binding.field);
                    binding.text_sub =
                        Some(notifier.subscribe_text_change(Arc::new(move |text| {
                            field.set_value(text);
                        })));
                }
            }
        }
        self
    }

    /// Accepted value change for a bound property: suppression
    /// bookkeeping, write-through into the bean, modification flag,
    /// listener dispatch.
    fn handle_value_change(&self, property: &str) {
        let listener = {
            let mut state = self.write();
            let state = &mut *state;
            match state.bindings.iter().find(|b| b.property == property) {
                Some(binding) => {
                    if state.suppressed.remove(property) {
                        binding.field.set_validation_visible(true);
                    }
                    (binding.write)(&mut state.bean, &binding.field.value());
                }
                None => {
                    log::warn!("value change for unbound property '{property}'");
                }
            }
            state.listener.clone()
        };
        self.inner.modified.store(true, Ordering::SeqCst);
        if let Some(listener) = listener {
            listener(self);
        }
    }

    /// Run the full validation pass.
    ///
    /// In order: clear errors displayed by the previous pass and rebuild
    /// the violation collections; run per-field validation, aborting
    /// invalid on the first layer's failure; run every cross-field
    /// validator (fail-soft) and attach failures to their explicit
    /// targets, their category target, or the bean-level collection; run
    /// schema validation against the resolved groups, displaying
    /// target-resolved violations and retaining the rest bean-level.
    /// Without a schema engine the schema step passes.
    pub fn is_valid(&self) -> bool {
        let mut state = self.write();
        let state = &mut *state;

        for field in state.error_carriers.drain(..) {
            field.clear_error();
        }
        for target in state.error_targets.values() {
            target.clear_error();
        }
        state.cross_violations.clear();
        state.schema_violations.clear();

        let fields_valid = state
            .bindings
            .iter()
            .all(|binding| binding.field.validate().is_ok());
        if !fields_valid {
            return false;
        }

        let mut cross_ok = true;
        for entry in &state.validators {
            if let Err(failure) = entry.validator.validate(&state.bean) {
                if !entry.targets.is_empty() {
                    for target in &entry.targets {
                        target.set_error(&failure.message);
                        state.error_carriers.push(Arc::clone(target));
                    }
                } else if let Some(target) = state
                    .error_targets
                    .get(&ErrorCategory::Validator(entry.key.clone()))
                {
                    target.set_error(&failure.message);
                } else {
                    state.cross_violations.push(failure);
                }
                cross_ok = false;
            }
        }

        let groups = if state.validation_groups.is_empty() {
            vec![DEFAULT_GROUP.to_string()]
        } else {
            state.validation_groups.clone()
        };
        let schema_ok = match &state.engine {
            Some(engine) => {
                let mut violations = engine.validate(&state.bean, &groups);
                violations.retain(|violation| {
                    match state
                        .error_targets
                        .get(&ErrorCategory::Constraint(violation.kind))
                    {
                        Some(target) => {
                            target.set_error(&violation.message);
                            false
                        }
                        None => true,
                    }
                });
                let ok = violations.is_empty();
                state.schema_violations = violations;
                ok
            }
            None => {
                ENGINE_MISSING_NOTICE.call_once(|| {
                    log::debug!("no schema engine configured; skipping schema validation");
                });
                true
            }
        };

        cross_ok && schema_ok
    }

    /// Remove all listener registrations and detach all fields.
    ///
    /// Iterates over a snapshot of the binding list, so field callbacks
    /// mutating the collection cannot invalidate the traversal. After
    /// unbinding, events from previously bound fields no longer reach the
    /// group.
    pub fn unbind(&self) {
        let bindings = {
            let mut state = self.write();
            state.suppressed.clear();
            std::mem::take(&mut state.bindings)
        };
        for binding in &bindings {
            release_binding(binding);
        }
    }

    /// Get the number of bound fields.
    pub fn binding_count(&self) -> usize {
        self.read().bindings.len()
    }
}

fn release_binding<T>(binding: &Binding<T>) {
    if let Some(id) = binding.value_sub {
        binding.field.unsubscribe_value_change(id);
    }
    if let Some(id) = binding.text_sub
        && let Some(notifier) = binding.field.as_text_change_notifier()
    {
        notifier.unsubscribe_text_change(id);
    }
}

impl<T> std::fmt::Debug for FormGroup<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self
            .inner
            .state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f.debug_struct("FormGroup")
            .field("bindings", &state.bindings.len())
            .field("validators", &state.validators.len())
            .field("suppressed", &state.suppressed)
            .finish()
    }
}
