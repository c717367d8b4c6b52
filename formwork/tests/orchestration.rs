//! Tests for the validation pass: layer ordering, fail-soft accumulation
//! and error-target resolution.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use formwork::error::InvalidValue;
use formwork::field::BoundField;
use formwork::fields::TextField;
use formwork::group::{ErrorCategory, FormGroup};

#[derive(Debug, Clone, Default)]
struct Person {
    name: Option<String>,
}

fn bind_name(group: &FormGroup<Person>, field: &TextField) {
    group.bind(
        "name",
        Arc::new(field.clone()),
        Box::new(|p: &Person| p.name.clone().unwrap_or_default()),
        Box::new(|p: &mut Person, v: &str| {
            p.name = if v.is_empty() { None } else { Some(v.to_string()) };
        }),
    );
}

fn failing(message: &'static str) -> impl Fn(&Person) -> Result<(), InvalidValue> {
    move |_| Err(InvalidValue::new(message))
}

#[test]
fn test_field_failure_skips_cross_validators() {
    let name = TextField::new("name").required("Name is required");
    let group = FormGroup::new(Person::default());
    bind_name(&group, &name);

    let runs = Arc::new(AtomicUsize::new(0));
    let runs_clone = Arc::clone(&runs);
    group.add_validator(
        "always_fails",
        move |_: &Person| {
            runs_clone.fetch_add(1, Ordering::SeqCst);
            Err(InvalidValue::new("cross failure"))
        },
        vec![],
    );

    assert!(!group.is_valid());
    assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[test]
fn test_field_failure_clears_stale_bean_level_errors() {
    let name = TextField::new("name");
    let group = FormGroup::new(Person::default());
    bind_name(&group, &name);
    group.add_validator("always_fails", failing("cross failure"), vec![]);

    assert!(!group.is_valid());
    assert_eq!(group.cross_field_violations().len(), 1);

    // Make per-field validation fail; the stale bean-level error from the
    // previous pass must already be gone when the pass aborts.
    name.set_required(true);
    assert!(!group.is_valid());
    assert!(group.cross_field_violations().is_empty());
    assert!(group.bean_level_messages().is_empty());
}

#[test]
fn test_fail_soft_records_all_failures() {
    let group = FormGroup::new(Person::default());
    group.add_validator("first", failing("first failure"), vec![]);
    group.add_validator("second", failing("second failure"), vec![]);

    assert!(!group.is_valid());

    let messages = group.bean_level_messages();
    assert_eq!(messages.len(), 2);
    assert!(messages.contains(&"first failure".to_string()));
    assert!(messages.contains(&"second failure".to_string()));
}

#[test]
fn test_replacing_validator_keeps_execution_order() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let group = FormGroup::new(Person::default());

    let order_a = Arc::clone(&order);
    group.add_validator(
        "a",
        move |_: &Person| {
            order_a.lock().unwrap().push("a");
            Ok(())
        },
        vec![],
    );
    let order_b = Arc::clone(&order);
    group.add_validator(
        "b",
        move |_: &Person| {
            order_b.lock().unwrap().push("b");
            Ok(())
        },
        vec![],
    );
    let order_a2 = Arc::clone(&order);
    group.add_validator(
        "a",
        move |_: &Person| {
            order_a2.lock().unwrap().push("a2");
            Ok(())
        },
        vec![],
    );

    assert!(group.is_valid());
    assert_eq!(*order.lock().unwrap(), vec!["a2", "b"]);
}

#[test]
fn test_explicit_targets_receive_error() {
    let name = TextField::new("name");
    let group = FormGroup::new(Person::default());
    bind_name(&group, &name);
    group.add_validator(
        "name_check",
        failing("name mismatch"),
        vec![Arc::new(name.clone())],
    );

    assert!(!group.is_valid());
    assert_eq!(name.error().as_deref(), Some("name mismatch"));
    assert!(group.cross_field_violations().is_empty());
}

#[test]
fn test_category_target_receives_error() {
    let summary = TextField::new("summary");
    let group = FormGroup::new(Person::default());
    group.add_validator("consistency", failing("inconsistent"), vec![]);
    group.set_error_target(
        ErrorCategory::Validator("consistency".into()),
        Arc::new(summary.clone()),
    );

    assert!(!group.is_valid());
    assert_eq!(summary.error().as_deref(), Some("inconsistent"));
    assert!(group.cross_field_violations().is_empty());
    assert!(group.bean_level_messages().is_empty());
}

#[test]
fn test_untargeted_failure_stays_bean_level() {
    let group = FormGroup::new(Person::default());
    group.add_validator("consistency", failing("inconsistent"), vec![]);

    assert!(!group.is_valid());
    assert_eq!(group.cross_field_violations().len(), 1);
    assert_eq!(group.bean_level_messages(), vec!["inconsistent".to_string()]);
}

#[test]
fn test_targeted_and_untargeted_failures() {
    let name = TextField::new("name");
    let group = FormGroup::new(Person::default());
    bind_name(&group, &name);
    group.add_validator(
        "v1",
        failing("v1 failure"),
        vec![Arc::new(name.clone())],
    );
    group.add_validator("v2", failing("v2 failure"), vec![]);

    assert!(!group.is_valid());
    assert_eq!(name.error().as_deref(), Some("v1 failure"));
    assert_eq!(group.bean_level_messages(), vec!["v2 failure".to_string()]);
}

#[test]
fn test_validation_is_idempotent() {
    let name = TextField::new("name");
    let group = FormGroup::new(Person::default());
    bind_name(&group, &name);
    group.add_validator(
        "v1",
        failing("v1 failure"),
        vec![Arc::new(name.clone())],
    );
    group.add_validator("v2", failing("v2 failure"), vec![]);

    let first = group.is_valid();
    let first_error = name.error();
    let first_messages = group.bean_level_messages();

    let second = group.is_valid();
    assert_eq!(first, second);
    assert_eq!(name.error(), first_error);
    assert_eq!(group.bean_level_messages(), first_messages);
}

#[test]
fn test_errors_clear_when_validator_passes() {
    let name = TextField::new("name");
    let group = FormGroup::new(Person::default());
    bind_name(&group, &name);
    group.add_validator(
        "name_present",
        |p: &Person| {
            if p.name.is_some() {
                Ok(())
            } else {
                Err(InvalidValue::new("name missing"))
            }
        },
        vec![Arc::new(name.clone())],
    );
    let group = group.with_eager_validation(|_| {});

    assert!(!group.is_valid());
    assert_eq!(name.error().as_deref(), Some("name missing"));

    name.set_value("Ada");
    assert!(group.is_valid());
    assert_eq!(name.error(), None);
}

#[test]
fn test_remove_and_clear_validators() {
    let group = FormGroup::new(Person::default());
    group.add_validator("v1", failing("v1 failure"), vec![]);
    group.add_validator("v2", failing("v2 failure"), vec![]);

    group.remove_validator("v1");
    assert!(!group.is_valid());
    assert_eq!(group.bean_level_messages(), vec!["v2 failure".to_string()]);

    group.clear_validators();
    assert!(group.is_valid());
    assert!(group.bean_level_messages().is_empty());
}
