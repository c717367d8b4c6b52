//! Tests for declarative schema constraints, validation groups and the
//! schema step of the validation pass.

use std::sync::Arc;

use formwork::engine::SchemaEngine;
use formwork::field::BoundField;
use formwork::fields::TextField;
use formwork::group::{ErrorCategory, FormGroup};
use formwork::schema::{Constraint, ConstraintKind, Schema};

#[derive(Debug, Clone, Default)]
struct Person {
    name: Option<String>,
    email: String,
    age: u32,
}

fn person_schema() -> Schema<Person> {
    Schema::builder()
        .constraint(
            "name",
            Constraint::not_null(|p: &Person| p.name.clone(), "Name is required"),
        )
        .constraint(
            "email",
            Constraint::email(|p: &Person| Some(p.email.clone()), "Invalid email"),
        )
        .build()
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

#[test]
fn test_not_null_fails_on_absent_value() {
    let constraint = Constraint::not_null(|p: &Person| p.name.clone(), "Name is required");
    assert!(!constraint.holds(&Person::default()));
    assert!(constraint.holds(&Person {
        name: Some("Ada".into()),
        ..Person::default()
    }));
}

#[test]
fn test_not_blank_rejects_whitespace() {
    let constraint = Constraint::not_blank(|p: &Person| p.name.clone(), "Name is blank");
    assert!(!constraint.holds(&Person {
        name: Some("   ".into()),
        ..Person::default()
    }));
    assert!(!constraint.holds(&Person::default()));
    assert!(constraint.holds(&Person {
        name: Some("Ada".into()),
        ..Person::default()
    }));
}

#[test]
fn test_length_bounds() {
    let constraint = Constraint::length(|p: &Person| p.name.clone(), 2, 5, "2-5 characters");
    let with_name = |name: &str| Person {
        name: Some(name.into()),
        ..Person::default()
    };
    assert!(!constraint.holds(&with_name("a")));
    assert!(constraint.holds(&with_name("ab")));
    assert!(constraint.holds(&with_name("abcde")));
    assert!(!constraint.holds(&with_name("abcdef")));
    // Presence is the NotNull constraint's concern.
    assert!(constraint.holds(&Person::default()));
}

#[test]
fn test_pattern_and_email() {
    let pattern = Constraint::pattern(|p: &Person| p.name.clone(), "^[a-z]+$", "lowercase only");
    assert!(pattern.holds(&Person {
        name: Some("ada".into()),
        ..Person::default()
    }));
    assert!(!pattern.holds(&Person {
        name: Some("Ada".into()),
        ..Person::default()
    }));

    let email = Constraint::email(|p: &Person| Some(p.email.clone()), "invalid");
    assert!(email.holds(&Person::default())); // empty is valid
    assert!(email.holds(&Person {
        email: "ada@example.com".into(),
        ..Person::default()
    }));
    assert!(!email.holds(&Person {
        email: "not-an-email".into(),
        ..Person::default()
    }));
}

#[test]
fn test_engine_reports_violations() {
    let engine = SchemaEngine::new(person_schema());
    let violations = engine.validate(
        &Person {
            email: "nope".into(),
            ..Person::default()
        },
        &[],
    );

    assert_eq!(violations.len(), 2);
    assert!(
        violations
            .iter()
            .any(|v| v.property == "name" && v.kind == ConstraintKind::NotNull)
    );
    assert!(
        violations
            .iter()
            .any(|v| v.property == "email" && v.kind == ConstraintKind::Email)
    );
}

#[test]
fn test_group_restricted_constraint() {
    let schema = Schema::builder()
        .constraint(
            "age",
            Constraint::custom("adult", |p: &Person| p.age >= 18, "Must be an adult")
                .in_groups(&["strict"]),
        )
        .build();
    let engine = SchemaEngine::new(schema);
    let minor = Person {
        age: 12,
        ..Person::default()
    };

    // Not part of the default group.
    assert!(engine.validate(&minor, &[]).is_empty());
    assert_eq!(
        engine.validate(&minor, &["strict".to_string()]).len(),
        1
    );
}

#[test]
fn test_validation_groups_on_form_group() {
    let schema = Schema::builder()
        .constraint(
            "age",
            Constraint::custom("adult", |p: &Person| p.age >= 18, "Must be an adult")
                .in_groups(&["strict"]),
        )
        .build();
    let group = FormGroup::new(Person {
        age: 12,
        ..Person::default()
    })
    .with_engine(Arc::new(SchemaEngine::new(schema)));

    assert_eq!(group.validation_groups(), vec!["default".to_string()]);
    assert!(group.is_valid());

    group.set_validation_groups(&["strict"]);
    assert!(!group.is_valid());
    assert_eq!(
        group.bean_level_messages(),
        vec!["Must be an adult".to_string()]
    );
}

#[test]
fn test_configure_defaults_marks_required() {
    let name = TextField::new("name");
    let nickname = TextField::new("nickname");
    let group = FormGroup::new(Person::default())
        .with_engine(Arc::new(SchemaEngine::new(person_schema())));
    bind_name(&group, &name);
    group.bind(
        "nickname",
        Arc::new(nickname.clone()),
        Box::new(|_: &Person| String::new()),
        Box::new(|_: &mut Person, _: &str| {}),
    );

    group.configure_defaults();

    assert!(name.is_required());
    assert_eq!(name.error().as_deref(), Some("Name is required"));
    // No schema entry: the lookup failure is non-fatal and the field is
    // left untouched.
    assert!(!nickname.is_required());
}

#[test]
fn test_missing_engine_treated_as_passing() {
    let group: FormGroup<Person> = FormGroup::new(Person::default());
    assert!(group.is_valid());
    assert!(group.constraint_violations().is_empty());
}

#[test]
fn test_constraint_target_resolution() {
    let banner = TextField::new("banner");
    let group = FormGroup::new(Person::default())
        .with_engine(Arc::new(SchemaEngine::new(person_schema())));
    group.set_error_target(
        ErrorCategory::Constraint(ConstraintKind::NotNull),
        Arc::new(banner.clone()),
    );

    // The NotNull violation is displayed on its target and removed from
    // the reported set; no unresolved violation remains.
    assert!(group.is_valid());
    assert_eq!(banner.error().as_deref(), Some("Name is required"));
    assert!(group.constraint_violations().is_empty());
}

#[test]
fn test_unresolved_violation_stays_bean_level() {
    let group = FormGroup::new(Person::default())
        .with_engine(Arc::new(SchemaEngine::new(person_schema())));

    assert!(!group.is_valid());
    let violations = group.constraint_violations();
    assert_eq!(violations.len(), 1);
    assert!(violations.iter().all(|v| v.property == "name"));
    assert_eq!(
        group.bean_level_messages(),
        vec!["Name is required".to_string()]
    );
}

#[test]
fn test_required_message_lookup() {
    let schema = person_schema();
    assert_eq!(schema.required_message("name"), Some("Name is required"));
    assert_eq!(schema.required_message("email"), None);
    assert_eq!(schema.required_message("missing"), None);
}
