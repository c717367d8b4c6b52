//! Signup form walkthrough.
//!
//! Binds a signup bean to text fields, auto-configures required flags
//! from the schema, suppresses the initial required-field noise, and
//! validates as the user "types".

use std::sync::Arc;

use formwork::prelude::*;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

#[derive(Debug, Clone, Default)]
struct Signup {
    name: Option<String>,
    email: String,
    password: String,
    password_again: String,
}

fn signup_schema() -> Schema<Signup> {
    Schema::builder()
        .constraint(
            "name",
            Constraint::not_null(|s: &Signup| s.name.clone(), "Name is required"),
        )
        .constraint(
            "email",
            Constraint::email(|s: &Signup| Some(s.email.clone()), "Please enter a valid email"),
        )
        .constraint(
            "password",
            Constraint::length(
                |s: &Signup| Some(s.password.clone()),
                8,
                64,
                "Password must be 8-64 characters",
            ),
        )
        .build()
}

fn main() {
    TermLogger::init(
        LevelFilter::Debug,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .expect("Failed to initialize logger");

    let name = TextField::new("name");
    let email = TextField::new("email").email("Please enter a valid email");
    let password = TextField::new("password");
    let password_again = TextField::new("password_again");

    let group = FormGroup::new(Signup::default())
        .with_engine(Arc::new(SchemaEngine::new(signup_schema())));

    group
        .bind(
            "name",
            Arc::new(name.clone()),
            Box::new(|s: &Signup| s.name.clone().unwrap_or_default()),
            Box::new(|s: &mut Signup, v: &str| {
                s.name = if v.is_empty() { None } else { Some(v.to_string()) };
            }),
        )
        .bind(
            "email",
            Arc::new(email.clone()),
            Box::new(|s: &Signup| s.email.clone()),
            Box::new(|s: &mut Signup, v: &str| s.email = v.to_string()),
        )
        .bind(
            "password",
            Arc::new(password.clone()),
            Box::new(|s: &Signup| s.password.clone()),
            Box::new(|s: &mut Signup, v: &str| s.password = v.to_string()),
        )
        .bind(
            "password_again",
            Arc::new(password_again.clone()),
            Box::new(|s: &Signup| s.password_again.clone()),
            Box::new(|s: &mut Signup, v: &str| s.password_again = v.to_string()),
        )
        .configure_defaults()
        .add_validator(
            "passwords_match",
            |s: &Signup| {
                if s.password == s.password_again {
                    Ok(())
                } else {
                    Err(InvalidValue::new("Passwords do not match"))
                }
            },
            vec![Arc::new(password_again.clone())],
        );

    let group = group.with_eager_validation(|group: &FormGroup<Signup>| {
        println!("form dirtied (valid: {})", group.is_valid());
    });

    // A pristine required field shows no error yet.
    group.hide_initial_validation_errors();
    println!("suppressed: {:?}", group.suppressed_fields());

    // The user types a name; the field becomes visible again.
    name.type_text("A");
    name.type_text("Ada");
    println!("suppressed after edit: {:?}", group.suppressed_fields());

    email.type_text("ada@example.com");
    password.type_text("correct horse");
    password_again.type_text("correct horse");

    println!("valid: {}", group.is_valid());
    println!("bean-level errors: {:?}", group.bean_level_messages());
    println!("bean: {:?}", group.bean());

    group.unbind();
}
