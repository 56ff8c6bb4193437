//! Integration tests for validation and submission through `FormControl`.

mod common;

use chrono::{Days, Local};
use common::*;
use fieldbind::config::{Configuration, ConfigurationStore, InMemoryConfiguration, Theme};
use fieldbind::{FormError, SubmitState, SubmitStatus};
use serde_json::json;
use std::cell::Cell;

async fn save_settings(
    store: InMemoryConfiguration,
    values: fieldbind::Values,
) -> fieldbind::Result<Option<String>> {
    let mut configuration = store.configuration().await?;
    configuration.apply(&values)?;
    store.set_configuration(configuration).await?;
    Ok(Some(SETTINGS_SAVED.to_string()))
}

// =============================================================================
// Settings
// =============================================================================

#[tokio::test]
async fn test_settings_submit_updates_configuration() {
    let store = InMemoryConfiguration::default();
    let control = settings_control(&store.configuration().await.unwrap());

    control
        .set_value("baseUrl", "  https://api.example.com  ")
        .unwrap();
    control.set_value("itemsPerPage", 25).unwrap();
    control.set_value("theme", "dark").unwrap();

    let outcome = control
        .submit_async(|values| save_settings(store.clone(), values))
        .await
        .unwrap();

    assert_eq!(outcome.status, SubmitStatus::Success);
    assert_eq!(outcome.message.as_deref(), Some(SETTINGS_SAVED));

    let saved = store.configuration().await.unwrap();
    assert_eq!(saved.api_base_url, "https://api.example.com");
    assert_eq!(saved.number_of_items_per_page, 25);
    assert_eq!(saved.theme, Theme::Dark);
    assert_eq!(saved.api_key, "nothing");

    let snapshot = control.snapshot().unwrap();
    assert_eq!(snapshot.submit_state, SubmitState::Succeeded);
    assert_eq!(snapshot.submit_count, 1);
}

#[tokio::test]
async fn test_settings_submit_blocked_by_default_base_url() {
    let store = InMemoryConfiguration::default();
    let control = settings_control(&Configuration::default());
    let called = Cell::new(false);

    let outcome = control
        .submit_async(|values| {
            called.set(true);
            save_settings(store.clone(), values)
        })
        .await
        .unwrap();

    assert!(!called.get());
    assert_eq!(outcome.status, SubmitStatus::Error);
    assert_eq!(outcome.message, None);

    let fields = settings_fields();
    let html = fields.base_url.render(&control).unwrap().into_markup();
    assert!(html.contains("Base URL is required"));
    assert!(!html.contains("Please enter a valid http(s) URL"));
    assert_eq!(attr_of(&html, "<input", "aria-invalid"), Some("true"));
    assert_eq!(
        attr_of(&html, "<input", "aria-describedby"),
        Some("baseUrl-description baseUrl-message")
    );
}

#[tokio::test]
async fn test_settings_rejection_keeps_values() {
    let control = settings_control(&Configuration::default());
    control.set_value("baseUrl", "https://api.example.com").unwrap();
    control.set_value("apiKey", "secret").unwrap();
    let before = control.values().unwrap();

    let outcome = control
        .submit_async(|_| async {
            Err::<Option<String>, _>(FormError::Rejected(SETTINGS_FAILED.to_string()))
        })
        .await
        .unwrap();

    assert_eq!(outcome.status, SubmitStatus::Error);
    assert_eq!(outcome.message.as_deref(), Some(SETTINGS_FAILED));
    assert_eq!(control.values().unwrap(), before);
    assert_eq!(control.snapshot().unwrap().submit_state, SubmitState::Failed);

    // The user can retry straight away.
    let outcome = control
        .submit_async(|_| async { Ok::<_, FormError>(Some(SETTINGS_SAVED.to_string())) })
        .await
        .unwrap();
    assert!(outcome.is_success());
}

#[tokio::test]
async fn test_second_submit_while_in_flight_is_refused() {
    let control = settings_control(&Configuration::default());
    control.set_value("baseUrl", "https://api.example.com").unwrap();
    let inner = control.clone();

    let outcome = control
        .submit_async(|_| async move {
            assert!(inner.is_submitting().unwrap());
            assert!(matches!(
                inner.submit(|_| Ok(None)),
                Err(FormError::AlreadySubmitting)
            ));
            Ok::<Option<String>, FormError>(None)
        })
        .await
        .unwrap();

    assert!(outcome.is_success());
}

#[test]
fn test_settings_items_per_page_bounds() {
    let control = settings_control(&Configuration::default());
    control.set_value("baseUrl", "https://api.example.com").unwrap();

    control.set_value("itemsPerPage", 0).unwrap();
    control.submit(|_| Ok(None)).unwrap();
    assert_eq!(
        control.field("itemsPerPage").unwrap().error_message(),
        Some("Number must be greater than 0")
    );

    control.set_value("itemsPerPage", 101).unwrap();
    assert_eq!(
        control.field("itemsPerPage").unwrap().error_message(),
        Some("Number must be less than or equal to 100")
    );

    control.set_value("itemsPerPage", 100).unwrap();
    assert!(!control.field("itemsPerPage").unwrap().invalid());
}

// =============================================================================
// Contacts
// =============================================================================

#[test]
fn test_contact_submit_suppressed_until_valid() {
    let today = Local::now().date_naive();
    let control = contact_control(&today.format("%Y-%m-%d").to_string());
    let submitted = Cell::new(0);

    let outcome = control
        .submit(|_| {
            submitted.set(submitted.get() + 1);
            Ok(None)
        })
        .unwrap();
    assert_eq!(outcome.status, SubmitStatus::Error);
    assert_eq!(submitted.get(), 0);

    let errors = control.errors().unwrap();
    assert_eq!(
        errors.get("first_name").and_then(|e| e.message()),
        Some("First name is required")
    );
    assert_eq!(
        errors.get("email").and_then(|e| e.message()),
        Some(INVALID_EMAIL)
    );
    assert!(!errors.contains_key("signed_on_date"));
    assert!(!errors.contains_key("id"));

    for (name, value) in [
        ("first_name", "Ada"),
        ("last_name", "Lovelace"),
        ("email", "ada@example.com"),
        ("street_address", "12 St James's Square"),
        ("city", "London"),
        ("country", "United Kingdom"),
    ] {
        control.set_value(name, value).unwrap();
    }
    // Fields re-validate on change once a submit has been attempted.
    assert!(control.errors().unwrap().is_empty());

    let html = email().render(&control).unwrap().into_markup();
    assert!(!html.contains(INVALID_EMAIL));
    assert_eq!(attr_of(&html, "<input", "aria-invalid"), Some("false"));

    let outcome = control
        .submit(|values| {
            submitted.set(submitted.get() + 1);
            assert_eq!(values.get("first_name"), Some(&json!("Ada")));
            Ok(None)
        })
        .unwrap();
    assert!(outcome.is_success());
    assert_eq!(submitted.get(), 1);
}

#[test]
fn test_contact_signed_on_date_in_past() {
    let yesterday = Local::now()
        .date_naive()
        .checked_sub_days(Days::new(1))
        .unwrap();
    let control = contact_control(&yesterday.format("%Y-%m-%d").to_string());
    control.validate().unwrap().unwrap_err();

    let html = signed_on_date()
        .render(&control)
        .unwrap()
        .into_markup();
    assert!(html.contains("Signed on date must be today or in the future"));
    assert_eq!(
        attr_of(&html, "<input", "aria-describedby"),
        Some("signed_on_date-message")
    );
}

#[test]
fn test_reset_clears_errors_and_values() {
    let control = contact_control("2999-01-01");
    control.set_value("city", "Paris").unwrap();
    control.validate().unwrap().unwrap_err();
    assert!(!control.errors().unwrap().is_empty());

    control.reset(None).unwrap();
    assert!(control.errors().unwrap().is_empty());
    assert_eq!(control.value("city").unwrap(), json!(""));
    let snapshot = control.snapshot().unwrap();
    assert_eq!(snapshot.submit_count, 0);
    assert!(!snapshot.is_dirty);
}

#[test]
fn test_contact_required_fields_accept_whitespace() {
    let control = contact_control("2999-01-01");
    control.set_value("city", "   ").unwrap();
    control.validate().unwrap().unwrap_err();

    let errors = control.errors().unwrap();
    assert!(!errors.contains_key("city"));
    assert_eq!(
        errors.get("country").and_then(|e| e.message()),
        Some("Country is required")
    );
}

#[test]
fn test_settings_api_key_must_not_be_empty() {
    let control = settings_control(&Configuration::default());
    control.set_value("baseUrl", "https://api.example.com").unwrap();
    control.set_value("apiKey", "").unwrap();
    control.submit(|_| Ok(None)).unwrap();
    assert_eq!(
        control.field("apiKey").unwrap().error_message(),
        Some("API Key is required")
    );

    control.set_value("apiKey", " ").unwrap();
    assert!(!control.field("apiKey").unwrap().invalid());
}
