#![allow(dead_code)]

use fieldbind::config::{Configuration, Theme};
use fieldbind::fields::{
    checkbox_field, date_field, email_field, number_field, password_field, select_field,
    text_field, FormCheckbox, FormDatePicker, FormInput, FormSelect,
};
use fieldbind::validation::{
    DateNotBefore, Email, FieldRules, HttpUrl, Integer, MinLength, OneOf, Required, Schema,
};
use fieldbind::{BoundField, FormControl, Values};
use serde_json::{json, Value};

pub const INVALID_EMAIL: &str = "Invalid email address";
pub const SETTINGS_SAVED: &str = "Your application settings have been successfully updated.";
pub const SETTINGS_FAILED: &str = "There was a problem updating your settings.";

pub fn values(pairs: &[(&str, Value)]) -> Values {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

pub fn render(field: &FormInput, control: &FormControl) -> BoundField {
    field
        .render(control)
        .unwrap_or_else(|e| panic!("Failed to render {}: {e}", field.name()))
}

/// Extracts the value of `attr` on the first tag that starts with `tag`.
pub fn attr_of<'a>(html: &'a str, tag: &str, attr: &str) -> Option<&'a str> {
    let start = html.find(tag)?;
    let end = start + html[start..].find('>')?;
    let element = &html[start..end];
    let needle = format!(r#" {attr}=""#);
    let value_start = element.find(&needle)? + needle.len();
    let value_len = element[value_start..].find('"')?;
    Some(&element[value_start..value_start + value_len])
}

// =============================================================================
// Settings form
// =============================================================================

pub fn settings_schema() -> Schema {
    Schema::new()
        .field(
            "baseUrl",
            FieldRules::new()
                .trim()
                .rule(Required::with_message("Base URL is required"))
                .rule(HttpUrl::with_message("Please enter a valid http(s) URL")),
        )
        .field(
            "itemsPerPage",
            FieldRules::new().rule(Integer::new().positive().max(100)),
        )
        .field(
            "apiKey",
            FieldRules::new().rule(MinLength::with_message(1, "API Key is required")),
        )
        .field(
            "theme",
            FieldRules::new().rule(OneOf::new(Theme::ALL.map(Theme::as_str))),
        )
}

pub fn settings_control(configuration: &Configuration) -> FormControl {
    FormControl::new(configuration.to_values()).with_schema(settings_schema())
}

pub struct SettingsFields {
    pub base_url: FormInput,
    pub items_per_page: FormInput,
    pub api_key: FormInput,
    pub theme: FormSelect,
}

pub fn settings_fields() -> SettingsFields {
    SettingsFields {
        base_url: text_field("baseUrl", "API Base URL")
            .description("The base URL for all API requests."),
        items_per_page: number_field("itemsPerPage", "Items Per Page")
            .description("Number of items to display per page in lists."),
        api_key: password_field("apiKey", "API Key")
            .description("Your API key for accessing external services."),
        theme: select_field(
            "theme",
            "Theme",
            Theme::ALL.map(|t| (t.as_str(), t.label())).to_vec(),
        )
        .description("Choose the application theme."),
    }
}

// =============================================================================
// Contact form
// =============================================================================

pub fn contact_schema() -> Schema {
    let required = |message: &str| FieldRules::new().rule(MinLength::with_message(1, message));
    Schema::new()
        .field("id", FieldRules::new().optional())
        .field("first_name", required("First name is required"))
        .field("last_name", required("Last name is required"))
        .field(
            "email",
            FieldRules::new().rule(Email::with_message(INVALID_EMAIL)),
        )
        .field("street_address", required("Street address is required"))
        .field("city", required("City is required"))
        .field("country", required("Country is required"))
        .field(
            "signed_on_date",
            FieldRules::new().rule(
                DateNotBefore::today()
                    .with_message("Signed on date must be today or in the future"),
            ),
        )
}

pub fn contact_defaults(signed_on_date: &str) -> Values {
    values(&[
        ("id", Value::Null),
        ("first_name", json!("")),
        ("last_name", json!("")),
        ("email", json!("")),
        ("street_address", json!("")),
        ("city", json!("")),
        ("country", json!("")),
        ("signed_on_date", json!(signed_on_date)),
        ("newsletter", json!(false)),
    ])
}

pub fn contact_control(signed_on_date: &str) -> FormControl {
    FormControl::new(contact_defaults(signed_on_date)).with_schema(contact_schema())
}

pub fn email() -> FormInput {
    email_field("email", "Email")
}

pub fn first_name() -> FormInput {
    text_field("first_name", "First Name")
}

pub fn signed_on_date() -> FormDatePicker {
    date_field("signed_on_date", "Sign on date")
}

pub fn newsletter() -> FormCheckbox {
    checkbox_field("newsletter", "Subscribe to the newsletter")
}
