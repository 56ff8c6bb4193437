//! Declarative schema validation.
//!
//! A [`Schema`] maps field names to [`FieldRules`]. Running it over a set of
//! form values either returns the parsed values (with transforms such as
//! trimming applied) or a [`ValidationErrors`] collection keyed by field.
//! The form container only ever looks at the first message of each field.

use std::fmt;
use std::sync::LazyLock;

use chrono::{Local, NaiveDate};
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::error::ValidationErrors;
use crate::state::Values;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern compiles")
});

static HTTP_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://[^\s/?#]+([/?#]\S*)?$").expect("url pattern compiles")
});

/// Date format used by date rules and the date picker.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Trait for field validation rules.
pub trait Rule: Send + Sync {
    /// Validates a value and returns an error message if invalid.
    fn validate(&self, value: &Value) -> Result<(), String>;

    /// Returns the error message for this rule.
    fn message(&self) -> &str;
}

/// Name of a JSON value's type, as shown in type mismatch messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "undefined",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn expect_str<'v>(value: &'v Value, required: &str) -> Result<&'v str, String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Null => Err(required.to_string()),
        other => Err(format!("Expected string, received {}", type_name(other))),
    }
}

/// Rule that requires a non-blank string.
#[derive(Debug, Clone)]
pub struct Required {
    message: String,
}

impl Required {
    /// Creates a new Required rule with default message.
    pub fn new() -> Self {
        Self {
            message: "This field is required.".to_string(),
        }
    }

    /// Creates a new Required rule with custom message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for Required {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for Required {
    fn validate(&self, value: &Value) -> Result<(), String> {
        let text = expect_str(value, &self.message)?;
        if text.trim().is_empty() {
            Err(self.message.clone())
        } else {
            Ok(())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Rule that enforces a maximum length in characters.
#[derive(Debug, Clone)]
pub struct MaxLength {
    max_length: usize,
    message: String,
}

impl MaxLength {
    /// Creates a new MaxLength rule.
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            message: format!("Ensure this value has at most {max_length} characters."),
        }
    }

    /// Creates a new MaxLength rule with custom message.
    pub fn with_message(max_length: usize, message: impl Into<String>) -> Self {
        Self {
            max_length,
            message: message.into(),
        }
    }
}

impl Rule for MaxLength {
    fn validate(&self, value: &Value) -> Result<(), String> {
        let text = expect_str(value, &self.message)?;
        if text.chars().count() > self.max_length {
            Err(self.message.clone())
        } else {
            Ok(())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Rule that enforces a minimum length in characters.
#[derive(Debug, Clone)]
pub struct MinLength {
    min_length: usize,
    message: String,
}

impl MinLength {
    /// Creates a new MinLength rule.
    pub fn new(min_length: usize) -> Self {
        Self {
            min_length,
            message: format!("Ensure this value has at least {min_length} characters."),
        }
    }

    /// Creates a new MinLength rule with custom message.
    pub fn with_message(min_length: usize, message: impl Into<String>) -> Self {
        Self {
            min_length,
            message: message.into(),
        }
    }
}

impl Rule for MinLength {
    fn validate(&self, value: &Value) -> Result<(), String> {
        let text = expect_str(value, &self.message)?;
        if text.chars().count() < self.min_length {
            Err(self.message.clone())
        } else {
            Ok(())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Rule for email addresses.
#[derive(Debug, Clone)]
pub struct Email {
    message: String,
}

impl Email {
    /// Creates a new Email rule with default message.
    pub fn new() -> Self {
        Self {
            message: "Enter a valid email address.".to_string(),
        }
    }

    /// Creates a new Email rule with custom message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for Email {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for Email {
    fn validate(&self, value: &Value) -> Result<(), String> {
        let text = expect_str(value, &self.message)?;
        if EMAIL_RE.is_match(text) {
            Ok(())
        } else {
            Err(self.message.clone())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Rule for absolute `http` or `https` URLs.
#[derive(Debug, Clone)]
pub struct HttpUrl {
    message: String,
}

impl HttpUrl {
    /// Creates a new HttpUrl rule with default message.
    pub fn new() -> Self {
        Self {
            message: "Enter a valid URL.".to_string(),
        }
    }

    /// Creates a new HttpUrl rule with custom message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for HttpUrl {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for HttpUrl {
    fn validate(&self, value: &Value) -> Result<(), String> {
        let text = expect_str(value, &self.message)?;
        if HTTP_URL_RE.is_match(text) {
            Ok(())
        } else {
            Err(self.message.clone())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Rule for whole numbers within optional bounds.
#[derive(Debug, Clone, Default)]
pub struct Integer {
    min: Option<i64>,
    max: Option<i64>,
    message: Option<String>,
}

impl Integer {
    /// Creates an unbounded Integer rule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the inclusive lower bound.
    #[must_use]
    pub fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    /// Sets the inclusive upper bound.
    #[must_use]
    pub fn max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    /// Requires the number to be greater than zero.
    #[must_use]
    pub fn positive(self) -> Self {
        self.min(1)
    }

    /// Replaces every generated message with a fixed one.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn fail(&self, generated: String) -> String {
        self.message.clone().unwrap_or(generated)
    }
}

impl Rule for Integer {
    fn validate(&self, value: &Value) -> Result<(), String> {
        let Value::Number(number) = value else {
            return Err(self.fail(format!(
                "Expected number, received {}",
                type_name(value)
            )));
        };
        let Some(n) = number.as_i64() else {
            return Err(self.fail("Expected integer, received float".to_string()));
        };

        if let Some(min) = self.min {
            if n < min {
                return Err(self.fail(if min == 1 {
                    "Number must be greater than 0".to_string()
                } else {
                    format!("Number must be greater than or equal to {min}")
                }));
            }
        }

        if let Some(max) = self.max {
            if n > max {
                return Err(self.fail(format!("Number must be less than or equal to {max}")));
            }
        }

        Ok(())
    }

    fn message(&self) -> &str {
        self.message.as_deref().unwrap_or("Invalid number.")
    }
}

/// Rule restricting a string to a fixed set of choices.
#[derive(Debug, Clone)]
pub struct OneOf {
    choices: Vec<String>,
    message: String,
}

impl OneOf {
    /// Creates a new OneOf rule.
    pub fn new(choices: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let choices: Vec<String> = choices.into_iter().map(Into::into).collect();
        let expected = choices
            .iter()
            .map(|c| format!("'{c}'"))
            .collect::<Vec<_>>()
            .join(" | ");
        Self {
            choices,
            message: format!("Invalid enum value. Expected {expected}"),
        }
    }

    /// Replaces the generated message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl Rule for OneOf {
    fn validate(&self, value: &Value) -> Result<(), String> {
        let text = expect_str(value, &self.message)?;
        if self.choices.iter().any(|c| c == text) {
            Ok(())
        } else {
            Err(format!("{}, received '{text}'", self.message))
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Lower bound for [`DateNotBefore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    /// The local calendar date at validation time.
    Today,
    /// A fixed date.
    Fixed(NaiveDate),
}

impl DateBound {
    fn resolve(self) -> NaiveDate {
        match self {
            Self::Today => Local::now().date_naive(),
            Self::Fixed(date) => date,
        }
    }
}

/// Rule for ISO dates (`YYYY-MM-DD`) on or after a bound.
#[derive(Debug, Clone)]
pub struct DateNotBefore {
    bound: DateBound,
    message: String,
}

impl DateNotBefore {
    /// Requires the date to be on or after `date`.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            bound: DateBound::Fixed(date),
            message: format!("Date must be on or after {}", date.format(DATE_FORMAT)),
        }
    }

    /// Requires the date to be today or in the future.
    pub fn today() -> Self {
        Self {
            bound: DateBound::Today,
            message: "Date must be today or in the future".to_string(),
        }
    }

    /// Replaces the default message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl Rule for DateNotBefore {
    fn validate(&self, value: &Value) -> Result<(), String> {
        let text = expect_str(value, "Required")?;
        let date = NaiveDate::parse_from_str(text, DATE_FORMAT)
            .map_err(|_| "Invalid date".to_string())?;
        if date < self.bound.resolve() {
            Err(self.message.clone())
        } else {
            Ok(())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

type Predicate = Box<dyn Fn(&Value) -> bool + Send + Sync>;

/// Rule backed by a caller predicate.
pub struct Refine {
    predicate: Predicate,
    message: String,
}

impl Refine {
    /// Creates a rule that fails with `message` when `predicate` is false.
    pub fn new(
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
        message: impl Into<String>,
    ) -> Self {
        Self {
            predicate: Box::new(predicate),
            message: message.into(),
        }
    }
}

impl fmt::Debug for Refine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Refine")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl Rule for Refine {
    fn validate(&self, value: &Value) -> Result<(), String> {
        if (self.predicate)(value) {
            Ok(())
        } else {
            Err(self.message.clone())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Rules attached to one field of a [`Schema`].
#[derive(Default)]
pub struct FieldRules {
    trim: bool,
    optional: bool,
    rules: Vec<Box<dyn Rule>>,
}

impl fmt::Debug for FieldRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRules")
            .field("trim", &self.trim)
            .field("optional", &self.optional)
            .field("rules", &self.rules.len())
            .finish()
    }
}

impl FieldRules {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trims string values before any rule runs.
    #[must_use]
    pub fn trim(mut self) -> Self {
        self.trim = true;
        self
    }

    /// Accepts a missing (`null`) value without running the rules.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Adds a rule. Rules run in insertion order.
    #[must_use]
    pub fn rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Applies transforms and runs every rule against `value`.
    pub fn check(&self, value: &Value) -> Result<Value, Vec<String>> {
        let value = match value {
            Value::String(s) if self.trim => Value::String(s.trim().to_string()),
            other => other.clone(),
        };

        if self.optional && value.is_null() {
            return Ok(value);
        }

        let messages: Vec<String> = self
            .rules
            .iter()
            .filter_map(|rule| rule.validate(&value).err())
            .collect();

        if messages.is_empty() {
            Ok(value)
        } else {
            Err(messages)
        }
    }
}

/// An ordered set of field rules.
#[derive(Debug, Default)]
pub struct Schema {
    fields: Vec<(String, FieldRules)>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the rules for a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, rules: FieldRules) -> Self {
        let name = name.into();
        if let Some(slot) = self.fields.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = rules;
        } else {
            self.fields.push((name, rules));
        }
        self
    }

    /// Returns whether the schema declares `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }

    /// Returns declared field names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Validates a single field. Undeclared fields always pass unchanged.
    pub fn validate_field(&self, name: &str, value: &Value) -> Result<Value, Vec<String>> {
        match self.fields.iter().find(|(n, _)| n == name) {
            Some((_, rules)) => rules.check(value),
            None => Ok(value.clone()),
        }
    }

    /// Validates every declared field.
    ///
    /// On success the returned map holds exactly the declared fields, after
    /// transforms. Missing values are validated as `null`.
    pub fn validate(&self, values: &Values) -> Result<Values, ValidationErrors> {
        let mut parsed = Values::new();
        let mut errors = ValidationErrors::new();

        for (name, rules) in &self.fields {
            let checked = match values.get(name) {
                Some(value) => rules.check(value),
                None => rules.check(&Value::Null),
            };
            match checked {
                Ok(value) => {
                    parsed.insert(name.clone(), value);
                }
                Err(messages) => {
                    for message in messages {
                        errors.add(name, message);
                    }
                }
            }
        }

        debug!(
            fields = self.fields.len(),
            invalid = errors.len(),
            "schema validation pass"
        );

        if errors.is_empty() {
            Ok(parsed)
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_rule() {
        let r = Required::with_message("First name is required");
        assert!(r.validate(&json!("Ada")).is_ok());
        assert_eq!(
            r.validate(&json!("")),
            Err("First name is required".to_string())
        );
        assert!(r.validate(&json!("   ")).is_err());
        assert_eq!(
            r.validate(&Value::Null),
            Err("First name is required".to_string())
        );
        assert_eq!(
            r.validate(&json!(3)),
            Err("Expected string, received number".to_string())
        );
    }

    #[test]
    fn test_length_rules() {
        assert!(MaxLength::new(5).validate(&json!("hello")).is_ok());
        assert!(MaxLength::new(5).validate(&json!("hello world")).is_err());
        assert!(MinLength::new(5).validate(&json!("hi")).is_err());
        // Characters, not bytes.
        assert!(MaxLength::new(2).validate(&json!("éé")).is_ok());
    }

    #[test]
    fn test_email_rule() {
        let r = Email::with_message("Invalid email address");
        assert!(r.validate(&json!("user@example.com")).is_ok());
        assert!(r.validate(&json!("user.name@domain.co.uk")).is_ok());
        assert_eq!(
            r.validate(&json!("invalid")),
            Err("Invalid email address".to_string())
        );
        assert!(r.validate(&json!("@example.com")).is_err());
    }

    #[test]
    fn test_http_url_rule() {
        let r = HttpUrl::with_message("Please enter a valid http(s) URL");
        assert!(r.validate(&json!("https://example.com")).is_ok());
        assert!(r.validate(&json!("http://localhost:8080/api?x=1")).is_ok());
        assert!(r.validate(&json!("ftp://example.com")).is_err());
        assert!(r.validate(&json!("example.com")).is_err());
        assert!(r.validate(&json!("https://")).is_err());
    }

    #[test]
    fn test_integer_rule() {
        let r = Integer::new().positive().max(100);
        assert!(r.validate(&json!(10)).is_ok());
        assert!(r.validate(&json!(100)).is_ok());
        assert_eq!(
            r.validate(&json!(0)),
            Err("Number must be greater than 0".to_string())
        );
        assert_eq!(
            r.validate(&json!(101)),
            Err("Number must be less than or equal to 100".to_string())
        );
        assert_eq!(
            r.validate(&json!(2.5)),
            Err("Expected integer, received float".to_string())
        );
        assert_eq!(
            r.validate(&json!("12")),
            Err("Expected number, received string".to_string())
        );
    }

    #[test]
    fn test_one_of_rule() {
        let r = OneOf::new(["light", "dark", "system"]);
        assert!(r.validate(&json!("dark")).is_ok());
        assert_eq!(
            r.validate(&json!("blue")),
            Err(
                "Invalid enum value. Expected 'light' | 'dark' | 'system', received 'blue'"
                    .to_string()
            )
        );
    }

    #[test]
    fn test_date_not_before_rule() {
        let bound = NaiveDate::from_ymd_opt(2030, 1, 1).expect("valid date");
        let r = DateNotBefore::new(bound).with_message("Too early");
        assert!(r.validate(&json!("2030-01-01")).is_ok());
        assert!(r.validate(&json!("2031-06-15")).is_ok());
        assert_eq!(r.validate(&json!("2029-12-31")), Err("Too early".to_string()));
        assert_eq!(r.validate(&json!("31/12/2029")), Err("Invalid date".to_string()));

        let today = Local::now().date_naive().format(DATE_FORMAT).to_string();
        assert!(DateNotBefore::today().validate(&json!(today)).is_ok());
        assert!(DateNotBefore::today().validate(&json!("2000-01-01")).is_err());
    }

    #[test]
    fn test_refine_rule() {
        let r = Refine::new(|v| v.as_str().is_some_and(|s| s.starts_with('+')), "Use +");
        assert!(r.validate(&json!("+33")).is_ok());
        assert_eq!(r.validate(&json!("33")), Err("Use +".to_string()));
    }

    #[test]
    fn test_field_rules_trim_and_optional() {
        let rules = FieldRules::new()
            .trim()
            .rule(Required::with_message("Base URL is required"));
        assert_eq!(rules.check(&json!("  x  ")), Ok(json!("x")));
        assert_eq!(
            rules.check(&json!("   ")),
            Err(vec!["Base URL is required".to_string()])
        );

        let optional = FieldRules::new().optional().rule(Required::new());
        assert_eq!(optional.check(&Value::Null), Ok(Value::Null));
    }

    #[test]
    fn test_schema_collects_errors_per_field() {
        let schema = Schema::new()
            .field(
                "email",
                FieldRules::new()
                    .rule(Required::with_message("Email is required"))
                    .rule(Email::with_message("Invalid email address")),
            )
            .field(
                "city",
                FieldRules::new().rule(Required::with_message("City is required")),
            );

        let mut values = Values::new();
        values.insert("email".into(), json!(""));
        values.insert("extra".into(), json!("dropped"));

        let errors = schema.validate(&values).expect_err("should fail");
        assert_eq!(errors.first("email"), Some("Email is required"));
        assert_eq!(errors.get("email").map(Vec::len), Some(2));
        assert_eq!(errors.first("city"), Some("City is required"));

        values.insert("email".into(), json!("ada@example.com"));
        values.insert("city".into(), json!("London"));
        let parsed = schema.validate(&values).expect("should pass");
        assert_eq!(parsed.len(), 2);
        assert!(!parsed.contains_key("extra"));
    }

    #[test]
    fn test_schema_field_replaces_rules() {
        let schema = Schema::new()
            .field("a", FieldRules::new().rule(Required::new()))
            .field("a", FieldRules::new());
        assert_eq!(schema.names().collect::<Vec<_>>(), vec!["a"]);
        assert!(schema.validate_field("a", &Value::Null).is_ok());
        assert!(schema.validate_field("undeclared", &json!(1)).is_ok());
    }
}
