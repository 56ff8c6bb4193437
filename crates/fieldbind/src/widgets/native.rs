//! Native HTML controls.

use chrono::NaiveDate;
use serde_json::{Number, Value};
use tracing::debug;

use super::{html_escape, merge_class, value_text, ControlAttrs, ControlElement, ControlEvent, Widget};
use crate::binder::FieldRenderProps;
use crate::validation::DATE_FORMAT;

const INPUT_CLASS: &str = "flex h-9 w-full min-w-0 rounded-md border border-input bg-transparent px-3 py-1 text-base shadow-xs outline-none disabled:cursor-not-allowed disabled:opacity-50 md:text-sm";

const SELECT_CLASS: &str = "border-input dark:bg-input/30 flex h-9 w-full rounded-md border bg-transparent px-3 py-1 text-sm shadow-xs outline-none focus-visible:border-ring focus-visible:ring-ring/50 focus-visible:ring-[3px] disabled:cursor-not-allowed disabled:opacity-50";

const TEXTAREA_CLASS: &str = "border-input placeholder:text-muted-foreground aria-invalid:border-destructive flex min-h-24 w-full rounded-md border bg-transparent px-3 py-2 text-base shadow-xs outline-none disabled:cursor-not-allowed disabled:opacity-50 md:text-sm";

const CHECKBOX_CLASS: &str = "mt-1 h-4 w-4";

fn placeholder_attr(placeholder: Option<&String>) -> String {
    placeholder
        .map(|p| format!(r#" placeholder="{}""#, html_escape(p)))
        .unwrap_or_default()
}

/// Text input widget.
#[derive(Debug, Clone)]
pub struct TextInput {
    /// The HTML input type (text, email, password, number).
    pub input_type: String,
    /// Placeholder text.
    pub placeholder: Option<String>,
    /// Extra CSS class.
    pub class: Option<String>,
    /// Extra attributes.
    pub attrs: ControlAttrs,
}

impl Default for TextInput {
    fn default() -> Self {
        Self {
            input_type: "text".to_string(),
            placeholder: None,
            class: None,
            attrs: ControlAttrs::new(),
        }
    }
}

impl TextInput {
    /// Creates a new text input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a password input.
    pub fn password() -> Self {
        Self {
            input_type: "password".to_string(),
            ..Default::default()
        }
    }

    /// Creates an email input.
    pub fn email() -> Self {
        Self {
            input_type: "email".to_string(),
            ..Default::default()
        }
    }

    /// Creates a number input. Its change events store numbers.
    pub fn number() -> Self {
        Self {
            input_type: "number".to_string(),
            ..Default::default()
        }
    }

    /// Sets the placeholder text.
    #[must_use]
    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }

    /// Adds a CSS class after the default ones.
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Sets an extra attribute.
    #[must_use]
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.set(key, value);
        self
    }

    fn is_number(&self) -> bool {
        self.input_type == "number"
    }
}

/// Parses a number input's text. Unparsable text becomes `null`.
fn parse_number(text: &str) -> Value {
    let text = text.trim();
    if let Ok(n) = text.parse::<i64>() {
        return Value::from(n);
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map_or(Value::Null, Value::Number)
}

impl Widget for TextInput {
    fn render(&self, props: FieldRenderProps<'_>) -> ControlElement {
        let class = merge_class(INPUT_CLASS, self.class.as_deref());
        let markup = format!(
            r#"<input type="{}" id="{}" name="{}" value="{}" class="{}"{}{}{}>"#,
            html_escape(&self.input_type),
            html_escape(props.id),
            html_escape(props.name),
            html_escape(&value_text(props.value)),
            class,
            placeholder_attr(self.placeholder.as_ref()),
            props.aria_attrs(),
            self.attrs.to_html(),
        );

        let handle = props.handle.clone();
        let numeric = self.is_number();
        ControlElement::new(markup).with_listener(move |event| match event {
            ControlEvent::Change { value, .. } if numeric => handle.on_change(parse_number(value)),
            ControlEvent::Change { value, .. } => handle.on_change(value.clone()),
            ControlEvent::Blur => handle.on_blur(),
        })
    }

    fn input_type(&self) -> &str {
        &self.input_type
    }
}

/// Multi-line text widget.
#[derive(Debug, Clone)]
pub struct Textarea {
    /// Number of rows.
    pub rows: usize,
    /// Placeholder text.
    pub placeholder: Option<String>,
    /// Extra CSS class.
    pub class: Option<String>,
}

impl Default for Textarea {
    fn default() -> Self {
        Self {
            rows: 4,
            placeholder: None,
            class: None,
        }
    }
}

impl Textarea {
    /// Creates a new textarea with the specified rows.
    pub fn new(rows: usize) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    /// Sets the placeholder text.
    #[must_use]
    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }

    /// Adds a CSS class after the default ones.
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }
}

impl Widget for Textarea {
    fn render(&self, props: FieldRenderProps<'_>) -> ControlElement {
        let class = merge_class(TEXTAREA_CLASS, self.class.as_deref());
        let markup = format!(
            r#"<textarea id="{}" name="{}" rows="{}" class="{}"{}{}>{}</textarea>"#,
            html_escape(props.id),
            html_escape(props.name),
            self.rows,
            class,
            placeholder_attr(self.placeholder.as_ref()),
            props.aria_attrs(),
            html_escape(&value_text(props.value)),
        );

        let handle = props.handle.clone();
        ControlElement::new(markup).with_listener(move |event| match event {
            ControlEvent::Change { value, .. } => handle.on_change(value.clone()),
            ControlEvent::Blur => handle.on_blur(),
        })
    }

    fn input_type(&self) -> &str {
        "textarea"
    }
}

/// Single-choice select widget.
///
/// Only string values can select an option. Any other value shows the blank
/// option.
#[derive(Debug, Clone)]
pub struct Select {
    /// Available choices (value, label).
    pub choices: Vec<(String, String)>,
    /// Whether to include an empty option.
    pub include_blank: bool,
    /// Label for blank option.
    pub blank_label: String,
    /// Extra CSS class.
    pub class: Option<String>,
}

impl Default for Select {
    fn default() -> Self {
        Self {
            choices: Vec::new(),
            include_blank: true,
            blank_label: "---------".to_string(),
            class: None,
        }
    }
}

impl Select {
    /// Creates a new select with the given choices.
    pub fn new(choices: Vec<(impl Into<String>, impl Into<String>)>) -> Self {
        Self {
            choices: choices
                .into_iter()
                .map(|(v, l)| (v.into(), l.into()))
                .collect(),
            ..Default::default()
        }
    }

    /// Disables the blank option.
    #[must_use]
    pub fn no_blank(mut self) -> Self {
        self.include_blank = false;
        self
    }

    /// Sets the blank label.
    #[must_use]
    pub fn blank_label(mut self, label: impl Into<String>) -> Self {
        self.blank_label = label.into();
        self
    }

    /// Adds a CSS class after the default ones.
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }
}

impl Widget for Select {
    fn render(&self, props: FieldRenderProps<'_>) -> ControlElement {
        let current = props.value.as_str().unwrap_or("");
        let class = merge_class(SELECT_CLASS, self.class.as_deref());

        let mut options = String::new();
        if self.include_blank {
            let selected = if current.is_empty() { " selected" } else { "" };
            options.push_str(&format!(
                r#"<option value=""{selected}>{}</option>"#,
                html_escape(&self.blank_label)
            ));
        }
        for (opt_value, label) in &self.choices {
            let selected_attr = if opt_value == current { " selected" } else { "" };
            options.push_str(&format!(
                r#"<option value="{}"{selected_attr}>{}</option>"#,
                html_escape(opt_value),
                html_escape(label)
            ));
        }

        let markup = format!(
            r#"<select id="{}" name="{}" class="{}"{}>{}</select>"#,
            html_escape(props.id),
            html_escape(props.name),
            class,
            props.aria_attrs(),
            options
        );

        let handle = props.handle.clone();
        ControlElement::new(markup).with_listener(move |event| match event {
            ControlEvent::Change { value, .. } => handle.on_change(Value::String(value.clone())),
            ControlEvent::Blur => handle.on_blur(),
        })
    }

    fn input_type(&self) -> &str {
        "select"
    }
}

/// Checkbox widget bound to a boolean value.
#[derive(Debug, Clone, Default)]
pub struct Checkbox {
    /// Extra CSS class.
    pub class: Option<String>,
}

impl Checkbox {
    /// Creates a new checkbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a CSS class after the default ones.
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }
}

impl Widget for Checkbox {
    fn render(&self, props: FieldRenderProps<'_>) -> ControlElement {
        let checked_attr = if props.value == &Value::Bool(true) {
            " checked"
        } else {
            ""
        };
        let class = merge_class(CHECKBOX_CLASS, self.class.as_deref());
        let markup = format!(
            r#"<input type="checkbox" id="{}" name="{}" class="{}"{checked_attr}{}>"#,
            html_escape(props.id),
            html_escape(props.name),
            class,
            props.aria_attrs(),
        );

        let handle = props.handle.clone();
        ControlElement::new(markup).with_listener(move |event| match event {
            ControlEvent::Change { checked, .. } => handle.on_change(*checked),
            ControlEvent::Blur => handle.on_blur(),
        })
    }

    fn input_type(&self) -> &str {
        "checkbox"
    }

    fn control_first(&self) -> bool {
        true
    }

    fn horizontal(&self) -> bool {
        true
    }
}

/// Date picker backed by `<input type="date">`.
///
/// Values are ISO dates (`YYYY-MM-DD`). Change events that do not carry a
/// valid date leave the field untouched.
#[derive(Debug, Clone, Default)]
pub struct DateInput {
    /// Earliest selectable date.
    pub min: Option<NaiveDate>,
    /// Placeholder text.
    pub placeholder: Option<String>,
}

impl DateInput {
    /// Creates a new date picker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the earliest selectable date.
    #[must_use]
    pub fn min(mut self, date: NaiveDate) -> Self {
        self.min = Some(date);
        self
    }

    /// Sets the placeholder text.
    #[must_use]
    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }
}

impl Widget for DateInput {
    fn render(&self, props: FieldRenderProps<'_>) -> ControlElement {
        let value = props
            .value
            .as_str()
            .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default();
        let min_attr = self
            .min
            .map(|d| format!(r#" min="{}""#, d.format(DATE_FORMAT)))
            .unwrap_or_default();
        let markup = format!(
            r#"<input type="date" id="{}" name="{}" value="{value}" class="{}"{min_attr}{}{}>"#,
            html_escape(props.id),
            html_escape(props.name),
            INPUT_CLASS,
            placeholder_attr(self.placeholder.as_ref()),
            props.aria_attrs(),
        );

        let handle = props.handle.clone();
        ControlElement::new(markup).with_listener(move |event| match event {
            ControlEvent::Change { value, .. } => {
                match NaiveDate::parse_from_str(value, DATE_FORMAT) {
                    Ok(date) => handle.on_change(date.format(DATE_FORMAT).to_string()),
                    Err(_) => {
                        debug!(field = handle.name(), "ignoring change without a date");
                        Ok(())
                    }
                }
            }
            ControlEvent::Blur => handle.on_blur(),
        })
    }

    fn input_type(&self) -> &str {
        "date"
    }
}
