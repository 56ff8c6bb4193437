//! Native control widgets and the event model they share.
//!
//! A widget turns [`FieldRenderProps`] into a [`ControlElement`]: the control's
//! HTML plus a listener that translates browser events into calls on the
//! field's change and blur notifiers.

mod native;

pub use native::{Checkbox, DateInput, Select, TextInput, Textarea};

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::binder::FieldRenderProps;
use crate::error::Result;

/// Extra HTML attributes for a control.
///
/// Attributes render in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlAttrs {
    /// HTML attributes.
    pub attrs: BTreeMap<String, String>,
}

impl ControlAttrs {
    /// Creates new empty attributes.
    pub fn new() -> Self {
        Self {
            attrs: BTreeMap::new(),
        }
    }

    /// Sets an attribute.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(key.into(), value.into());
    }

    /// Gets an attribute.
    pub fn get(&self, key: &str) -> Option<&String> {
        self.attrs.get(key)
    }

    /// Renders the attributes with a leading space, or nothing when empty.
    pub fn to_html(&self) -> String {
        self.attrs
            .iter()
            .map(|(k, v)| format!(r#" {k}="{}""#, html_escape(v)))
            .collect()
    }

    /// Builder method to set an attribute.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }
}

/// A browser event delivered to a rendered control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlEvent {
    /// The control changed. `value` is the target's value, `checked` its
    /// checked flag.
    Change { value: String, checked: bool },
    /// The control lost focus.
    Blur,
}

impl ControlEvent {
    /// A change event from a value-carrying control.
    pub fn input(value: impl Into<String>) -> Self {
        Self::Change {
            value: value.into(),
            checked: false,
        }
    }

    /// A change event from a checkbox.
    pub fn toggle(checked: bool) -> Self {
        Self::Change {
            value: "on".to_string(),
            checked,
        }
    }
}

/// Translates control events into field notifications.
pub type Listener = Box<dyn Fn(&ControlEvent) -> Result<()> + Send + Sync>;

/// A rendered control.
pub struct ControlElement {
    markup: String,
    listener: Option<Listener>,
}

impl fmt::Debug for ControlElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlElement")
            .field("markup", &self.markup)
            .field("listening", &self.listener.is_some())
            .finish()
    }
}

impl ControlElement {
    /// A control that ignores events.
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            listener: None,
        }
    }

    #[must_use]
    pub fn with_listener(
        mut self,
        listener: impl Fn(&ControlEvent) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Delivers an event to the control's listener, if it has one.
    pub fn dispatch(&self, event: &ControlEvent) -> Result<()> {
        match &self.listener {
            Some(listener) => listener(event),
            None => Ok(()),
        }
    }
}

/// Trait for widgets that render a native control.
pub trait Widget: Send + Sync {
    /// Renders the control for one field.
    fn render(&self, props: FieldRenderProps<'_>) -> ControlElement;

    /// Returns the HTML input type.
    fn input_type(&self) -> &str {
        "text"
    }

    /// Whether the control is placed before its label by default.
    fn control_first(&self) -> bool {
        false
    }

    /// Whether the control and its label share one row by default.
    fn horizontal(&self) -> bool {
        false
    }
}

/// Text shown for a value in a text-like control.
pub fn value_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Null => Cow::Borrowed(""),
        Value::String(s) => Cow::Borrowed(s),
        Value::Bool(b) => Cow::Owned(b.to_string()),
        Value::Number(n) => Cow::Owned(n.to_string()),
        other => Cow::Owned(other.to_string()),
    }
}

/// Joins a base class with an optional extra class.
pub(crate) fn merge_class(base: &str, extra: Option<&str>) -> String {
    match extra.map(str::trim).filter(|c| !c.is_empty()) {
        Some(extra) => format!("{base} {extra}"),
        None => base.to_string(),
    }
}

/// Escapes HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
        assert_eq!(html_escape("\"test\""), "&quot;test&quot;");
        assert_eq!(html_escape("a & b"), "a &amp; b");
    }

    #[test]
    fn test_control_attrs_render_sorted_and_escaped() {
        let attrs = ControlAttrs::new()
            .with("placeholder", "a \"b\"")
            .with("autocomplete", "off");
        assert_eq!(
            attrs.to_html(),
            r#" autocomplete="off" placeholder="a &quot;b&quot;""#
        );
        assert_eq!(ControlAttrs::new().to_html(), "");
    }

    #[test]
    fn test_value_text() {
        assert_eq!(value_text(&Value::Null), "");
        assert_eq!(value_text(&json!("abc")), "abc");
        assert_eq!(value_text(&json!(42)), "42");
        assert_eq!(value_text(&json!(true)), "true");
    }

    #[test]
    fn test_merge_class() {
        assert_eq!(merge_class("a", None), "a");
        assert_eq!(merge_class("a", Some("  ")), "a");
        assert_eq!(merge_class("a", Some("b")), "a b");
    }

    #[test]
    fn test_element_without_listener_ignores_events() {
        let element = ControlElement::new("<span></span>");
        assert!(element.dispatch(&ControlEvent::Blur).is_ok());
        assert_eq!(element.markup(), "<span></span>");
    }
}
