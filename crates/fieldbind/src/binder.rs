//! The field binder.
//!
//! [`FieldBinder`] reads one field from a [`FormControl`], derives its
//! accessibility identifiers from the field name and composes label,
//! description, the caller-rendered control and the error message into one
//! markup fragment. It performs no validation: it only reads the container's
//! `invalid` flag and error message.

use std::fmt;

use ironhtml::html;
use ironhtml::typed::Element;
use ironhtml_elements::{Div, P};
use serde_json::Value;

use crate::error::Result;
use crate::state::{FieldDescriptor, FieldHandle, FormControl};
use crate::widgets::{html_escape, ControlElement, ControlEvent};

const LABEL_CLASS: &str = "text-sm font-medium leading-none";
const DESCRIPTION_CLASS: &str = "text-[0.8rem] text-muted-foreground";
const MESSAGE_CLASS: &str = "text-[0.8rem] font-medium text-destructive";
const ROW_CLASS: &str = "flex items-start gap-3";

/// Element identifiers of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIds {
    /// The control's `id`, referenced by the label's `for`.
    pub control: String,
    /// `<name>-description`.
    pub description: String,
    /// `<name>-message`.
    pub message: String,
}

impl FieldIds {
    /// Derives the identifiers from the field name.
    pub fn for_field(name: &str) -> Self {
        Self {
            control: name.to_string(),
            description: format!("{name}-description"),
            message: format!("{name}-message"),
        }
    }

    /// The `aria-describedby` token list, or `None` when nothing describes
    /// the control.
    pub fn described_by(&self, has_description: bool, has_message: bool) -> Option<String> {
        let tokens: Vec<&str> = [
            has_description.then_some(self.description.as_str()),
            has_message.then_some(self.message.as_str()),
        ]
        .into_iter()
        .flatten()
        .collect();
        (!tokens.is_empty()).then(|| tokens.join(" "))
    }
}

/// What a control renderer receives: the field descriptor augmented with the
/// element id and accessibility attributes.
#[derive(Debug, Clone, Copy)]
pub struct FieldRenderProps<'a> {
    pub name: &'a str,
    pub id: &'a str,
    pub value: &'a Value,
    pub aria_invalid: bool,
    pub aria_describedby: Option<&'a str>,
    pub handle: &'a FieldHandle,
}

impl FieldRenderProps<'_> {
    /// ` aria-invalid="…"` followed by ` aria-describedby="…"` when present.
    pub fn aria_attrs(&self) -> String {
        let mut attrs = format!(r#" aria-invalid="{}""#, self.aria_invalid);
        if let Some(described_by) = self.aria_describedby {
            attrs.push_str(&format!(
                r#" aria-describedby="{}""#,
                html_escape(described_by)
            ));
        }
        attrs
    }
}

/// Renders a field label. `has_error` switches on the destructive style.
pub fn render_label(ids: &FieldIds, text: &str, has_error: bool) -> String {
    let id = &ids.control;
    let class = if has_error {
        format!("{LABEL_CLASS} text-destructive")
    } else {
        LABEL_CLASS.to_string()
    };
    html! {
        label.for_(#id).class(#class) { #text }
    }
    .render()
}

/// Renders a field description.
pub fn render_description(ids: &FieldIds, text: &str) -> String {
    Element::<P>::new()
        .attr("id", &ids.description)
        .class(DESCRIPTION_CLASS)
        .text(text)
        .render()
}

/// Renders the error message, or nothing when the message is absent or empty.
pub fn render_message(ids: &FieldIds, message: Option<&str>) -> Option<String> {
    let message = message.filter(|m| !m.is_empty())?;
    Some(
        Element::<P>::new()
            .attr("id", &ids.message)
            .class(MESSAGE_CLASS)
            .text(message)
            .render(),
    )
}

/// A field rendered by a [`FieldBinder`].
#[derive(Debug)]
pub struct BoundField {
    markup: String,
    ids: FieldIds,
    control: ControlElement,
}

impl BoundField {
    /// The complete field markup.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Consumes the field, returning its markup.
    pub fn into_markup(self) -> String {
        self.markup
    }

    /// The identifiers used in the markup.
    pub fn ids(&self) -> &FieldIds {
        &self.ids
    }

    /// The control's `id`, also the label's `for`.
    pub fn control_id(&self) -> &str {
        &self.ids.control
    }

    /// The control as rendered by the caller.
    pub fn control(&self) -> &ControlElement {
        &self.control
    }

    /// Delivers a browser event to the control.
    pub fn dispatch(&self, event: &ControlEvent) -> Result<()> {
        self.control.dispatch(event)
    }
}

impl fmt::Display for BoundField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.markup)
    }
}

/// Binds one named field to a caller-rendered control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinder {
    name: String,
    label: String,
    description: Option<String>,
    horizontal: bool,
    control_first: bool,
}

impl FieldBinder {
    /// Creates a stacked binder: label, description, control, message.
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            description: None,
            horizontal: false,
            control_first: false,
        }
    }

    /// Sets the description shown under the label. An empty text counts as
    /// no description.
    #[must_use]
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Lays the control and its label out in one row.
    #[must_use]
    pub fn horizontal(mut self, horizontal: bool) -> Self {
        self.horizontal = horizontal;
        self
    }

    /// Places the control before its label.
    #[must_use]
    pub fn control_first(mut self, control_first: bool) -> Self {
        self.control_first = control_first;
        self
    }

    /// The bound field's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The label text.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Reads the field from `control` and renders it.
    ///
    /// Fails only when `control` does not know the field.
    pub fn render<F>(&self, control: &FormControl, render: F) -> Result<BoundField>
    where
        F: FnOnce(FieldRenderProps<'_>) -> ControlElement,
    {
        let field = control.field(&self.name)?;
        Ok(self.render_field(&field, render))
    }

    /// Renders an already-read field.
    pub fn render_field<F>(&self, field: &FieldDescriptor, render: F) -> BoundField
    where
        F: FnOnce(FieldRenderProps<'_>) -> ControlElement,
    {
        let ids = FieldIds::for_field(field.name());
        let message = field.error_message();
        let description = self.description.as_deref().filter(|d| !d.is_empty());
        let described_by = ids.described_by(description.is_some(), message.is_some());

        let control = render(FieldRenderProps {
            name: field.name(),
            id: &ids.control,
            value: field.value(),
            aria_invalid: field.invalid(),
            aria_describedby: described_by.as_deref(),
            handle: field.handle(),
        });

        let label_html = render_label(&ids, &self.label, message.is_some());
        let description_html = description
            .map(|text| render_description(&ids, text))
            .unwrap_or_default();
        let message_html = render_message(&ids, message);

        let wrapper_class = if self.control_first {
            "space-y-0"
        } else {
            "space-y-2"
        };
        let wrapper = Element::<Div>::new().class(wrapper_class);

        let wrapper = if self.control_first {
            wrapper.child::<Div, _>(|row| {
                row.when(self.horizontal, |r| r.class(ROW_CLASS))
                    .raw(control.markup())
                    .child::<Div, _>(|text| {
                        text.class("space-y-1 leading-none")
                            .raw(&label_html)
                            .raw(&description_html)
                    })
            })
        } else if self.horizontal {
            wrapper.child::<Div, _>(|row| {
                row.class(ROW_CLASS)
                    .child::<Div, _>(|text| {
                        text.class("space-y-1")
                            .raw(&label_html)
                            .raw(&description_html)
                    })
                    .raw(control.markup())
            })
        } else {
            wrapper
                .raw(&label_html)
                .raw(&description_html)
                .raw(control.markup())
        };

        let markup = wrapper
            .when(message_html.is_some(), |w| {
                w.raw(message_html.as_deref().unwrap_or(""))
            })
            .render();

        BoundField {
            markup,
            ids,
            control,
        }
    }
}
