//! Typed field wrappers.
//!
//! A [`FormField`] pairs a [`FieldBinder`] with a [`Widget`]. The aliases
//! ([`FormInput`], [`FormSelect`], [`FormTextarea`], [`FormCheckbox`],
//! [`FormDatePicker`]) name the common pairings; the helper functions build
//! them with sensible defaults.

mod checkbox;
mod date;
mod input;
mod select;

pub use checkbox::checkbox_field;
pub use date::date_field;
pub use input::{email_field, number_field, password_field, text_field, textarea_field};
pub use select::select_field;

use crate::binder::{BoundField, FieldBinder};
use crate::error::Result;
use crate::state::FormControl;
use crate::widgets::{Checkbox, DateInput, Select, TextInput, Textarea, Widget};

/// A field binder rendering a native widget.
#[derive(Debug, Clone)]
pub struct FormField<W> {
    binder: FieldBinder,
    widget: W,
}

/// A text-like input field.
pub type FormInput = FormField<TextInput>;
pub type FormSelect = FormField<Select>;
pub type FormTextarea = FormField<Textarea>;
pub type FormCheckbox = FormField<Checkbox>;
pub type FormDatePicker = FormField<DateInput>;

impl<W: Widget> FormField<W> {
    /// Creates a field using the widget's default layout.
    pub fn new(name: impl Into<String>, label: impl Into<String>, widget: W) -> Self {
        let binder = FieldBinder::new(name, label)
            .horizontal(widget.horizontal())
            .control_first(widget.control_first());
        Self { binder, widget }
    }

    /// Sets the description shown under the label.
    #[must_use]
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.binder = self.binder.description(text);
        self
    }

    /// Overrides the widget's default row layout.
    #[must_use]
    pub fn horizontal(mut self, horizontal: bool) -> Self {
        self.binder = self.binder.horizontal(horizontal);
        self
    }

    /// Overrides the widget's default control position.
    #[must_use]
    pub fn control_first(mut self, control_first: bool) -> Self {
        self.binder = self.binder.control_first(control_first);
        self
    }

    /// Replaces the widget, e.g. to set a placeholder.
    #[must_use]
    pub fn widget(mut self, f: impl FnOnce(W) -> W) -> Self {
        self.widget = f(self.widget);
        self
    }

    /// The underlying binder.
    pub fn binder(&self) -> &FieldBinder {
        &self.binder
    }

    /// The bound field's name.
    pub fn name(&self) -> &str {
        self.binder.name()
    }

    /// Renders the field from the current state of `control`.
    pub fn render(&self, control: &FormControl) -> Result<BoundField> {
        self.binder
            .render(control, |props| self.widget.render(props))
    }
}
