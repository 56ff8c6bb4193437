//! Text field types.

use super::{FormInput, FormTextarea};
use crate::widgets::{TextInput, Textarea};

/// Creates a plain text input field.
pub fn text_field(name: &str, label: &str) -> FormInput {
    FormInput::new(name, label, TextInput::new())
}

/// Creates an email input field.
pub fn email_field(name: &str, label: &str) -> FormInput {
    FormInput::new(name, label, TextInput::email())
}

/// Creates a password input field.
pub fn password_field(name: &str, label: &str) -> FormInput {
    FormInput::new(name, label, TextInput::password())
}

/// Creates a number input field. Its value is stored as a JSON number.
pub fn number_field(name: &str, label: &str) -> FormInput {
    FormInput::new(name, label, TextInput::number())
}

/// Creates a multi-line text field.
pub fn textarea_field(name: &str, label: &str, rows: usize) -> FormTextarea {
    FormTextarea::new(name, label, Textarea::new(rows))
}
