//! Checkbox field types.

use super::FormCheckbox;
use crate::widgets::Checkbox;

/// Creates a boolean field (checkbox) placed before its label on one row.
pub fn checkbox_field(name: &str, label: &str) -> FormCheckbox {
    FormCheckbox::new(name, label, Checkbox::new())
}
