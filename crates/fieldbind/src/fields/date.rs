//! Date field types.

use super::FormDatePicker;
use crate::widgets::DateInput;

/// Creates a date picker field storing ISO dates.
pub fn date_field(name: &str, label: &str) -> FormDatePicker {
    FormDatePicker::new(name, label, DateInput::new())
}
