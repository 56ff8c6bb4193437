//! Select field types.

use super::FormSelect;
use crate::widgets::Select;

/// Creates a choice field (select/dropdown).
pub fn select_field(name: &str, label: &str, choices: Vec<(&str, &str)>) -> FormSelect {
    FormSelect::new(name, label, Select::new(choices))
}
