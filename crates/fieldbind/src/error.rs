//! Error types for forms.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::state::SubmitState;

/// Form-specific errors.
#[derive(Debug, Error)]
pub enum FormError {
    /// The container has no default value and no schema entry for the field.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// A submit was started while another one is still in flight.
    #[error("form submit is already in progress")]
    AlreadySubmitting,

    /// The submit state machine was asked to make an illegal move.
    #[error("invalid submit state transition: {from:?} -> {to:?}")]
    InvalidStateTransition { from: SubmitState, to: SubmitState },

    /// A lock guarding form state was poisoned by a panicking writer.
    #[error("form state lock poisoned while {0}")]
    StatePoisoned(&'static str),

    /// A submission handler refused the values. The message is user-facing.
    #[error("{0}")]
    Rejected(String),

    /// A theme name outside `light`, `dark` and `system`.
    #[error("unknown theme: {0}")]
    UnknownTheme(String),

    /// Configuration JSON could not be decoded.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] serde_json::Error),
}

/// Collection of validation errors by field.
///
/// Fields are kept in name order so that the first invalid field is stable
/// from one validation pass to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    /// Errors keyed by field name.
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Creates a new empty ValidationErrors.
    pub fn new() -> Self {
        Self {
            errors: BTreeMap::new(),
        }
    }

    /// Adds an error for a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Returns whether there are any errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of fields with errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns errors for a specific field.
    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    /// Returns the first error reported for a field.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.errors
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    /// Collapses the collection to one message per field.
    pub fn flatten(&self) -> BTreeMap<&str, &str> {
        self.errors
            .iter()
            .filter_map(|(field, messages)| {
                messages
                    .first()
                    .map(|message| (field.as_str(), message.as_str()))
            })
            .collect()
    }

    /// Returns all errors as a flat list.
    pub fn all_errors(&self) -> Vec<(&str, &str)> {
        self.errors
            .iter()
            .flat_map(|(field, messages)| {
                messages
                    .iter()
                    .map(move |msg| (field.as_str(), msg.as_str()))
            })
            .collect()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (field, messages) in &self.errors {
            for message in messages {
                writeln!(f, "{field}: {message}")?;
            }
        }
        Ok(())
    }
}

/// Result type alias for form operations.
pub type Result<T> = std::result::Result<T, FormError>;
