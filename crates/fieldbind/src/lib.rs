//! # fieldbind
//!
//! Accessible form-field binding for server-rendered HTML.
//!
//! This crate provides:
//! - A field binder that wires label, description, control and error message
//!   together with `for`/`id`, `aria-invalid` and `aria-describedby`
//! - Typed field wrappers for text inputs, selects, textareas, checkboxes and
//!   date pickers
//! - A form-state container with dirty/touched tracking and a submit state
//!   machine
//! - Schema validation with field-keyed messages
//!
//! ## Quick Start
//!
//! ```rust
//! use fieldbind::fields::email_field;
//! use fieldbind::validation::{Email, FieldRules, Schema};
//! use fieldbind::{FormControl, Values};
//! use serde_json::json;
//!
//! let mut defaults = Values::new();
//! defaults.insert("email".into(), json!("not-an-email"));
//!
//! let schema = Schema::new().field(
//!     "email",
//!     FieldRules::new().rule(Email::with_message("Invalid email address")),
//! );
//! let control = FormControl::new(defaults).with_schema(schema);
//! control.validate().unwrap();
//!
//! let field = email_field("email", "Email").render(&control).unwrap();
//! assert!(field.markup().contains(r#"aria-invalid="true""#));
//! assert!(field.markup().contains(r#"aria-describedby="email-message""#));
//! assert!(field.markup().contains("Invalid email address"));
//! ```
//!
//! ## Custom controls
//!
//! ```rust
//! use fieldbind::{ControlElement, ControlEvent, FieldBinder, FormControl, Values};
//! use serde_json::json;
//!
//! let mut defaults = Values::new();
//! defaults.insert("rating".into(), json!(3));
//! let control = FormControl::new(defaults);
//!
//! let bound = FieldBinder::new("rating", "Rating")
//!     .render(&control, |props| {
//!         let handle = props.handle.clone();
//!         ControlElement::new(format!(
//!             r#"<x-stars id="{}"{}></x-stars>"#,
//!             props.id,
//!             props.aria_attrs()
//!         ))
//!         .with_listener(move |event| match event {
//!             ControlEvent::Change { value, .. } => {
//!                 handle.on_change(value.parse::<u8>().unwrap_or(0))
//!             }
//!             ControlEvent::Blur => handle.on_blur(),
//!         })
//!     })
//!     .unwrap();
//!
//! bound.dispatch(&ControlEvent::input("5")).unwrap();
//! assert_eq!(control.value("rating").unwrap(), json!(5));
//! ```

mod binder;
pub mod config;
mod error;
pub mod fields;
mod state;
pub mod validation;
pub mod widgets;

pub use binder::{
    render_description, render_label, render_message, BoundField, FieldBinder, FieldIds,
    FieldRenderProps,
};
pub use error::{FormError, Result, ValidationErrors};
pub use state::{
    FieldDescriptor, FieldError, FieldHandle, FieldMeta, FormControl, FormOptions, FormSnapshot,
    RevalidateMode, SubmitOutcome, SubmitState, SubmitStatus, ValidationMode, Values,
    SUBMIT_FAILED_MESSAGE,
};
pub use widgets::{ControlElement, ControlEvent, Widget};
