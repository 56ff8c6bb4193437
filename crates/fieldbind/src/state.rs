//! The form-state container.
//!
//! [`FormControl`] owns the current values of a form, per-field metadata
//! (dirty, touched, error) and the submit state machine. It is a cheap
//! clonable handle; every clone observes the same state. Locks are never held
//! while caller code runs.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{FormError, Result, ValidationErrors};
use crate::validation::Schema;

/// Form values keyed by field name.
pub type Values = serde_json::Map<String, Value>;

/// Notification text for a submit whose handler failed with anything other
/// than [`FormError::Rejected`].
pub const SUBMIT_FAILED_MESSAGE: &str = "There was a problem submitting the form.";

/// When a field is validated before the first submit.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ValidationMode {
    #[default]
    OnSubmit,
    OnChange,
    OnBlur,
}

/// When a field is validated again after the first submit.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RevalidateMode {
    #[default]
    OnChange,
    OnBlur,
    OnSubmit,
}

/// Container behaviour.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FormOptions {
    /// Applies until the first submit.
    pub validate_mode: ValidationMode,
    /// Applies from the first submit on.
    pub revalidate_mode: RevalidateMode,
}

/// Where a form is in its submit cycle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitState {
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

/// The user-facing result of a submit, meant to be shown as a notification.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitStatus {
    Idle,
    Success,
    Error,
}

/// What a submit produced.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubmitOutcome {
    pub status: SubmitStatus,
    /// Notification text. `None` means nothing should be shown.
    pub message: Option<String>,
}

impl SubmitOutcome {
    /// Nothing has been submitted.
    pub fn idle() -> Self {
        Self {
            status: SubmitStatus::Idle,
            message: None,
        }
    }

    /// A handled submit, with an optional confirmation.
    pub fn success(message: Option<String>) -> Self {
        Self {
            status: SubmitStatus::Success,
            message,
        }
    }

    /// A failed submit. `None` when validation blocked it.
    pub fn error(message: Option<String>) -> Self {
        Self {
            status: SubmitStatus::Error,
            message,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == SubmitStatus::Success
    }
}

/// An error attached to one field.
///
/// A field can be invalid without a displayable message, e.g. when an error
/// was set programmatically with no text.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FieldError {
    pub message: Option<String>,
}

impl FieldError {
    /// An error with a displayable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    pub fn without_message() -> Self {
        Self { message: None }
    }

    /// The message, if it is a non-empty string.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.is_empty())
    }
}

/// Per-field bookkeeping kept by the container.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FieldMeta {
    pub dirty: bool,
    pub touched: bool,
    pub error: Option<FieldError>,
}

impl FieldMeta {
    pub fn invalid(&self) -> bool {
        self.error.is_some()
    }
}

/// A copy of the whole form state at one point in time.
#[derive(Clone, Debug)]
pub struct FormSnapshot {
    pub values: Values,
    pub submit_state: SubmitState,
    pub submit_count: u32,
    pub is_dirty: bool,
    pub is_valid: bool,
    pub field_meta: BTreeMap<String, FieldMeta>,
}

struct FormStore {
    defaults: Values,
    values: Values,
    meta: BTreeMap<String, FieldMeta>,
    submit_state: SubmitState,
    submit_count: u32,
}

impl FormStore {
    fn ensure_meta(&mut self, name: &str) -> &mut FieldMeta {
        self.meta.entry(name.to_string()).or_default()
    }
}

/// Handle to a form's state.
#[derive(Clone)]
pub struct FormControl {
    options: FormOptions,
    schema: Option<Arc<Schema>>,
    store: Arc<RwLock<FormStore>>,
}

impl fmt::Debug for FormControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormControl")
            .field("options", &self.options)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Change,
    Blur,
}

impl FormControl {
    /// Creates a container holding `defaults`.
    pub fn new(defaults: Values) -> Self {
        Self {
            options: FormOptions::default(),
            schema: None,
            store: Arc::new(RwLock::new(FormStore {
                values: defaults.clone(),
                defaults,
                meta: BTreeMap::new(),
                submit_state: SubmitState::Idle,
                submit_count: 0,
            })),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: FormOptions) -> Self {
        self.options = options;
        self
    }

    /// Attaches the schema used by `trigger`, `validate` and the submit methods.
    #[must_use]
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(Arc::new(schema));
        self
    }

    pub fn options(&self) -> FormOptions {
        self.options
    }

    fn knows(&self, store: &FormStore, name: &str) -> bool {
        store.defaults.contains_key(name)
            || store.values.contains_key(name)
            || self.schema.as_ref().is_some_and(|s| s.contains(name))
    }

    /// Returns the descriptor of `name` for one render pass.
    pub fn field(&self, name: &str) -> Result<FieldDescriptor> {
        let store = read_lock(&self.store, "reading field")?;
        if !self.knows(&store, name) {
            return Err(FormError::UnknownField(name.to_string()));
        }
        let meta = store.meta.get(name).cloned().unwrap_or_default();
        Ok(FieldDescriptor {
            value: store.values.get(name).cloned().unwrap_or(Value::Null),
            dirty: meta.dirty,
            touched: meta.touched,
            error: meta.error,
            handle: FieldHandle {
                control: self.clone(),
                name: Arc::from(name),
            },
        })
    }

    /// Current value of `name`; `null` for a known field with no value.
    pub fn value(&self, name: &str) -> Result<Value> {
        let store = read_lock(&self.store, "reading value")?;
        if !self.knows(&store, name) {
            return Err(FormError::UnknownField(name.to_string()));
        }
        Ok(store.values.get(name).cloned().unwrap_or(Value::Null))
    }

    pub fn values(&self) -> Result<Values> {
        Ok(read_lock(&self.store, "reading values")?.values.clone())
    }

    /// Stores a new value and re-validates the field if the mode asks for it.
    pub fn set_value(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        {
            let mut store = write_lock(&self.store, "setting value")?;
            if !self.knows(&store, name) {
                return Err(FormError::UnknownField(name.to_string()));
            }
            let dirty = match store.defaults.get(name) {
                Some(default) => *default != value,
                None => !value.is_null(),
            };
            debug!(field = name, dirty, "field changed");
            store.values.insert(name.to_string(), value);
            store.ensure_meta(name).dirty = dirty;
        }
        if self.validates_on(Trigger::Change)? {
            self.trigger(name)?;
        }
        Ok(())
    }

    /// Marks the field as touched and re-validates it if the mode asks for it.
    pub fn touch(&self, name: &str) -> Result<()> {
        {
            let mut store = write_lock(&self.store, "touching field")?;
            if !self.knows(&store, name) {
                return Err(FormError::UnknownField(name.to_string()));
            }
            store.ensure_meta(name).touched = true;
        }
        if self.validates_on(Trigger::Blur)? {
            self.trigger(name)?;
        }
        Ok(())
    }

    fn validates_on(&self, trigger: Trigger) -> Result<bool> {
        let submitted = read_lock(&self.store, "reading submit count")?.submit_count > 0;
        Ok(if submitted {
            matches!(
                (self.options.revalidate_mode, trigger),
                (RevalidateMode::OnChange, Trigger::Change) | (RevalidateMode::OnBlur, Trigger::Blur)
            )
        } else {
            matches!(
                (self.options.validate_mode, trigger),
                (ValidationMode::OnChange, Trigger::Change) | (ValidationMode::OnBlur, Trigger::Blur)
            )
        })
    }

    /// Validates one field against the schema. Returns whether it is valid.
    ///
    /// Without a schema the field's current error is left alone.
    pub fn trigger(&self, name: &str) -> Result<bool> {
        let Some(schema) = &self.schema else {
            return Ok(true);
        };
        let value = self.value(name)?;
        let error = schema
            .validate_field(name, &value)
            .err()
            .map(|messages| FieldError {
                message: messages.into_iter().next(),
            });
        let valid = error.is_none();
        write_lock(&self.store, "storing field validation")?
            .ensure_meta(name)
            .error = error;
        Ok(valid)
    }

    /// Validates every field and replaces all field errors with the result.
    ///
    /// The outer `Result` reports container failures; the inner one is the
    /// schema outcome (parsed values or the errors that were attached).
    pub fn validate(&self) -> Result<std::result::Result<Values, ValidationErrors>> {
        let values = self.values()?;
        let Some(schema) = &self.schema else {
            return Ok(Ok(values));
        };
        let outcome = schema.validate(&values);

        let mut store = write_lock(&self.store, "storing form validation")?;
        for meta in store.meta.values_mut() {
            meta.error = None;
        }
        if let Err(errors) = &outcome {
            for (name, message) in errors.flatten() {
                store.ensure_meta(name).error = Some(FieldError::new(message));
            }
        }
        Ok(outcome)
    }

    /// Attaches an error to a field without running validation.
    pub fn set_error(&self, name: &str, error: FieldError) -> Result<()> {
        let mut store = write_lock(&self.store, "setting field error")?;
        if !self.knows(&store, name) {
            return Err(FormError::UnknownField(name.to_string()));
        }
        store.ensure_meta(name).error = Some(error);
        Ok(())
    }

    pub fn clear_errors(&self) -> Result<()> {
        let mut store = write_lock(&self.store, "clearing all field errors")?;
        for meta in store.meta.values_mut() {
            meta.error = None;
        }
        Ok(())
    }

    pub fn clear_field_errors(&self, name: &str) -> Result<()> {
        let mut store = write_lock(&self.store, "clearing field errors")?;
        if let Some(meta) = store.meta.get_mut(name) {
            meta.error = None;
        }
        Ok(())
    }

    /// Current errors keyed by field name.
    pub fn errors(&self) -> Result<BTreeMap<String, FieldError>> {
        Ok(read_lock(&self.store, "reading errors")?
            .meta
            .iter()
            .filter_map(|(name, meta)| meta.error.clone().map(|e| (name.clone(), e)))
            .collect())
    }

    /// Replaces the values, optionally with new defaults, and forgets all
    /// metadata and submit history.
    pub fn reset(&self, defaults: Option<Values>) -> Result<()> {
        let mut store = write_lock(&self.store, "resetting form")?;
        if let Some(defaults) = defaults {
            store.defaults = defaults;
        }
        store.values = store.defaults.clone();
        store.meta.clear();
        store.submit_state = SubmitState::Idle;
        store.submit_count = 0;
        Ok(())
    }

    pub fn snapshot(&self) -> Result<FormSnapshot> {
        let store = read_lock(&self.store, "creating form snapshot")?;
        Ok(FormSnapshot {
            values: store.values.clone(),
            submit_state: store.submit_state,
            submit_count: store.submit_count,
            is_dirty: store.meta.values().any(|m| m.dirty),
            is_valid: store.meta.values().all(|m| m.error.is_none()),
            field_meta: store.meta.clone(),
        })
    }

    pub fn is_submitting(&self) -> Result<bool> {
        Ok(read_lock(&self.store, "reading submit state")?.submit_state == SubmitState::Submitting)
    }

    fn begin_submit(&self) -> Result<()> {
        let mut store = write_lock(&self.store, "preparing submit")?;
        if matches!(
            store.submit_state,
            SubmitState::Validating | SubmitState::Submitting
        ) {
            return Err(FormError::AlreadySubmitting);
        }
        transition(&mut store, SubmitState::Validating)?;
        store.submit_count = store.submit_count.saturating_add(1);
        Ok(())
    }

    /// Runs validation and moves to `Submitting`. `None` means the submit was
    /// suppressed because at least one field is invalid.
    fn validated_values(&self) -> Result<Option<Values>> {
        match self.validate()? {
            Ok(parsed) => {
                transition(
                    &mut *write_lock(&self.store, "moving submit state to submitting")?,
                    SubmitState::Submitting,
                )?;
                Ok(Some(parsed))
            }
            Err(errors) => {
                debug!(invalid = errors.len(), "submit suppressed by validation");
                transition(
                    &mut *write_lock(&self.store, "handling submit validation failure")?,
                    SubmitState::Failed,
                )?;
                Ok(None)
            }
        }
    }

    fn finish_submit(&self, result: Result<Option<String>>) -> Result<SubmitOutcome> {
        let mut store = write_lock(&self.store, "completing submit")?;
        match result {
            Ok(message) => {
                transition(&mut store, SubmitState::Succeeded)?;
                info!("form submitted");
                Ok(SubmitOutcome::success(message))
            }
            Err(FormError::Rejected(message)) => {
                transition(&mut store, SubmitState::Failed)?;
                warn!(%message, "form submission rejected");
                Ok(SubmitOutcome::error(Some(message)))
            }
            Err(err) => {
                transition(&mut store, SubmitState::Failed)?;
                warn!(error = %err, "form submission failed");
                Ok(SubmitOutcome::error(Some(SUBMIT_FAILED_MESSAGE.to_string())))
            }
        }
    }

    /// Validates, then hands the parsed values to `f`.
    ///
    /// `f` is not called while any field is invalid. An `Err` from `f` is
    /// turned into an [`SubmitStatus::Error`] outcome: a
    /// [`FormError::Rejected`] message is shown as is, any other error as
    /// [`SUBMIT_FAILED_MESSAGE`]. The form values are left untouched so the
    /// user can retry.
    pub fn submit<F>(&self, f: F) -> Result<SubmitOutcome>
    where
        F: FnOnce(Values) -> Result<Option<String>>,
    {
        self.begin_submit()?;
        let _pending = PendingSubmit { control: self };
        let Some(parsed) = self.validated_values()? else {
            return Ok(SubmitOutcome::error(None));
        };
        self.finish_submit(f(parsed))
    }

    /// Async variant of [`submit`](Self::submit). The handler is awaited once,
    /// with no lock held. Dropping the returned future before it completes
    /// leaves the form in [`SubmitState::Failed`].
    pub async fn submit_async<F, Fut>(&self, f: F) -> Result<SubmitOutcome>
    where
        F: FnOnce(Values) -> Fut,
        Fut: Future<Output = Result<Option<String>>>,
    {
        self.begin_submit()?;
        let _pending = PendingSubmit { control: self };
        let Some(parsed) = self.validated_values()? else {
            return Ok(SubmitOutcome::error(None));
        };
        let result = f(parsed).await;
        self.finish_submit(result)
    }
}

/// Moves a submit that never reached `finish_submit` (cancelled future,
/// panicking handler) to `Failed`.
struct PendingSubmit<'a> {
    control: &'a FormControl,
}

impl Drop for PendingSubmit<'_> {
    fn drop(&mut self) {
        let Ok(mut store) = self.control.store.write() else {
            return;
        };
        if matches!(
            store.submit_state,
            SubmitState::Validating | SubmitState::Submitting
        ) {
            warn!(state = ?store.submit_state, "submit abandoned before completion");
            store.submit_state = SubmitState::Failed;
        }
    }
}

/// Change and blur notifiers for one field.
#[derive(Clone, Debug)]
pub struct FieldHandle {
    control: FormControl,
    name: Arc<str>,
}

impl FieldHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stores a new value for the field.
    pub fn on_change(&self, value: impl Into<Value>) -> Result<()> {
        self.control.set_value(&self.name, value)
    }

    /// Marks the field as touched.
    pub fn on_blur(&self) -> Result<()> {
        self.control.touch(&self.name)
    }
}

/// A field's value and validity, read from a [`FormControl`] for one render
/// pass.
#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    value: Value,
    dirty: bool,
    touched: bool,
    error: Option<FieldError>,
    handle: FieldHandle,
}

impl FieldDescriptor {
    pub fn name(&self) -> &str {
        self.handle.name()
    }

    /// The value at the time the descriptor was read.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Whether an error is attached, with or without a message.
    pub fn invalid(&self) -> bool {
        self.error.is_some()
    }

    pub fn error(&self) -> Option<&FieldError> {
        self.error.as_ref()
    }

    /// The displayable error message: present only when non-empty.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().and_then(FieldError::message)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_touched(&self) -> bool {
        self.touched
    }

    /// Notifiers to pass to the rendered control.
    pub fn handle(&self) -> &FieldHandle {
        &self.handle
    }
}

fn transition(store: &mut FormStore, next: SubmitState) -> Result<()> {
    let current = store.submit_state;
    if current == next {
        return Ok(());
    }

    let allowed = matches!(
        (current, next),
        (SubmitState::Idle, SubmitState::Validating)
            | (SubmitState::Validating, SubmitState::Submitting)
            | (SubmitState::Validating, SubmitState::Failed)
            | (SubmitState::Submitting, SubmitState::Succeeded)
            | (SubmitState::Submitting, SubmitState::Failed)
            | (SubmitState::Succeeded, SubmitState::Validating)
            | (SubmitState::Failed, SubmitState::Validating)
            | (_, SubmitState::Idle)
    );
    if !allowed {
        return Err(FormError::InvalidStateTransition {
            from: current,
            to: next,
        });
    }
    store.submit_state = next;
    Ok(())
}

fn read_lock<'a, T>(lock: &'a RwLock<T>, context: &'static str) -> Result<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| FormError::StatePoisoned(context))
}

fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> Result<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| FormError::StatePoisoned(context))
}
