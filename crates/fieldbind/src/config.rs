//! Application configuration edited through the settings form.
//!
//! [`Configuration`] is plain serde data. Its form representation uses the
//! keys `baseUrl`, `itemsPerPage`, `apiKey` and `theme`, so the same JSON can
//! seed a [`FormControl`](crate::FormControl) and be read back after submit.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use futures::future::{self, BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{FormError, Result};
use crate::state::Values;

/// Colour theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    /// Follow the operating system preference.
    System,
}

impl Theme {
    /// Every theme, in display order.
    pub const ALL: [Self; 3] = [Self::Light, Self::Dark, Self::System];

    /// The serialised name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }

    /// Display label used by select controls.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Light => "Light",
            Self::Dark => "Dark",
            Self::System => "System",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|theme| theme.as_str() == s)
            .ok_or_else(|| FormError::UnknownTheme(s.to_string()))
    }
}

/// Process-wide application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    #[serde(rename = "baseUrl")]
    pub api_base_url: String,
    #[serde(rename = "itemsPerPage")]
    pub number_of_items_per_page: u32,
    #[serde(rename = "apiKey")]
    pub api_key: String,
    pub theme: Theme,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            number_of_items_per_page: 10,
            api_key: "nothing".to_string(),
            theme: Theme::Light,
        }
    }
}

impl Configuration {
    /// Parses a configuration from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The configuration as form values.
    pub fn to_values(&self) -> Values {
        match serde_json::to_value(self) {
            Ok(Value::Object(values)) => values,
            _ => Values::new(),
        }
    }

    /// Overwrites the settings present in `values`; other keys are ignored.
    ///
    /// Nothing changes when any present value has the wrong shape.
    pub fn apply(&mut self, values: &Values) -> Result<()> {
        let mut merged = self.to_values();
        for (key, value) in values {
            if merged.contains_key(key) {
                merged.insert(key.clone(), value.clone());
            }
        }
        *self = serde_json::from_value(Value::Object(merged))?;
        debug!(theme = %self.theme, "configuration updated");
        Ok(())
    }
}

/// Asynchronous access to the current configuration.
pub trait ConfigurationStore: Send + Sync {
    /// Loads the current configuration.
    fn configuration(&self) -> BoxFuture<'_, Result<Configuration>>;

    /// Persists `configuration`.
    fn set_configuration(&self, configuration: Configuration) -> BoxFuture<'_, Result<()>>;
}

/// A configuration store held in memory and shared by clone.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConfiguration {
    inner: Arc<RwLock<Configuration>>,
}

impl InMemoryConfiguration {
    /// Creates a store holding `configuration`.
    pub fn new(configuration: Configuration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(configuration)),
        }
    }

    /// A copy of the current configuration.
    pub fn get(&self) -> Result<Configuration> {
        self.inner
            .read()
            .map(|c| c.clone())
            .map_err(|_| FormError::StatePoisoned("reading configuration"))
    }

    /// Replaces the current configuration.
    pub fn set(&self, configuration: Configuration) -> Result<()> {
        let mut current = self
            .inner
            .write()
            .map_err(|_| FormError::StatePoisoned("writing configuration"))?;
        *current = configuration;
        Ok(())
    }
}

impl ConfigurationStore for InMemoryConfiguration {
    fn configuration(&self) -> BoxFuture<'_, Result<Configuration>> {
        future::ready(self.get()).boxed()
    }

    fn set_configuration(&self, configuration: Configuration) -> BoxFuture<'_, Result<()>> {
        future::ready(self.set(configuration)).boxed()
    }
}
