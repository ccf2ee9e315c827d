use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RavelError, Result};
use crate::event::DEFAULT_EVENT_CAPACITY;

/// Top-level Ravel configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub dialogs: DialogsConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub shop: ShopConfig,
}

/// Where dialog documents live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogsConfig {
    /// Directory holding `<category>/<name>.json` files.
    #[serde(default = "default_dialogs_root")]
    pub root: String,
    #[serde(default = "default_category")]
    pub default_category: String,
}

impl Default for DialogsConfig {
    fn default() -> Self {
        Self {
            root: default_dialogs_root(),
            default_category: default_category(),
        }
    }
}

fn default_dialogs_root() -> String { "dialogs".to_string() }
fn default_category() -> String { "examples".to_string() }

/// Unit of a delay node's `length`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelayUnit {
    #[default]
    Millis,
    Seconds,
}

impl DelayUnit {
    /// Convert a delay length to a duration. `None` for negative, NaN or
    /// out-of-range lengths.
    pub fn duration(&self, length: f64) -> Option<Duration> {
        let nanos = match self {
            DelayUnit::Millis => length * 1e6,
            DelayUnit::Seconds => length * 1e9,
        };
        (nanos >= 0.0 && nanos < u64::MAX as f64).then(|| Duration::from_nanos(nanos.round() as u64))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub delay_unit: DelayUnit,
    /// Capacity of the run event broadcast channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
    /// Line written when a run reaches its end.
    #[serde(default = "default_termination_notice")]
    pub termination_notice: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            delay_unit: DelayUnit::default(),
            event_capacity: default_event_capacity(),
            termination_notice: default_termination_notice(),
        }
    }
}

fn default_event_capacity() -> usize { DEFAULT_EVENT_CAPACITY }
fn default_termination_notice() -> String { "Encountered end node".to_string() }

/// Where a shop continues after a purchase of an item without its own `next`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AfterPurchase {
    /// Return to the shop node itself so the player can buy again.
    #[default]
    Reprompt,
    /// Leave through the shop node's `next`.
    Next,
}

/// Shop node policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopConfig {
    /// Selecting `0` leaves the shop through its `next` without buying.
    #[serde(default = "default_allow_exit")]
    pub allow_exit: bool,
    #[serde(default)]
    pub after_purchase: AfterPurchase,
    /// Host method called with `[item name, price]` on every purchase.
    #[serde(default)]
    pub purchase_method: Option<String>,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            allow_exit: default_allow_exit(),
            after_purchase: AfterPurchase::default(),
            purchase_method: None,
        }
    }
}

fn default_allow_exit() -> bool { true }

impl AppConfig {
    /// Load config from a TOML file, with env var expansion.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| RavelError::ConfigNotFound(path.display().to_string()))?;

        // Expand ${ENV_VAR} references
        let expanded = expand_env_vars(&content);

        toml::from_str(&expanded).map_err(|e| RavelError::Config(e.to_string()))
    }

    /// Load config from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve the dialogs directory (expand ~).
    pub fn dialogs_dir(&self) -> PathBuf {
        let root = &self.dialogs.root;
        if let Some(rest) = root.strip_prefix("~/") {
            if let Some(home) = home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(root)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| RavelError::Config(e.to_string()))
    }
}

/// Replace `${NAME}` with the value of environment variable `NAME`.
/// Unset variables and an unterminated `${` are left as written.
fn expand_env_vars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = rest.find("${") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };

        let name = &after[..close];
        match std::env::var(name) {
            Ok(value) => out.push_str(&value),
            Err(_) => out.push_str(&rest[open..open + 2 + close + 1]),
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}
