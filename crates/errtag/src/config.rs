//! Process-wide settings for stack capture and serialization defaults.
//!
//! Configuration is read from TOML and may be overridden from the environment:
//!
//! ```toml
//! capture_stack = "always"   # "never" | "env" | "always"
//! include_stack = false
//! ```
//!
//! - `ERRTAG_CAPTURE_STACK` overrides `capture_stack`.
//! - `ERRTAG_INCLUDE_STACK` overrides `include_stack` (`1`, `0`, `true`, `false`).
//!
//! Applications install a config once at startup with [`install`]; library code reads it
//! through [`current`], which falls back to [`Config::default`] when nothing was installed.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::Deserialize;

use crate::error::{Error, Result};

pub const ENV_CAPTURE_STACK: &str = "ERRTAG_CAPTURE_STACK";
pub const ENV_INCLUDE_STACK: &str = "ERRTAG_INCLUDE_STACK";

static INSTALLED: OnceCell<Config> = OnceCell::new();

/// When a freshly constructed tagged error records a backtrace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackCapture {
    /// Never capture; `stack()` is `None` unless a literal stack is attached.
    Never,
    /// Follow `RUST_BACKTRACE` / `RUST_LIB_BACKTRACE`.
    #[default]
    Env,
    /// Always capture, regardless of environment.
    Always,
}

impl StackCapture {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "never" | "off" => Some(StackCapture::Never),
            "env" => Some(StackCapture::Env),
            "always" | "on" => Some(StackCapture::Always),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub capture_stack: StackCapture,
    /// Default for `include_stack` where callers do not pass one explicitly.
    pub include_stack: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capture_stack: StackCapture::Env,
            include_stack: true,
        }
    }
}

impl Config {
    /// Parse a configuration from a TOML string. Missing keys keep their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).map_err(|e| Error::Config(format!("TOML parse error: {}", e)))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source: Arc::new(source),
        })?;
        Self::from_toml_str(&text)
    }

    /// Apply overrides from the process environment.
    pub fn with_env(self) -> Result<Self> {
        self.with_env_lookup(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_CAPTURE_STACK) {
            self.capture_stack = StackCapture::parse(&raw).ok_or_else(|| {
                Error::Config(format!("{ENV_CAPTURE_STACK}: unrecognized value {raw:?}"))
            })?;
        }
        if let Some(raw) = lookup(ENV_INCLUDE_STACK) {
            self.include_stack = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(Error::Config(format!(
                        "{ENV_INCLUDE_STACK}: unrecognized value {raw:?}"
                    )));
                }
            };
        }
        Ok(self)
    }
}

/// Install the process-wide configuration. Only the first call succeeds.
pub fn install(config: Config) -> Result<()> {
    tracing::debug!(?config, "installing errtag config");
    INSTALLED
        .set(config)
        .map_err(|_| Error::ConfigAlreadyInstalled)
}

/// The installed configuration, or the defaults.
pub fn current() -> Config {
    INSTALLED.get().cloned().unwrap_or_default()
}
