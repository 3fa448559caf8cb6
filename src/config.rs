// src/config.rs
use std::{env, path::PathBuf};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    fixture_path: PathBuf,
    print_changeset: bool,
    fixed_time: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

fn default_fixture_path() -> PathBuf {
    PathBuf::from("fixtures/catalog.json")
}

fn parse_flag(value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::Invalid(format!(
            "SLUG_TREE_PRINT_CHANGESET must be a boolean, got `{other}`"
        ))),
    }
}

impl AppConfig {
    /// Build configuration from environment variables, falling back to
    /// defaults for everything that is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Allow dotenv files to populate env vars when present.
        dotenvy::dotenv().ok();

        let fixture_path = env::var("SLUG_TREE_FIXTURE")
            .map_or_else(|_| default_fixture_path(), PathBuf::from);

        let print_changeset = env::var("SLUG_TREE_PRINT_CHANGESET")
            .ok()
            .map(|v| parse_flag(&v))
            .transpose()?
            .unwrap_or(false);

        let fixed_time = env::var("SLUG_TREE_FIXED_TIME")
            .ok()
            .filter(|v| !v.trim().is_empty());

        Ok(Self {
            fixture_path,
            print_changeset,
            fixed_time,
        })
    }

    /// Override the fixture path, e.g. from a positional argument.
    #[must_use]
    pub fn with_fixture_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.fixture_path = path.into();
        self
    }

    pub fn fixture_path(&self) -> &PathBuf {
        &self.fixture_path
    }

    pub const fn print_changeset(&self) -> bool {
        self.print_changeset
    }

    /// RFC 3339 instant used to stamp slug events instead of the wall clock.
    pub fn fixed_time(&self) -> Option<&str> {
        self.fixed_time.as_deref()
    }

    /// The fixture path is mandatory once overrides are applied.
    pub fn ensure_fixture(&self) -> Result<(), ConfigError> {
        if self.fixture_path.as_os_str().is_empty() {
            return Err(ConfigError::Missing("SLUG_TREE_FIXTURE"));
        }
        Ok(())
    }
}
