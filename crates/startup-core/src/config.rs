use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigurationError;

/// Runtime configuration for the startup-code CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Current working directory (project root unless overridden).
    pub cwd: PathBuf,

    /// Whether to emit JSON logs.
    pub json_logs: bool,

    /// Verbosity level (0 = INFO, 1 = DEBUG, 2+ = TRACE).
    pub verbosity: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            json_logs: false,
            verbosity: 0,
        }
    }
}

impl Config {
    /// Create a new config with the given working directory.
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            ..Default::default()
        }
    }

    /// Set verbosity level.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set JSON log output.
    #[must_use]
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }
}

/// When the synthesized `import "<entrypoint>";` source is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InjectionStrategy {
    /// Rendered once, when the pipeline plugin is constructed.
    #[default]
    Eager,
    /// Rendered on the first `config_resolved` or `load`, whichever comes first.
    Lazy,
}

/// Options accepted by the startup-code integration.
///
/// Read once per pipeline invocation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupOptions {
    /// The module to load when the server starts, relative to the project root.
    pub entrypoint: String,

    /// Whether to load the entrypoint under the dev server.
    #[serde(default = "default_true")]
    pub run_in_dev: bool,

    /// Whether the dev-only route is marked for prerendering.
    #[serde(default = "default_true")]
    pub dev_route_prerender: bool,

    #[serde(default)]
    pub injection: InjectionStrategy,
}

fn default_true() -> bool {
    true
}

impl StartupOptions {
    /// Options for `entrypoint` with every other field at its default.
    #[must_use]
    pub fn new(entrypoint: impl Into<String>) -> Self {
        Self {
            entrypoint: entrypoint.into(),
            run_in_dev: true,
            dev_route_prerender: true,
            injection: InjectionStrategy::default(),
        }
    }

    #[must_use]
    pub fn with_run_in_dev(mut self, run_in_dev: bool) -> Self {
        self.run_in_dev = run_in_dev;
        self
    }

    #[must_use]
    pub fn with_dev_route_prerender(mut self, prerender: bool) -> Self {
        self.dev_route_prerender = prerender;
        self
    }

    #[must_use]
    pub fn with_injection(mut self, injection: InjectionStrategy) -> Self {
        self.injection = injection;
        self
    }

    /// Reject option values that cannot name a module.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.entrypoint.trim().is_empty() {
            return Err(ConfigurationError::MissingEntrypoint);
        }
        Ok(())
    }
}
