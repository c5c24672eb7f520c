use std::path::PathBuf;
use thiserror::Error;

use crate::bundler::PluginError;

/// Core error type for startup-code operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// A state no correct host should be able to reach.
    #[error("{message} Please file an issue for startup-code.")]
    InternalInvariant { message: String },

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error("Failed to load module {id}: {message}")]
    ModuleLoad { id: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },
}

impl Error {
    #[must_use]
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InternalInvariant {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn module_load(id: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::ModuleLoad {
            id: id.into(),
            message: message.to_string(),
        }
    }

    /// Whether this error stems from user configuration rather than a defect.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::ConfigParse { .. })
    }
}

/// Invalid user or host configuration, reported at setup time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error(
        "startup-code currently only works with one of the following adapters: {}",
        .allowed.join(", ")
    )]
    UnsupportedAdapter {
        /// Adapter name the host reported, if any.
        found: Option<String>,
        allowed: Vec<&'static str>,
    },

    #[error("startup-code requires a non-empty `entrypoint` option")]
    MissingEntrypoint,

    #[error("No startup-code config found in {}", .root.display())]
    NotFound { root: PathBuf },
}
