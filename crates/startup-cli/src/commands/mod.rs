pub mod check;
pub mod dev;
pub mod transform;
pub mod version;

use miette::{IntoDiagnostic, Result};
use startup_core::dev::{load_project_config, ProjectConfig};
use startup_core::ConfigurationError;
use std::path::{Path, PathBuf};

/// Canonical project root plus its loaded config.
pub(crate) fn load_project(cwd: &Path, config: Option<&Path>) -> Result<(PathBuf, ProjectConfig)> {
    let root = dunce::canonicalize(cwd).into_diagnostic()?;
    match load_project_config(&root, config).into_diagnostic()? {
        Some((path, project)) => {
            tracing::debug!(config = %path.display(), "loaded project config");
            Ok((root, project))
        }
        None => Err(ConfigurationError::NotFound { root }).into_diagnostic(),
    }
}
