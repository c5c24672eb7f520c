//! Setup-time values shared by the pipeline plugin, the dev route and the
//! server-start hook.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use startup_util::path::{resolve_against, to_slash};

use crate::config::{InjectionStrategy, StartupOptions};
use crate::error::ConfigurationError;
use crate::integration::Command;

/// Absolute path of the user's startup module.
///
/// Cloning shares the underlying string, so every consumer handed a clone
/// refers to the very same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedEntrypoint(Arc<str>);

impl ResolvedEntrypoint {
    /// Resolve `entrypoint` relative to the project `root`.
    #[must_use]
    pub fn resolve(root: &Path, entrypoint: &str) -> Self {
        Self(Arc::from(to_slash(&resolve_against(root, entrypoint))))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn as_path(&self) -> &Path {
        Path::new(&*self.0)
    }

    /// Whether both handles point at one allocation, not merely equal text.
    #[must_use]
    pub fn is_same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// `import "<path>";`, the whole body of the virtual startup module.
    #[must_use]
    pub fn import_statement(&self) -> String {
        format!("import {};", serde_json::Value::from(self.as_str()))
    }
}

impl fmt::Display for ResolvedEntrypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ResolvedEntrypoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Everything the setup phase decides, computed once and never mutated.
#[derive(Debug)]
pub struct StartupContext {
    pub entrypoint: ResolvedEntrypoint,
    /// Command is `dev` and the options ask to run there.
    pub dev: bool,
    pub injection: InjectionStrategy,
    pub dev_route_prerender: bool,
}

impl StartupContext {
    /// Build the context for one pipeline configuration.
    pub fn new(
        root: &Path,
        options: &StartupOptions,
        command: Command,
    ) -> Result<Self, ConfigurationError> {
        options.validate()?;
        Ok(Self {
            entrypoint: ResolvedEntrypoint::resolve(root, &options.entrypoint),
            dev: command.is_dev() && options.run_in_dev,
            injection: options.injection,
            dev_route_prerender: options.dev_route_prerender,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_to_root() {
        let entry = ResolvedEntrypoint::resolve(Path::new("/proj"), "./src/entry.ts");
        assert_eq!(entry.as_str(), "/proj/src/entry.ts");
        assert_eq!(entry.as_path(), Path::new("/proj/src/entry.ts"));
    }

    #[test]
    fn test_import_statement_quotes_path() {
        let entry = ResolvedEntrypoint::resolve(Path::new("/proj"), "./src/entry.ts");
        assert_eq!(entry.import_statement(), r#"import "/proj/src/entry.ts";"#);

        let odd = ResolvedEntrypoint::resolve(Path::new("/proj"), "./src/\"q\".ts");
        assert_eq!(odd.import_statement(), r#"import "/proj/src/\"q\".ts";"#);
    }

    #[test]
    fn test_clones_share_allocation() {
        let entry = ResolvedEntrypoint::resolve(Path::new("/proj"), "boot.ts");
        let copy = entry.clone();
        let other = ResolvedEntrypoint::resolve(Path::new("/proj"), "boot.ts");

        assert!(entry.is_same(&copy));
        assert_eq!(entry, other);
        assert!(!entry.is_same(&other));
    }

    #[test]
    fn test_dev_flag() {
        let root = Path::new("/proj");
        let options = StartupOptions::new("./boot.ts");

        assert!(StartupContext::new(root, &options, Command::Dev).unwrap().dev);
        assert!(!StartupContext::new(root, &options, Command::Build).unwrap().dev);

        let off = options.with_run_in_dev(false);
        assert!(!StartupContext::new(root, &off, Command::Dev).unwrap().dev);
    }

    #[test]
    fn test_empty_entrypoint_rejected() {
        let err = StartupContext::new(Path::new("/proj"), &StartupOptions::new(""), Command::Dev)
            .unwrap_err();
        assert_eq!(err, ConfigurationError::MissingEntrypoint);
    }
}
