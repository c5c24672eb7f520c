//! Plugin system for the build pipeline.
//!
//! Provides a Rollup-compatible plugin interface (`resolve_id`, `load`,
//! `transform`) plus Vite's `enforce` ordering and `config_resolved` hook.
//!
//! ## Example
//!
//! ```ignore
//! use startup_core::bundler::{HookResult, Plugin, PluginContext, TransformResult};
//!
//! struct Banner;
//!
//! impl Plugin for Banner {
//!     fn name(&self) -> &str { "banner" }
//!
//!     fn transform(&self, code: &str, _id: &str, _ctx: &PluginContext) -> HookResult<Option<TransformResult>> {
//!         Ok(Some(TransformResult::code(format!("/* built */\n{code}"))))
//!     }
//! }
//! ```

use std::path::PathBuf;

use super::sourcemap::SourceMap;

/// Result type for plugin hooks.
pub type HookResult<T> = Result<T, PluginError>;

/// Error from a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginError {
    /// Plugin name that caused the error.
    pub plugin: String,
    /// Hook that failed.
    pub hook: &'static str,
    /// Error message.
    pub message: String,
}

impl PluginError {
    pub fn new(plugin: impl Into<String>, hook: &'static str, message: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            hook,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for PluginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.plugin, self.hook, self.message)
    }
}

impl std::error::Error for PluginError {}

/// Context passed to plugin hooks.
#[derive(Debug, Clone, Default)]
pub struct PluginContext {
    /// Working directory.
    pub cwd: PathBuf,
    /// Whether the current pass compiles code for the server process.
    pub ssr: bool,
}

impl PluginContext {
    /// Create a new client-side plugin context.
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            ssr: false,
        }
    }

    /// Server-side compilation context.
    pub fn ssr(cwd: PathBuf) -> Self {
        Self {
            ssr: true,
            ..Self::new(cwd)
        }
    }
}

/// Result of resolve hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveIdResult {
    /// Resolved module ID (usually a file path).
    pub id: String,
}

impl ResolveIdResult {
    /// Create a resolved module result.
    pub fn resolved(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Result of load hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadResult {
    /// Module source code.
    pub code: String,
    /// Optional source map.
    pub map: Option<SourceMap>,
}

impl LoadResult {
    /// Create a load result with code only.
    pub fn code(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            map: None,
        }
    }
}

/// Result of transform hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformResult {
    /// Transformed code.
    pub code: String,
    /// Optional source map.
    pub map: Option<SourceMap>,
}

impl TransformResult {
    /// Create a transform result with code only.
    pub fn code(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            map: None,
        }
    }

    /// Create a transform result with a source map.
    pub fn with_map(code: impl Into<String>, map: SourceMap) -> Self {
        Self {
            code: code.into(),
            map: Some(map),
        }
    }
}

/// Plugin enforcement ordering.
///
/// Controls where a plugin runs relative to others in the pipeline.
/// Mirrors Vite's `enforce` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum PluginEnforce {
    /// Runs before normal plugins (e.g., alias resolution).
    Pre,
    /// Default ordering (no enforcement).
    #[default]
    Normal,
    /// Runs after normal plugins and the host's core transforms.
    Post,
}

impl PluginEnforce {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pre => "pre",
            Self::Normal => "normal",
            Self::Post => "post",
        }
    }
}

/// Final pipeline configuration, handed to `config_resolved`.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Root directory of the project.
    pub root: PathBuf,
    /// Whether the pipeline serves the dev server rather than a production build.
    pub dev: bool,
}

/// The main plugin trait.
///
/// All hooks have default implementations that do nothing, so a plugin only
/// implements the hooks it cares about.
pub trait Plugin: Send + Sync {
    /// Plugin name for debugging and error messages.
    fn name(&self) -> &str;

    /// Plugin ordering: `Pre`, `Normal` (default), or `Post`.
    fn enforce(&self) -> PluginEnforce {
        PluginEnforce::Normal
    }

    /// Called once the pipeline configuration is final (read-only).
    fn config_resolved(&self, _config: &ResolvedConfig) -> HookResult<()> {
        Ok(())
    }

    /// Resolve a module specifier to an ID.
    ///
    /// Return `Some(result)` to handle this resolution, or `None` to let
    /// the next plugin or default resolver handle it.
    fn resolve_id(
        &self,
        _specifier: &str,
        _importer: Option<&str>,
        _ctx: &PluginContext,
    ) -> HookResult<Option<ResolveIdResult>> {
        Ok(None)
    }

    /// Load a module by ID.
    ///
    /// Return `Some(result)` to provide the module source, or `None` to let
    /// the next plugin or default loader handle it.
    fn load(&self, _id: &str, _ctx: &PluginContext) -> HookResult<Option<LoadResult>> {
        Ok(None)
    }

    /// Transform module source code.
    ///
    /// Return `Some(result)` to transform the code, or `None` to pass it through.
    /// Multiple plugins can transform the same module in sequence.
    fn transform(
        &self,
        _code: &str,
        _id: &str,
        _ctx: &PluginContext,
    ) -> HookResult<Option<TransformResult>> {
        Ok(None)
    }
}

/// Output of running a module through every plugin's `transform`.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    /// Final code.
    pub code: String,
    /// Maps returned by the plugins that changed the code, in pipeline order.
    pub maps: Vec<SourceMap>,
}

/// A container for managing multiple plugins.
///
/// Plugins are kept sorted by their `enforce()` ordering: `Pre` → `Normal` → `Post`.
/// Within the same enforcement level, insertion order is preserved.
pub struct PluginContainer {
    plugins: Vec<Box<dyn Plugin>>,
    ctx: PluginContext,
}

impl PluginContainer {
    /// Create a new plugin container.
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            plugins: Vec::new(),
            ctx: PluginContext::new(cwd),
        }
    }

    /// Add a plugin. Plugins are automatically sorted by enforce order.
    pub fn add(&mut self, plugin: Box<dyn Plugin>) {
        let needs_sort = plugin.enforce() != PluginEnforce::Normal
            || self
                .plugins
                .last()
                .is_some_and(|p| p.enforce() > PluginEnforce::Normal);
        self.plugins.push(plugin);
        if needs_sort {
            // Stable: insertion order survives within each level.
            self.plugins.sort_by_key(|p| p.enforce());
        }
    }

    /// Set whether hooks run for the server-side pass.
    pub fn set_ssr(&mut self, ssr: bool) {
        self.ctx.ssr = ssr;
    }

    /// Get the context (read-only).
    pub fn context(&self) -> &PluginContext {
        &self.ctx
    }

    /// Names of the registered plugins, in execution order.
    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Check if any plugins are registered.
    pub fn has_plugins(&self) -> bool {
        !self.plugins.is_empty()
    }

    /// Call `config_resolved` on all plugins.
    pub fn call_config_resolved(&self, config: &ResolvedConfig) -> HookResult<()> {
        for plugin in &self.plugins {
            plugin.config_resolved(config)?;
        }
        Ok(())
    }

    /// Try to resolve a module ID through plugins.
    /// Returns None if no plugin handled the resolution.
    pub fn resolve_id(
        &self,
        specifier: &str,
        importer: Option<&str>,
    ) -> HookResult<Option<ResolveIdResult>> {
        for plugin in &self.plugins {
            if let Some(result) = plugin.resolve_id(specifier, importer, &self.ctx)? {
                return Ok(Some(result));
            }
        }
        Ok(None)
    }

    /// Try to load a module through plugins.
    /// Returns None if no plugin handled the load.
    pub fn load(&self, id: &str) -> HookResult<Option<LoadResult>> {
        for plugin in &self.plugins {
            if let Some(result) = plugin.load(id, &self.ctx)? {
                return Ok(Some(result));
            }
        }
        Ok(None)
    }

    /// Transform code through all plugins.
    /// Each plugin's output is passed to the next plugin.
    pub fn transform(&self, code: &str, id: &str) -> HookResult<TransformOutput> {
        let mut current = code.to_string();
        let mut maps = Vec::new();
        for plugin in &self.plugins {
            if let Some(result) = plugin.transform(&current, id, &self.ctx)? {
                current = result.code;
                maps.extend(result.map);
            }
        }
        Ok(TransformOutput {
            code: current,
            maps,
        })
    }
}

impl Default for PluginContainer {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Suffix {
        name: &'static str,
        enforce: PluginEnforce,
    }

    impl Plugin for Suffix {
        fn name(&self) -> &str {
            self.name
        }

        fn enforce(&self) -> PluginEnforce {
            self.enforce
        }

        fn transform(
            &self,
            code: &str,
            _id: &str,
            _ctx: &PluginContext,
        ) -> HookResult<Option<TransformResult>> {
            Ok(Some(TransformResult::code(format!("{code}{}", self.name))))
        }
    }

    fn suffix(name: &'static str, enforce: PluginEnforce) -> Box<dyn Plugin> {
        Box::new(Suffix { name, enforce })
    }

    #[test]
    fn test_enforce_ordering() {
        let mut container = PluginContainer::default();
        container.add(suffix("post", PluginEnforce::Post));
        container.add(suffix("a", PluginEnforce::Normal));
        container.add(suffix("pre", PluginEnforce::Pre));
        container.add(suffix("b", PluginEnforce::Normal));

        assert_eq!(container.plugin_names(), vec!["pre", "a", "b", "post"]);

        let out = container.transform("", "m.js").unwrap();
        assert_eq!(out.code, "preabpost");
        assert!(out.maps.is_empty());
    }

    #[test]
    fn test_empty_container_passes_through() {
        let container = PluginContainer::new(PathBuf::from("/proj"));
        assert!(!container.has_plugins());
        assert_eq!(container.resolve_id("x", None).unwrap(), None);
        assert_eq!(container.load("x").unwrap(), None);
        assert_eq!(container.transform("code", "x").unwrap().code, "code");
    }

    #[test]
    fn test_ssr_flag_reaches_context() {
        let mut container = PluginContainer::new(PathBuf::from("/proj"));
        assert!(!container.context().ssr);
        container.set_ssr(true);
        assert!(container.context().ssr);
        assert!(PluginContext::ssr(PathBuf::from("/proj")).ssr);
    }

    #[test]
    fn test_plugin_error_display() {
        let err = PluginError::new("startup-code", "load", "boom");
        assert_eq!(err.to_string(), "[startup-code] load: boom");
    }
}
