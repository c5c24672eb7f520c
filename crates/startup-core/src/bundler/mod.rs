//! Build pipeline plugin layer.
//!
//! The host bundler drives every module through `resolve_id` → `load` →
//! `transform`; plugins registered in a [`PluginContainer`] take part in
//! each step.
//!
//! ## Usage
//!
//! ```ignore
//! use startup_core::bundler::{PluginContainer, plugins::StartupCodePlugin};
//!
//! let mut container = PluginContainer::new(root);
//! container.add(Box::new(StartupCodePlugin::new(context)));
//! container.set_ssr(true);
//! let out = container.transform(&code, id)?;
//! ```

mod plugin;
pub mod plugins;
mod sourcemap;

pub use plugin::{
    HookResult, LoadResult, Plugin, PluginContainer, PluginContext, PluginEnforce, PluginError,
    ResolveIdResult, ResolvedConfig, TransformOutput, TransformResult,
};
pub use sourcemap::{SourceMap, SourceMapBuilder};
