//! Startup-code pipeline plugin.
//!
//! Makes the server bundle execute a user module once at startup:
//!
//! 1. `transform` appends `import "virtual:startup-code";` to the host's
//!    generated server entry (server-side passes only).
//! 2. `resolve_id` maps `virtual:startup-code` to `\0virtual:startup-code`.
//! 3. `load` answers that id with `import "<absolute entrypoint>";`.
//!
//! The plugin is `enforce: post` so it sees the entry after the host's own
//! code generation.

mod transform;
mod virtual_module;

pub use transform::{is_generated_server_entry, Transform, Transformer, SSR_ENTRY_MARKER};
pub use virtual_module::{VirtualEntryModule, PUBLIC_ID, RESOLVED_ID};

use std::sync::Arc;

use tracing::debug;

use crate::bundler::{
    HookResult, LoadResult, Plugin, PluginContext, PluginEnforce, PluginError, ResolveIdResult,
    ResolvedConfig, TransformResult,
};
use crate::context::StartupContext;

/// Plugin name, used in hook errors and logs.
pub const PLUGIN_NAME: &str = "startup-code";

/// Build-pipeline half of the startup-code integration.
pub struct StartupCodePlugin {
    context: Arc<StartupContext>,
    module: VirtualEntryModule,
}

impl StartupCodePlugin {
    #[must_use]
    pub fn new(context: Arc<StartupContext>) -> Self {
        let module = VirtualEntryModule::new(context.entrypoint.clone(), context.injection);
        Self { context, module }
    }

    #[must_use]
    pub fn context(&self) -> &Arc<StartupContext> {
        &self.context
    }
}

impl Plugin for StartupCodePlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn enforce(&self) -> PluginEnforce {
        PluginEnforce::Post
    }

    fn config_resolved(&self, config: &ResolvedConfig) -> HookResult<()> {
        let was_rendered = self.module.is_rendered();
        self.module.prepare();
        debug!(
            root = %config.root.display(),
            dev = config.dev,
            rendered_now = !was_rendered,
            "startup module ready"
        );
        Ok(())
    }

    fn resolve_id(
        &self,
        specifier: &str,
        _importer: Option<&str>,
        _ctx: &PluginContext,
    ) -> HookResult<Option<ResolveIdResult>> {
        Ok(VirtualEntryModule::resolve(specifier).map(ResolveIdResult::resolved))
    }

    fn load(&self, id: &str, ctx: &PluginContext) -> HookResult<Option<LoadResult>> {
        if id != RESOLVED_ID {
            return Ok(None);
        }
        let code = self
            .module
            .load(id, ctx.ssr)
            .map_err(|e| PluginError::new(PLUGIN_NAME, "load", e.to_string()))?;
        debug!(entrypoint = %self.context.entrypoint, "loaded virtual startup module");
        Ok(code.map(LoadResult::code))
    }

    fn transform(
        &self,
        code: &str,
        id: &str,
        ctx: &PluginContext,
    ) -> HookResult<Option<TransformResult>> {
        if !ctx.ssr {
            return Ok(None);
        }
        Ok(Transformer::run_all(code, id))
    }
}
