//! The startup-code integration.
//!
//! Binds the pipeline plugin and the dev server to the host's two lifecycle
//! hooks:
//!
//! ```text
//! config_setup  (once per pipeline configuration)
//!   → check adapter against the allow-list
//!   → resolve entrypoint against the project root
//!   → register /dev-only/startup-code (dev command only)
//!   → register StartupCodePlugin (enforce: post)
//! server_setup  (once, when the dev server starts)
//!   → ssr_load_module(entrypoint) if command is dev and runInDev
//! ```
//!
//! Production builds never reach `server_setup`; there the generated server
//! entry imports the virtual module instead.

mod adapter;
mod host;

pub use adapter::{ensure_supported_adapter, AdapterInfo, ALLOWED_ADAPTERS};
pub use host::{Command, ConfigSetup, ConfigUpdate, IntegrationHost, PipelineHost};

use std::sync::{Arc, OnceLock};

use tracing::{debug, info};

use crate::bundler::plugins::StartupCodePlugin;
use crate::config::StartupOptions;
use crate::context::StartupContext;
use crate::dev::{DevServer, InjectedRoute, SsrLoadOptions};
use crate::error::Error;

/// Integration name reported to the host.
pub const INTEGRATION_NAME: &str = "startup-code";

/// Runs a user module once when the server starts, in builds and under the
/// dev server.
pub struct StartupCodeIntegration {
    options: StartupOptions,
    context: OnceLock<Arc<StartupContext>>,
}

impl StartupCodeIntegration {
    #[must_use]
    pub fn new(options: StartupOptions) -> Self {
        Self {
            options,
            context: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        INTEGRATION_NAME
    }

    #[must_use]
    pub fn options(&self) -> &StartupOptions {
        &self.options
    }

    /// The context decided by `config_setup`, once it has run.
    #[must_use]
    pub fn context(&self) -> Option<&Arc<StartupContext>> {
        self.context.get()
    }

    /// Config-setup hook.
    ///
    /// Validation happens before any host mutation, so a rejected setup
    /// leaves the host untouched.
    pub async fn config_setup(&self, params: ConfigSetup<'_>) -> Result<Arc<StartupContext>, Error> {
        if self.context.get().is_some() {
            return Err(Error::invariant("config_setup ran twice for one integration."));
        }

        let adapter = ensure_supported_adapter(params.adapter)?;
        let context = Arc::new(StartupContext::new(params.root, &self.options, params.command)?);
        info!(
            adapter = %adapter.name,
            command = %params.command,
            entrypoint = %context.entrypoint,
            "configuring startup code"
        );

        // The route is the only host mutation that can be refused, so it goes
        // first and a refusal leaves no plugin behind.
        if params.command.is_dev() {
            let route =
                InjectedRoute::dev_only(context.entrypoint.clone(), context.dev_route_prerender);
            debug!(pattern = %route.pattern, "injecting dev route");
            params.host.inject_route(route).await?;
        } else {
            debug!(command = %params.command, "dev route skipped outside dev");
        }

        params.host.update_config(ConfigUpdate {
            plugins: vec![Box::new(StartupCodePlugin::new(Arc::clone(&context)))],
        });

        self.context
            .set(Arc::clone(&context))
            .map_err(|_| Error::invariant("config_setup ran twice for one integration."))?;
        Ok(context)
    }

    /// Server-setup hook: run the entrypoint once under the dev server.
    pub async fn server_setup(&self, server: &dyn DevServer) -> Result<(), Error> {
        let context = self
            .context
            .get()
            .ok_or_else(|| Error::invariant("server_setup ran before config_setup."))?;

        if !context.dev {
            debug!("startup code not loaded under the dev server (runInDev is off)");
            return Ok(());
        }

        info!(entrypoint = %context.entrypoint, "loading startup code");
        server
            .ssr_load_module(
                context.entrypoint.as_str(),
                SsrLoadOptions {
                    fix_stacktrace: true,
                },
            )
            .await
    }
}
