//! Dev server side of the integration.
//!
//! In development nothing executes the generated server entry up front:
//! modules load lazily when a request needs them. The integration therefore
//! asks the dev server to load the startup module once at server start, and
//! exposes a dev-only route bound to the same module.

pub mod config;
mod route;

pub use config::{find_config_file, load_project_config, ProjectConfig, CONFIG_FILES};
pub use route::{InjectedRoute, DEV_ROUTE};

use futures::future::BoxFuture;

use crate::error::Error;

/// Options for [`DevServer::ssr_load_module`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SsrLoadOptions {
    /// Rewrite stack traces of errors thrown while loading so they point at
    /// original sources.
    pub fix_stacktrace: bool,
}

/// Handle to a running dev server, given to the server-setup hook.
pub trait DevServer: Send + Sync {
    /// Load and execute `url` as server-side code, resolving once it has run.
    fn ssr_load_module<'a>(
        &'a self,
        url: &'a str,
        options: SsrLoadOptions,
    ) -> BoxFuture<'a, Result<(), Error>>;
}
