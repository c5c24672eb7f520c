use serde::Serialize;

use crate::context::ResolvedEntrypoint;

/// Path of the route that runs the startup module on request.
pub const DEV_ROUTE: &str = "/dev-only/startup-code";

/// A route the integration asks the host to serve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InjectedRoute {
    pub pattern: String,
    /// Module that handles the route.
    pub entrypoint: ResolvedEntrypoint,
    /// Render at build time instead of per request.
    pub prerender: bool,
}

impl InjectedRoute {
    /// The dev-only startup route, bound to `entrypoint`.
    #[must_use]
    pub fn dev_only(entrypoint: ResolvedEntrypoint, prerender: bool) -> Self {
        Self {
            pattern: DEV_ROUTE.to_string(),
            entrypoint,
            prerender,
        }
    }
}
