//! `startup-code dev` command implementation.
//!
//! Plays the dev-server host for the integration:
//!
//! ```text
//! load startup.config.*         → options + adapter
//! config_setup (command: dev)   → plugin + /dev-only/startup-code
//! config_resolved               → lazy injection renders here
//! server_setup                  → node runs the entrypoint once
//! serve injected routes         → GET loads the route's module (cached
//!                                 unless its process failed)
//! ```

use axum::{http::StatusCode, routing::get, Json, Router};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use startup_core::bundler::ResolvedConfig;
use startup_core::dev::{DevServer, SsrLoadOptions};
use startup_core::integration::{ConfigSetup, PipelineHost};
use startup_core::{Command, Error, ResolvedEntrypoint, StartupCodeIntegration};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::loader::NodeModuleLoader;

/// Dev command action.
#[derive(Debug, Clone)]
pub struct DevAction {
    /// Working directory (project root).
    pub cwd: PathBuf,
    /// Explicit config file path (overrides auto-discovery).
    pub config: Option<PathBuf>,
    /// Port to listen on.
    pub port: u16,
    /// Host to bind to.
    pub host: String,
}

#[derive(Debug, Serialize)]
struct RouteResponseJson {
    ok: bool,
    entrypoint: String,
    /// True when this request did not start the module (it was already running).
    cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Run the dev command.
pub async fn run(action: DevAction) -> Result<()> {
    let (root, project) = super::load_project(&action.cwd, action.config.as_deref())?;

    let integration = StartupCodeIntegration::new(project.startup.clone());
    let adapter = project.adapter_info();
    let mut host = PipelineHost::new(&root);
    integration
        .config_setup(ConfigSetup {
            root: &root,
            adapter: adapter.as_ref(),
            command: Command::Dev,
            host: &mut host,
        })
        .await
        .into_diagnostic()?;

    let (plugins, routes) = host.into_parts();
    plugins
        .call_config_resolved(&ResolvedConfig {
            root: root.clone(),
            dev: true,
        })
        .into_diagnostic()?;

    let loader = Arc::new(NodeModuleLoader::locate(&root).into_diagnostic()?);
    match integration.server_setup(loader.as_ref()).await {
        Ok(()) => {}
        // The dev route can run it again once the module is fixed.
        Err(e @ Error::ModuleLoad { .. }) => {
            tracing::error!(error = %e, "startup module failed to load");
        }
        Err(e) => return Err(e).into_diagnostic(),
    }

    let mut app = Router::new();
    for route in &routes {
        let loader = Arc::clone(&loader);
        let entrypoint = route.entrypoint.clone();
        app = app.route(
            &route.pattern,
            get(move || run_route_module(loader, entrypoint)),
        );
    }

    let host_ip = if action.host == "localhost" {
        "127.0.0.1".to_string()
    } else {
        action.host.clone()
    };
    let addr: SocketAddr = format!("{host_ip}:{}", action.port)
        .parse()
        .into_diagnostic()?;

    println!();
    println!("  startup-code dev server");
    println!();
    if let Some(context) = integration.context() {
        println!("  entrypoint  {}", context.entrypoint);
    }
    for route in &routes {
        println!("  route       http://{}:{}{}", action.host, action.port, route.pattern);
    }
    println!();

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .into_diagnostic()?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .into_diagnostic()?;

    loader.shutdown().await;
    Ok(())
}

/// Handler for an injected route: load its module through the dev loader.
async fn run_route_module(
    loader: Arc<NodeModuleLoader>,
    entrypoint: ResolvedEntrypoint,
) -> (StatusCode, Json<RouteResponseJson>) {
    let cached = loader.is_loaded(entrypoint.as_str()).await;
    let result = loader
        .ssr_load_module(
            entrypoint.as_str(),
            SsrLoadOptions {
                fix_stacktrace: true,
            },
        )
        .await;

    match result {
        Ok(()) => (
            StatusCode::OK,
            Json(RouteResponseJson {
                ok: true,
                entrypoint: entrypoint.to_string(),
                cached,
                error: None,
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "dev route failed to load module");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RouteResponseJson {
                    ok: false,
                    entrypoint: entrypoint.to_string(),
                    cached,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}
