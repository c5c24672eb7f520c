//! Dev-server module loader backed by Node.js.
//!
//! Each module is executed in its own long-lived `node` process, so
//! timers and schedulers it starts keep running for the life of the dev
//! server. A module id is loaded at most once while it is healthy; later
//! loads are no-ops, like a module cache. A module whose process exited
//! with an error is no longer loaded, and the next load runs it again.

use futures::future::BoxFuture;
use startup_core::dev::{DevServer, SsrLoadOptions};
use startup_core::Error;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// How long a fresh module process may take to fail before its load counts
/// as successful.
pub const DEFAULT_STARTUP_GRACE: Duration = Duration::from_millis(250);

pub struct NodeModuleLoader {
    node: PathBuf,
    root: PathBuf,
    grace: Duration,
    modules: Mutex<HashMap<String, Child>>,
}

impl NodeModuleLoader {
    /// Use the `node` found on `PATH`.
    pub fn locate(root: &Path) -> Result<Self, Error> {
        let node = which::which("node").map_err(|e| Error::module_load("node", e))?;
        Ok(Self::with_runtime(node, root))
    }

    /// Use a specific runtime binary.
    pub fn with_runtime(node: impl Into<PathBuf>, root: &Path) -> Self {
        Self {
            node: node.into(),
            root: root.to_path_buf(),
            grace: DEFAULT_STARTUP_GRACE,
            modules: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_startup_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Whether `url` is loaded and its process has not failed since.
    pub async fn is_loaded(&self, url: &str) -> bool {
        let mut modules = self.modules.lock().await;
        modules.get_mut(url).is_some_and(|child| !has_failed(child))
    }

    /// Stop every module process.
    pub async fn shutdown(&self) {
        let mut modules = self.modules.lock().await;
        for (url, child) in modules.iter_mut() {
            if let Err(e) = child.kill().await {
                warn!(url = %url, error = %e, "failed to stop module process");
            }
        }
        modules.clear();
    }
}

/// The process has exited with a non-zero status.
fn has_failed(child: &mut Child) -> bool {
    matches!(child.try_wait(), Ok(Some(status)) if !status.success())
}

impl DevServer for NodeModuleLoader {
    fn ssr_load_module<'a>(
        &'a self,
        url: &'a str,
        options: SsrLoadOptions,
    ) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            let mut modules = self.modules.lock().await;
            if let Some(child) = modules.get_mut(url) {
                if !has_failed(child) {
                    debug!(url, "module already loaded");
                    return Ok(());
                }
                info!(url, "module exited with an error, loading it again");
                modules.remove(url);
            }

            let mut cmd = Command::new(&self.node);
            if options.fix_stacktrace {
                cmd.arg("--enable-source-maps");
            }
            cmd.arg(url).current_dir(&self.root).kill_on_drop(true);

            let mut child = cmd.spawn().map_err(|e| Error::module_load(url, e))?;
            let pid = child.id();

            match tokio::time::timeout(self.grace, child.wait()).await {
                Ok(Ok(status)) if !status.success() => {
                    return Err(Error::module_load(url, format!("process exited with {status}")));
                }
                Ok(Ok(_)) => debug!(url, "module ran to completion"),
                Ok(Err(e)) => return Err(Error::module_load(url, e)),
                Err(_) => info!(url, pid, "started module process"),
            }

            modules.insert(url.to_string(), child);
            Ok(())
        })
    }
}
