//! What the host framework hands the integration during setup.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use super::adapter::AdapterInfo;
use crate::bundler::{Plugin, PluginContainer};
use crate::dev::InjectedRoute;
use crate::error::Error;

/// The host command the pipeline was configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Dev,
    Build,
    Preview,
    Sync,
}

impl Command {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Build => "build",
            Self::Preview => "preview",
            Self::Sync => "sync",
        }
    }

    #[must_use]
    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" => Ok(Self::Dev),
            "build" => Ok(Self::Build),
            "preview" => Ok(Self::Preview),
            "sync" => Ok(Self::Sync),
            other => Err(format!(
                "unknown command '{other}' (expected dev, build, preview or sync)"
            )),
        }
    }
}

/// Config mutation requested by an integration.
#[derive(Default)]
pub struct ConfigUpdate {
    /// Pipeline plugins to append.
    pub plugins: Vec<Box<dyn Plugin>>,
}

/// Mutation surface the host exposes during config setup.
pub trait IntegrationHost: Send {
    /// Merge `update` into the pipeline configuration.
    fn update_config(&mut self, update: ConfigUpdate);

    /// Register a route served by a module. Refusing the route must leave
    /// the host unchanged.
    fn inject_route(&mut self, route: InjectedRoute) -> BoxFuture<'_, Result<(), Error>>;
}

/// Arguments of the config-setup hook.
pub struct ConfigSetup<'a> {
    pub root: &'a Path,
    pub adapter: Option<&'a AdapterInfo>,
    pub command: Command,
    pub host: &'a mut dyn IntegrationHost,
}

/// In-process host: collects plugins into a [`PluginContainer`] and keeps
/// injected routes in registration order.
pub struct PipelineHost {
    root: PathBuf,
    plugins: PluginContainer,
    routes: Vec<InjectedRoute>,
}

impl PipelineHost {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            plugins: PluginContainer::new(root.clone()),
            root,
            routes: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn plugins(&self) -> &PluginContainer {
        &self.plugins
    }

    pub fn plugins_mut(&mut self) -> &mut PluginContainer {
        &mut self.plugins
    }

    pub fn routes(&self) -> &[InjectedRoute] {
        &self.routes
    }

    /// Find a route by its exact pattern.
    pub fn route(&self, pattern: &str) -> Option<&InjectedRoute> {
        self.routes.iter().find(|r| r.pattern == pattern)
    }

    pub fn into_parts(self) -> (PluginContainer, Vec<InjectedRoute>) {
        (self.plugins, self.routes)
    }
}

impl IntegrationHost for PipelineHost {
    fn update_config(&mut self, update: ConfigUpdate) {
        for plugin in update.plugins {
            self.plugins.add(plugin);
        }
    }

    fn inject_route(&mut self, route: InjectedRoute) -> BoxFuture<'_, Result<(), Error>> {
        Box::pin(async move {
            if self.route(&route.pattern).is_some() {
                return Err(Error::invariant(format!(
                    "route {} was injected twice.",
                    route.pattern
                )));
            }
            self.routes.push(route);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parse_roundtrip() {
        for cmd in [Command::Dev, Command::Build, Command::Preview, Command::Sync] {
            assert_eq!(cmd.as_str().parse::<Command>().unwrap(), cmd);
        }
        assert!("serve".parse::<Command>().is_err());
        assert!(Command::Dev.is_dev());
        assert!(!Command::Build.is_dev());
    }

    #[test]
    fn test_pipeline_host_starts_empty() {
        let host = PipelineHost::new("/proj");
        assert_eq!(host.root(), Path::new("/proj"));
        assert!(!host.plugins().has_plugins());
        assert!(host.routes().is_empty());
    }
}
