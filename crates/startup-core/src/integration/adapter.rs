use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Adapters that keep one server process alive between requests.
///
/// Startup code only makes sense there: request-per-invocation runtimes
/// would run it on every cold start, or never.
pub const ALLOWED_ADAPTERS: &[&str] = &["@astrojs/node", "@deno/astro-adapter"];

/// The host's configured deployment adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterInfo {
    pub name: String,
}

impl AdapterInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Accept the adapter only if it is in [`ALLOWED_ADAPTERS`].
pub fn ensure_supported_adapter(
    adapter: Option<&AdapterInfo>,
) -> Result<&AdapterInfo, ConfigurationError> {
    match adapter {
        Some(adapter) if ALLOWED_ADAPTERS.contains(&adapter.name.as_str()) => Ok(adapter),
        other => Err(ConfigurationError::UnsupportedAdapter {
            found: other.map(|a| a.name.clone()),
            allowed: ALLOWED_ADAPTERS.to_vec(),
        }),
    }
}
