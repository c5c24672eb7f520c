/// The current version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns a formatted version string including the git hash when the build provides one.
#[must_use]
pub fn version_string() -> String {
    match option_env!("STARTUP_CODE_GIT_HASH") {
        Some(hash) => format!("startup-code {VERSION} ({hash})"),
        None => format!("startup-code {VERSION}"),
    }
}
