//! Built-in pipeline plugins.

pub mod startup_code;

pub use startup_code::StartupCodePlugin;
