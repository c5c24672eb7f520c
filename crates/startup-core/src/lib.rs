#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::must_use_candidate)]

//! Run a user-supplied module once when the server starts.
//!
//! The build side is a pipeline plugin ([`bundler::plugins::StartupCodePlugin`])
//! that makes the generated server entry import the startup module; the dev
//! side is the [`integration::StartupCodeIntegration`] lifecycle, which loads
//! the module through the dev server when it starts.

pub mod bundler;
pub mod config;
pub mod context;
pub mod dev;
pub mod error;
pub mod integration;
pub mod version;

pub use config::{Config, InjectionStrategy, StartupOptions};
pub use context::{ResolvedEntrypoint, StartupContext};
pub use error::{ConfigurationError, Error};
pub use integration::{Command, StartupCodeIntegration};
pub use version::VERSION;
