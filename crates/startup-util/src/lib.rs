#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Shared utilities for startup-code.
//!
//! Pure helpers with no logging/tracing dependencies. Logging is owned by
//! the CLI crate, and the core crate only emits events.

pub mod fs;
pub mod path;
