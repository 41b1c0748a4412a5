//! Language runner infrastructure for Stepwright.
//!
//! The runner is the external process that owns step implementations. This crate
//! loads runner configuration, starts the discovery listener a runner dials back
//! into, launches the runner process, and exchanges framed [`Message`]s with it
//! under explicit timeouts.
//!
//! [`Message`]: stepwright_types::Message

pub mod client;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod manifest;

pub use client::{ProcessLauncher, RunnerConnection, RunnerHandle, RunnerLauncher, RunnerSession};
pub use config::{ConfigError, RunnerCommand, RunnerConfig, TimeoutConfig};
pub use discovery::DiscoveryService;
pub use errors::RunnerError;
pub use manifest::{Manifest, load_manifest};
