//! Runner client subsystem facade.
//!
//! This module exposes the surface the refactor engine talks to: a
//! [`RunnerLauncher`] that produces a connected [`RunnerSession`]. The concrete
//! implementation spawns the configured runner process and speaks framed JSON
//! over the discovery connection.

mod connection;
mod handle;
mod launcher;
mod session;
mod stdio;

pub use connection::RunnerConnection;
pub use handle::RunnerHandle;
pub use launcher::{INTERNAL_PORT_ENV, ProcessLauncher};
pub use session::{RunnerLauncher, RunnerSession};
