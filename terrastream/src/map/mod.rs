//! Map-level facade: configuration document and per-frame session.

mod config;
mod session;

pub use config::{MapConfig, MapConfigError};
pub use session::{FrameOutput, MapError, MapSession, SessionConfig};
