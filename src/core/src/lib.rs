//! Ambient stack shared by every `gliderd` crate: the error type, the
//! environment-driven config, and logging setup.

pub mod config;
pub mod error;
pub mod log;

pub use config::Config;
pub use error::{Error, Result};
