//! Observability module
//!
//! Logging setup for engines and tests that embed the scenario loader.

pub mod logging;

pub use logging::{ColorChoice, LogFormat, init_logging};
