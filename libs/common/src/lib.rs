//! Shared utilities for the BNG tools
//!
//! - layered configuration loading with figment
//! - tracing subscriber setup

pub mod config;
pub mod error;
pub mod logging;

pub use config::{load_config, load_config_from_file, save_config_to_file};
pub use error::{Error, Result};
pub use logging::{init_logging, init_test_logging, LogConfig, LogFormat};
