//! Parsing and validation of `rvtb.toml` harness configuration files.
//!
//! This crate reads the configuration file and produces a strongly-typed
//! [`HarnessConfig`]. Every field has a default, so an empty file (or no file
//! at all) reproduces the reference run: 40010 ticks, one reset tick, and a
//! VCD trace at `rv32im_top_tb.vcd`.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{
    load_config, load_config_file, load_config_from_str, validate_config, CONFIG_FILE_NAME,
};
pub use types::*;
