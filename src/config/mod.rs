// src/config/mod.rs

//! Configuration loading and validation for waverun.
//!
//! - `model.rs` defines the TOML-backed data model and its conversion into
//!   task descriptors.
//! - `loader.rs` reads a config file from disk.
//! - `validate.rs` checks structural invariants during `RawConfigFile` ->
//!   `ConfigFile` conversion.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{ConfigFile, ConfigSection, RawConfigFile, TaskConfig};
