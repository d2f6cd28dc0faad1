// src/config/mod.rs

//! Settings for procguard.
//!
//! Responsibilities:
//! - Define the TOML-backed settings model (`model.rs`).
//! - Load settings from disk or the environment (`loader.rs`).
//! - Validate basic invariants like a non-zero process limit (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{apply_env, load_and_validate, load_from_path};
pub use model::{
    DEFAULT_MAX_OPEN_PROCESSES, DEFAULT_OUTPUT_TAIL_LINES, ENV_MAX_OPEN_PROCESSES, ENV_VERIFY,
    Settings,
};
pub use validate::validate_settings;
