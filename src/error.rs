//! # Error Handling
//!
//! This module defines the centralized error type for `fleetsync`. It uses the
//! `thiserror` library to build an `Error` enum covering every failure mode of
//! the library, each variant carrying enough context to point the operator at
//! the offending file, group, or worker.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum of all library errors.
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Note that configuration defects found while walking an overlay tree (an
//! unknown group tag, a missing tag when one is required) are *not* returned
//! as `Err`: the walk records them as [`crate::overlay::Defect`]s and carries
//! on. They convert into this type so a defect can be rendered and
//! propagated by callers that want to stop at the first one, through
//! `Error::Defect`.

use thiserror::Error;

use crate::overlay::Defect;

/// Main error type for fleetsync operations
#[derive(Error, Debug)]
pub enum Error {
    /// An error occurred while parsing or validating the configuration file.
    ///
    /// Includes an optional hint about how to fix it.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A configuration defect found in the overlay tree.
    #[error(transparent)]
    Defect(#[from] Defect),

    /// A node name was requested that the configuration does not define.
    #[error("no such node: {node}")]
    UnknownNode { node: String },

    /// A circular definition was found while expanding compound groups.
    #[error("Cycle detected in group definitions: {cycle}")]
    CycleDetected { cycle: String },

    /// A worker process could not be started.
    #[error("failed to spawn worker {worker}: {message}")]
    Spawn { worker: usize, message: String },

    /// Waiting for a worker process failed for a reason other than the
    /// worker no longer being our child.
    #[error("failed to wait for workers: {message}")]
    Wait { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
