//! Flip panel error types

use thiserror::Error;

/// Configuration errors. Runtime operations never fail; they degrade to no-ops.
#[derive(Error, Debug)]
pub enum FliptError {
    /// Failed to read a config file
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML or has wrong field types
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Spring parameters must be finite and positive
    #[error("Invalid spring parameters: mass {mass}, stiffness {stiffness}")]
    InvalidSpring { mass: f32, stiffness: f32 },
}

/// Result type for flip panel configuration
pub type Result<T> = std::result::Result<T, FliptError>;
