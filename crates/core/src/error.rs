//! Error types for the SDK generator

use thiserror::Error;

/// Main error type for the generator
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Contract violation in `{entity}`: {reason}")]
    ContractViolation { entity: String, reason: String },

    #[error("Render error: {0}")]
    Render(String),
}

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn contract(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ContractViolation {
            entity: entity.into(),
            reason: reason.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}
