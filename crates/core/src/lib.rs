//! Core types for the Unity SDK generator
//!
//! This crate holds the reflected model consumed by the output stage, together
//! with the shared error type, configuration and progress events.

pub mod error;
pub mod types;
pub mod config;
pub mod events;

pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use events::{EventBus, GenerationEvent};
