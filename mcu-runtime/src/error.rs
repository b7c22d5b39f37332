//! Runtime error types for the M1047 chipset VM

use crate::state::Fault;
use mcu_spec::{ConfigError, McuError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Spec error: {0}")]
    Spec(#[from] McuError),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    #[error("Fault: {0}")]
    Fault(#[from] Fault),

    #[error("Chip is already booted")]
    AlreadyBooted,

    #[error("Chip lock poisoned")]
    Poisoned,

    #[error("Driver thread panicked")]
    DriverPanicked,

    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

impl RuntimeError {
    /// The chip fault behind this error, if any
    pub fn fault(&self) -> Option<&Fault> {
        match self {
            RuntimeError::Fault(fault) => Some(fault),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
