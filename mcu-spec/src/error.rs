//! # Error Types for the M1047 chipset specification

use crate::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum McuError {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    // Storage errors
    #[error("Index {index} out of bounds (size {len})")]
    OutOfBounds { index: usize, len: usize },

    #[error("Unsupported width: {0} bits")]
    UnsupportedWidth(usize),

    // Instruction table errors
    #[error("Unknown mnemonic: {0}")]
    UnknownMnemonic(String),

    #[error("Unknown opcode: {0:#04x}")]
    UnknownOpcode(u8),

    #[error("Duplicate opcode {opcode:#04x} ({first} and {second})")]
    DuplicateOpcode {
        opcode: u8,
        first: &'static str,
        second: &'static str,
    },

    #[error("Duplicate mnemonic: {0}")]
    DuplicateMnemonic(&'static str),

    #[error("{mnemonic} takes {expected} operand(s), found {found}")]
    OperandCount {
        mnemonic: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{mnemonic}: operand {value} does not fit {bits} bits")]
    OperandRange {
        mnemonic: &'static str,
        value: i64,
        bits: u32,
    },
}

impl McuError {
    /// Check if this error comes from a bad index into storage
    pub fn is_bounds(&self) -> bool {
        matches!(self, McuError::OutOfBounds { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = McuError::OutOfBounds { index: 9, len: 8 };
        assert_eq!(err.to_string(), "Index 9 out of bounds (size 8)");

        let err = McuError::UnknownOpcode(0xFF);
        assert_eq!(err.to_string(), "Unknown opcode: 0xff");

        let err = McuError::OperandCount {
            mnemonic: "ADD",
            expected: 2,
            found: 1,
        };
        assert_eq!(err.to_string(), "ADD takes 2 operand(s), found 1");

        let err = McuError::OperandRange {
            mnemonic: "BRBC",
            value: 64,
            bits: 7,
        };
        assert_eq!(err.to_string(), "BRBC: operand 64 does not fit 7 bits");
    }

    #[test]
    fn test_config_error_from() {
        let err: McuError = ConfigError::NoRegisters.into();
        assert!(err.to_string().starts_with("Invalid configuration"));
    }

    #[test]
    fn test_is_bounds() {
        assert!(McuError::OutOfBounds { index: 0, len: 0 }.is_bounds());
        assert!(!McuError::UnknownOpcode(0).is_bounds());
    }
}
