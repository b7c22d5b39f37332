//! Chip snapshots
//!
//! A [`ChipSnapshot`] is a plain copy of everything a chip owns. Snapshots
//! serialize to a small binary image: magic, version, then the bincode
//! payload.

use crate::error::{Result, RuntimeError};
use crate::state::{Fault, Lifecycle};
use mcu_spec::ChipConfig;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Magic number: "MCUS" in ASCII
pub const MAGIC: u32 = 0x5355434D;

/// Image format version
pub const VERSION: u32 = 1;

const HEADER_LEN: usize = 8;

/// Complete chip state at one point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipSnapshot {
    pub config: ChipConfig,
    pub lifecycle: Lifecycle,
    pub registers: Vec<u32>,
    /// Status register bytes
    pub status: Vec<u8>,
    pub ram: Vec<u32>,
    pub rom: Option<Vec<u32>>,
    /// Digital pin bytes, eight pins per byte
    pub digital: Vec<u8>,
    pub analog: Vec<u32>,
    pub mapped: Vec<u32>,
    pub sp: u32,
    pub ip: u32,
    pub cycles: u64,
    pub fault: Option<Fault>,
}

impl ChipSnapshot {
    /// Serialize to a binary image
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let payload =
            bincode::serialize(self).map_err(|e| RuntimeError::Snapshot(e.to_string()))?;

        let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
        bytes.extend_from_slice(&MAGIC.to_le_bytes());
        bytes.extend_from_slice(&VERSION.to_le_bytes());
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    /// Parse a binary image
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(RuntimeError::Snapshot("Image too small".into()));
        }

        let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if magic != MAGIC {
            return Err(RuntimeError::Snapshot("Invalid magic number".into()));
        }

        let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if version != VERSION {
            return Err(RuntimeError::Snapshot(format!(
                "Unsupported version: {}",
                version
            )));
        }

        bincode::deserialize(&bytes[HEADER_LEN..]).map_err(|e| RuntimeError::Snapshot(e.to_string()))
    }

    /// SHA-256 of the binary image
    pub fn digest(&self) -> Result<[u8; 32]> {
        let bytes = self.to_bytes()?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(hasher.finalize().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Chip;
    use mcu_spec::opcode::m1047;

    fn booted_chip() -> Chip {
        let mut chip = Chip::new(ChipConfig::M1047).unwrap();
        chip.load_program(0, &[m1047::LDI as u32, 4, 0x2A, 0xFF]).unwrap();
        chip.boot().unwrap();
        chip.cycle().unwrap();
        // Second cycle faults on 0xFF
        assert!(chip.cycle().is_err());
        chip
    }

    #[test]
    fn test_bytes_round_trip() {
        let snapshot = booted_chip().snapshot();
        let bytes = snapshot.to_bytes().unwrap();
        assert_eq!(&bytes[0..4], b"MCUS");

        let parsed = ChipSnapshot::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, snapshot);
        assert_eq!(parsed.registers[4], 0x2A);
        assert_eq!(
            parsed.fault,
            Some(Fault::IllegalInstruction { ip: 3, opcode: 0xFF })
        );
    }

    #[test]
    fn test_from_bytes_rejects_bad_header() {
        let mut bytes = booted_chip().snapshot().to_bytes().unwrap();

        assert!(ChipSnapshot::from_bytes(&bytes[..4]).is_err());

        bytes[4] = 9;
        let err = ChipSnapshot::from_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("Unsupported version"));

        bytes[0] = 0;
        let err = ChipSnapshot::from_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("magic"));
    }

    #[test]
    fn test_from_bytes_rejects_truncated_payload() {
        let bytes = booted_chip().snapshot().to_bytes().unwrap();
        let err = ChipSnapshot::from_bytes(&bytes[..bytes.len() - 3]).unwrap_err();
        assert!(matches!(err, RuntimeError::Snapshot(_)));
    }

    #[test]
    fn test_digest_tracks_state() {
        let chip = booted_chip();
        let a = chip.snapshot().digest().unwrap();
        assert_eq!(a, chip.snapshot().digest().unwrap());

        let mut other = chip.clone();
        other.set_register(0, 1).unwrap();
        assert_ne!(a, other.snapshot().digest().unwrap());
    }
}
