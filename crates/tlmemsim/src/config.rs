//! Responder configuration.
//!
//! Defaults describe a 1 GiB RAM at bus address 0 with a 31-bit address
//! bus. Every field can be overridden from JSON; missing fields keep their
//! defaults.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::MemsimError;

/// Default RAM base address.
pub const DEFAULT_BASE: u64 = 0x0000_0000;

/// Default RAM size: 1 GiB.
pub const DEFAULT_SIZE: usize = 1024 * 1024 * 1024;

/// Implemented address bits on channel A.
pub const DEFAULT_ADDRESS_MASK: u64 = 0x7FFF_FFFF;

/// Raw image file loaded into memory before the first cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageLoad {
    pub path: PathBuf,
    /// Byte offset into the memory image (not a bus address).
    #[serde(default)]
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemsimConfig {
    /// Bus address of the first byte of memory.
    pub base: u64,
    /// Memory size in bytes; a non-zero multiple of 8.
    pub size: usize,
    /// Applied to every admitted request address.
    pub address_mask: u64,
    pub image: Option<ImageLoad>,
}

impl Default for MemsimConfig {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE,
            size: DEFAULT_SIZE,
            address_mask: DEFAULT_ADDRESS_MASK,
            image: None,
        }
    }
}

impl MemsimConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, MemsimError> {
        Ok(serde_json::from_str(json)?)
    }
}
