//! Error types.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tilelink::AOpcode;

/// A request that breaks the TL-UH protocol. The responder does not recover
/// from these on its own; the driver must `reset()` before continuing.
///
/// `Display`/`Error` are implemented by hand: `thiserror` treats a field named
/// `source` as the error cause, which `BurstMismatch::source` (a TileLink
/// source ID) is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    UnknownOpcode(u8),
    NonZeroParam { opcode: AOpcode, param: u8 },
    UnsupportedSize { size: u8 },
    InvalidAtomicMask { mask: u8 },
    BurstMismatch {
        expected: AOpcode,
        expected_source: u8,
        opcode: u8,
        source: u8,
    },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownOpcode(op) => write!(f, "unknown channel A opcode {op}"),
            Self::NonZeroParam { opcode, param } => {
                write!(f, "{opcode} carries non-zero param {param}")
            }
            Self::UnsupportedSize { size } => {
                write!(f, "transfer size 2^{size} exceeds the largest supported burst")
            }
            Self::InvalidAtomicMask { mask } => {
                write!(f, "atomic byte mask {mask:#04x} is not 0x0f, 0xf0 or 0xff")
            }
            Self::BurstMismatch {
                expected,
                expected_source,
                opcode,
                source,
            } => write!(
                f,
                "A beat (opcode {opcode}, source {source}) does not continue the {expected} burst from source {expected_source}"
            ),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Setup-time failures: building the memory image and loading it.
#[derive(Debug, Error)]
pub enum MemsimError {
    #[error("memory size {0} is not a non-zero multiple of 8 bytes")]
    InvalidSize(usize),
    #[error("memory of {size} bytes at base {base:#x} overflows the address space")]
    InvalidRange { base: u64, size: usize },
    #[error("unable to open image {}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("image of {len} bytes at offset {offset:#x} does not fit in {size} bytes of memory")]
    ImageTooLarge {
        offset: usize,
        len: usize,
        size: usize,
    },
    #[error("invalid configuration")]
    Config(#[from] serde_json::Error),
}

/// A store access outside `[base, base + size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("address {addr:#x} is outside the memory image")]
pub struct OutOfRange {
    pub addr: u64,
}
