//! TileLink Uncached Heavyweight (TL-UH) protocol definitions.
//!
//! This crate is the single source of protocol constants for the workspace:
//! opcode and param encodings for channels A and D, the per-cycle channel
//! snapshots exchanged with a bus model, and beat arithmetic for a 64-bit
//! data bus.
//!
//! | A opcode       | enc | D opcode      | enc |
//! |----------------|-----|---------------|-----|
//! | PutFullData    | 0   | AccessAck     | 0   |
//! | PutPartialData | 1   | AccessAckData | 1   |
//! | ArithmeticData | 2   | HintAck       | 2   |
//! | LogicalData    | 3   |               |     |
//! | Get            | 4   |               |     |
//! | Intent         | 5   |               |     |

mod channel;
mod opcode;

pub use channel::{BusInputs, BusOutputs, ChannelA, ChannelD};
pub use opcode::{AOpcode, ArithmeticParam, DOpcode, DecodeError, IntentParam, LogicalParam};

/// Data bus width in bytes.
pub const BUS_BYTES: u64 = 8;

/// Number of data beats for a transfer of `2^size` bytes on the 64-bit bus.
///
/// Transfers narrower than the bus still take one beat.
#[must_use]
pub fn beats_for(size: u8) -> u32 {
    let bytes = 1u64 << size;
    bytes.div_ceil(BUS_BYTES) as u32
}

/// Byte-enable mask for a single-beat access of `2^size` bytes at `address`.
///
/// Transfers of a full beat or more enable every lane.
#[must_use]
pub fn lane_mask(address: u64, size: u8) -> u8 {
    if size >= 3 {
        return 0xFF;
    }
    let bytes = 1u32 << size;
    let lane = (address & (BUS_BYTES - 1)) as u32 & !(bytes - 1);
    (((1u32 << bytes) - 1) << lane) as u8
}
