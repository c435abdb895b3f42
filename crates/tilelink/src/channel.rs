//! Per-cycle channel snapshots.
//!
//! A bus model sees one [`BusInputs`] per rising clock edge and returns one
//! [`BusOutputs`]. The outputs are the values the model drives until the next
//! edge, so a D beat returned from one call is handshaked against the
//! `d_ready` passed to the following call.

use serde::{Deserialize, Serialize};

use crate::opcode::{AOpcode, ArithmeticParam, DOpcode, IntentParam, LogicalParam};
use crate::lane_mask;

/// Channel A (request) signals as sampled on a clock edge.
///
/// `opcode` and `param` are raw wire values; a model decodes them when it
/// admits the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelA {
    pub valid: bool,
    pub opcode: u8,
    pub param: u8,
    /// log2 of the transfer size in bytes.
    pub size: u8,
    pub source: u8,
    pub address: u64,
    /// Byte enables for this beat.
    pub mask: u8,
    pub data: u64,
    pub corrupt: bool,
}

impl ChannelA {
    fn request(opcode: AOpcode, param: u8, address: u64, size: u8, source: u8) -> Self {
        Self {
            valid: true,
            opcode: opcode.into(),
            param,
            size,
            source,
            address,
            mask: lane_mask(address, size),
            data: 0,
            corrupt: false,
        }
    }

    /// `Get` of `2^size` bytes.
    #[must_use]
    pub fn get(address: u64, size: u8, source: u8) -> Self {
        Self::request(AOpcode::Get, 0, address, size, source)
    }

    /// First beat of a `PutFullData`.
    #[must_use]
    pub fn put_full(address: u64, size: u8, source: u8, data: u64) -> Self {
        Self {
            data,
            ..Self::request(AOpcode::PutFullData, 0, address, size, source)
        }
    }

    /// First beat of a `PutPartialData` with explicit byte enables.
    #[must_use]
    pub fn put_partial(address: u64, size: u8, source: u8, mask: u8, data: u64) -> Self {
        Self {
            mask,
            data,
            ..Self::request(AOpcode::PutPartialData, 0, address, size, source)
        }
    }

    /// `ArithmeticData` with explicit byte enables.
    #[must_use]
    pub fn arithmetic(
        param: ArithmeticParam,
        address: u64,
        size: u8,
        source: u8,
        mask: u8,
        data: u64,
    ) -> Self {
        Self {
            mask,
            data,
            ..Self::request(AOpcode::ArithmeticData, param.into(), address, size, source)
        }
    }

    /// `LogicalData` with explicit byte enables.
    #[must_use]
    pub fn logical(
        param: LogicalParam,
        address: u64,
        size: u8,
        source: u8,
        mask: u8,
        data: u64,
    ) -> Self {
        Self {
            mask,
            data,
            ..Self::request(AOpcode::LogicalData, param.into(), address, size, source)
        }
    }

    /// `Intent` (prefetch hint).
    #[must_use]
    pub fn intent(param: IntentParam, address: u64, size: u8, source: u8) -> Self {
        Self::request(AOpcode::Intent, param.into(), address, size, source)
    }

    /// A follow-on data beat of a burst already in progress.
    ///
    /// Header fields are carried over from the first beat, as TileLink
    /// requires them to stay constant across a burst.
    #[must_use]
    pub fn next_beat(self, mask: u8, data: u64) -> Self {
        Self { mask, data, ..self }
    }

    /// The same signals with `valid` deasserted.
    #[must_use]
    pub fn idle(self) -> Self {
        Self {
            valid: false,
            ..self
        }
    }
}

/// Channel D (response) signals driven by a model for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelD {
    pub valid: bool,
    pub opcode: DOpcode,
    pub param: u8,
    pub size: u8,
    pub source: u8,
    pub sink: u8,
    pub denied: bool,
    pub corrupt: bool,
    pub data: u64,
}

impl ChannelD {
    /// A valid response beat with no data, not denied.
    #[must_use]
    pub fn response(opcode: DOpcode, size: u8, source: u8) -> Self {
        Self {
            valid: true,
            opcode,
            param: 0,
            size,
            source,
            sink: 0,
            denied: false,
            corrupt: false,
            data: 0,
        }
    }

    /// A valid `AccessAckData` beat.
    #[must_use]
    pub fn access_ack_data(size: u8, source: u8, data: u64) -> Self {
        Self {
            data,
            ..Self::response(DOpcode::AccessAckData, size, source)
        }
    }

    /// Mark the beat denied. Data-carrying denied beats are also corrupt and
    /// carry no data.
    #[must_use]
    pub fn deny(self) -> Self {
        let carries_data = self.opcode == DOpcode::AccessAckData;
        Self {
            denied: true,
            corrupt: self.corrupt || carries_data,
            data: if carries_data { 0 } else { self.data },
            ..self
        }
    }
}

/// Everything a bus model samples on one rising edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BusInputs {
    pub a: ChannelA,
    /// Requester is ready to accept the D beat presented last cycle.
    pub d_ready: bool,
}

impl BusInputs {
    #[must_use]
    pub fn new(a: ChannelA, d_ready: bool) -> Self {
        Self { a, d_ready }
    }

    /// No request, requester ready for responses.
    #[must_use]
    pub fn quiet() -> Self {
        Self {
            a: ChannelA::default(),
            d_ready: true,
        }
    }
}

/// Everything a bus model drives until the next rising edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BusOutputs {
    pub a_ready: bool,
    pub d: ChannelD,
}
