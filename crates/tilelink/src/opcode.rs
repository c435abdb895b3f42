//! Opcode and param encodings.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A raw wire value that does not name a defined encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{field} value {value} is not a defined encoding")]
pub struct DecodeError {
    /// Which field failed to decode (`"a_opcode"`, `"arithmetic param"`, ...).
    pub field: &'static str,
    /// The raw value seen on the wire.
    pub value: u8,
}

/// Channel A opcodes (TL-UL plus the TL-UH additions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AOpcode {
    PutFullData = 0,
    PutPartialData = 1,
    ArithmeticData = 2,
    LogicalData = 3,
    Get = 4,
    Intent = 5,
}

impl AOpcode {
    /// True for opcodes whose A beats carry data.
    #[must_use]
    pub fn has_data(self) -> bool {
        !matches!(self, AOpcode::Get | AOpcode::Intent)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            AOpcode::PutFullData => "PutFullData",
            AOpcode::PutPartialData => "PutPartialData",
            AOpcode::ArithmeticData => "ArithmeticData",
            AOpcode::LogicalData => "LogicalData",
            AOpcode::Get => "Get",
            AOpcode::Intent => "Intent",
        }
    }
}

impl TryFrom<u8> for AOpcode {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AOpcode::PutFullData),
            1 => Ok(AOpcode::PutPartialData),
            2 => Ok(AOpcode::ArithmeticData),
            3 => Ok(AOpcode::LogicalData),
            4 => Ok(AOpcode::Get),
            5 => Ok(AOpcode::Intent),
            _ => Err(DecodeError {
                field: "a_opcode",
                value,
            }),
        }
    }
}

impl From<AOpcode> for u8 {
    fn from(op: AOpcode) -> Self {
        op as u8
    }
}

impl fmt::Display for AOpcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Channel D opcodes.
///
/// Serialized as the raw wire encoding so traces read like waveform dumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum DOpcode {
    #[default]
    AccessAck = 0,
    AccessAckData = 1,
    HintAck = 2,
}

impl TryFrom<u8> for DOpcode {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DOpcode::AccessAck),
            1 => Ok(DOpcode::AccessAckData),
            2 => Ok(DOpcode::HintAck),
            _ => Err(DecodeError {
                field: "d_opcode",
                value,
            }),
        }
    }
}

impl From<DOpcode> for u8 {
    fn from(op: DOpcode) -> Self {
        op as u8
    }
}

impl fmt::Display for DOpcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DOpcode::AccessAck => "AccessAck",
            DOpcode::AccessAckData => "AccessAckData",
            DOpcode::HintAck => "HintAck",
        })
    }
}

/// Param field of `ArithmeticData`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticParam {
    Min = 0,
    Max = 1,
    MinU = 2,
    MaxU = 3,
    Add = 4,
}

impl TryFrom<u8> for ArithmeticParam {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ArithmeticParam::Min),
            1 => Ok(ArithmeticParam::Max),
            2 => Ok(ArithmeticParam::MinU),
            3 => Ok(ArithmeticParam::MaxU),
            4 => Ok(ArithmeticParam::Add),
            _ => Err(DecodeError {
                field: "arithmetic param",
                value,
            }),
        }
    }
}

impl From<ArithmeticParam> for u8 {
    fn from(p: ArithmeticParam) -> Self {
        p as u8
    }
}

/// Param field of `LogicalData`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalParam {
    Xor = 0,
    Or = 1,
    And = 2,
    Swap = 3,
}

impl TryFrom<u8> for LogicalParam {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(LogicalParam::Xor),
            1 => Ok(LogicalParam::Or),
            2 => Ok(LogicalParam::And),
            3 => Ok(LogicalParam::Swap),
            _ => Err(DecodeError {
                field: "logical param",
                value,
            }),
        }
    }
}

impl From<LogicalParam> for u8 {
    fn from(p: LogicalParam) -> Self {
        p as u8
    }
}

/// Param field of `Intent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentParam {
    PrefetchRead = 0,
    PrefetchWrite = 1,
}

impl TryFrom<u8> for IntentParam {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(IntentParam::PrefetchRead),
            1 => Ok(IntentParam::PrefetchWrite),
            _ => Err(DecodeError {
                field: "intent param",
                value,
            }),
        }
    }
}

impl From<IntentParam> for u8 {
    fn from(p: IntentParam) -> Self {
        p as u8
    }
}
