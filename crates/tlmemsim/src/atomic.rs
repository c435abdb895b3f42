//! Atomic ALU for `ArithmeticData` and `LogicalData`.
//!
//! An atomic beat operates on one of three lane groups selected by the byte
//! mask: the low 32-bit half (`0x0f`), the high 32-bit half (`0xf0`) or the
//! whole word (`0xff`). Operands are the prior memory value and the incoming
//! data restricted to that group; the result is merged back under the same
//! mask. Signed comparisons on a half sign-extend from bit 31 of that half.

use tilelink::{AOpcode, ArithmeticParam, DecodeError, LogicalParam};

use crate::error::ProtocolError;
use crate::mask::{expand, merge};

/// Decoded atomic operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomicOp {
    Arithmetic(ArithmeticParam),
    Logical(LogicalParam),
}

impl AtomicOp {
    /// Decode the param of an atomic opcode.
    pub fn decode(opcode: AOpcode, param: u8) -> Result<Self, DecodeError> {
        match opcode {
            AOpcode::ArithmeticData => ArithmeticParam::try_from(param).map(AtomicOp::Arithmetic),
            AOpcode::LogicalData => LogicalParam::try_from(param).map(AtomicOp::Logical),
            _ => Err(DecodeError {
                field: "atomic opcode",
                value: opcode.into(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lanes {
    Low,
    High,
    Full,
}

impl Lanes {
    fn shift(self) -> u32 {
        match self {
            Lanes::High => 32,
            Lanes::Low | Lanes::Full => 0,
        }
    }

    fn width_mask(self) -> u64 {
        match self {
            Lanes::Full => u64::MAX,
            Lanes::Low | Lanes::High => 0xFFFF_FFFF,
        }
    }

    fn signed(self, operand: u64) -> i64 {
        match self {
            Lanes::Full => operand as i64,
            Lanes::Low | Lanes::High => i64::from(operand as u32 as i32),
        }
    }
}

impl TryFrom<u8> for Lanes {
    type Error = ProtocolError;

    fn try_from(mask: u8) -> Result<Self, Self::Error> {
        match mask {
            0x0F => Ok(Lanes::Low),
            0xF0 => Ok(Lanes::High),
            0xFF => Ok(Lanes::Full),
            _ => Err(ProtocolError::InvalidAtomicMask { mask }),
        }
    }
}

/// Reject byte masks that do not select a half or the whole word.
pub fn check_mask(mask: u8) -> Result<(), ProtocolError> {
    Lanes::try_from(mask).map(|_| ())
}

/// Compute the word to write back for `op` applied to `old` and `data`.
///
/// Lanes outside `mask` keep their value from `old`.
pub fn execute(op: AtomicOp, old: u64, data: u64, mask: u8) -> Result<u64, ProtocolError> {
    let lanes = Lanes::try_from(mask)?;
    let bm = expand(mask);
    let shift = lanes.shift();
    let r1 = (old & bm) >> shift;
    let r2 = (data & bm) >> shift;

    let wb = match op {
        AtomicOp::Arithmetic(param) => match param {
            ArithmeticParam::Min => {
                if lanes.signed(r1) < lanes.signed(r2) {
                    r1
                } else {
                    r2
                }
            }
            ArithmeticParam::Max => {
                if lanes.signed(r1) < lanes.signed(r2) {
                    r2
                } else {
                    r1
                }
            }
            ArithmeticParam::MinU => r1.min(r2),
            ArithmeticParam::MaxU => r1.max(r2),
            ArithmeticParam::Add => r1.wrapping_add(r2) & lanes.width_mask(),
        },
        AtomicOp::Logical(param) => match param {
            LogicalParam::Xor => r1 ^ r2,
            LogicalParam::Or => r1 | r2,
            LogicalParam::And => r1 & r2,
            LogicalParam::Swap => r2,
        },
    };

    Ok(merge(old, wb << shift, mask))
}
