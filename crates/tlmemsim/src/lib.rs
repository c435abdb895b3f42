//! Single-cycle TileLink TL-UH memory responder.
//!
//! [`TlMemsim`] answers channel A requests (Get, PutFullData,
//! PutPartialData, ArithmeticData, LogicalData, Intent) with channel D
//! responses, backed by a flat [`MemoryImage`]. The driver calls
//! [`TlMemsim::tick`] once per rising clock edge; the responder never
//! advances on its own.
//!
//! ```
//! use tilelink::{BusInputs, ChannelA, DOpcode};
//! use tlmemsim::TlMemsim;
//!
//! let mut ram = TlMemsim::new(0, 1 << 20)?;
//! ram.reset();
//! ram.memory_mut().write(0, 0x1122_3344_5566_7788, 0xFF)?;
//!
//! let out = ram.tick(&BusInputs::new(ChannelA::get(0, 3, 1), true))?;
//! assert_eq!(out.d.opcode, DOpcode::AccessAckData);
//! assert_eq!(out.d.data, 0x1122_3344_5566_7788);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod atomic;
pub mod config;
mod error;
pub mod mask;
pub mod memory;
mod observable;
mod responder;

pub use config::{ImageLoad, MemsimConfig};
pub use error::{MemsimError, OutOfRange, ProtocolError};
pub use memory::MemoryImage;
pub use responder::{MAX_SIZE, PendingTransaction, TlMemsim};
