//! TileLink TL-UH memory responder.
//!
//! The responder is clocked by its driver: each call to [`TlMemsim::tick`]
//! is one rising edge. The inputs are the channel A signals and `d_ready`
//! as sampled on that edge; the outputs are what the responder drives until
//! the next edge. A D beat returned from one call is therefore handshaked
//! against the `d_ready` passed to the next call. If it was not accepted,
//! the next call presents it again unchanged and keeps A-ready low.
//!
//! Only one transaction is ever in flight. A request is admitted only on an
//! edge where the responder is idle, which is also the only time it drives
//! A-ready high outside a Put burst.
//!
//! Per-opcode timing, counting the admission edge as cycle 0:
//!
//! | Opcode       | Cycle 0                 | Later cycles                           |
//! |--------------|-------------------------|----------------------------------------|
//! | Get          | first `AccessAckData`   | one beat per accepted beat, then a turnaround cycle |
//! | Put          | first data beat written | one data beat per valid A beat, `AccessAck` after the last |
//! | Arithmetic / Logical | RMW, `AccessAckData` with the old value | next data beat once accepted |
//! | Intent       | nothing driven          | `HintAck` on cycle 1                   |

use std::path::Path;

use sim_core::Cycles;
use tilelink::{
    AOpcode, BUS_BYTES, BusInputs, BusOutputs, ChannelA, ChannelD, DOpcode, IntentParam,
    beats_for,
};
use tracing::{debug, trace, warn};

use crate::atomic::{self, AtomicOp};
use crate::config::{DEFAULT_ADDRESS_MASK, MemsimConfig};
use crate::error::{MemsimError, ProtocolError};
use crate::memory::MemoryImage;

/// Largest transfer size code accepted on channel A (a 4-bit field).
pub const MAX_SIZE: u8 = 15;

/// The in-flight request, captured when it was admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTransaction {
    pub opcode: AOpcode,
    pub param: u8,
    /// log2 of the transfer size in bytes.
    pub size: u8,
    pub source: u8,
    /// Address of the next beat.
    pub address: u64,
    /// Beats still to be produced or consumed. Get counts one extra for the
    /// turnaround cycle after its last beat.
    pub beats_remaining: u32,
    /// Set only on the admission cycle.
    pub first_beat: bool,
    /// A response is being presented and has not been accepted yet.
    pub bubble: bool,
    /// Some beat of this transaction fell outside memory or named an
    /// unknown operation.
    pub denied: bool,
}

impl PendingTransaction {
    const IDLE: Self = Self {
        opcode: AOpcode::Get,
        param: 0,
        size: 0,
        source: 0,
        address: 0,
        beats_remaining: 0,
        first_beat: false,
        bubble: false,
        denied: false,
    };

    /// Nothing left to transfer and no response waiting for the requester.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.beats_remaining == 0 && !self.bubble
    }
}

/// Single-cycle TL-UH memory responder.
pub struct TlMemsim {
    memory: MemoryImage,
    address_mask: u64,
    txn: PendingTransaction,
    /// D channel as driven since the last edge.
    d_out: ChannelD,
    a_ready: bool,
    cycles: Cycles,
}

impl TlMemsim {
    /// Build a responder over a zeroed memory of `size` bytes at `base`.
    pub fn new(base: u64, size: usize) -> Result<Self, MemsimError> {
        Ok(Self::with_memory(MemoryImage::new(base, size)?))
    }

    /// Build a responder over an existing memory image.
    #[must_use]
    pub fn with_memory(memory: MemoryImage) -> Self {
        Self {
            memory,
            address_mask: DEFAULT_ADDRESS_MASK,
            txn: PendingTransaction::IDLE,
            d_out: ChannelD::default(),
            a_ready: true,
            cycles: Cycles::ZERO,
        }
    }

    /// Build a responder from a configuration, loading its image if one is
    /// named.
    pub fn from_config(config: &MemsimConfig) -> Result<Self, MemsimError> {
        let mut sim = Self::new(config.base, config.size)?.with_address_mask(config.address_mask);
        if let Some(image) = &config.image {
            sim.load(&image.path, image.offset)?;
        }
        Ok(sim)
    }

    /// Replace the mask applied to admitted request addresses.
    #[must_use]
    pub fn with_address_mask(mut self, mask: u64) -> Self {
        self.address_mask = mask;
        self
    }

    /// Drop any in-flight transaction and response. Call before the first
    /// cycle, on bus reset, and after a [`ProtocolError`].
    pub fn reset(&mut self) {
        self.txn = PendingTransaction::IDLE;
        self.d_out = ChannelD::default();
        self.a_ready = true;
    }

    /// Bulk-load a raw image file at byte `offset` of memory.
    pub fn load(&mut self, path: impl AsRef<Path>, offset: usize) -> Result<usize, MemsimError> {
        self.memory.load(path, offset)
    }

    #[must_use]
    pub fn memory(&self) -> &MemoryImage {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut MemoryImage {
        &mut self.memory
    }

    /// The in-flight transaction, or `None` when idle.
    #[must_use]
    pub fn transaction(&self) -> Option<&PendingTransaction> {
        (!self.txn.is_idle()).then_some(&self.txn)
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.txn.is_idle()
    }

    /// Edges seen since construction.
    #[must_use]
    pub fn cycles(&self) -> Cycles {
        self.cycles
    }

    /// Signals currently driven (the result of the last `tick`).
    #[must_use]
    pub fn outputs(&self) -> BusOutputs {
        BusOutputs {
            a_ready: self.a_ready,
            d: self.d_out,
        }
    }

    pub(crate) fn pending(&self) -> &PendingTransaction {
        &self.txn
    }

    /// Advance one rising clock edge.
    ///
    /// # Errors
    ///
    /// Returns a [`ProtocolError`] if the request breaks the protocol. The
    /// outputs are then undefined and the responder must be reset.
    pub fn tick(&mut self, inputs: &BusInputs) -> Result<BusOutputs, ProtocolError> {
        self.cycles.advance();
        let a = &inputs.a;

        // Response from the last edge not taken: present it again.
        if self.d_out.valid && !inputs.d_ready {
            debug!(
                "stall: {} to source {} not accepted",
                self.d_out.opcode, self.d_out.source
            );
            return Ok(self.drive(false));
        }
        self.d_out.valid = false;

        // Admission is gated on idle only. While a Put or atomic burst waits
        // for data, a valid A beat must continue it; otherwise A is ignored.
        if self.txn.is_idle() {
            if !a.valid {
                return Ok(self.drive(true));
            }
            self.admit(a)?;
        } else if a.valid && self.txn.opcode.has_data() && !self.txn.bubble {
            self.check_continuation(a)?;
        }

        let a_ready = match self.txn.opcode {
            AOpcode::Get => self.get_beat(),
            AOpcode::PutFullData | AOpcode::PutPartialData => self.put_beat(a),
            AOpcode::ArithmeticData | AOpcode::LogicalData => self.atomic_beat(a)?,
            AOpcode::Intent => self.intent_beat(),
        };
        Ok(self.drive(a_ready))
    }

    fn drive(&mut self, a_ready: bool) -> BusOutputs {
        self.a_ready = a_ready;
        self.outputs()
    }

    fn admit(&mut self, a: &ChannelA) -> Result<(), ProtocolError> {
        debug_assert!(self.txn.is_idle(), "admission with a transaction in flight");

        let opcode =
            AOpcode::try_from(a.opcode).map_err(|_| ProtocolError::UnknownOpcode(a.opcode))?;
        if matches!(
            opcode,
            AOpcode::Get | AOpcode::PutFullData | AOpcode::PutPartialData
        ) && a.param != 0
        {
            return Err(ProtocolError::NonZeroParam {
                opcode,
                param: a.param,
            });
        }
        if a.size > MAX_SIZE {
            return Err(ProtocolError::UnsupportedSize { size: a.size });
        }

        self.txn = PendingTransaction {
            opcode,
            param: a.param,
            size: a.size,
            source: a.source,
            address: a.address & self.address_mask,
            beats_remaining: beats_for(a.size),
            first_beat: true,
            bubble: false,
            denied: false,
        };
        debug!(
            "admit {opcode} param {} size {} source {} address {:#010x} ({} beats)",
            a.param, a.size, a.source, self.txn.address, self.txn.beats_remaining
        );
        Ok(())
    }

    /// A data beat after the first must repeat the header of the burst it
    /// belongs to.
    fn check_continuation(&self, a: &ChannelA) -> Result<(), ProtocolError> {
        let txn = &self.txn;
        if a.opcode == u8::from(txn.opcode)
            && a.param == txn.param
            && a.size == txn.size
            && a.source == txn.source
        {
            return Ok(());
        }
        Err(ProtocolError::BurstMismatch {
            expected: txn.opcode,
            expected_source: txn.source,
            opcode: a.opcode,
            source: a.source,
        })
    }

    fn advance_beat(&mut self) {
        self.txn.beats_remaining -= 1;
        self.txn.address = self.txn.address.wrapping_add(BUS_BYTES);
    }

    fn get_beat(&mut self) -> bool {
        if self.txn.first_beat {
            self.txn.first_beat = false;
            self.txn.beats_remaining += 1;
        }

        if self.txn.beats_remaining == 1 {
            self.txn.beats_remaining = 0;
            debug!("get complete for source {}", self.txn.source);
            return true;
        }

        let beat = ChannelD::access_ack_data(self.txn.size, self.txn.source, 0);
        self.d_out = match self.memory.read(self.txn.address) {
            Ok(data) => {
                trace!(
                    "GET {:#010x} beat {} = {data:#018x}",
                    self.txn.address, self.txn.beats_remaining
                );
                ChannelD { data, ..beat }
            }
            Err(err) => {
                warn!("get denied: {err}");
                self.txn.denied = true;
                beat.deny()
            }
        };
        self.advance_beat();
        false
    }

    fn put_beat(&mut self, a: &ChannelA) -> bool {
        if self.txn.bubble {
            self.txn.bubble = false;
            debug!("put complete for source {}", self.txn.source);
            return true;
        }
        self.txn.first_beat = false;

        if !a.valid {
            return true;
        }
        if a.corrupt {
            debug!("corrupt put beat at {:#010x} written as-is", self.txn.address);
        }
        trace!(
            "PUT {:#010x} beat {} = {:#018x} mask {:#04x}",
            self.txn.address, self.txn.beats_remaining, a.data, a.mask
        );
        if let Err(err) = self.memory.write(self.txn.address, a.data, a.mask) {
            warn!("put beat dropped: {err}");
            self.txn.denied = true;
        }
        self.advance_beat();
        if self.txn.beats_remaining > 0 {
            return true;
        }

        let ack = ChannelD::response(DOpcode::AccessAck, self.txn.size, self.txn.source);
        self.d_out = if self.txn.denied { ack.deny() } else { ack };
        self.txn.bubble = true;
        false
    }

    fn atomic_beat(&mut self, a: &ChannelA) -> Result<bool, ProtocolError> {
        if self.txn.bubble {
            // Response taken: finished, or ready for the next data beat.
            self.txn.bubble = false;
            return Ok(true);
        }
        self.txn.first_beat = false;

        if !a.valid {
            return Ok(true);
        }
        atomic::check_mask(a.mask)?;

        let beat = ChannelD::access_ack_data(self.txn.size, self.txn.source, 0);
        self.d_out = match AtomicOp::decode(self.txn.opcode, self.txn.param) {
            Err(err) => {
                warn!("atomic denied: {err}");
                self.txn.denied = true;
                beat.deny()
            }
            Ok(op) => match self.memory.word_mut(self.txn.address) {
                Err(err) => {
                    warn!("atomic denied: {err}");
                    self.txn.denied = true;
                    beat.deny()
                }
                Ok(word) => {
                    let old = *word;
                    *word = atomic::execute(op, old, a.data, a.mask)?;
                    trace!(
                        "ATOM {op:?} {:#010x} beat {} = {:#018x} mask {:#04x}, was {old:#018x}",
                        self.txn.address, self.txn.beats_remaining, a.data, a.mask
                    );
                    ChannelD { data: old, ..beat }
                }
            },
        };
        self.advance_beat();
        self.txn.bubble = true;
        Ok(false)
    }

    fn intent_beat(&mut self) -> bool {
        if self.txn.first_beat {
            self.txn.first_beat = false;
            let hint = match IntentParam::try_from(self.txn.param) {
                Ok(IntentParam::PrefetchRead) => "PrefetchRead",
                Ok(IntentParam::PrefetchWrite) => "PrefetchWrite",
                Err(_) => "Unknown",
            };
            debug!(
                "INTENT {hint} ({}) {:#010x} size {}",
                self.txn.param, self.txn.address, self.txn.size
            );
            return false;
        }

        if self.txn.bubble {
            self.txn.bubble = false;
            return true;
        }

        self.d_out = ChannelD::response(DOpcode::HintAck, self.txn.size, self.txn.source);
        self.txn.beats_remaining = 0;
        self.txn.bubble = true;
        false
    }
}
