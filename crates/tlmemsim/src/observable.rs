//! Observable implementation for the responder.

use sim_core::{Observable, Value};

use crate::responder::TlMemsim;

const TLMEMSIM_QUERY_PATHS: &[&str] = &[
    "cycles",
    "idle",
    "beats_remaining",
    "address",
    "opcode",
    "param",
    "size",
    "source",
    "first_beat",
    "bubble",
    "denied",
    "a_ready",
    "d.valid",
    "d.opcode",
    "d.source",
    "d.data",
    "d.denied",
];

impl Observable for TlMemsim {
    fn query(&self, path: &str) -> Option<Value> {
        let txn = self.pending();
        let out = self.outputs();
        match path {
            "cycles" => Some(self.cycles().get().into()),
            "idle" => Some(self.is_idle().into()),
            "beats_remaining" => Some(txn.beats_remaining.into()),
            "address" => Some(txn.address.into()),
            "opcode" => Some(txn.opcode.name().into()),
            "param" => Some(txn.param.into()),
            "size" => Some(txn.size.into()),
            "source" => Some(txn.source.into()),
            "first_beat" => Some(txn.first_beat.into()),
            "bubble" => Some(txn.bubble.into()),
            "denied" => Some(txn.denied.into()),
            "a_ready" => Some(out.a_ready.into()),
            "d.valid" => Some(out.d.valid.into()),
            "d.opcode" => Some(Value::Text(out.d.opcode.to_string())),
            "d.source" => Some(out.d.source.into()),
            "d.data" => Some(Value::Word(out.d.data)),
            "d.denied" => Some(out.d.denied.into()),
            _ => {
                // mem.<hex bus address>
                let addr = path.strip_prefix("mem.")?;
                let addr = addr.strip_prefix("0x").unwrap_or(addr);
                let addr = u64::from_str_radix(addr, 16).ok()?;
                self.memory().read(addr).ok().map(Value::Word)
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        TLMEMSIM_QUERY_PATHS
    }
}
