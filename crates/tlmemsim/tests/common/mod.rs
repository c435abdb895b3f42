//! Cycle-level requester used by the integration tests.
//!
//! Presents channel A beats until the responder takes them, drives `d_ready`
//! from a repeating pattern, and records every D beat at the edge where it
//! is accepted.

#![allow(dead_code)]

use tilelink::{BusInputs, BusOutputs, ChannelA, ChannelD};
use tlmemsim::TlMemsim;

/// Give up on a transaction after this many edges.
const CYCLE_LIMIT: usize = 10_000;

pub struct Requester {
    pub sim: TlMemsim,
    ready_pattern: Vec<bool>,
    edge: usize,
    last: BusOutputs,
    accepted: Vec<ChannelD>,
}

impl Requester {
    pub fn new(mut sim: TlMemsim) -> Self {
        sim.reset();
        let last = sim.outputs();
        Self {
            sim,
            ready_pattern: vec![true],
            edge: 0,
            last,
            accepted: Vec::new(),
        }
    }

    /// Drive `d_ready` from `pattern`, repeated. The pattern must contain at
    /// least one `true` or no response will ever complete.
    pub fn with_ready_pattern(mut self, pattern: &[bool]) -> Self {
        assert!(pattern.contains(&true), "ready pattern never accepts");
        self.ready_pattern = pattern.to_vec();
        self
    }

    /// One rising edge with `a` on channel A.
    pub fn edge(&mut self, a: ChannelA) -> BusOutputs {
        let d_ready = self.ready_pattern[self.edge % self.ready_pattern.len()];
        self.edge += 1;
        if d_ready && self.last.d.valid {
            self.accepted.push(self.last.d);
        }
        self.last = self
            .sim
            .tick(&BusInputs::new(a, d_ready))
            .expect("legal request");
        self.last
    }

    /// Present `a` until an edge where A-ready was high.
    pub fn send(&mut self, a: ChannelA) {
        for _ in 0..CYCLE_LIMIT {
            let taken = self.last.a_ready;
            self.edge(a);
            if taken {
                return;
            }
        }
        panic!("request never accepted: {a:?}");
    }

    /// Idle channel A until the transaction completes; returns the D beats
    /// accepted since the last call.
    pub fn drain(&mut self) -> Vec<ChannelD> {
        for _ in 0..CYCLE_LIMIT {
            if self.sim.is_idle() && !self.last.d.valid {
                return std::mem::take(&mut self.accepted);
            }
            self.edge(ChannelA::default());
        }
        panic!("transaction never completed");
    }

    pub fn get(&mut self, address: u64, size: u8, source: u8) -> Vec<ChannelD> {
        self.send(ChannelA::get(address, size, source));
        self.drain()
    }

    /// Full-mask put burst, one data word per beat.
    pub fn put(&mut self, address: u64, size: u8, source: u8, data: &[u64]) -> Vec<ChannelD> {
        let beats: Vec<(u8, u64)> = data.iter().map(|&d| (0xFF, d)).collect();
        self.put_beats(ChannelA::put_full(address, size, source, 0), &beats)
    }

    /// Put burst starting from `first`, with explicit `(mask, data)` beats.
    pub fn put_beats(&mut self, first: ChannelA, beats: &[(u8, u64)]) -> Vec<ChannelD> {
        for &(mask, data) in beats {
            self.send(first.next_beat(mask, data));
        }
        self.drain()
    }

    /// Any single request (atomic, intent) followed by its completion.
    pub fn request(&mut self, a: ChannelA) -> Vec<ChannelD> {
        self.send(a);
        self.drain()
    }

    pub fn edges(&self) -> usize {
        self.edge
    }
}
