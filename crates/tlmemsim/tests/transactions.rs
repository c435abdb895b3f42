//! End-to-end transactions driven cycle by cycle.

mod common;

use common::Requester;
use tilelink::{
    ArithmeticParam, BusInputs, ChannelA, DOpcode, IntentParam, LogicalParam, beats_for,
};
use tlmemsim::{MemsimConfig, MemsimError, TlMemsim};

const MIB: usize = 1024 * 1024;

fn ram(size: usize) -> TlMemsim {
    TlMemsim::new(0, size).expect("valid memory")
}

/// Irregular d_ready pattern used to exercise stalls.
const CHOPPY: &[bool] = &[true, false, false, true, false, true, true, false];

#[test]
fn write_then_read_one_word() {
    let mut req = Requester::new(ram(MIB));

    let acks = req.put(0, 3, 1, &[0x1122_3344_5566_7788]);
    assert_eq!(acks.len(), 1);
    assert_eq!(acks[0].opcode, DOpcode::AccessAck);
    assert_eq!(acks[0].source, 1);
    assert!(!acks[0].denied);

    let beats = req.get(0, 3, 0x2A);
    assert_eq!(beats.len(), 1);
    assert_eq!(beats[0].opcode, DOpcode::AccessAckData);
    assert_eq!(beats[0].data, 0x1122_3344_5566_7788);
    assert_eq!(beats[0].source, 0x2A);
    assert_eq!(beats[0].size, 3);
    assert!(!beats[0].denied);
    assert!(!beats[0].corrupt);
}

#[test]
fn get_burst_in_address_order() {
    for pattern in [&[true][..], CHOPPY] {
        let mut req = Requester::new(ram(4096)).with_ready_pattern(pattern);
        for i in 0..8u64 {
            req.sim
                .memory_mut()
                .write(0x200 + i * 8, 0xA000 + i, 0xFF)
                .expect("in range");
        }
        let beats = req.get(0x200, 6, 4);
        assert_eq!(beats.len(), beats_for(6) as usize);
        let data: Vec<u64> = beats.iter().map(|d| d.data).collect();
        assert_eq!(data, (0..8).map(|i| 0xA000 + i).collect::<Vec<_>>());
        assert!(beats.iter().all(|d| d.source == 4 && d.size == 6));
    }
}

#[test]
fn put_burst_lands_in_consecutive_words() {
    let mut req = Requester::new(ram(4096)).with_ready_pattern(CHOPPY);
    let words = [0x11, 0x22, 0x33, 0x44];
    let acks = req.put(0x80, 5, 3, &words);
    assert_eq!(acks.len(), 1);
    assert_eq!(acks[0].opcode, DOpcode::AccessAck);

    for (i, &w) in words.iter().enumerate() {
        assert_eq!(req.sim.memory().read(0x80 + 8 * i as u64), Ok(w));
    }
    assert_eq!(req.sim.memory().read(0xA0), Ok(0));

    let beats = req.get(0x80, 5, 3);
    let data: Vec<u64> = beats.iter().map(|d| d.data).collect();
    assert_eq!(data, words);
}

#[test]
fn partial_put_touches_only_enabled_lanes() {
    let mut req = Requester::new(ram(4096));
    req.put(0x40, 3, 0, &[0x1111_2222_3333_4444]);

    let first = ChannelA::put_partial(0x40, 3, 0, 0x0F, 0);
    req.put_beats(first, &[(0x30, 0xAAAA_BBBB_CCCC_DDDD)]);
    assert_eq!(req.sim.memory().read(0x40), Ok(0x1111_BBBB_3333_4444));
}

#[test]
fn second_request_ignored_while_busy() {
    let mut sim = ram(4096);
    sim.reset();
    sim.memory_mut().write(0, 0x10, 0xFF).expect("in range");

    let out = sim
        .tick(&BusInputs::new(ChannelA::get(0, 5, 1), true))
        .expect("legal request");
    assert!(!out.a_ready);

    let intruder = ChannelA::put_full(0x100, 3, 9, 0xBAD);
    let mut sources = vec![out.d.source];
    loop {
        let out = sim
            .tick(&BusInputs::new(intruder, true))
            .expect("legal request");
        if out.d.valid {
            assert!(!out.a_ready);
            sources.push(out.d.source);
        } else {
            // Turnaround: A-ready comes back only once the burst is done.
            assert!(out.a_ready);
            break;
        }
        assert_eq!(sim.transaction().map(|t| t.source), Some(1));
    }
    assert_eq!(sources, vec![1; 4]);
    assert_eq!(sim.memory().read(0x100), Ok(0));

    // Now idle: the same request is admitted.
    let out = sim
        .tick(&BusInputs::new(intruder, true))
        .expect("legal request");
    assert_eq!(out.d.opcode, DOpcode::AccessAck);
    assert_eq!(out.d.source, 9);
    assert_eq!(sim.memory().read(0x100), Ok(0xBAD));
}

#[test]
fn stalled_beat_is_repeated_without_advancing() {
    let mut sim = ram(4096);
    sim.reset();
    for i in 0..4u64 {
        sim.memory_mut().write(i * 8, i + 1, 0xFF).expect("in range");
    }

    let first = sim
        .tick(&BusInputs::new(ChannelA::get(0, 5, 2), true))
        .expect("legal request");
    let second = sim.tick(&BusInputs::quiet()).expect("legal request");
    assert_eq!(second.d.data, 2);
    let address = sim.transaction().map(|t| t.address);

    for _ in 0..5 {
        let held = sim
            .tick(&BusInputs::new(ChannelA::default(), false))
            .expect("legal request");
        assert_eq!(held.d, second.d);
        assert!(!held.a_ready);
        assert_eq!(sim.transaction().map(|t| t.address), address);
    }

    let third = sim.tick(&BusInputs::quiet()).expect("legal request");
    assert_eq!(third.d.data, 3);
    assert_eq!(first.d.data, 1);
}

#[test]
fn sign_extended_atomics_on_low_half() {
    let cases = [
        (ArithmeticParam::Min, 0xFFFF_FFFF),
        (ArithmeticParam::Max, 0x0000_0001),
        (ArithmeticParam::MinU, 0x0000_0001),
        (ArithmeticParam::MaxU, 0xFFFF_FFFF),
    ];
    for (param, expected) in cases {
        let mut req = Requester::new(ram(4096)).with_ready_pattern(CHOPPY);
        req.put(0x10, 3, 0, &[0xFFFF_FFFF]);

        let beats = req.request(ChannelA::arithmetic(param, 0x10, 2, 5, 0x0F, 1));
        assert_eq!(beats.len(), 1, "{param:?}");
        assert_eq!(beats[0].opcode, DOpcode::AccessAckData);
        assert_eq!(beats[0].data, 0xFFFF_FFFF, "{param:?} returns prior value");
        assert_eq!(req.sim.memory().read(0x10), Ok(expected), "{param:?}");
    }
}

#[test]
fn atomic_add_on_high_half() {
    let mut req = Requester::new(ram(4096));
    req.put(0, 3, 0, &[0x0000_0005_DEAD_BEEF]);
    let beats = req.request(ChannelA::arithmetic(
        ArithmeticParam::Add,
        0,
        2,
        0,
        0xF0,
        0x0000_0003_0000_0000,
    ));
    assert_eq!(beats[0].data, 0x0000_0005_DEAD_BEEF);
    assert_eq!(req.sim.memory().read(0), Ok(0x0000_0008_DEAD_BEEF));
}

#[test]
fn multi_beat_logical_returns_each_old_word() {
    let mut req = Requester::new(ram(4096)).with_ready_pattern(CHOPPY);
    req.put(0x100, 4, 0, &[0x0F, 0xF0]);

    let first = ChannelA::logical(LogicalParam::Xor, 0x100, 4, 6, 0xFF, 0xFF);
    req.send(first);
    req.send(first.next_beat(0xFF, 0xFF));
    let beats = req.drain();

    assert_eq!(beats.len(), 2);
    assert_eq!(beats[0].data, 0x0F);
    assert_eq!(beats[1].data, 0xF0);
    assert_eq!(req.sim.memory().read(0x100), Ok(0xF0));
    assert_eq!(req.sim.memory().read(0x108), Ok(0x0F));
}

#[test]
fn intent_gets_one_hint_ack() {
    let mut req = Requester::new(ram(4096)).with_ready_pattern(CHOPPY);
    let beats = req.request(ChannelA::intent(IntentParam::PrefetchWrite, 0x40, 6, 8));
    assert_eq!(beats.len(), 1);
    assert_eq!(beats[0].opcode, DOpcode::HintAck);
    assert_eq!(beats[0].source, 8);
    assert_eq!(req.sim.memory().read(0x40), Ok(0));
}

#[test]
fn out_of_range_burst_is_denied_per_beat() {
    let mut req = Requester::new(ram(64));
    let beats = req.get(0x30, 5, 0);
    assert_eq!(beats.len(), 4);
    assert!(!beats[0].denied);
    assert!(!beats[1].denied);
    assert!(beats[2].denied && beats[2].corrupt);
    assert!(beats[3].denied && beats[3].corrupt);
}

#[test]
fn put_burst_running_off_the_end_is_denied() {
    let mut req = Requester::new(ram(64)).with_ready_pattern(CHOPPY);
    let acks = req.put(0x38, 4, 2, &[0x11, 0x22]);
    assert_eq!(acks.len(), 1);
    assert_eq!(acks[0].opcode, DOpcode::AccessAck);
    assert_eq!(acks[0].source, 2);
    assert!(acks[0].denied);
    assert!(!acks[0].corrupt);
    assert_eq!(req.sim.memory().read(0x38), Ok(0x11));

    // Denial does not leak into the next transaction
    let acks = req.put(0x30, 3, 2, &[0x33]);
    assert!(!acks[0].denied);
}

#[test]
fn config_loads_image_before_first_cycle() {
    let path = std::env::temp_dir().join(format!("tlmemsim-image-{}.bin", std::process::id()));
    std::fs::write(&path, 0x0102_0304_0506_0708_u64.to_le_bytes()).expect("write image");

    let json = format!(
        r#"{{ "size": 4096, "image": {{ "path": {:?}, "offset": 16 }} }}"#,
        path.display().to_string()
    );
    let config = MemsimConfig::from_json(&json).expect("valid config");
    let sim = TlMemsim::from_config(&config);
    let _ = std::fs::remove_file(&path);

    let mut req = Requester::new(sim.expect("image loads"));
    let beats = req.get(16, 3, 0);
    assert_eq!(beats[0].data, 0x0102_0304_0506_0708);
}

#[test]
fn config_with_missing_image_fails() {
    let config = MemsimConfig::from_json(
        r#"{ "size": 4096, "image": { "path": "/nonexistent/tlmemsim.bin" } }"#,
    )
    .expect("valid config");
    assert!(matches!(
        TlMemsim::from_config(&config),
        Err(MemsimError::Load { .. })
    ));
}

#[test]
fn back_to_back_transactions_cost_fixed_cycles() {
    let mut req = Requester::new(ram(4096));
    req.get(0, 3, 0);
    // Admission beat, turnaround
    assert_eq!(req.edges(), 2);
    req.put(0, 3, 0, &[1]);
    // Data beat with ack, ack accepted
    assert_eq!(req.edges(), 4);
}
