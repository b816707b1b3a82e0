//! Trace Replay Tests.
//!
//! End-to-end scenarios through the `Simulator`: counting, swap expansion,
//! register-fed cache control, and the scheduled injection firing with the
//! address of the resident line.

use a9sim_core::config::CacheTarget;
use a9sim_core::core::injector::InjectionPlan;
use a9sim_core::sim::trace::TraceEvent;
use a9sim_core::Simulator;

use crate::common::builder::insn;
use crate::common::harness::{self, small_cache_addr, small_config, TEXT_BEGIN};

fn simulator() -> Simulator {
    harness::init_logging();
    Simulator::new(&small_config()).expect("valid config")
}

fn insn_event(vaddr: u64, word: u32) -> TraceEvent {
    TraceEvent::Insn { vaddr, word }
}

/// A straight-line run counts instructions and data accesses.
#[test]
fn replay_counts_events() {
    let mut sim = simulator();
    let events = [
        insn_event(TEXT_BEGIN, insn::ldr_imm(0, 1, 0)),
        TraceEvent::Mem {
            vaddr: 0x4000_0000,
            store: false,
        },
        insn_event(TEXT_BEGIN + 4, insn::str_imm(0, 1, 0)),
        TraceEvent::Mem {
            vaddr: 0x4000_0004,
            store: true,
        },
        insn_event(TEXT_BEGIN + 8, insn::branch(0)),
    ];

    let fired = sim.run(&events);
    assert!(fired.is_empty());

    let counters = sim.driver().counters();
    assert_eq!(counters.insn_count, 3);
    assert_eq!(counters.load_count, 1);
    assert_eq!(counters.store_count, 1);
}

/// Revisiting an instruction address reuses its translation; the counters
/// still advance per execution.
#[test]
fn replay_reuses_translations() {
    let mut sim = simulator();
    let loop_body = insn_event(TEXT_BEGIN, insn::add_reg(0, 1, 2));

    for _ in 0..50 {
        sim.step(&loop_body);
    }

    assert_eq!(sim.driver().counters().insn_count, 50);
    let icache = sim.driver().caches().cache(CacheTarget::ICache).stats();
    assert_eq!(icache.load_misses, 1);
    assert_eq!(icache.load_hits, 49);
}

/// A swap instruction expands its one memory record into a store and a
/// load.
#[test]
fn replay_expands_swap() {
    let mut sim = simulator();
    let events = [
        insn_event(TEXT_BEGIN, insn::swp(0, 1, 2)),
        TraceEvent::Mem {
            vaddr: 0x4000_0000,
            store: false,
        },
    ];

    sim.run(&events);

    let counters = sim.driver().counters();
    assert_eq!(counters.store_count, 1);
    assert_eq!(counters.load_count, 1);
}

/// Register records feed the DCISW payload read.
#[test]
fn replay_feeds_dcisw_from_registers() {
    let mut sim = simulator();

    // warm row 5 way 0 of the data cache
    let target = small_cache_addr(5, 9);
    sim.run(&[
        insn_event(TEXT_BEGIN, insn::ldr_imm(0, 1, 0)),
        TraceEvent::Mem {
            vaddr: target,
            store: false,
        },
    ]);
    assert!(sim
        .driver()
        .caches()
        .is_block_valid(CacheTarget::DCache, 5, 0));

    sim.run(&[
        TraceEvent::Reg {
            index: 11,
            value: insn::dcisw_payload(5, 0),
        },
        insn_event(TEXT_BEGIN + 4, insn::dcisw(11)),
    ]);

    assert!(!sim
        .driver()
        .caches()
        .is_block_valid(CacheTarget::DCache, 5, 0));
    assert_eq!(sim.driver().counters().cp_count, 1);
}

/// The scheduled injection fires at the planned instruction count with
/// the address of the line resident at the chosen coordinates.
#[test]
fn replay_fires_scheduled_injection() {
    let mut config = small_config();
    config.injection = Some(InjectionPlan {
        sleep_cycles: 100,
        cache: CacheTarget::DCache,
        row: 0,
        way: 0,
        word: 3,
    });
    let mut sim = Simulator::new(&config).expect("valid config");

    // make row 0 way 0 hold a known line before the trigger
    let resident = small_cache_addr(0, 7);
    let mut events = vec![
        insn_event(TEXT_BEGIN, insn::ldr_imm(0, 1, 0)),
        TraceEvent::Mem {
            vaddr: resident,
            store: false,
        },
    ];
    for n in 1..120u64 {
        events.push(insn_event(TEXT_BEGIN + n * 4, insn::add_reg(0, 1, 2)));
    }

    let fired = sim.run(&events);
    assert_eq!(fired.len(), 1, "single shot");
    let event = fired[0].as_ref().expect("valid slot");
    assert_eq!(event.insn_count, 100);
    assert_eq!(event.addr as u64, resident + 3 * 4);
}

/// Without a plan the replay never produces an injection report.
#[test]
fn replay_without_plan_never_fires() {
    let mut sim = simulator();
    let events: Vec<TraceEvent> = (0..200u64)
        .map(|n| insn_event(TEXT_BEGIN + n * 4, insn::add_reg(0, 1, 2)))
        .collect();

    assert!(sim.run(&events).is_empty());
}
