//! Cache Hierarchy Tests.
//!
//! Verifies miss forwarding between L1 and L2, the cache-maintenance entry
//! points, target selection, and the report layout.

use a9sim_core::config::CacheTarget;
use a9sim_core::core::hierarchy::CacheSystem;
use a9sim_core::core::injector::InjectionPlan;
use a9sim_core::SimError;

use crate::common::harness::small_config;

fn system() -> CacheSystem {
    CacheSystem::new(&small_config().cache).expect("valid geometry")
}

// ══════════════════════════════════════════════════════════
// 1. Miss forwarding
// ══════════════════════════════════════════════════════════

/// An I-cache miss is forwarded to L2 as a load; a subsequent I-cache hit
/// is not.
#[test]
fn icache_miss_loads_l2() {
    let mut system = system();

    assert!(!system.icache_load(0x5000).is_hit());
    assert_eq!(system.cache(CacheTarget::L2Cache).stats().load_misses, 1);

    assert!(system.icache_load(0x5000).is_hit());
    let l2 = system.cache(CacheTarget::L2Cache).stats();
    assert_eq!(l2.load_hits + l2.load_misses, 1, "hits stay in L1");
}

/// A D-cache load miss is forwarded to L2 as a load.
#[test]
fn dcache_miss_loads_l2() {
    let mut system = system();

    system.dcache_load(0x9000);
    assert_eq!(system.cache(CacheTarget::DCache).stats().load_misses, 1);
    assert_eq!(system.cache(CacheTarget::L2Cache).stats().load_misses, 1);
}

/// A store miss passes through the no-write-allocate L1 into the
/// write-allocate L2, which installs the line; the L1 stays empty.
#[test]
fn store_miss_forwards_and_fills_only_l2() {
    let mut system = system();

    system.dcache_store(0x9000);
    assert_eq!(system.cache(CacheTarget::DCache).stats().store_misses, 1);
    assert_eq!(system.cache(CacheTarget::L2Cache).stats().store_misses, 1);
    assert_eq!(system.cache(CacheTarget::L2Cache).stats().compulsory_misses, 1);

    // L1 did not allocate, so the same store misses L1 again but hits L2
    system.dcache_store(0x9000);
    assert_eq!(system.cache(CacheTarget::DCache).stats().store_misses, 2);
    assert_eq!(system.cache(CacheTarget::L2Cache).stats().store_hits, 1);
}

/// An L2 line warmed by an I-side miss serves a later D-side miss.
#[test]
fn l2_is_unified() {
    let mut system = system();

    system.icache_load(0x7000);
    system.dcache_load(0x7000);

    let l2 = system.cache(CacheTarget::L2Cache).stats();
    assert_eq!(l2.load_misses, 1);
    assert_eq!(l2.load_hits, 1);
}

// ══════════════════════════════════════════════════════════
// 2. Maintenance operations
// ══════════════════════════════════════════════════════════

/// ICIALLU empties the instruction cache but leaves L2 warm.
#[test]
fn icache_invalidate_all_leaves_l2() {
    let mut system = system();

    system.icache_load(0x5000);
    system.icache_invalidate_all();

    assert!(!system.icache_load(0x5000).is_hit(), "L1 was emptied");
    let l2 = system.cache(CacheTarget::L2Cache).stats();
    assert_eq!(l2.load_hits, 1, "the refetch hits the warm L2");
}

/// DCISW invalidates exactly one D-cache block.
#[test]
fn dcache_invalidate_block_is_targeted() {
    let mut system = system();

    // fill row 5 ways 0..2; invalid-slot preference makes way order fixed
    for tag in 0..3u64 {
        system.dcache_load((tag << 12) | (5 << 5));
    }
    system.dcache_invalidate_block(5, 2);

    assert!(!system.is_block_valid(CacheTarget::DCache, 5, 2));
    assert!(system.is_block_valid(CacheTarget::DCache, 5, 0));
    assert!(system.is_block_valid(CacheTarget::DCache, 5, 1));
}

// ══════════════════════════════════════════════════════════
// 3. Target selection and validation
// ══════════════════════════════════════════════════════════

/// Cache names map to targets; anything else is refused.
#[test]
fn cache_target_parsing() {
    assert_eq!("icache".parse::<CacheTarget>().unwrap(), CacheTarget::ICache);
    assert_eq!("dcache".parse::<CacheTarget>().unwrap(), CacheTarget::DCache);
    assert_eq!("l2cache".parse::<CacheTarget>().unwrap(), CacheTarget::L2Cache);
    assert!(matches!(
        "l3cache".parse::<CacheTarget>(),
        Err(SimError::UnknownCache(_))
    ));
    assert_eq!(CacheTarget::L2Cache.to_string(), "l2cache");
}

/// Plans are validated against the geometry of their chosen cache.
#[test]
fn validate_injection_uses_target_geometry() {
    let system = system();

    let l2_plan = InjectionPlan {
        sleep_cycles: 0,
        cache: CacheTarget::L2Cache,
        row: 200,
        way: 7,
        word: 7,
    };
    assert!(system.validate_injection(&l2_plan).is_ok());

    // row 200 exceeds the 128-row L1 data cache
    let d_plan = InjectionPlan {
        cache: CacheTarget::DCache,
        ..l2_plan
    };
    assert!(matches!(
        system.validate_injection(&d_plan),
        Err(SimError::InjectionRange { .. })
    ));
}

/// `block_addr` routes to the chosen cache.
#[test]
fn block_addr_by_target() {
    let mut system = system();

    system.dcache_load(0x9020);
    let found = (0..4).any(|way| system.block_addr(CacheTarget::DCache, 1, way) == 0x9020);
    assert!(found);
    assert_eq!(system.block_addr(CacheTarget::ICache, 1, 0), 0);
}

// ══════════════════════════════════════════════════════════
// 4. Report
// ══════════════════════════════════════════════════════════

/// The report lists the caches in icache, dcache, l2cache order.
#[test]
fn report_orders_caches() {
    let mut out = String::new();
    system().write_report(&mut out);

    let icache = out.find("icache").expect("icache block");
    let dcache = out.find("dcache").expect("dcache block");
    let l2cache = out.find("l2cache").expect("l2cache block");
    assert!(icache < dcache && dcache < l2cache);
}
