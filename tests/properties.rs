use dysect::{DysectEngine, EngineConfig};

type SmallEngine = DysectEngine<4, 4, 2, u64, u64>;

fn engine(alpha: f64) -> SmallEngine {
    DysectEngine::new(0, EngineConfig::new(alpha))
}

#[test]
fn find_returns_last_written_value() {
    let mut e = engine(1.1);
    assert!(e.insert(5, 8));
    assert_eq!(e.get(&5), Some(&8));
    assert!(!e.insert(5, 9));
    assert_eq!(e.get(&5), Some(&8));
}

#[test]
fn size_tracks_successful_inserts_and_erases() {
    let mut e = engine(1.1);
    for k in 1..200u64 {
        e.insert(k, k * 2);
    }
    assert_eq!(e.len(), 199);
    for k in 1..100u64 {
        e.erase(&k);
    }
    assert_eq!(e.len(), 99);
}

#[test]
fn capacity_never_falls_below_live_count() {
    let mut e = engine(1.2);
    let mut last_capacity = e.capacity();
    for k in 1..2000u64 {
        e.insert(k, k);
        assert!(e.capacity() >= e.len());
        assert!(e.capacity() >= last_capacity, "capacity must never shrink without an explicit shrink");
        last_capacity = e.capacity();
    }
}

#[test]
fn iteration_yields_every_live_key_exactly_once() {
    let mut e = engine(1.1);
    let inserted: Vec<u64> = (1..500u64).collect();
    for &k in &inserted {
        e.insert(k, k);
    }
    let mut seen: Vec<u64> = e.iter().map(|(k, _)| k).collect();
    seen.sort_unstable();
    let mut expected = inserted.clone();
    expected.sort_unstable();
    assert_eq!(seen, expected);
    assert_eq!(e.len(), inserted.len());
}

#[test]
fn every_live_key_is_reachable_through_its_probe_set() {
    let mut e = engine(1.1);
    for k in 1..500u64 {
        e.insert(k, k);
    }
    for k in 1..500u64 {
        assert!(e.displacement(&k) >= 0, "key {} not reachable via its candidates", k);
    }
}

#[test]
fn insert_then_erase_is_a_no_op_on_size() {
    let mut e = engine(1.1);
    let before = e.len();
    e.insert(42, 1);
    e.erase(&42);
    assert_eq!(e.len(), before);
    assert_eq!(e.get(&42), None);
}

#[test]
fn erase_is_idempotent() {
    let mut e = engine(1.1);
    e.insert(7, 1);
    assert_eq!(e.erase(&7), 1);
    assert_eq!(e.erase(&7), 0);
}

#[test]
fn accessor_inserts_default_on_miss() {
    let mut e = engine(1.1);
    e[3] += 10;
    assert_eq!(e[3], 10);
    e[3] += 5;
    assert_eq!(e[3], 15);
}
