// ChainedHashMap public API suite.
//
// Each test documents what behavior is being verified and which
// invariants are assumed or asserted. The core invariants exercised:
// - Count: `len()` equals the number of live entries.
// - Shadowing: the newest entry for a key wins until deleted.
// - Sizing: slot count starts at 16 and doubles once the collision
//   counter reaches its threshold, before the triggering insert lands.
// - Teardown: the destructor runs once per entry, never on relocation.
use chained_hashmap::{ChainedHashMap, Error, KeyHasher, INITIAL_SLOT_COUNT};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::ControlFlow;
use std::rc::Rc;

fn zero_hash(_: &String) -> u64 {
    0
}

// Test: count invariant for distinct keys.
// Assumes: no deletes.
// Verifies: len() == N and every key reads back its value.
#[test]
fn distinct_inserts_count_and_round_trip() {
    let mut m = ChainedHashMap::new();
    for i in 0..1_000u32 {
        m.set(format!("key-{i}"), i).unwrap();
    }
    assert_eq!(m.len(), 1_000);
    for i in 0..1_000u32 {
        assert_eq!(m.get(&format!("key-{i}")), Ok(&i));
    }
}

// Test: shadowing order.
// Assumes: duplicate keys are not rejected.
// Verifies: newest value visible; one delete uncovers the previous one.
#[test]
fn shadowing_order() {
    let mut m = ChainedHashMap::new();
    m.set("k", "v1").unwrap();
    m.set("k", "v2").unwrap();
    assert_eq!(m.get(&"k"), Ok(&"v2"));
    assert_eq!(m.len(), 2);
    m.delete(&"k").unwrap();
    assert_eq!(m.get(&"k"), Ok(&"v1"));
    assert_eq!(m.len(), 1);
}

// Test: absent keys.
// Assumes: key was never inserted.
// Verifies: get/delete report NotFound (legacy code -1) and len is unchanged.
#[test]
fn absent_key_is_not_found() {
    let mut m = ChainedHashMap::new();
    m.set(1u64, 1u64).unwrap();
    let err = m.get(&99).unwrap_err();
    assert_eq!(err, Error::NotFound);
    assert_eq!(err.code(), -1);
    assert_eq!(m.delete(&99), Err(Error::NotFound));
    assert_eq!(m.len(), 1);
}

// Test: the concrete constant-hash resize scenario.
// Assumes: hash(_) == 0, so every insert after the first collides.
// Verifies: the 13th insert resizes to 32 slots; all 13 entries survive.
#[test]
fn constant_hash_thirteen_inserts() {
    let mut m = ChainedHashMap::with_hasher(zero_hash as fn(&String) -> u64);
    for i in 0..13 {
        m.set(format!("{i}"), i).unwrap();
    }
    assert_eq!(m.len(), 13);
    assert_eq!(m.slot_count(), 32);
    for i in 0..13 {
        assert_eq!(m.get(&format!("{i}")), Ok(&i));
    }
}

// Test: resize preserves data.
// Assumes: enough colliding inserts to cross several thresholds.
// Verifies: slot count doubles each time; every value reads back.
#[test]
fn resize_preserves_values_and_doubles() {
    let mut m = ChainedHashMap::with_hasher(|k: &u32| u64::from(*k % 3));
    let mut sizes = vec![m.slot_count()];
    for i in 0..500u32 {
        m.set(i, i * 7).unwrap();
        if m.slot_count() != *sizes.last().unwrap() {
            sizes.push(m.slot_count());
        }
    }
    assert_eq!(sizes[0], INITIAL_SLOT_COUNT);
    for w in sizes.windows(2) {
        assert_eq!(w[1], w[0] * 2);
    }
    assert!(sizes.len() > 2);
    for i in 0..500u32 {
        assert_eq!(m.get(&i), Ok(&(i * 7)));
    }
}

// Test: set, delete, get.
// Verifies: the deleted key is gone and the table is empty.
#[test]
fn set_delete_get_scenario() {
    let mut m = ChainedHashMap::new();
    m.set("a".to_string(), "1".to_string()).unwrap();
    m.delete(&"a".to_string()).unwrap();
    assert!(m.get(&"a".to_string()).unwrap_err().is_not_found());
    assert_eq!(m.len(), 0);
    assert!(m.is_empty());
}

// Test: traversal completeness.
// Assumes: a mix of inserts and deletes.
// Verifies: foreach visits exactly the live set, each pair once.
#[test]
fn foreach_matches_live_set() {
    let mut m = ChainedHashMap::new();
    for i in 0..200u16 {
        m.set(i, u32::from(i) + 1).unwrap();
    }
    for i in (0..200u16).step_by(3) {
        m.delete(&i).unwrap();
    }
    let mut seen = BTreeMap::new();
    let _ = m.foreach(|k, v| {
        assert!(seen.insert(*k, *v).is_none(), "visited twice");
        ControlFlow::Continue(())
    });
    let expected: BTreeMap<u16, u32> = (0..200u16)
        .filter(|i| i % 3 != 0)
        .map(|i| (i, u32::from(i) + 1))
        .collect();
    assert_eq!(seen, expected);
    assert_eq!(seen.len(), m.len());

    let via_iter: BTreeSet<u16> = (&m).into_iter().map(|(k, _)| *k).collect();
    assert_eq!(via_iter, expected.keys().copied().collect::<BTreeSet<u16>>());
}

// Test: teardown cleanliness.
// Assumes: destructor registered through the builder.
// Verifies: deleted entries destroyed once at delete time; survivors once at
// drop; resizes in between destroy nothing.
#[test]
fn teardown_destroys_each_live_entry_once() {
    let destroyed: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = destroyed.clone();
    let mut m = ChainedHashMap::builder()
        .hasher(zero_hash as fn(&String) -> u64)
        .destructor(move |k: String, _v: usize| sink.borrow_mut().push(k))
        .build()
        .unwrap();

    for i in 0..60 {
        m.set(format!("e{i}"), i).unwrap();
    }
    assert!(m.slot_count() > INITIAL_SLOT_COUNT);
    assert!(destroyed.borrow().is_empty());

    m.delete(&"e0".to_string()).unwrap();
    m.delete(&"e59".to_string()).unwrap();
    assert_eq!(*destroyed.borrow(), vec!["e0".to_string(), "e59".to_string()]);

    drop(m);
    let all = destroyed.borrow();
    assert_eq!(all.len(), 60);
    let unique: BTreeSet<&String> = all.iter().collect();
    assert_eq!(unique.len(), 60);
}

// Test: values with their own Drop are released exactly once without a
// registered destructor.
// Verifies: Rc strong counts return to one after delete and drop.
#[test]
fn owned_payloads_drop_once_without_destructor() {
    let payload = Rc::new(());
    let mut m = ChainedHashMap::with_hasher(|k: &u8| u64::from(*k));
    for i in 0..40u8 {
        m.set(i, payload.clone()).unwrap();
    }
    assert_eq!(Rc::strong_count(&payload), 41);
    m.delete(&5).unwrap();
    assert_eq!(Rc::strong_count(&payload), 40);
    drop(m);
    assert_eq!(Rc::strong_count(&payload), 1);
}

// Test: custom comparator.
// Assumes: comparator returns Equal for matches only.
// Verifies: get_by/delete_by use it; the hash still selects the slot.
#[test]
fn comparator_driven_lookup() {
    #[derive(Debug)]
    struct Rec {
        id: u32,
        tag: &'static str,
    }
    let hasher = |r: &Rec| u64::from(r.id);
    assert_eq!(hasher.hash_key(&Rec { id: 3, tag: "" }), 3);

    let mut m = ChainedHashMap::with_hasher(hasher);
    m.set(Rec { id: 1, tag: "one" }, 10).unwrap();
    m.set(Rec { id: 17, tag: "seventeen" }, 170).unwrap();

    let by_id = |a: &Rec, b: &Rec| a.id.cmp(&b.id);
    let probe = Rec { id: 17, tag: "ignored" };
    assert_eq!(m.get_by(&probe, by_id), Ok(&170));
    m.delete_by(&probe, by_id).unwrap();
    assert_eq!(m.get_by(&probe, by_id), Err(Error::NotFound));
    assert_eq!(m.get_by(&Rec { id: 1, tag: "x" }, by_id), Ok(&10));
    assert_eq!(m.len(), 1);
    let tags: Vec<&str> = m.iter().map(|(k, _)| k.tag).collect();
    assert_eq!(tags, vec!["one"]);
}

// Test: early stop.
// Verifies: Break ends traversal after the current visit.
#[test]
fn foreach_break_stops_traversal() {
    let mut m = ChainedHashMap::new();
    for i in 0..30u32 {
        m.set(i, ()).unwrap();
    }
    let calls = Cell::new(0);
    let flow = m.foreach(|_, _| {
        calls.set(calls.get() + 1);
        if calls.get() == 7 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });
    assert!(flow.is_break());
    assert_eq!(calls.get(), 7);
}
