#![cfg(test)]

// Property tests for ChainedHashMap kept inside the crate so they can read
// sizing internals alongside the public API.

use crate::chained_hash_map::{ChainedHashMap, INITIAL_SLOT_COUNT};
use crate::error::Error;
use crate::hasher::{BuildKeyHasher, KeyHasher};
use core::ops::ControlFlow;
use hashbrown::HashMap;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

// Pool-indexed operations so shrinking converges on earlier keys.
#[derive(Clone, Debug)]
enum OpI {
    Set(usize, i32),
    Delete(usize),
    Get(usize),
    Mutate(usize, i32),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=24).prop_flat_map(|pool| {
        let idx = 0..pool.len();
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Set(i, v)),
            2 => idx.clone().prop_map(OpI::Delete),
            2 => idx.clone().prop_map(OpI::Get),
            1 => (idx, any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

type Log = Rc<RefCell<Vec<(String, i32)>>>;

// Model: per key, a stack of values; the top is what `get` must return.
fn run_state_machine<H>(hasher: H, pool: &[String], ops: Vec<OpI>) -> Result<(), TestCaseError>
where
    H: KeyHasher<String>,
{
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    let mut sut = ChainedHashMap::builder()
        .hasher(hasher)
        .destructor(move |k: String, v: i32| sink.borrow_mut().push((k, v)))
        .build()
        .map_err(|e| TestCaseError::fail(e.to_string()))?;
    let mut model: HashMap<String, Vec<i32>> = HashMap::new();
    let mut expected_log: Vec<(String, i32)> = Vec::new();
    let mut last_slots = sut.slot_count();

    for op in ops {
        match op {
            OpI::Set(i, v) => {
                let k = pool[i].clone();
                prop_assert!(sut.set(k.clone(), v).is_ok());
                model.entry(k).or_default().push(v);
            }
            OpI::Delete(i) => {
                let k = &pool[i];
                let res = sut.delete(k);
                match model.get_mut(k).and_then(Vec::pop) {
                    Some(v) => {
                        prop_assert_eq!(res, Ok(()));
                        expected_log.push((k.clone(), v));
                    }
                    None => prop_assert_eq!(res, Err(Error::NotFound)),
                }
            }
            OpI::Get(i) => {
                let k = &pool[i];
                let want = model.get(k).and_then(|s| s.last());
                prop_assert_eq!(sut.get(k).ok(), want);
                prop_assert_eq!(sut.contains_key(k), want.is_some());
            }
            OpI::Mutate(i, d) => {
                let k = &pool[i];
                match model.get_mut(k).and_then(|s| s.last_mut()) {
                    Some(mv) => {
                        *mv = mv.wrapping_add(d);
                        let sv = sut.get_mut(k).map_err(|e| TestCaseError::fail(e.to_string()))?;
                        *sv = sv.wrapping_add(d);
                        prop_assert_eq!(*sv, *mv);
                    }
                    None => prop_assert!(sut.get_mut(k).is_err()),
                }
            }
            OpI::Iterate => {
                let mut seen: BTreeMap<String, Vec<i32>> = BTreeMap::new();
                let flow = sut.foreach(|k, v| {
                    seen.entry(k.clone()).or_default().push(*v);
                    ControlFlow::Continue(())
                });
                prop_assert!(flow.is_continue());
                // Chains are newest first; the model stacks are oldest first.
                let want: BTreeMap<String, Vec<i32>> = model
                    .iter()
                    .filter(|(_, s)| !s.is_empty())
                    .map(|(k, s)| (k.clone(), s.iter().rev().copied().collect()))
                    .collect();
                prop_assert_eq!(seen, want);
            }
        }

        // Post-conditions after each op.
        let live: usize = model.values().map(Vec::len).sum();
        prop_assert_eq!(sut.len(), live);
        prop_assert_eq!(sut.iter().count(), live);
        prop_assert_eq!(sut.is_empty(), live == 0);
        prop_assert_eq!(&*log.borrow(), &expected_log);
        prop_assert!(sut.slot_count() >= last_slots);
        prop_assert!(sut.slot_count().is_power_of_two());
        prop_assert!(sut.slot_count() >= INITIAL_SLOT_COUNT);
        prop_assert!(sut.collision_count() < sut.resize_threshold());
        prop_assert_eq!(sut.resize_threshold(), sut.slot_count() / 4 * 3);
        last_slots = sut.slot_count();
    }

    // Teardown hands every still-live entry to the destructor once.
    drop(sut);
    for (k, stack) in model {
        expected_log.extend(stack.into_iter().map(|v| (k.clone(), v)));
    }
    let mut got = log.borrow().clone();
    got.sort();
    expected_log.sort();
    prop_assert_eq!(got, expected_log);
    Ok(())
}

// Property: state-machine equivalence against a shadow-stack model.
// - `get` returns the most recently set value that has not been deleted.
// - `delete` removes exactly that value and reports it to the destructor.
// - `foreach`/`iter` yield each live entry once, newest first per key.
// - Slot count only doubles; the threshold tracks it; collisions stay below it.
// - Dropping the table destroys exactly the remaining live entries.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_state_machine(<BuildKeyHasher>::default(), &pool, ops)?;
    }
}

// Same invariants with every key in one slot; resizes happen early and
// often, and relocation must keep shadowing order intact.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_state_machine(|_: &String| 0u64, &pool, ops)?;
    }
}

// Few distinct hash values: slots split across resizes instead of moving
// wholesale.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_narrow_hash((pool, ops) in arb_scenario()) {
        run_state_machine(|k: &String| k.bytes().map(u64::from).sum::<u64>() % 97, &pool, ops)?;
    }
}
