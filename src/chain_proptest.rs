#![cfg(test)]

// Property tests for Chain against a Vec model.

use crate::chain::{Chain, Position};
use core::ops::ControlFlow;
use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Debug)]
enum Op {
    Insert(usize, u16),
    Append(u16),
    Prepend(u16),
    Delete(usize),
    Remove(usize),
    Set(usize, u16),
    Find(u16),
    StopAfter(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    // Small value range so `Find` hits existing elements often.
    let idx = 0usize..12;
    let val = 0u16..8;
    prop_oneof![
        (idx.clone(), val.clone()).prop_map(|(i, v)| Op::Insert(i, v)),
        val.clone().prop_map(Op::Append),
        val.clone().prop_map(Op::Prepend),
        idx.clone().prop_map(Op::Delete),
        idx.clone().prop_map(Op::Remove),
        (idx.clone(), val.clone()).prop_map(|(i, v)| Op::Set(i, v)),
        val.prop_map(Op::Find),
        idx.prop_map(Op::StopAfter),
    ]
}

// Property: Chain behaves like a Vec under positional edits.
// - Insert positions at or past the end append.
// - Out-of-range delete/remove/set fail and leave contents intact.
// - Only `delete_at` and the final drop reach the destructor; every element
//   inserted reaches exactly one of: destructor, `remove_at`/`set` return.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_chain_matches_vec(ops in proptest::collection::vec(arb_op(), 1..80)) {
        let destroyed = Rc::new(RefCell::new(Vec::new()));
        let sink = destroyed.clone();
        let mut sut: Chain<u16> = Chain::with_destructor(move |x: u16| sink.borrow_mut().push(x));
        let mut model: Vec<u16> = Vec::new();
        let mut expected_destroyed: Vec<u16> = Vec::new();

        for op in ops {
            match op {
                Op::Insert(i, v) => {
                    sut.insert_at(Position::Index(i), v);
                    model.insert(i.min(model.len()), v);
                }
                Op::Append(v) => {
                    sut.append(v);
                    model.push(v);
                }
                Op::Prepend(v) => {
                    sut.prepend(v);
                    model.insert(0, v);
                }
                Op::Delete(i) => {
                    let res = sut.delete_at(i);
                    prop_assert_eq!(res.is_ok(), i < model.len());
                    if i < model.len() {
                        expected_destroyed.push(model.remove(i));
                    }
                }
                Op::Remove(i) => {
                    let res = sut.remove_at(i);
                    if i < model.len() {
                        prop_assert_eq!(res, Ok(model.remove(i)));
                    } else {
                        prop_assert!(res.is_err());
                    }
                }
                Op::Set(i, v) => {
                    let res = sut.set(i, v);
                    if i < model.len() {
                        let old = core::mem::replace(&mut model[i], v);
                        prop_assert_eq!(res, Ok(old));
                    } else {
                        prop_assert!(res.is_err());
                    }
                }
                Op::Find(v) => {
                    let want = model.iter().position(|x| *x == v);
                    prop_assert_eq!(sut.find(|x| x.cmp(&v)), want);
                    prop_assert_eq!(sut.find_data(|x| x.cmp(&v)).map(|(i, d)| (i, *d)), want.map(|i| (i, v)));
                }
                Op::StopAfter(n) => {
                    let mut visited = 0usize;
                    let flow = sut.foreach(|i, _| {
                        visited += 1;
                        if i == n { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
                    });
                    prop_assert_eq!(flow.is_break(), n < model.len());
                    prop_assert_eq!(visited, model.len().min(n + 1));
                }
            }

            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.iter().copied().collect::<Vec<_>>(), model.clone());
            prop_assert_eq!(&*destroyed.borrow(), &expected_destroyed);
        }

        drop(sut);
        expected_destroyed.extend(model);
        prop_assert_eq!(&*destroyed.borrow(), &expected_destroyed);
    }
}
