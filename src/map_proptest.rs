#![cfg(test)]

// Property tests for ShiftMap kept inside the crate so they can check the
// internal probe invariant after every operation.

use crate::hash::{KeyHash, MixHasher};
use crate::map::ShiftMap;
use crate::scan::Scan;
use hashbrown::HashMap;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::BTreeSet;

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, i32),
    Overwrite(usize, i32),
    Remove(usize),
    Get(usize),
    Reserve(usize),
    Compact,
    ScanDeleteOdd,
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<Vec<u8>>, Vec<Op>)> {
    proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..6), 1..=40)
        .prop_flat_map(|pool| {
            let idx = 0..pool.len();
            let op = prop_oneof![
                8 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
                2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Overwrite(i, v)),
                5 => idx.clone().prop_map(Op::Remove),
                3 => idx.prop_map(Op::Get),
                1 => (0usize..80).prop_map(Op::Reserve),
                1 => Just(Op::Compact),
                1 => Just(Op::ScanDeleteOdd),
                1 => Just(Op::Clear),
            ];
            proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
        })
}

/// State-machine equivalence against a `hashbrown::HashMap` model.
/// Invariants checked after each op:
/// - probe invariant, load limit and slot/entry correspondence;
/// - `len` parity and key-set parity with the model;
/// - insert never overwrites, remove hands back the model's value;
/// - scan-delete removes exactly the odd values.
fn run<H: KeyHash>(hasher: H, pool: &[Vec<u8>], ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut sut: ShiftMap<i32, H> = ShiftMap::with_hasher(hasher);
    let mut model: HashMap<Vec<u8>, i32> = HashMap::new();

    for op in ops {
        match op {
            Op::Insert(i, v) => {
                let k = &pool[i];
                let got = *sut.insert_with(k, || v).unwrap();
                let expected = *model.entry(k.clone()).or_insert(v);
                prop_assert_eq!(got, expected);
            }
            Op::Overwrite(i, v) => {
                let k = &pool[i];
                match sut.get_mut(k).unwrap() {
                    Some(cell) => {
                        *cell = v;
                        prop_assert!(model.insert(k.clone(), v).is_some());
                    }
                    None => prop_assert!(!model.contains_key(k)),
                }
            }
            Op::Remove(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.remove(k).unwrap(), model.remove(k));
                prop_assert_eq!(sut.get(k).unwrap(), None);
            }
            Op::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k).unwrap(), model.get(k));
                prop_assert_eq!(sut.contains_key(k).unwrap(), model.contains_key(k));
            }
            Op::Reserve(n) => {
                sut.reserve(n).unwrap();
                if n.max(model.len()) > 0 {
                    prop_assert!(sut.load_limit() >= n.max(model.len()));
                } else {
                    prop_assert_eq!(sut.capacity(), 0);
                }
            }
            Op::Compact => {
                let before = sut.capacity();
                sut.compact().unwrap();
                prop_assert!(sut.capacity() <= before);
            }
            Op::ScanDeleteOdd => {
                let mut visited = 0;
                let flow = sut.scan(|_, v| {
                    visited += 1;
                    if *v % 2 != 0 {
                        Scan::<()>::Delete
                    } else {
                        Scan::Continue
                    }
                });
                prop_assert!(flow.is_continue());
                prop_assert_eq!(visited, model.len());
                model.retain(|_, v| *v % 2 == 0);
            }
            Op::Clear => {
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.capacity(), 0);
            }
        }

        sut.assert_invariants();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        let s_keys: BTreeSet<Vec<u8>> = sut.iter().map(|(k, _)| k.to_vec()).collect();
        let m_keys: BTreeSet<Vec<u8>> = model.keys().cloned().collect();
        prop_assert_eq!(s_keys, m_keys);
    }

    for (k, v) in &model {
        prop_assert_eq!(sut.get(k).unwrap(), Some(v));
    }
    Ok(())
}

// Every key probes from the same bucket.
#[derive(Clone, Copy, Default)]
struct ConstHash;
impl KeyHash for ConstHash {
    fn hash_key(&self, _bytes: &[u8], _seed: u64) -> u64 {
        0
    }
}

// Four home buckets at the very end of the table, so clusters in a 16-slot
// table wrap around to the front.
#[derive(Clone, Copy, Default)]
struct TailHash;
impl KeyHash for TailHash {
    fn hash_key(&self, bytes: &[u8], _seed: u64) -> u64 {
        let b = bytes.first().copied().unwrap_or(0) as u64;
        u64::MAX - (b & 3)
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run(MixHasher, &pool, ops)?;
    }

    // Same invariants under worst-case collisions.
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run(ConstHash, &pool, ops)?;
    }

    // Same invariants with clusters that wrap the end of the table.
    #[test]
    fn prop_state_machine_with_wraparound((pool, ops) in arb_scenario()) {
        run(TailHash, &pool, ops)?;
    }
}
