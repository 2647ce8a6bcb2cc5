#![cfg(test)]

// Property tests for HashTable kept inside the crate so they can share the
// drop-counting payloads from `test_support`.

use crate::bucket_hasher::BucketHasher;
use crate::chain_table::{BorrowingTable, HashTable, OwningTable};
use crate::error::TableError;
use crate::ownership::Ownership;
use crate::test_support::{DropLog, Tracked};
use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};

type Collide = fn(&String, usize) -> usize;

// Every key lands in bucket 0: one chain holds the whole table.
fn collide(_: &String, _: usize) -> usize {
    0
}

// Pool-indexed operations so that shrinking converges on few, early keys.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, i32),
    Replace(usize, i32),
    Delete(usize),
    Find(usize),
    Contains(String),
    Clear,
    Process,
}

fn arb_scenario() -> impl Strategy<Value = (usize, Vec<String>, Vec<Op>)> {
    (0usize..=6, proptest::collection::vec("[a-z]{0,4}", 1..=8)).prop_flat_map(
        |(buckets, pool)| {
            let idxs: Vec<usize> = (0..pool.len()).collect();
            let idx = proptest::sample::select(idxs);
            let op = prop_oneof![
                4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
                2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Replace(i, v)),
                2 => idx.clone().prop_map(Op::Delete),
                2 => idx.clone().prop_map(Op::Find),
                1 => "[a-z]{0,4}".prop_map(Op::Contains),
                1 => Just(Op::Clear),
                1 => Just(Op::Process),
            ];
            proptest::collection::vec(op, 1..80)
                .prop_map(move |ops| (buckets, pool.clone(), ops))
        },
    )
}

// Count parity with the model, and the count equals the summed chain lengths.
fn check_shape<V, O, H, M>(
    sut: &HashTable<String, V, O, H>,
    model: &HashMap<String, M>,
) -> Result<(), TestCaseError>
where
    O: Ownership,
{
    prop_assert_eq!(sut.len(), model.len());
    prop_assert_eq!(sut.is_empty(), model.is_empty());
    let chained: usize = (0..sut.bucket_count())
        .filter_map(|b| sut.chain_len(b))
        .sum();
    prop_assert_eq!(chained, sut.len());
    Ok(())
}

// Borrowing table against std::collections::HashMap:
// - duplicates and zero-bucket tables reject inserts and hand the pair back;
// - replace/delete return exactly the payloads the model holds;
// - clear returns every pair once; process visits every pair once.
fn run_borrowing<H>(
    mut sut: BorrowingTable<String, i32, H>,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError>
where
    H: BucketHasher<String>,
{
    let has_buckets = sut.bucket_count() > 0;
    let mut model: HashMap<String, i32> = HashMap::new();

    for op in ops {
        match op {
            Op::Insert(i, v) => {
                let k = pool[i].clone();
                match sut.insert(k.clone(), v) {
                    Ok(()) => {
                        prop_assert!(!model.contains_key(&k), "insert must fail on duplicate");
                        model.insert(k, v);
                    }
                    Err(r) => {
                        let (err, (kk, vv)) = r.into_parts();
                        prop_assert_eq!(&kk, &k);
                        prop_assert_eq!(vv, v);
                        if has_buckets {
                            prop_assert_eq!(err, TableError::DuplicateKey);
                            prop_assert!(model.contains_key(&k));
                        } else {
                            prop_assert_eq!(err, TableError::NoBuckets);
                        }
                    }
                }
            }
            Op::Replace(i, v) => {
                let k = &pool[i];
                match sut.replace(k, v) {
                    Ok(old) => {
                        let prev = model.insert(k.clone(), v);
                        prop_assert_eq!(Some(old), prev);
                    }
                    Err(r) => {
                        prop_assert!(!model.contains_key(k));
                        prop_assert_eq!(r.payload, v);
                    }
                }
            }
            Op::Delete(i) => {
                let k = &pool[i];
                match sut.delete(k) {
                    Ok((kk, vv)) => {
                        prop_assert_eq!(&kk, k);
                        prop_assert_eq!(model.remove(k), Some(vv));
                    }
                    Err(e) => {
                        prop_assert!(!model.contains_key(k));
                        prop_assert!(matches!(e, TableError::NotFound | TableError::NoBuckets));
                    }
                }
            }
            Op::Find(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.find(k), model.get(k));
            }
            Op::Contains(s) => {
                prop_assert_eq!(sut.contains_key(&s), model.contains_key(&s));
            }
            Op::Clear => {
                let mut back = sut.clear();
                let mut expected: Vec<(String, i32)> = model.drain().collect();
                back.sort();
                expected.sort();
                prop_assert_eq!(back, expected);
            }
            Op::Process => {
                let mut seen: BTreeMap<String, i32> = BTreeMap::new();
                let mut visits = 0usize;
                sut.process(|k, v| {
                    visits += 1;
                    seen.insert(k.clone(), *v);
                });
                prop_assert_eq!(visits, model.len());
                let expected: BTreeMap<String, i32> =
                    model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(seen, expected);
            }
        }
        check_shape(&sut, &model)?;
    }
    Ok(())
}

// Owning table: every value that leaves the table (overwritten, deleted,
// cleared) is destroyed exactly once, and nothing else is.
fn run_owning<H>(
    mut sut: OwningTable<String, Tracked, H>,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError>
where
    H: BucketHasher<String>,
{
    let log = DropLog::default();
    let mut model: HashMap<String, String> = HashMap::new();
    let mut departed = 0usize;
    let mut seq = 0usize;
    let mut fresh = |v: i32| {
        seq += 1;
        let name = format!("v{seq}:{v}");
        (log.track(&name), name)
    };

    for op in ops {
        match op {
            Op::Insert(i, v) => {
                let k = pool[i].clone();
                let (value, name) = fresh(v);
                match sut.insert(k.clone(), value) {
                    Ok(()) => {
                        model.insert(k, name);
                    }
                    Err(r) => {
                        // The rejected value is ours again; dropping it here counts.
                        drop(r);
                        departed += 1;
                    }
                }
            }
            Op::Replace(i, v) => {
                let k = &pool[i];
                let (value, name) = fresh(v);
                match sut.replace(k, value) {
                    Ok(()) => {
                        prop_assert!(model.insert(k.clone(), name).is_some());
                        departed += 1;
                    }
                    Err(r) => {
                        prop_assert!(!model.contains_key(k));
                        drop(r);
                        departed += 1;
                    }
                }
            }
            Op::Delete(i) => {
                let k = &pool[i];
                match sut.delete(k) {
                    Ok(((), ())) => {
                        let name = model.remove(k);
                        prop_assert!(name.is_some());
                        if let Some(name) = name {
                            prop_assert_eq!(log.drops_of(&name), 1);
                        }
                        departed += 1;
                    }
                    Err(_) => prop_assert!(!model.contains_key(k)),
                }
            }
            Op::Find(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.find(k).map(|t| t.name()), model.get(k).map(String::as_str));
            }
            Op::Contains(s) => {
                prop_assert_eq!(sut.contains_key(&s), model.contains_key(&s));
            }
            Op::Clear => {
                let released = sut.clear();
                prop_assert_eq!(released.len(), model.len());
                departed += model.len();
                model.clear();
            }
            Op::Process => {
                let mut visits = 0usize;
                sut.process(|k, v| {
                    visits += 1;
                    assert_eq!(model.get(k).map(String::as_str), Some(v.name()));
                });
                prop_assert_eq!(visits, model.len());
            }
        }
        prop_assert_eq!(log.total(), departed);
        check_shape(&sut, &model)?;
    }

    let remaining = sut.len();
    drop(sut);
    prop_assert_eq!(log.total(), departed + remaining);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_borrowing_state_machine((buckets, pool, ops) in arb_scenario()) {
        let sut: BorrowingTable<String, i32> = HashTable::new(buckets).unwrap();
        run_borrowing(sut, &pool, ops)?;
    }

    // Same invariants with every key colliding into one chain.
    #[test]
    fn prop_borrowing_state_machine_with_collisions((buckets, pool, ops) in arb_scenario()) {
        let sut = BorrowingTable::<String, i32, Collide>::with_hasher(buckets, collide).unwrap();
        run_borrowing(sut, &pool, ops)?;
    }

    #[test]
    fn prop_owning_destroys_each_departure_once((buckets, pool, ops) in arb_scenario()) {
        let sut: OwningTable<String, Tracked> = HashTable::new(buckets).unwrap();
        run_owning(sut, &pool, ops)?;
    }

    #[test]
    fn prop_owning_destroys_each_departure_once_with_collisions((buckets, pool, ops) in arb_scenario()) {
        let sut = OwningTable::<String, Tracked, Collide>::with_hasher(buckets, collide).unwrap();
        run_owning(sut, &pool, ops)?;
    }
}
