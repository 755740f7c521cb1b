//! Seed-reproducible property checks: every structural invariant is
//! re-derived after each random edit.

use deferred_list_util::Fuzzer;
use op_tree::{DrainOp, OpTree};

const SEED: [u8; 32] = [0x5e; 32];

/// Committed length the virtual sequence starts from after each clear.
const COMMITTED: i64 = 256;

#[test]
fn random_edit_streams_keep_every_invariant() {
    let fuzzer = Fuzzer::new(Some(SEED));
    let mut tree: OpTree<i64> = OpTree::new();
    let mut len: i64 = COMMITTED;
    for step in 0..20_000i64 {
        match fuzzer.random_int(0, 2) {
            0 => {
                let k = fuzzer.random_int(0, len);
                tree.apply_insert(k, step).unwrap();
                len += 1;
            }
            1 if len > 0 => {
                let k = fuzzer.random_int(0, len - 1);
                tree.apply_set(k, -step).unwrap();
            }
            2 if len > 0 => {
                let k = fuzzer.random_int(0, len - 1);
                tree.apply_remove(k).unwrap();
                len -= 1;
            }
            _ => continue,
        }
        if let Err(e) = tree.validate() {
            panic!("step {step}: {e}\n{}", tree.print());
        }
        assert_eq!(tree.net_index_balance(), len - COMMITTED, "step {step}");
        if fuzzer.random_bool(0.002) {
            tree.clear();
            tree.validate().unwrap();
            len = COMMITTED;
        }
    }
}

#[test]
fn drained_stream_is_sorted_paired_and_terminated() {
    let fuzzer = Fuzzer::new(Some(SEED));
    let mut tree: OpTree<i64> = OpTree::new();
    let mut len: i64 = COMMITTED;
    for step in 0..2_000i64 {
        match fuzzer.random_int(0, 2) {
            0 => {
                let k = fuzzer.random_int(0, len);
                tree.apply_insert(k, step).unwrap();
                len += 1;
            }
            1 if len > 0 => {
                let k = fuzzer.random_int(0, len - 1);
                tree.apply_set(k, step).unwrap();
            }
            2 if len > 0 => {
                let k = fuzzer.random_int(0, len - 1);
                tree.apply_remove(k).unwrap();
                len -= 1;
            }
            _ => continue,
        }
        let ops: Vec<_> = tree.drain(COMMITTED).collect();
        let end = ops.last().expect("stream is never empty");
        assert_eq!(end, &DrainOp::End { key: COMMITTED + tree.net_index_balance() });
        let mut prev: Option<&DrainOp<i64>> = None;
        for op in &ops[..ops.len() - 1] {
            if let Some(prev) = prev {
                match (prev, op) {
                    // a Remove/Set pair shares one key, Remove first
                    (DrainOp::Remove { key: a, .. }, DrainOp::Set { key: b, .. }) if a == b => {}
                    _ => assert!(prev.key() < op.key(), "stream out of order at {op:?}"),
                }
            }
            prev = Some(op);
        }
    }
}

#[test]
fn measured_height_stays_within_the_stored_bound() {
    let mut tree: OpTree<i64> = OpTree::new();
    for i in 0..4_096i64 {
        tree.apply_insert(i, i).unwrap();
    }
    tree.validate().unwrap();
    assert_eq!(tree.node_count(), 4_096);
    assert_eq!(tree.height_bound(), 24);
}
