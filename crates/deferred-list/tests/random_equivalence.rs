//! Randomized equivalence harness: every edit is mirrored into a naive
//! `Vec` reference, with point checks per step and full-array checks
//! around every settle. The seed is fixed so failures replay.

use deferred_list::DeferredList;
use deferred_list_util::Fuzzer;

const SEED: [u8; 32] = [0xa7; 32];
const STEPS: usize = 100_000;

fn run(auto_settle: Option<usize>) {
    let fuzzer = Fuzzer::new(Some(SEED));
    let mut reference: Vec<i64> = (0..8).collect();
    let mut list = DeferredList::from_vec(reference.clone());
    if let Some(height) = auto_settle {
        list = list.with_auto_settle(height);
    }
    for step in 0..STEPS {
        let value = step as i64;
        let len = reference.len();
        let roll = if len < 4 {
            0
        } else if len > 2048 {
            2
        } else {
            fuzzer.random_int(0, 2)
        };
        match roll {
            0 => {
                let k = fuzzer.random_index(len + 1);
                reference.insert(k, value);
                list.insert(k, value).unwrap();
            }
            1 => {
                let k = fuzzer.random_index(len);
                reference[k] = value;
                list.set(k, value).unwrap();
            }
            _ => {
                let k = fuzzer.random_index(len);
                reference.remove(k);
                list.remove(k).unwrap();
            }
        }
        assert_eq!(list.len(), reference.len(), "step {step}");
        let probe = fuzzer.random_index(reference.len());
        assert_eq!(*list.get(probe).unwrap(), reference[probe], "step {step}");
        if fuzzer.random_bool(0.005) {
            for i in 0..reference.len() {
                assert_eq!(*list.get(i).unwrap(), reference[i], "pre-settle, step {step}");
            }
            list.settle();
            assert_eq!(list.to_vec(), reference, "post-settle, step {step}");
        }
    }
    list.settle();
    assert_eq!(list.to_vec(), reference);
}

#[test]
fn random_edits_match_a_naive_reference() {
    run(None);
}

#[test]
fn random_edits_match_with_auto_settling() {
    run(Some(8));
}
