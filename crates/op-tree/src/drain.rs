//! In-order emission of the pending operation stream.

use crate::node::NIL;
use crate::op::OpSlot;
use crate::tree::OpTree;

/// One record of the in-order operation stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DrainOp<T> {
    Insert { key: i64, value: T },
    Set { key: i64, value: T },
    Remove { key: i64, count: u32 },
    /// Terminal record; its key is the settled sequence length, so a
    /// consumer can flush the array tail uniformly.
    End { key: i64 },
}

impl<T> DrainOp<T> {
    pub fn key(&self) -> i64 {
        match self {
            DrainOp::Insert { key, .. }
            | DrainOp::Set { key, .. }
            | DrainOp::Remove { key, .. }
            | DrainOp::End { key } => *key,
        }
    }
}

/// Lazy in-order walk over the pending operations in ascending
/// effective-key order. A `RemoveSet` node emits two records at the same
/// key, Remove first. Iteration pushes lazy shifts down on first visit —
/// a benign mutation — but does not otherwise change the tree; values
/// are cloned out of the slots.
pub struct Drain<'a, T> {
    tree: &'a mut OpTree<T>,
    curr: u32,
    piggyback: bool,
    end_key: i64,
    done: bool,
}

impl<T: Clone> OpTree<T> {
    /// The operation stream against a committed array of length
    /// `committed_len`, terminated by `DrainOp::End`.
    pub fn drain(&mut self, committed_len: i64) -> Drain<'_, T> {
        let end_key = committed_len + self.net_index_balance();
        let curr = self.scan_first();
        Drain {
            tree: self,
            curr,
            piggyback: false,
            end_key,
            done: false,
        }
    }
}

impl<T: Clone> Iterator for Drain<'_, T> {
    type Item = DrainOp<T>;

    fn next(&mut self) -> Option<DrainOp<T>> {
        if self.done {
            return None;
        }
        if self.curr == NIL {
            self.done = true;
            return Some(DrainOp::End { key: self.end_key });
        }
        let n = self.curr;
        let key = self.tree.node(n).key;
        let slot = self
            .tree
            .node(n)
            .slot
            .as_ref()
            .expect("live node carries operations");
        if self.piggyback {
            self.piggyback = false;
            let record = match slot {
                OpSlot::RemoveSet { value, .. } => DrainOp::Set {
                    key,
                    value: value.clone(),
                },
                _ => unreachable!("piggyback flagged on a single-operation slot"),
            };
            self.curr = self.tree.scan_next(n);
            return Some(record);
        }
        let record = match slot {
            OpSlot::Insert(v) => DrainOp::Insert {
                key,
                value: v.clone(),
            },
            OpSlot::Set(v) => DrainOp::Set {
                key,
                value: v.clone(),
            },
            OpSlot::Remove { count } => DrainOp::Remove { key, count: *count },
            OpSlot::RemoveSet { count, .. } => {
                self.piggyback = true;
                return Some(DrainOp::Remove { key, count: *count });
            }
        };
        self.curr = self.tree.scan_next(n);
        Some(record)
    }
}
