//! Structural validator used by the test harnesses.

use crate::node::{OpNode, NIL};
use crate::op::OpSlot;
use crate::tree::OpTree;

impl<T> OpTree<T> {
    /// Re-derives every structural invariant of the tree: red-black
    /// validity, strict effective-key ordering, the subtree balance
    /// equation, slot legality, and the stored height bound.
    ///
    /// Reads shifts along the way instead of pushing them down, so the
    /// tree is not mutated.
    pub fn validate(&self) -> Result<(), String> {
        let sentinel = self.node(NIL);
        if !sentinel.black || sentinel.shift != 0 || sentinel.balance != 0 {
            return Err("sentinel fields were written".to_string());
        }
        if self.root == NIL {
            if self.node_count() != 0 {
                return Err("empty tree with a nonzero node count".to_string());
            }
            return Ok(());
        }
        if self.p(self.root) != NIL {
            return Err("root has a parent".to_string());
        }
        if !self.is_black(self.root) {
            return Err("root is not black".to_string());
        }
        let mut keys = Vec::with_capacity(self.node_count());
        let mut seen = 0usize;
        let (_, height) = self.check_node(self.root, 0, &mut keys, &mut seen)?;
        if seen != self.node_count() {
            return Err(format!(
                "node count {} disagrees with reachable nodes {seen}",
                self.node_count()
            ));
        }
        if height > self.height_bound() + 1 {
            return Err(format!(
                "measured height {height} exceeds bound {}",
                self.height_bound()
            ));
        }
        for pair in keys.windows(2) {
            if pair[0] >= pair[1] {
                return Err(format!(
                    "effective keys not strictly increasing: {} then {}",
                    pair[0], pair[1]
                ));
            }
        }
        Ok(())
    }

    /// Returns `(black_height, height)` of the subtree at `n`.
    fn check_node(
        &self,
        n: u32,
        acc_shift: i64,
        keys: &mut Vec<i64>,
        seen: &mut usize,
    ) -> Result<(usize, usize), String> {
        if n == NIL {
            return Ok((0, 0));
        }
        *seen += 1;
        let node = self.node(n);
        let (l, r) = (node.l, node.r);
        if l != NIL && self.p(l) != n {
            return Err(format!("broken parent link on left child of {n}"));
        }
        if r != NIL && self.p(r) != n {
            return Err(format!("broken parent link on right child of {n}"));
        }
        if !node.black && (!self.is_black(l) || !self.is_black(r)) {
            return Err(format!("red node {n} has a red child"));
        }
        check_slot(n, node)?;
        let expected = node.weight() + self.node(l).balance + self.node(r).balance;
        if node.balance != expected {
            return Err(format!(
                "balance {} at node {n} should be {expected}",
                node.balance
            ));
        }
        let child_shift = acc_shift + node.shift;
        let (lbh, lh) = self.check_node(l, child_shift, keys, seen)?;
        keys.push(node.key + child_shift);
        let (rbh, rh) = self.check_node(r, child_shift, keys, seen)?;
        if lbh != rbh {
            return Err(format!("black height mismatch under node {n}"));
        }
        let bh = lbh + usize::from(node.black);
        Ok((bh, 1 + lh.max(rh)))
    }
}

fn check_slot<T>(n: u32, node: &OpNode<T>) -> Result<(), String> {
    match &node.slot {
        None => Err(format!("node {n} has an empty operation slot")),
        Some(OpSlot::Remove { count }) | Some(OpSlot::RemoveSet { count, .. }) if *count == 0 => {
            Err(format!("node {n} carries a zero-count remove"))
        }
        Some(_) => Ok(()),
    }
}
