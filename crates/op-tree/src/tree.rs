//! The operation tree: an order-statistic red-black tree of pending
//! positional edits, ordered by effective key.
//!
//! All node links are indices into an arena owned by the tree; index 0 is
//! the sentinel and the setter helpers discard writes through it, so the
//! descent and fix-up code can assign blindly. Keys are maintained lazily:
//! a node's true key is its stored `key` plus every unpushed `shift` on
//! its root path, and each traversal pushes shifts down before observing
//! a key ("push before you observe or restructure").

use crate::error::TreeError;
use crate::node::{OpNode, NIL};
use crate::op::{self, Fused, Incoming, OpKind, OpSlot};

/// Result of a point lookup.
#[derive(Debug, PartialEq, Eq)]
pub enum Lookup<'a, T> {
    /// The element visible at this index comes from a pending operation.
    Pending(&'a T),
    /// The index reads through to this committed-array position.
    Committed(i64),
}

pub struct OpTree<T> {
    arena: Vec<OpNode<T>>,
    free: Vec<u32>,
    pub(crate) root: u32,
    count: usize,
}

pub(crate) enum FuseStep<T> {
    Fused(i64),
    Rejected(Incoming<T>),
}

impl<T> OpTree<T> {
    pub fn new() -> Self {
        Self {
            arena: vec![OpNode::sentinel()],
            free: Vec::new(),
            root: NIL,
            count: 0,
        }
    }

    /// Records an insertion of `value` at current index `key`.
    pub fn apply_insert(&mut self, key: i64, value: T) -> Result<(), TreeError> {
        self.record(key, Incoming::Insert(value))
    }

    /// Records an overwrite of the element at current index `key`.
    pub fn apply_set(&mut self, key: i64, value: T) -> Result<(), TreeError> {
        self.record(key, Incoming::Set(value))
    }

    /// Records a removal of the element at current index `key`.
    pub fn apply_remove(&mut self, key: i64) -> Result<(), TreeError> {
        self.record(key, Incoming::Remove { count: 1 })
    }

    /// Point lookup at current index `key`.
    ///
    /// Pushes lazy shifts down along the descent path; this mutation is
    /// part of the lazy-evaluation contract and does not change what any
    /// subsequent operation observes.
    pub fn find(&mut self, key: i64) -> Lookup<'_, T> {
        let mut acc = 0i64;
        let mut c = self.root;
        while c != NIL {
            self.push_down(c);
            let ck = self.node(c).key;
            if key < ck {
                c = self.l(c);
                continue;
            }
            acc += self.node(self.l(c)).balance + self.node(c).weight();
            if key == ck {
                return match self.node(c).slot.as_ref().expect("live node carries operations") {
                    OpSlot::RemoveSet { value, .. } => Lookup::Pending(value),
                    OpSlot::Insert(v) | OpSlot::Set(v) => Lookup::Pending(v),
                    OpSlot::Remove { .. } => Lookup::Committed(key - acc),
                };
            }
            c = self.r(c);
        }
        Lookup::Committed(key - acc)
    }

    /// Net change in sequence length across all pending operations.
    pub fn net_index_balance(&self) -> i64 {
        self.node(self.root).balance
    }

    pub fn node_count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Upper bound on the tree height: `⌊2·log₂(nodes+1)⌋`.
    pub fn height_bound(&self) -> usize {
        (2.0 * ((self.count + 1) as f64).log2()).floor() as usize
    }

    /// Drops every pending operation and resets the arena.
    pub fn clear(&mut self) {
        self.arena.truncate(1);
        self.free.clear();
        self.root = NIL;
        self.count = 0;
    }

    // --- edit path ---

    fn record(&mut self, key: i64, mut incoming: Incoming<T>) -> Result<(), TreeError> {
        let w = incoming.weight();
        let is_remove = incoming.kind() == OpKind::Remove;
        if self.root == NIL {
            let n = self.alloc(key, incoming.into_slot());
            self.arena[n as usize].black = true;
            self.arena[n as usize].balance = w;
            self.root = n;
            return Ok(());
        }
        let mut c = self.root;
        let touched = loop {
            self.push_down(c);
            let ck = self.node(c).key;
            if key > ck {
                let r = self.r(c);
                if r == NIL {
                    break self.attach(c, false, key, incoming, w)?;
                }
                c = r;
            } else if key == ck {
                self.add_shift(self.r(c), w);
                match self.fuse_at(c, incoming)? {
                    FuseStep::Fused(delta) => {
                        self.propagate_balance(c, delta);
                        if self.node(c).slot.is_none() {
                            self.delete_node(c)?;
                            break NIL;
                        }
                        break c;
                    }
                    FuseStep::Rejected(back) => {
                        // The insert lands in front of this node, which
                        // therefore shifts right along with its right
                        // subtree. Every key in the left subtree is
                        // smaller, so the descent bottoms out at its
                        // rightmost slot.
                        incoming = back;
                        self.bump_key(c, w);
                        let l = self.l(c);
                        if l == NIL {
                            break self.attach(c, true, key, incoming, w)?;
                        }
                        c = l;
                    }
                }
            } else {
                self.bump_key(c, w);
                self.add_shift(self.r(c), w);
                let l = self.l(c);
                if l == NIL {
                    break self.attach(c, true, key, incoming, w)?;
                }
                c = l;
            }
        };
        if is_remove && touched != NIL {
            self.merge_duplicate(touched, key)?;
        }
        Ok(())
    }

    fn attach(
        &mut self,
        parent: u32,
        to_left: bool,
        key: i64,
        incoming: Incoming<T>,
        w: i64,
    ) -> Result<u32, TreeError> {
        let n = self.alloc(key, incoming.into_slot());
        if to_left {
            self.set_l(parent, n);
        } else {
            self.set_r(parent, n);
        }
        self.set_p(n, parent);
        self.propagate_balance(n, w);
        self.fix_insert(n)?;
        Ok(n)
    }

    fn fuse_at(&mut self, n: u32, incoming: Incoming<T>) -> Result<FuseStep<T>, TreeError> {
        let slot = self.take_slot(n).expect("live node carries operations");
        let before = slot.weight();
        Ok(match op::fuse(slot, incoming)? {
            Fused::Slot(slot) => {
                let after = slot.weight();
                self.put_slot(n, slot);
                FuseStep::Fused(after - before)
            }
            Fused::Cleared => FuseStep::Fused(-before),
            Fused::Rejected { slot, incoming } => {
                self.put_slot(n, slot);
                FuseStep::Rejected(incoming)
            }
        })
    }

    /// A Remove pulls every later key one step left, which can land the
    /// in-order successor on the key just edited. The successor's
    /// operations are then replayed into this node and the successor is
    /// deleted.
    fn merge_duplicate(&mut self, n: u32, key: i64) -> Result<(), TreeError> {
        let s = self.scan_next(n);
        if s == NIL {
            return Ok(());
        }
        if self.node(s).shift != 0 {
            return Err(TreeError::StaleShiftInScan(s));
        }
        if self.node(s).key != key {
            return Ok(());
        }
        let slot = self.take_slot(s).expect("live node carries operations");
        let absorbed = slot.weight();
        self.propagate_balance(s, -absorbed);
        let (primary, piggyback) = slot.into_replay();
        self.replay(n, primary)?;
        if let Some(set) = piggyback {
            self.replay(n, set)?;
        }
        self.delete_node(s)
    }

    fn replay(&mut self, n: u32, incoming: Incoming<T>) -> Result<(), TreeError> {
        match self.fuse_at(n, incoming)? {
            FuseStep::Fused(delta) => {
                if self.node(n).slot.is_none() {
                    return Err(TreeError::BadFusion("absorption emptied the slot"));
                }
                self.propagate_balance(n, delta);
                Ok(())
            }
            FuseStep::Rejected(_) => Err(TreeError::BadFusion("unfusable colocated operations")),
        }
    }

    // --- traversal ---

    /// Leftmost node, pushing shifts down along the way.
    pub(crate) fn scan_first(&mut self) -> u32 {
        let mut c = self.root;
        if c == NIL {
            return NIL;
        }
        self.push_down(c);
        loop {
            let l = self.l(c);
            if l == NIL {
                return c;
            }
            c = l;
            self.push_down(c);
        }
    }

    /// Leftmost node of the subtree at `from`, pushing shifts down along
    /// the way.
    pub(crate) fn scan_min(&mut self, from: u32) -> u32 {
        let mut c = from;
        self.push_down(c);
        loop {
            let l = self.l(c);
            if l == NIL {
                return c;
            }
            c = l;
            self.push_down(c);
        }
    }

    /// In-order successor of `n`, pushing shifts down at every node
    /// entered so that its stored key is its effective key.
    pub(crate) fn scan_next(&mut self, n: u32) -> u32 {
        self.push_down(n);
        let r = self.r(n);
        if r != NIL {
            return self.scan_min(r);
        }
        let mut c = n;
        let mut p = self.p(c);
        while p != NIL && self.r(p) == c {
            c = p;
            p = self.p(p);
        }
        p
    }

    // --- arena plumbing ---

    fn alloc(&mut self, key: i64, slot: OpSlot<T>) -> u32 {
        let node = OpNode::new(key, slot);
        self.count += 1;
        match self.free.pop() {
            Some(i) => {
                self.arena[i as usize] = node;
                i
            }
            None => {
                self.arena.push(node);
                (self.arena.len() - 1) as u32
            }
        }
    }

    pub(crate) fn free_node(&mut self, n: u32) {
        self.arena[n as usize] = OpNode::sentinel();
        self.free.push(n);
        self.count -= 1;
    }

    #[inline]
    pub(crate) fn node(&self, n: u32) -> &OpNode<T> {
        &self.arena[n as usize]
    }

    #[inline]
    pub(crate) fn l(&self, n: u32) -> u32 {
        self.arena[n as usize].l
    }

    #[inline]
    pub(crate) fn r(&self, n: u32) -> u32 {
        self.arena[n as usize].r
    }

    #[inline]
    pub(crate) fn p(&self, n: u32) -> u32 {
        self.arena[n as usize].p
    }

    #[inline]
    pub(crate) fn is_black(&self, n: u32) -> bool {
        self.arena[n as usize].black
    }

    #[inline]
    pub(crate) fn set_l(&mut self, n: u32, v: u32) {
        if n != NIL {
            self.arena[n as usize].l = v;
        }
    }

    #[inline]
    pub(crate) fn set_r(&mut self, n: u32, v: u32) {
        if n != NIL {
            self.arena[n as usize].r = v;
        }
    }

    #[inline]
    pub(crate) fn set_p(&mut self, n: u32, v: u32) {
        if n != NIL {
            self.arena[n as usize].p = v;
        }
    }

    #[inline]
    pub(crate) fn set_black(&mut self, n: u32, black: bool) {
        if n != NIL {
            self.arena[n as usize].black = black;
        }
    }

    #[inline]
    pub(crate) fn set_balance(&mut self, n: u32, v: i64) {
        if n != NIL {
            self.arena[n as usize].balance = v;
        }
    }

    #[inline]
    pub(crate) fn add_shift(&mut self, n: u32, d: i64) {
        if n != NIL {
            self.arena[n as usize].shift += d;
        }
    }

    #[inline]
    fn bump_key(&mut self, n: u32, d: i64) {
        if n != NIL {
            self.arena[n as usize].key += d;
        }
    }

    #[inline]
    pub(crate) fn set_key(&mut self, n: u32, key: i64) {
        if n != NIL {
            self.arena[n as usize].key = key;
        }
    }

    #[inline]
    pub(crate) fn take_slot(&mut self, n: u32) -> Option<OpSlot<T>> {
        if n == NIL {
            return None;
        }
        self.arena[n as usize].slot.take()
    }

    #[inline]
    pub(crate) fn set_slot(&mut self, n: u32, slot: Option<OpSlot<T>>) {
        if n != NIL {
            self.arena[n as usize].slot = slot;
        }
    }

    #[inline]
    fn put_slot(&mut self, n: u32, slot: OpSlot<T>) {
        if n != NIL {
            self.arena[n as usize].slot = Some(slot);
        }
    }

    /// Adds the node's lazy shift into its key and hands it to both
    /// children. Idempotent; a no-op on the sentinel.
    pub(crate) fn push_down(&mut self, n: u32) {
        if n == NIL {
            return;
        }
        let s = self.arena[n as usize].shift;
        if s == 0 {
            return;
        }
        let (l, r) = {
            let node = &mut self.arena[n as usize];
            node.key += s;
            node.shift = 0;
            (node.l, node.r)
        };
        self.add_shift(l, s);
        self.add_shift(r, s);
    }

    /// Applies `delta` to the subtree balance of `from` and every
    /// ancestor.
    pub(crate) fn propagate_balance(&mut self, from: u32, delta: i64) {
        if delta == 0 {
            return;
        }
        let mut n = from;
        while n != NIL {
            self.arena[n as usize].balance += delta;
            n = self.p(n);
        }
    }
}

impl<T> Default for OpTree<T> {
    fn default() -> Self {
        Self::new()
    }
}
