//! The sequence façade over a committed array and an operation tree.

use op_tree::{DrainOp, Lookup, OpTree};

use crate::commit;
use crate::error::ListError;

/// A random-access sequence that defers positional edits.
///
/// The committed state lives in a flat `Vec<T>`; inserts, sets and
/// removes are recorded in an [`OpTree`] keyed by the index the caller
/// currently observes, and merged into the array in one linear pass on
/// [`settle`](DeferredList::settle). Reads fall through the tree to the
/// committed array, so interleaved edits stay O(log n) while reads stay
/// array-like.
pub struct DeferredList<T: Clone> {
    items: Vec<T>,
    tree: OpTree<T>,
    auto_settle_height: Option<usize>,
}

impl<T: Clone> DeferredList<T> {
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_vec(Vec::with_capacity(capacity))
    }

    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            items,
            tree: OpTree::new(),
            auto_settle_height: None,
        }
    }

    /// Settles automatically whenever the tree's height bound exceeds
    /// `height`, trading settle passes for cheaper subsequent edits.
    pub fn with_auto_settle(mut self, height: usize) -> Self {
        self.auto_settle_height = Some(height);
        self
    }

    pub fn len(&self) -> usize {
        (self.items.len() as i64 + self.tree.net_index_balance()) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The element currently visible at `index`, pending edits included.
    pub fn get(&mut self, index: usize) -> Result<&T, ListError> {
        let len = self.len();
        if index >= len {
            return Err(ListError::OutOfBounds { index, len });
        }
        match self.tree.find(index as i64) {
            Lookup::Pending(value) => Ok(value),
            Lookup::Committed(i) => Ok(&self.items[i as usize]),
        }
    }

    pub fn insert(&mut self, index: usize, value: T) -> Result<(), ListError> {
        let len = self.len();
        if index > len {
            return Err(ListError::OutOfBounds { index, len });
        }
        self.tree.apply_insert(index as i64, value)?;
        self.maybe_settle();
        Ok(())
    }

    pub fn set(&mut self, index: usize, value: T) -> Result<(), ListError> {
        let len = self.len();
        if index >= len {
            return Err(ListError::OutOfBounds { index, len });
        }
        self.tree.apply_set(index as i64, value)?;
        self.maybe_settle();
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<(), ListError> {
        let len = self.len();
        if index >= len {
            return Err(ListError::OutOfBounds { index, len });
        }
        self.tree.apply_remove(index as i64)?;
        self.maybe_settle();
        Ok(())
    }

    /// Merges every pending edit into the committed array and clears the
    /// tree. Settling twice is settling once.
    pub fn settle(&mut self) {
        if self.tree.is_empty() {
            return;
        }
        let committed = self.items.len() as i64;
        commit::apply_ops(&mut self.items, self.tree.drain(committed));
        self.tree.clear();
    }

    /// Settles, then exposes the flat array; there is no stable
    /// iteration while edits are pending.
    pub fn as_slice(&mut self) -> &[T] {
        self.settle();
        &self.items
    }

    pub fn to_vec(&mut self) -> Vec<T> {
        self.settle();
        self.items.clone()
    }

    /// Capacity of the committed backing array.
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Number of pending edit nodes.
    pub fn pending_edits(&self) -> usize {
        self.tree.node_count()
    }

    /// Net length change the pending edits will apply.
    pub fn pending_balance(&self) -> i64 {
        self.tree.net_index_balance()
    }

    /// The pending operation stream, in index order.
    pub fn pending_ops(&mut self) -> Vec<DrainOp<T>> {
        self.tree.drain(self.items.len() as i64).collect()
    }

    fn maybe_settle(&mut self) {
        if let Some(limit) = self.auto_settle_height {
            if self.tree.height_bound() > limit {
                self.settle();
            }
        }
    }
}

impl<T: Clone + std::fmt::Debug> DeferredList<T> {
    pub fn dump_tree(&self) -> String {
        self.tree.print()
    }
}

impl<T: Clone> Default for DeferredList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> From<Vec<T>> for DeferredList<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}
