//! Pending operations and the per-node fusion rules.

use crate::error::TreeError;

/// Kind tag for a pending edit, as supplied by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpKind {
    Insert,
    Set,
    Remove,
}

/// An edit arriving at the tree. `Remove` carries a count so that
/// duplicate-collision replay can feed collapsed runs back through the
/// same fusion path; the public edit API always records count 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Incoming<T> {
    Insert(T),
    Set(T),
    Remove { count: u32 },
}

impl<T> Incoming<T> {
    pub fn kind(&self) -> OpKind {
        match self {
            Incoming::Insert(_) => OpKind::Insert,
            Incoming::Set(_) => OpKind::Set,
            Incoming::Remove { .. } => OpKind::Remove,
        }
    }

    /// Net sequence-length contribution of this edit.
    pub fn weight(&self) -> i64 {
        match self {
            Incoming::Insert(_) => 1,
            Incoming::Set(_) => 0,
            Incoming::Remove { count } => -(*count as i64),
        }
    }

    pub(crate) fn into_slot(self) -> OpSlot<T> {
        match self {
            Incoming::Insert(v) => OpSlot::Insert(v),
            Incoming::Set(v) => OpSlot::Set(v),
            Incoming::Remove { count } => OpSlot::Remove { count },
        }
    }
}

/// The fused operation slot of a tree node.
///
/// `RemoveSet` is the only legal two-operation configuration: a Remove in
/// the primary position with a Set piggybacked on the element that
/// emerges at the same index once the removal is applied. The piggybacked
/// Set never contributes to the subtree index balance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OpSlot<T> {
    Insert(T),
    Set(T),
    Remove { count: u32 },
    RemoveSet { count: u32, value: T },
}

impl<T> OpSlot<T> {
    /// Net sequence-length contribution of the slot.
    pub fn weight(&self) -> i64 {
        match self {
            OpSlot::Insert(_) => 1,
            OpSlot::Set(_) => 0,
            OpSlot::Remove { count } | OpSlot::RemoveSet { count, .. } => -(*count as i64),
        }
    }

    /// Splits the slot into its primary edit and the piggybacked Set, in
    /// replay order.
    pub(crate) fn into_replay(self) -> (Incoming<T>, Option<Incoming<T>>) {
        match self {
            OpSlot::Insert(v) => (Incoming::Insert(v), None),
            OpSlot::Set(v) => (Incoming::Set(v), None),
            OpSlot::Remove { count } => (Incoming::Remove { count }, None),
            OpSlot::RemoveSet { count, value } => {
                (Incoming::Remove { count }, Some(Incoming::Set(value)))
            }
        }
    }
}

/// Outcome of fusing an incoming edit into an occupied slot.
pub(crate) enum Fused<T> {
    /// The slot absorbed the edit.
    Slot(OpSlot<T>),
    /// The edit cancelled the slot entirely; the node must be deleted.
    Cleared,
    /// The edit cannot share this slot (Insert only); ownership of both
    /// returns to the caller, which descends further.
    Rejected { slot: OpSlot<T>, incoming: Incoming<T> },
}

/// Fuses `incoming` into `slot`.
///
/// An Insert is rejected wherever fusing it would require a second
/// independent operation at one key; the edit path then places it in a
/// fresh node to the left. Set and Remove always fuse.
pub(crate) fn fuse<T>(slot: OpSlot<T>, incoming: Incoming<T>) -> Result<Fused<T>, TreeError> {
    Ok(match incoming {
        Incoming::Insert(v) => match slot {
            OpSlot::Remove { count: 1 } => Fused::Slot(OpSlot::Set(v)),
            OpSlot::Remove { count } => Fused::Slot(OpSlot::RemoveSet {
                count: count - 1,
                value: v,
            }),
            slot => Fused::Rejected {
                slot,
                incoming: Incoming::Insert(v),
            },
        },
        Incoming::Set(v) => match slot {
            OpSlot::Insert(_) => Fused::Slot(OpSlot::Insert(v)),
            OpSlot::Set(_) => Fused::Slot(OpSlot::Set(v)),
            OpSlot::Remove { count } | OpSlot::RemoveSet { count, .. } => {
                Fused::Slot(OpSlot::RemoveSet { count, value: v })
            }
        },
        Incoming::Remove { count: m } => match slot {
            OpSlot::Insert(_) => {
                if m != 1 {
                    return Err(TreeError::BadFusion("collapsed remove run over an insert"));
                }
                Fused::Cleared
            }
            OpSlot::Set(_) => Fused::Slot(OpSlot::Remove { count: m }),
            OpSlot::Remove { count } | OpSlot::RemoveSet { count, .. } => {
                Fused::Slot(OpSlot::Remove { count: count + m })
            }
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fused<'a>(slot: OpSlot<&'a str>, incoming: Incoming<&'a str>) -> OpSlot<&'a str> {
        match fuse(slot, incoming).unwrap() {
            Fused::Slot(s) => s,
            Fused::Cleared => panic!("slot cleared"),
            Fused::Rejected { .. } => panic!("fusion rejected"),
        }
    }

    #[test]
    fn test_insert_rejected_by_insert_set_and_pair() {
        for slot in [
            OpSlot::Insert("a"),
            OpSlot::Set("a"),
            OpSlot::RemoveSet { count: 1, value: "a" },
        ] {
            match fuse(slot.clone(), Incoming::Insert("b")).unwrap() {
                Fused::Rejected { slot: back, incoming } => {
                    assert_eq!(back, slot);
                    assert_eq!(incoming, Incoming::Insert("b"));
                }
                _ => panic!("expected rejection"),
            }
        }
    }

    #[test]
    fn test_insert_cancels_single_remove_into_set() {
        assert_eq!(
            fused(OpSlot::Remove { count: 1 }, Incoming::Insert("v")),
            OpSlot::Set("v")
        );
    }

    #[test]
    fn test_insert_decrements_remove_run_and_piggybacks() {
        assert_eq!(
            fused(OpSlot::Remove { count: 3 }, Incoming::Insert("v")),
            OpSlot::RemoveSet { count: 2, value: "v" }
        );
    }

    #[test]
    fn test_set_overwrites_but_insert_stays_insert() {
        assert_eq!(fused(OpSlot::Insert("a"), Incoming::Set("b")), OpSlot::Insert("b"));
        assert_eq!(fused(OpSlot::Set("a"), Incoming::Set("b")), OpSlot::Set("b"));
    }

    #[test]
    fn test_set_piggybacks_on_remove() {
        assert_eq!(
            fused(OpSlot::Remove { count: 2 }, Incoming::Set("v")),
            OpSlot::RemoveSet { count: 2, value: "v" }
        );
        assert_eq!(
            fused(OpSlot::RemoveSet { count: 2, value: "old" }, Incoming::Set("v")),
            OpSlot::RemoveSet { count: 2, value: "v" }
        );
    }

    #[test]
    fn test_remove_cancels_insert() {
        match fuse(OpSlot::Insert("a"), Incoming::Remove { count: 1 }).unwrap() {
            Fused::Cleared => {}
            _ => panic!("expected cleared slot"),
        }
    }

    #[test]
    fn test_remove_supersedes_set() {
        assert_eq!(
            fused(OpSlot::Set("a"), Incoming::Remove { count: 1 }),
            OpSlot::Remove { count: 1 }
        );
    }

    #[test]
    fn test_remove_collapses_runs_and_drops_piggyback() {
        assert_eq!(
            fused(OpSlot::Remove { count: 2 }, Incoming::Remove { count: 1 }),
            OpSlot::Remove { count: 3 }
        );
        assert_eq!(
            fused(
                OpSlot::RemoveSet { count: 2, value: "v" },
                Incoming::Remove { count: 3 }
            ),
            OpSlot::Remove { count: 5 }
        );
    }

    #[test]
    fn test_collapsed_remove_over_insert_is_illegal() {
        assert!(fuse(OpSlot::Insert("a"), Incoming::Remove { count: 2 }).is_err());
    }

    #[test]
    fn test_weights() {
        assert_eq!(OpSlot::Insert("v").weight(), 1);
        assert_eq!(OpSlot::Set("v").weight(), 0);
        assert_eq!(OpSlot::<&str>::Remove { count: 4 }.weight(), -4);
        assert_eq!(OpSlot::RemoveSet { count: 4, value: "v" }.weight(), -4);
    }
}
