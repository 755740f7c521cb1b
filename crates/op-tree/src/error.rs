use thiserror::Error;

/// Internal consistency failures.
///
/// Every variant signals a bug in the tree, not a recoverable runtime
/// condition; after any of these the tree is in an undefined state and
/// must be discarded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("rotation pivot is the sentinel")]
    RotateSentinel,
    #[error("stale key shift on node {0} during the duplicate scan")]
    StaleShiftInScan(u32),
    #[error("stale key shift on node {0} during delete")]
    StaleShiftInDelete(u32),
    #[error("operations cannot fuse: {0}")]
    BadFusion(&'static str),
}
