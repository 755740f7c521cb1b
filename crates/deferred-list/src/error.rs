use op_tree::TreeError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListError {
    #[error("index {index} out of bounds for length {len}")]
    OutOfBounds { index: usize, len: usize },
    /// An internal consistency failure surfaced by the operation tree;
    /// the list is in an undefined state and must be discarded.
    #[error(transparent)]
    Tree(#[from] TreeError),
}
