use thiserror::Error;

/// Errors raised while selecting or configuring an index.
///
/// Inserting and listing never fail; only the construction surface does.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("unknown index kind: {0:?} (expected bst, avl, rbt or skiplist)")]
    UnknownKind(String),
    #[error("skip list height cap must be at least 1, got {0}")]
    InvalidMaxHeight(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
