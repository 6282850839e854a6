use crate::axis::Axis;
use crate::id::Id;

pub type Result<T> = std::result::Result<T, Error>;

/// Every way a transform can reject its input. Transforms either return a valid mapper or one of
/// these; the input mapper is never touched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("cannot build a mapper from an empty id list")]
    EmptyInput,

    #[error("duplicate identifier: {id}")]
    DuplicateIdentifier { id: Id },

    #[error("unknown identifier: {id}")]
    UnknownIdentifier { id: Id },

    #[error("{}", not_a_permutation_message(.group))]
    NotAPermutation { group: Option<String> },

    #[error("split assignments do not cover the ids (missing: {missing:?}, extra: {extra:?})")]
    IncompleteAssignment { missing: Vec<Id>, extra: Vec<Id> },

    #[error("ids appear in more than one group: {ids:?}")]
    DuplicateAssignment { ids: Vec<Id> },

    #[error("invalid range [{start}, {end}) for {size} items")]
    InvalidRange { start: i64, end: i64, size: usize },

    #[error("no matching ids in the visual order")]
    EmptyResult,

    #[error("{what}: expected {expected} values, got {actual}")]
    ArityMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("column '{column}' not found (available: {available:?})")]
    UnknownColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("metadata ids do not match the axis ids (missing: {missing:?}, extra: {extra:?})")]
    MetadataMismatch { missing: Vec<Id>, extra: Vec<Id> },

    #[error("cannot use {axis} metadata: none was provided")]
    MissingMetadata { axis: Axis },

    #[error(transparent)]
    Cluster(#[from] heron::Error),
}

fn not_a_permutation_message(group: &Option<String>) -> String {
    match group {
        Some(name) => format!("new order for group '{name}' is not a permutation of its ids"),
        None => "new order is not a permutation of the current ids".to_string(),
    }
}

/// Caps how many offending ids an error carries.
pub(crate) const REPORTED_IDS: usize = 5;
