#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("unsupported linkage method: {method}")]
    UnsupportedMethod { method: String },
    #[error("unsupported distance metric: {metric}")]
    UnsupportedMetric { metric: String },
    #[error("data has {rows} rows but {ids} ids were given")]
    ShapeMismatch { rows: usize, ids: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
