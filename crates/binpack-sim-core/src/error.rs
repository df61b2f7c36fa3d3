use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("Invalid item size at index {index}: {value} (expected 0.0 < size <= 1.0)")]
    InvalidItemSize { index: usize, value: f64 },
    #[error("Unknown algorithm code: {code:?} (expected one of FF, BF, FFD, BFD)")]
    UnknownAlgorithm { code: String },
}

pub type Result<T> = std::result::Result<T, SimError>;
