use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the pricing engine and its table loader.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurveError {
    /// Supply, token amount, fee or resulting supply is outside the curve, or
    /// a spend exceeds the remaining curve capacity.
    #[error("value out of range for the bonding curve")]
    OutOfRange,

    #[error("malformed number: {0:?}")]
    MalformedNumber(String),

    #[error("table resource missing at {path}: {reason}")]
    ResourceMissing { path: PathBuf, reason: String },

    #[error("table resource corrupt at {path}: {reason}")]
    ResourceCorrupt { path: PathBuf, reason: String },

    #[error("fixed-point arithmetic overflow")]
    Overflow,
}

impl CurveError {
    /// True for load-time integrity failures that must abort initialization.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ResourceMissing { .. } | Self::ResourceCorrupt { .. })
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ResourceCorrupt { path: path.into(), reason: reason.into() }
    }
}

pub type CurveResult<T> = Result<T, CurveError>;
