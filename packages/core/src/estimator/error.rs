//! Error types for fee estimation

use thiserror::Error;

/// Errors that can occur while running an estimation cycle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EstimatorError {
    #[error("Fetch error: {message}")]
    Fetch { message: String },

    #[error("Malformed hex quantity: {value:?}")]
    MalformedHex { value: String },

    #[error("Reward length mismatch in block {block_index}: expected {expected} percentiles, got {actual}")]
    LengthMismatch {
        block_index: usize,
        expected: usize,
        actual: usize,
    },

    /// `percentile` is set when samples exist but none carries that percentile.
    #[error(
        "No fee samples to aggregate{}",
        .percentile.map(|p| format!(" for percentile {p}")).unwrap_or_default()
    )]
    EmptyWindow { percentile: Option<u8> },

    #[error("Percentile {percentile} is missing from the averaged fees")]
    UnknownPercentile { percentile: u8 },

    #[error("Numerical overflow in calculation: {operation}")]
    Overflow { operation: String },
}

impl EstimatorError {
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch { message: message.into() }
    }

    pub fn malformed_hex(value: impl Into<String>) -> Self {
        Self::MalformedHex { value: value.into() }
    }

    pub fn overflow(operation: impl Into<String>) -> Self {
        Self::Overflow { operation: operation.into() }
    }

    /// Short stable label, used for metrics and structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch { .. } => "fetch",
            Self::MalformedHex { .. } => "malformed_hex",
            Self::LengthMismatch { .. } => "length_mismatch",
            Self::EmptyWindow { .. } => "empty_window",
            Self::UnknownPercentile { .. } => "unknown_percentile",
            Self::Overflow { .. } => "overflow",
        }
    }
}
