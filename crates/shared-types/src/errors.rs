//! # Error Types
//!
//! Errors raised while constructing shared primitives.

use thiserror::Error;

/// Errors produced when parsing a chain identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainIdError {
    /// Chain id is empty or longer than [`crate::MAX_CHAIN_ID_LEN`].
    #[error("Invalid chain id length: {0}")]
    InvalidLength(usize),

    /// Chain id does not have the `<name>_<id>-<revision>` shape.
    #[error("Invalid chain id format: {0}")]
    InvalidFormat(String),

    /// Base name is not lowercase alphanumeric.
    #[error("Invalid chain base name: {0}")]
    InvalidBaseName(String),

    /// Optional level segment is not a decimal number.
    #[error("Invalid level in chain id: {0}")]
    InvalidLevel(String),

    /// Numeric id is not a positive decimal number.
    #[error("Invalid numeric id in chain id: {0}")]
    InvalidNumericId(String),

    /// Revision is not a positive decimal number.
    #[error("Invalid revision in chain id: {0}")]
    InvalidRevision(String),
}

/// Errors produced when decoding a transaction hash.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxHashError {
    /// Input is not valid hex.
    #[error("Invalid tx hash hex: {0}")]
    InvalidHex(String),

    /// Input does not decode to 32 bytes.
    #[error("Invalid tx hash length: expected 32, got {0}")]
    InvalidLength(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_error_display() {
        let err = ChainIdError::InvalidFormat("mythos".to_string());
        assert!(err.to_string().contains("mythos"));
    }

    #[test]
    fn test_tx_hash_error_display() {
        let err = TxHashError::InvalidLength(31);
        assert!(err.to_string().contains("31"));
    }
}
