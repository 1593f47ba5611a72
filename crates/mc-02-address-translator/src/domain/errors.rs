//! # Error Types

use shared_types::ChainId;
use thiserror::Error;

/// Address translation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    /// Chain is not in the registry.
    #[error("Unknown chain: {0}")]
    UnknownChain(ChainId),

    /// Address does not match the declared source encoding.
    #[error("Address decode error: {0}")]
    DecodeError(String),

    /// Bytes could not be encoded under the target prefix.
    #[error("Address encode error: {0}")]
    EncodeError(String),

    /// Address kind is not one of acc/val/cons.
    #[error("Invalid address kind: {0}")]
    InvalidKind(String),
}
