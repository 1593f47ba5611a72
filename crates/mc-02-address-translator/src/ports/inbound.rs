//! # Inbound Ports
//!
//! API exposed to the registry and the cross-chain coordinator.

use shared_types::ChainId;

use crate::domain::{AddressKind, TranslationError};

/// Address translation API.
///
/// Every method is pure: the same inputs against the same registry state
/// always give the same output.
pub trait AddressTranslation {
    /// Translate an account address from one chain's namespace to another's.
    fn translate(
        &self,
        from: &ChainId,
        to: &ChainId,
        address: &str,
    ) -> Result<String, TranslationError> {
        self.translate_kind(from, to, AddressKind::Acc, address)
    }

    /// Translate an address of the given kind.
    fn translate_kind(
        &self,
        from: &ChainId,
        to: &ChainId,
        kind: AddressKind,
        address: &str,
    ) -> Result<String, TranslationError>;

    /// Re-encode an address under an explicit prefix, whatever its source.
    fn convert_with_prefix(&self, address: &str, prefix: &str) -> Result<String, TranslationError>;

    /// Whether translating between the two chains is invertible.
    fn same_coin_type_class(&self, a: &ChainId, b: &ChainId) -> Result<bool, TranslationError>;
}
