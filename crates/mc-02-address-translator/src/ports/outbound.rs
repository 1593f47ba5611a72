//! # Outbound Ports
//!
//! Dependencies of the translator: where addressing schemes come from and
//! how addresses are encoded.

use shared_types::ChainId;
use std::sync::Arc;

use crate::domain::{AddressingScheme, TranslationError};

/// Resolves a chain id to its addressing scheme.
///
/// Implemented by the subchain registry.
pub trait AddressingLookup {
    /// Scheme for `chain_id`, or `None` if the chain is unknown.
    fn addressing_scheme(&self, chain_id: &ChainId) -> Option<AddressingScheme>;
}

impl<T: AddressingLookup + ?Sized> AddressingLookup for &T {
    fn addressing_scheme(&self, chain_id: &ChainId) -> Option<AddressingScheme> {
        (**self).addressing_scheme(chain_id)
    }
}

impl<T: AddressingLookup + ?Sized> AddressingLookup for Arc<T> {
    fn addressing_scheme(&self, chain_id: &ChainId) -> Option<AddressingScheme> {
        (**self).addressing_scheme(chain_id)
    }
}

/// Human-readable-part address codec.
pub trait AddressCodec {
    /// Split an address into `(prefix, raw bytes)`.
    fn decode(&self, address: &str) -> Result<(String, Vec<u8>), TranslationError>;

    /// Encode raw bytes under `prefix`.
    fn encode(&self, prefix: &str, bytes: &[u8]) -> Result<String, TranslationError>;
}
