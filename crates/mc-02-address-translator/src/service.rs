//! # Address Translator Service
//!
//! Decodes an address under its source chain's prefix and re-encodes the raw
//! bytes under the destination chain's prefix.

use shared_types::ChainId;
use tracing::trace;

use crate::adapters::Bech32Codec;
use crate::domain::{AddressKind, AddressingScheme, TranslationError};
use crate::ports::{AddressCodec, AddressTranslation, AddressingLookup};

/// Translator over an addressing lookup.
///
/// `L` is typically the registry (or a borrowed view of its state), `C` the
/// codec. Holds no state of its own.
#[derive(Debug, Clone)]
pub struct AddressTranslator<L, C = Bech32Codec> {
    lookup: L,
    codec: C,
}

impl<L: AddressingLookup> AddressTranslator<L, Bech32Codec> {
    /// Translator using the standard Bech32 codec.
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            codec: Bech32Codec,
        }
    }
}

impl<L: AddressingLookup, C: AddressCodec> AddressTranslator<L, C> {
    /// Translator with a custom codec.
    pub fn with_codec(lookup: L, codec: C) -> Self {
        Self { lookup, codec }
    }

    fn scheme(&self, chain_id: &ChainId) -> Result<AddressingScheme, TranslationError> {
        self.lookup
            .addressing_scheme(chain_id)
            .ok_or_else(|| TranslationError::UnknownChain(chain_id.clone()))
    }
}

impl<L: AddressingLookup, C: AddressCodec> AddressTranslation for AddressTranslator<L, C> {
    fn translate_kind(
        &self,
        from: &ChainId,
        to: &ChainId,
        kind: AddressKind,
        address: &str,
    ) -> Result<String, TranslationError> {
        // Both chains are resolved before decoding so an unknown chain is
        // reported even for a malformed address.
        let source = self.scheme(from)?;
        let target = self.scheme(to)?;

        let (hrp, bytes) = self.codec.decode(address)?;
        let expected = source.prefixes.address_prefix(kind);
        if hrp != expected {
            return Err(TranslationError::DecodeError(format!(
                "{address}: prefix {hrp} does not match {from} {kind} prefix {expected}"
            )));
        }

        let out = self
            .codec
            .encode(target.prefixes.address_prefix(kind), &bytes)?;
        trace!(%from, %to, %kind, "Translated address");
        Ok(out)
    }

    fn convert_with_prefix(&self, address: &str, prefix: &str) -> Result<String, TranslationError> {
        let (_, bytes) = self.codec.decode(address)?;
        self.codec.encode(prefix, &bytes)
    }

    fn same_coin_type_class(&self, a: &ChainId, b: &ChainId) -> Result<bool, TranslationError> {
        Ok(self.scheme(a)?.same_class(&self.scheme(b)?))
    }
}
