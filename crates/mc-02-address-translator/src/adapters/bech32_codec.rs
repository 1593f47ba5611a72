//! Bech32 codec backed by the `bech32` crate.

use bech32::{FromBase32, ToBase32, Variant};

use crate::domain::TranslationError;
use crate::ports::AddressCodec;

/// Classic Bech32 (BIP-173) codec, as used by Cosmos-SDK chains.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bech32Codec;

impl AddressCodec for Bech32Codec {
    fn decode(&self, address: &str) -> Result<(String, Vec<u8>), TranslationError> {
        let (hrp, data, variant) =
            bech32::decode(address).map_err(|e| TranslationError::DecodeError(e.to_string()))?;
        if variant != Variant::Bech32 {
            return Err(TranslationError::DecodeError(format!(
                "{address}: expected bech32, found bech32m"
            )));
        }
        let bytes =
            Vec::<u8>::from_base32(&data).map_err(|e| TranslationError::DecodeError(e.to_string()))?;
        Ok((hrp, bytes))
    }

    fn encode(&self, prefix: &str, bytes: &[u8]) -> Result<String, TranslationError> {
        bech32::encode(prefix, bytes.to_base32(), Variant::Bech32)
            .map_err(|e| TranslationError::EncodeError(e.to_string()))
    }
}
