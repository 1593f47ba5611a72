//! # Adapters Layer
//!
//! Bech32 codec and a static addressing lookup.

mod bech32_codec;
mod static_lookup;

pub use bech32_codec::Bech32Codec;
pub use static_lookup::StaticAddressingLookup;
