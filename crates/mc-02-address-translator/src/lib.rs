//! # MC-02 Address Translator
//!
//! Converts an account identity between chain-specific address namespaces.
//!
//! **Architecture:** Hexagonal (Domain + Ports/Adapters)
//!
//! ## Purpose
//!
//! Every subchain has its own bech32 prefix set. The same key pair shows up
//! as `mythos1...` on one chain and `level01...` on another. Translation
//! decodes under the source prefix and re-encodes the raw bytes under the
//! destination prefix.
//!
//! ## Guarantees
//!
//! | Property | Description |
//! |----------|-------------|
//! | Pure | No state, safe inside deterministic query paths |
//! | Strict | An address must carry its source chain's prefix |
//! | Invertible | Round trip holds between chains of one coin-type class |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{Bech32Codec, StaticAddressingLookup};
pub use domain::{
    AddressKind, AddressingScheme, Bech32Prefixes, TranslationError, COIN_TYPE_COSMOS,
    COIN_TYPE_ETH,
};
pub use ports::{AddressCodec, AddressTranslation, AddressingLookup};
pub use service::AddressTranslator;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
