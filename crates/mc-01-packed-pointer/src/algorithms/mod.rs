//! # Algorithms Module
//!
//! Copy-in/copy-out marshaling over packed pointers.

pub mod marshal;

pub use marshal::*;
