//! # Domain Module
//!
//! Addressing schemes, address kinds and translation errors.

pub mod errors;
pub mod value_objects;

pub use errors::*;
pub use value_objects::*;
