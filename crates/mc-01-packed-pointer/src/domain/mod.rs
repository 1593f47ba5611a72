//! # Domain Module
//!
//! Packed pointer value object and boundary errors.

pub mod errors;
pub mod value_objects;

pub use errors::*;
pub use value_objects::*;
