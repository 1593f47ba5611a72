//! # Mythos Multichain Test Suite
//!
//! Cross-crate flows that need the registry, handlers and coordinator
//! wired together.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/
//! │   ├── scenario.rs   # root + mythos_7000-14 + mythos_7001-1 fixture
//! │   └── flows.rs      # end-to-end flows over the fixture
//! └── benches/          # criterion benchmarks
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p mc-tests
//! cargo test -p mc-tests integration::
//! cargo bench -p mc-tests
//! ```

#![allow(dead_code)]

pub mod integration;
