//! Shared foundational types for the gantry build orchestrator.
//!
//! This crate provides content hashing for change detection and interned
//! identifiers for declaration names.

#![warn(missing_docs)]

pub mod hash;
pub mod ident;

pub use hash::{ContentHash, ParseHashError};
pub use ident::{Ident, Interner};
