//! Shared foundational types used across the tether platform-integration toolchain.
//!
//! This crate provides the signal [`Direction`] model shared by platform
//! descriptions and component interfaces, content hashing for reproducible
//! build fingerprints, and the internal error type.

#![warn(missing_docs)]

pub mod direction;
pub mod hash;
pub mod result;

pub use direction::{Direction, ParseDirectionError};
pub use hash::ContentHash;
pub use result::InternalError;
