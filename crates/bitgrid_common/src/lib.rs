//! Shared foundational types used across the BitGrid toolchain.
//!
//! This crate provides the direction encoding common to every grid-facing
//! component and the internal result type used for unrecoverable errors.

#![warn(missing_docs)]

pub mod direction;
pub mod result;

pub use direction::Direction;
pub use result::{BitResult, InternalError};
