//! # Wildkin Common
//!
//! Common types and shared abstractions for Project Wildkin.
//!
//! This crate provides foundational types used across all Wildkin subsystems:
//! - ID types (EntityId, ItemTypeId)
//! - Horizontal-plane spatial helpers
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod ids;
pub mod space;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::space::*;
}

pub use prelude::*;
