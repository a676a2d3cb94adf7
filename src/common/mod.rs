//! Common types, traits, and error definitions for exploration_planner
//!
//! This module provides the foundational building blocks shared by the
//! trajectory tree, the spatial index and the trajectory generators.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
