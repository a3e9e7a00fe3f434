//! Pure domain types with minimal dependencies
//!
//! Geometry, coordinate mapping, the selection state machine and the
//! analysis state. Nothing here performs I/O.

pub mod analysis;
pub mod geometry;
pub mod mapping;
pub mod selection;

pub use analysis::*;
pub use geometry::*;
pub use selection::*;
