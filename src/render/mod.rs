//! Report rendering module
//!
//! This module contains:
//! - Layout constants and block arithmetic
//! - Bitmap text metrics, drawing and wrapping
//! - Report composition using image and tiny-skia (for saving to file)

pub mod geometry;
pub mod report;
pub mod text;
