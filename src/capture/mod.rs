//! Image sources
//!
//! Loads user-supplied images and holds encoded assets returned by the model.

pub mod image;
