//! Core application module
//!
//! This module contains:
//! - The event loop that drives a session and runs its tasks

pub mod app;
