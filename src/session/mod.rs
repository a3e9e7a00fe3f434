//! Analysis session management module
//!
//! This module contains:
//! - Session state management
//! - Message and task types for session interactions

pub mod messages;
pub mod state;
