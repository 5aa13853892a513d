//! Command handlers, one module per area.

pub mod auth;
pub mod config;
pub mod misc;
pub mod notes;
pub mod search;
