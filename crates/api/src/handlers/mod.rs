//! Request handlers. Each forwards to exactly one Harmony API operation.

pub mod cache;
pub mod health;
pub mod visualize;
