//! Request handlers, grouped by concern.

pub mod chat;
pub mod insights;
pub mod stats;
