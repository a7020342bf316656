//! HTTP API surface.

pub mod handlers;
