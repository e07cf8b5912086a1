//! Core use-case services.
//!
//! # Responsibility
//! - Compose extension resolution and dispatch into caller-facing operations.
//! - Keep FFI layers decoupled from the discovery protocol.

pub mod extension_service;
