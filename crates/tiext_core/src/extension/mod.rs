//! Host extension functions.
//!
//! This module owns the discovery protocol: enumerate the host table, match
//! one identifier, hand out a typed entry point, and release every host
//! allocation. Invocation lives in `dispatch`.

pub mod catalog;
pub mod function;
pub mod id;
pub mod resolve;
