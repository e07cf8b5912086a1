//! JNI surface for `tiext_core`.
//!
//! Loaded into the VM as a native library or agent; the exported symbols in
//! `api` are the only entry points.

pub mod api;
mod jni_support;

pub use api::{install_jvmti_env, jvmti_host};
