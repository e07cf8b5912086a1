//! JVMTI extension-function discovery and dispatch.
//!
//! This crate owns the protocol for enumerating a host's extension table,
//! matching one identifier, and releasing every host allocation on the way.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod extension;
pub mod host;
pub mod logging;
pub mod service;
pub mod sys;

pub use config::RuntimeConfig;
pub use dispatch::ClassLoaderSegment;
pub use error::{ExtensionError, ExtensionResult, JvmtiError};
pub use extension::catalog::{
    ExtensionCatalog, ExtensionDescriptor, ExtensionSummary, ParamInfo, ParamSummary,
};
pub use extension::function::{
    known_extension_ids, AddToDexClassLoader, ExtensionFunction, RawExtensionFn,
    ADD_TO_DEX_CLASS_LOADER,
};
pub use extension::id::CapabilityId;
pub use extension::resolve::{list_extensions, resolve, resolve_as, resolve_raw};
pub use host::{ExtensionHost, JvmtiHost, RawExtensionTable};
pub use logging::{
    default_log_level, init_from_config, init_logging, logging_status, LogTarget, LoggingError,
};
pub use service::extension_service::ExtensionService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
