//! Extension use-case service.
//!
//! # Responsibility
//! - Resolve an extension and dispatch to it in one call.
//! - Surface discovery, lookup and invocation failures unchanged.
//!
//! # Invariants
//! - Dispatch never runs when resolution fails.
//! - Every call queries the host afresh; nothing is cached between calls.

use crate::dispatch::{self, ClassLoaderSegment};
use crate::error::ExtensionResult;
use crate::extension::catalog::ExtensionSummary;
use crate::extension::function::{AddToDexClassLoader, ExtensionFunction};
use crate::extension::id::CapabilityId;
use crate::extension::resolve;
use crate::host::ExtensionHost;
use crate::sys::jni::jobject;
use log::{info, warn};
use std::ffi::CStr;

/// Use-case service wrapper over one extension host.
pub struct ExtensionService<H: ExtensionHost> {
    host: H,
}

impl<H: ExtensionHost> ExtensionService<H> {
    /// Creates a service over the provided host implementation.
    pub fn new(host: H) -> Self {
        Self { host }
    }

    /// Lists metadata for every extension the host exposes right now.
    pub fn list_extensions(&self) -> ExtensionResult<Vec<ExtensionSummary>> {
        resolve::list_extensions(&self.host).inspect_err(|err| {
            warn!("event=extension_list module=service status=error error={err}");
        })
    }

    /// Resolves the add-to-dex-class-loader extension without calling it.
    pub fn resolve_add_to_dex_class_loader(&self) -> ExtensionResult<AddToDexClassLoader> {
        resolve::resolve::<AddToDexClassLoader, _>(&self.host)
    }

    /// Appends `segment` to `loader` through the host's
    /// `com.android.art.classloader.add_to_dex_class_loader` extension.
    ///
    /// # Contract
    /// - Resolves, then dispatches; no dispatch after a failed resolution.
    /// - Returns `NotFound` when the host does not register the extension.
    ///
    /// # Safety
    /// `loader` must be null or a live JNI reference on the current thread.
    pub unsafe fn add_to_dex_class_loader(
        &self,
        loader: jobject,
        segment: &CStr,
    ) -> ExtensionResult<()> {
        let id = CapabilityId::new(AddToDexClassLoader::ID)?;
        self.add_to_class_loader_via(&id, loader, segment)
    }

    /// Same as [`Self::add_to_dex_class_loader`] for a host that registers
    /// the same signature under a different identifier.
    ///
    /// # Safety
    /// - The extension registered under `id` must take
    ///   `(jvmtiEnv*, jobject, const char*)`.
    /// - `loader` must be null or a live JNI reference on the current thread.
    pub unsafe fn add_to_class_loader_via(
        &self,
        id: &CapabilityId,
        loader: jobject,
        segment: &CStr,
    ) -> ExtensionResult<()> {
        let handle = resolve::resolve_as::<AddToDexClassLoader, _>(&self.host, id)
            .inspect_err(|err| {
                warn!("event=extension_resolve module=service status=error id={id} error={err}");
            })?;

        dispatch::invoke(&self.host, id, handle, ClassLoaderSegment { loader, segment })
            .inspect(|_| {
                info!(
                    "event=extension_dispatch module=service status=ok id={id} segment_len={}",
                    segment.to_bytes().len()
                );
            })
            .inspect_err(|err| {
                warn!("event=extension_dispatch module=service status=error id={id} error={err}");
            })
    }
}
