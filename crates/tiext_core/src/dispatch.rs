//! Invocation of resolved extension functions.
//!
//! # Invariants
//! - Only handles produced by `resolve` reach this module.
//! - Any status other than `JVMTI_ERROR_NONE` becomes
//!   `ExtensionError::Invocation` with the host code unchanged.

use crate::error::{ExtensionError, ExtensionResult, JvmtiError};
use crate::extension::function::AddToDexClassLoader;
use crate::extension::id::CapabilityId;
use crate::host::ExtensionHost;
use crate::sys::jni::jobject;
use log::debug;
use std::ffi::CStr;

/// Arguments of the add-to-dex-class-loader extension.
#[derive(Debug, Clone, Copy)]
pub struct ClassLoaderSegment<'a> {
    /// Class loader reference owned by the calling JNI frame.
    pub loader: jobject,
    /// Dex file or directory path to append.
    pub segment: &'a CStr,
}

/// Calls `handle` with the host environment and `args`.
///
/// `id` is the identifier `handle` was resolved under and only labels errors.
///
/// # Safety
/// - `handle` must have been resolved from `host`.
/// - `args.loader` must be null or a live JNI reference on the current thread.
pub unsafe fn invoke<H>(
    host: &H,
    id: &CapabilityId,
    handle: AddToDexClassLoader,
    args: ClassLoaderSegment<'_>,
) -> ExtensionResult<()>
where
    H: ExtensionHost + ?Sized,
{
    let entry = handle.entry();
    let status = entry(host.raw_env(), args.loader, args.segment.as_ptr());
    match JvmtiError::check(status) {
        Ok(()) => {
            debug!("event=extension_invoke module=dispatch status=ok id={id}");
            Ok(())
        }
        Err(error) => {
            debug!("event=extension_invoke module=dispatch status=error id={id} error={error}");
            Err(ExtensionError::Invocation {
                id: id.to_string(),
                error,
            })
        }
    }
}
