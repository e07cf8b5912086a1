//! Host runtime contract for extension enumeration and memory release.
//!
//! # Responsibility
//! - Abstract the two JVMTI calls the catalog needs behind one trait.
//! - Provide the real implementation over a raw `jvmtiEnv*`.
//!
//! # Invariants
//! - A successful enumeration transfers ownership of every allocation in the
//!   returned table to the caller.
//! - A failed enumeration returns no table and owes no release.

use crate::error::JvmtiError;
use crate::sys::jni::jint;
use crate::sys::jvmti::{jvmtiEnv, jvmtiExtensionFunctionInfo};
use std::ffi::c_uchar;
use std::ptr::{self, NonNull};

/// Raw table returned by one enumeration call.
#[derive(Debug, Clone, Copy)]
pub struct RawExtensionTable {
    pub count: jint,
    pub entries: *mut jvmtiExtensionFunctionInfo,
}

/// Host runtime that exposes extension functions.
pub trait ExtensionHost {
    /// Environment pointer passed as the first argument to every extension.
    fn raw_env(&self) -> *mut jvmtiEnv;

    /// Enumerates all extension functions registered by the host.
    ///
    /// The caller owns every allocation reachable from the returned table and
    /// must hand each one back to [`ExtensionHost::deallocate`] exactly once.
    fn get_extension_functions(&self) -> Result<RawExtensionTable, JvmtiError>;

    /// Releases one allocation obtained from this host.
    ///
    /// # Safety
    /// `mem` must be non-null, come from this host's enumeration call, and not
    /// have been released before.
    unsafe fn deallocate(&self, mem: *mut c_uchar) -> Result<(), JvmtiError>;
}

/// [`ExtensionHost`] backed by a live JVMTI environment.
#[derive(Debug, Clone, Copy)]
pub struct JvmtiHost {
    env: NonNull<jvmtiEnv>,
}

impl JvmtiHost {
    /// Wraps a raw environment pointer.
    ///
    /// Returns `None` for a null pointer.
    ///
    /// # Safety
    /// `env` must be a JVMTI environment that stays valid for as long as the
    /// returned value is used.
    pub unsafe fn from_raw(env: *mut jvmtiEnv) -> Option<Self> {
        NonNull::new(env).map(|env| Self { env })
    }
}

impl ExtensionHost for JvmtiHost {
    fn raw_env(&self) -> *mut jvmtiEnv {
        self.env.as_ptr()
    }

    fn get_extension_functions(&self) -> Result<RawExtensionTable, JvmtiError> {
        let env = self.env.as_ptr();
        let mut count: jint = 0;
        let mut entries: *mut jvmtiExtensionFunctionInfo = ptr::null_mut();
        // SAFETY: `env` is a valid environment per `from_raw`; the function table
        // prefix matches `jvmti.h` up to slot 124.
        let status = unsafe {
            let get_fn = (**env).GetExtensionFunctions;
            get_fn(env, &mut count, &mut entries)
        };
        JvmtiError::check(status)?;
        Ok(RawExtensionTable { count, entries })
    }

    unsafe fn deallocate(&self, mem: *mut c_uchar) -> Result<(), JvmtiError> {
        let env = self.env.as_ptr();
        let deallocate_fn = (**env).Deallocate;
        JvmtiError::check(deallocate_fn(env, mem))
    }
}

impl<T: ExtensionHost + ?Sized> ExtensionHost for &T {
    fn raw_env(&self) -> *mut jvmtiEnv {
        (**self).raw_env()
    }

    fn get_extension_functions(&self) -> Result<RawExtensionTable, JvmtiError> {
        (**self).get_extension_functions()
    }

    unsafe fn deallocate(&self, mem: *mut c_uchar) -> Result<(), JvmtiError> {
        (**self).deallocate(mem)
    }
}
