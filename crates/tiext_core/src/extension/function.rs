//! Typed handles for host extension functions.
//!
//! The host publishes every extension as a variadic `jvmtiExtensionFunction`.
//! Callers need a concrete signature; the conversion happens only in
//! [`ExtensionFunction::from_raw`], which `resolve` calls once per lookup.

use crate::sys::jni::jobject;
use crate::sys::jvmti::{jvmtiEnv, jvmtiError};
use std::ffi::{c_char, c_void};
use std::fmt::{Debug, Formatter};

/// ART extension that appends a dex path segment to a class loader.
pub const ADD_TO_DEX_CLASS_LOADER: &str = "com.android.art.classloader.add_to_dex_class_loader";

const KNOWN_EXTENSION_IDS: &[&str] = &[ADD_TO_DEX_CLASS_LOADER];

/// Identifiers of the extensions this crate has typed handles for.
pub fn known_extension_ids() -> &'static [&'static str] {
    KNOWN_EXTENSION_IDS
}

/// Signature every extension is published under.
pub type VariadicExtensionFn = unsafe extern "C" fn(jvmti_env: *mut jvmtiEnv, ...) -> jvmtiError;

/// Untyped extension entry point as enumerated from the host.
#[derive(Clone, Copy)]
pub struct RawExtensionFn(VariadicExtensionFn);

impl RawExtensionFn {
    pub fn new(func: VariadicExtensionFn) -> Self {
        Self(func)
    }

    /// Address of the entry point, for identity checks and diagnostics.
    pub fn as_ptr(self) -> *const c_void {
        self.0 as *const c_void
    }
}

impl Debug for RawExtensionFn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RawExtensionFn").field(&self.as_ptr()).finish()
    }
}

impl PartialEq for RawExtensionFn {
    fn eq(&self, other: &Self) -> bool {
        self.as_ptr() == other.as_ptr()
    }
}

impl Eq for RawExtensionFn {}

/// Extension function with a known concrete signature.
pub trait ExtensionFunction: Copy {
    /// Identifier the host registers this function under.
    const ID: &'static str;

    /// Reinterprets the host's variadic pointer as this signature.
    ///
    /// # Safety
    /// `raw` must be the entry point of an extension whose real signature is
    /// the one `Self` wraps.
    unsafe fn from_raw(raw: RawExtensionFn) -> Self;

    /// Address of the entry point.
    fn as_ptr(self) -> *const c_void;
}

/// `jvmtiError (*)(jvmtiEnv*, jobject loader, const char* segment)`.
pub type AddToDexClassLoaderFn =
    unsafe extern "C" fn(env: *mut jvmtiEnv, loader: jobject, segment: *const c_char) -> jvmtiError;

/// Typed handle for [`ADD_TO_DEX_CLASS_LOADER`].
#[derive(Clone, Copy)]
pub struct AddToDexClassLoader(AddToDexClassLoaderFn);

impl AddToDexClassLoader {
    pub(crate) fn entry(self) -> AddToDexClassLoaderFn {
        self.0
    }
}

impl ExtensionFunction for AddToDexClassLoader {
    const ID: &'static str = ADD_TO_DEX_CLASS_LOADER;

    unsafe fn from_raw(raw: RawExtensionFn) -> Self {
        Self(std::mem::transmute::<VariadicExtensionFn, AddToDexClassLoaderFn>(raw.0))
    }

    fn as_ptr(self) -> *const c_void {
        self.0 as *const c_void
    }
}

impl Debug for AddToDexClassLoader {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AddToDexClassLoader").field(&self.as_ptr()).finish()
    }
}
