//! Owned view over one host extension-function table.
//!
//! # Responsibility
//! - Take ownership of every allocation returned by one enumeration call.
//! - Expose descriptors for matching and metadata snapshots.
//! - Release every allocation exactly once when the catalog is dropped.
//!
//! # Invariants
//! - Each descriptor releases its parameter names, then its identifier,
//!   description, parameter array and error array.
//! - The backing table is released after every descriptor, exactly once,
//!   whether or not any descriptor was selected.
//! - A failed enumeration builds no catalog and releases nothing.

use crate::error::{ExtensionError, ExtensionResult, JvmtiError};
use crate::extension::function::RawExtensionFn;
use crate::extension::id::CapabilityId;
use crate::host::ExtensionHost;
use crate::sys::jvmti::{
    jvmtiExtensionFunctionInfo, jvmtiParamInfo, jvmtiParamKind, jvmtiParamTypes,
};
use log::{debug, warn};
use serde::Serialize;
use std::ffi::{c_char, c_uchar, CStr};

/// One host extension descriptor whose memory this process now owns.
pub struct ExtensionDescriptor<'h, H: ExtensionHost + ?Sized> {
    host: &'h H,
    info: jvmtiExtensionFunctionInfo,
}

impl<'h, H: ExtensionHost + ?Sized> ExtensionDescriptor<'h, H> {
    /// Stable identifier, e.g. `com.android.art.classloader.add_to_dex_class_loader`.
    pub fn id(&self) -> Option<&CStr> {
        // SAFETY: host strings stay alive until this descriptor is dropped.
        unsafe { optional_cstr(self.info.id) }
    }

    pub fn short_description(&self) -> Option<&CStr> {
        // SAFETY: see `id`.
        unsafe { optional_cstr(self.info.short_description) }
    }

    /// Exact byte comparison against `id`.
    pub fn matches(&self, id: &CapabilityId) -> bool {
        self.id()
            .is_some_and(|own| own.to_bytes() == id.as_str().as_bytes())
    }

    pub fn params(&self) -> impl ExactSizeIterator<Item = ParamInfo<'_>> {
        self.raw_params().iter().map(|raw| ParamInfo { raw })
    }

    pub fn errors(&self) -> impl ExactSizeIterator<Item = JvmtiError> + '_ {
        // SAFETY: the host promises `error_count` initialized codes at `errors`.
        let codes = unsafe { host_slice(self.info.errors, self.info.error_count) };
        codes.iter().copied().map(JvmtiError)
    }

    /// Untyped entry point, `None` when the host registered a null function.
    pub fn raw_function(&self) -> Option<RawExtensionFn> {
        self.info.func.map(RawExtensionFn::new)
    }

    /// Copies metadata into an owned, serializable value.
    pub fn summary(&self) -> ExtensionSummary {
        ExtensionSummary {
            id: lossy(self.id()),
            short_description: lossy(self.short_description()),
            params: self
                .params()
                .map(|param| ParamSummary {
                    name: lossy(param.name()),
                    kind: param.kind(),
                    base_type: param.base_type(),
                    null_ok: param.null_ok(),
                })
                .collect(),
            errors: self.errors().map(JvmtiError::code).collect(),
        }
    }

    fn raw_params(&self) -> &[jvmtiParamInfo] {
        // SAFETY: the host promises `param_count` initialized entries at `params`.
        unsafe { host_slice(self.info.params, self.info.param_count) }
    }
}

impl<H: ExtensionHost + ?Sized> Drop for ExtensionDescriptor<'_, H> {
    fn drop(&mut self) {
        for param in self.raw_params() {
            release(self.host, param.name.cast(), "param_name");
        }
        release(self.host, self.info.id.cast(), "id");
        release(self.host, self.info.short_description.cast(), "short_description");
        release(self.host, self.info.params.cast(), "params");
        release(self.host, self.info.errors.cast(), "errors");
    }
}

/// Borrowed view of one parameter declaration.
#[derive(Debug, Clone, Copy)]
pub struct ParamInfo<'a> {
    raw: &'a jvmtiParamInfo,
}

impl<'a> ParamInfo<'a> {
    pub fn name(&self) -> Option<&'a CStr> {
        // SAFETY: parameter names live as long as the owning descriptor.
        unsafe { optional_cstr(self.raw.name) }
    }

    pub fn kind(&self) -> jvmtiParamKind {
        self.raw.kind
    }

    pub fn base_type(&self) -> jvmtiParamTypes {
        self.raw.base_type
    }

    pub fn null_ok(&self) -> bool {
        self.raw.null_ok != 0
    }
}

/// All descriptors from one enumeration call plus the table backing them.
pub struct ExtensionCatalog<'h, H: ExtensionHost + ?Sized> {
    host: &'h H,
    table: *mut jvmtiExtensionFunctionInfo,
    descriptors: Vec<ExtensionDescriptor<'h, H>>,
}

impl<'h, H: ExtensionHost + ?Sized> ExtensionCatalog<'h, H> {
    /// Queries the host afresh and takes ownership of the whole table.
    ///
    /// # Errors
    /// - `ExtensionError::Discovery` when the host enumeration call fails.
    pub fn enumerate(host: &'h H) -> ExtensionResult<Self> {
        let table = host.get_extension_functions().map_err(|err| {
            warn!("event=extension_enumerate module=catalog status=error error={err}");
            ExtensionError::Discovery(err)
        })?;

        let len = match usize::try_from(table.count) {
            Ok(len) if !table.entries.is_null() => len,
            Ok(0) => 0,
            Ok(len) => {
                warn!(
                    "event=extension_enumerate module=catalog status=warn reason=null_table count={len}"
                );
                0
            }
            Err(_) => {
                warn!(
                    "event=extension_enumerate module=catalog status=warn reason=negative_count count={}",
                    table.count
                );
                0
            }
        };

        // Constructed before reading entries so the table is released on every
        // path from here on.
        let mut catalog = Self {
            host,
            table: table.entries,
            descriptors: Vec::with_capacity(len),
        };
        for index in 0..len {
            // SAFETY: the host promises `count` initialized entries at `entries`.
            let info = unsafe { table.entries.add(index).read() };
            catalog.descriptors.push(ExtensionDescriptor { host, info });
        }

        debug!("event=extension_enumerate module=catalog status=ok entries={len}");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Descriptors in host enumeration order.
    pub fn iter(&self) -> std::slice::Iter<'_, ExtensionDescriptor<'h, H>> {
        self.descriptors.iter()
    }

    /// First descriptor in enumeration order whose identifier equals `id`.
    pub fn find(&self, id: &CapabilityId) -> Option<&ExtensionDescriptor<'h, H>> {
        self.descriptors.iter().find(|descriptor| descriptor.matches(id))
    }

    pub fn summaries(&self) -> Vec<ExtensionSummary> {
        self.descriptors.iter().map(ExtensionDescriptor::summary).collect()
    }
}

impl<H: ExtensionHost + ?Sized> Drop for ExtensionCatalog<'_, H> {
    fn drop(&mut self) {
        self.descriptors.clear();
        release(self.host, self.table.cast(), "table");
    }
}

/// Owned metadata for one extension function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionSummary {
    pub id: String,
    pub short_description: String,
    pub params: Vec<ParamSummary>,
    pub errors: Vec<u32>,
}

/// Owned metadata for one extension parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamSummary {
    pub name: String,
    pub kind: u32,
    pub base_type: u32,
    pub null_ok: bool,
}

fn release<H: ExtensionHost + ?Sized>(host: &H, mem: *mut c_uchar, field: &'static str) {
    if mem.is_null() {
        return;
    }
    // SAFETY: every pointer passed here came from the host table and is
    // released from exactly one place (descriptor or catalog drop).
    if let Err(err) = unsafe { host.deallocate(mem) } {
        warn!("event=extension_release module=catalog status=error field={field} error={err}");
    }
}

/// # Safety
/// `ptr` must be null or point to a NUL-terminated string valid for `'a`.
unsafe fn optional_cstr<'a>(ptr: *const c_char) -> Option<&'a CStr> {
    if ptr.is_null() {
        None
    } else {
        Some(CStr::from_ptr(ptr))
    }
}

/// # Safety
/// `ptr` must be null or point to `count` initialized values valid for `'a`.
unsafe fn host_slice<'a, T>(ptr: *const T, count: i32) -> &'a [T] {
    match usize::try_from(count) {
        Ok(len) if len > 0 && !ptr.is_null() => std::slice::from_raw_parts(ptr, len),
        _ => &[],
    }
}

fn lossy(value: Option<&CStr>) -> String {
    value
        .map(|value| value.to_string_lossy().into_owned())
        .unwrap_or_default()
}
