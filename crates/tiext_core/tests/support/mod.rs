#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ffi::{c_char, c_uchar, c_void, CStr, CString};
use std::mem::size_of;
use std::ptr;
use std::sync::Mutex;
use tiext_core::extension::function::{AddToDexClassLoaderFn, VariadicExtensionFn};
use tiext_core::sys::jni::{jint, jobject};
use tiext_core::sys::jvmti::{
    jvmtiEnv, jvmtiError, jvmtiExtensionFunction, jvmtiExtensionFunctionInfo, jvmtiParamInfo,
    JVMTI_ERROR_ILLEGAL_ARGUMENT, JVMTI_ERROR_INTERNAL, JVMTI_ERROR_NONE,
    JVMTI_ERROR_WRONG_PHASE, JVMTI_KIND_IN_PTR, JVMTI_TYPE_CCHAR,
};
use tiext_core::{ExtensionHost, JvmtiError, RawExtensionTable};

/// Which field of the extension table an allocation backs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllocKind {
    Table,
    Id,
    Description,
    ParamName,
    Params,
    Errors,
}

/// Declarative description of one extension the fake host exposes.
#[derive(Clone)]
pub struct FakeExtension {
    pub id: String,
    pub description: Option<String>,
    pub params: Vec<String>,
    pub errors: Vec<jvmtiError>,
    pub func: jvmtiExtensionFunction,
}

impl FakeExtension {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            description: Some(format!("fake extension {id}")),
            params: Vec::new(),
            errors: Vec::new(),
            func: Some(variadic(record_segment)),
        }
    }

    pub fn with_params(mut self, names: &[&str]) -> Self {
        self.params = names.iter().map(|name| name.to_string()).collect();
        self
    }

    pub fn with_errors(mut self, errors: &[jvmtiError]) -> Self {
        self.errors = errors.to_vec();
        self
    }

    pub fn with_func(mut self, func: AddToDexClassLoaderFn) -> Self {
        self.func = Some(variadic(func));
        self
    }

    pub fn without_func(mut self) -> Self {
        self.func = None;
        self
    }

    /// Publishes a null `short_description`.
    pub fn without_description(mut self) -> Self {
        self.description = None;
        self
    }
}

/// Fake host that allocates its table with `libc` and records every release.
pub struct RecordingHost {
    extensions: Vec<FakeExtension>,
    failure: Option<jvmtiError>,
    count_override: Option<jint>,
    null_table: bool,
    fail_release_at: Option<usize>,
    release_attempts: Cell<usize>,
    failed_releases: Cell<usize>,
    live: RefCell<HashMap<usize, AllocKind>>,
    allocated: RefCell<Vec<AllocKind>>,
    released: RefCell<Vec<AllocKind>>,
    bogus_releases: Cell<usize>,
    enumerations: Cell<usize>,
}

impl RecordingHost {
    pub fn new(extensions: Vec<FakeExtension>) -> Self {
        Self {
            extensions,
            failure: None,
            count_override: None,
            null_table: false,
            fail_release_at: None,
            release_attempts: Cell::new(0),
            failed_releases: Cell::new(0),
            live: RefCell::new(HashMap::new()),
            allocated: RefCell::new(Vec::new()),
            released: RefCell::new(Vec::new()),
            bogus_releases: Cell::new(0),
            enumerations: Cell::new(0),
        }
    }

    pub fn with_ids(ids: &[&str]) -> Self {
        Self::new(ids.iter().map(|id| FakeExtension::new(id)).collect())
    }

    /// Host whose enumeration call always fails with `code`.
    pub fn failing(code: jvmtiError) -> Self {
        let mut host = Self::new(vec![FakeExtension::new("com.example.unreachable")]);
        host.failure = Some(code);
        host
    }

    /// Reports `count` instead of the real number of entries.
    pub fn reporting_count(mut self, count: jint) -> Self {
        self.count_override = Some(count);
        self
    }

    /// Returns a null table while still reporting `count` entries.
    pub fn with_null_table(mut self, count: jint) -> Self {
        self.null_table = true;
        self.count_override = Some(count);
        self
    }

    /// Makes the `nth` (1-based) release call fail without freeing.
    pub fn failing_release_at(mut self, nth: usize) -> Self {
        self.fail_release_at = Some(nth);
        self
    }

    pub fn release_attempts(&self) -> usize {
        self.release_attempts.get()
    }

    pub fn failed_releases(&self) -> usize {
        self.failed_releases.get()
    }

    pub fn released(&self, kind: AllocKind) -> usize {
        self.released.borrow().iter().filter(|k| **k == kind).count()
    }

    pub fn allocated(&self, kind: AllocKind) -> usize {
        self.allocated.borrow().iter().filter(|k| **k == kind).count()
    }

    pub fn total_released(&self) -> usize {
        self.released.borrow().len()
    }

    pub fn total_allocated(&self) -> usize {
        self.allocated.borrow().len()
    }

    /// Allocations handed out and not yet released.
    pub fn outstanding(&self) -> usize {
        self.live.borrow().len()
    }

    /// Releases of pointers this host never handed out or already freed.
    pub fn bogus_releases(&self) -> usize {
        self.bogus_releases.get()
    }

    pub fn enumerations(&self) -> usize {
        self.enumerations.get()
    }

    fn alloc_bytes(&self, size: usize, kind: AllocKind) -> *mut c_uchar {
        // SAFETY: plain C allocation; zero-sized requests still get a unique block.
        let mem = unsafe { libc::calloc(1, size.max(1)) }.cast::<c_uchar>();
        assert!(!mem.is_null(), "calloc failed");
        self.live.borrow_mut().insert(mem as usize, kind);
        self.allocated.borrow_mut().push(kind);
        mem
    }

    fn alloc_str(&self, value: &str, kind: AllocKind) -> *mut c_char {
        let value = CString::new(value).expect("fake strings have no NUL");
        let bytes = value.as_bytes_with_nul();
        let mem = self.alloc_bytes(bytes.len(), kind);
        // SAFETY: `mem` holds at least `bytes.len()` bytes.
        unsafe { ptr::copy_nonoverlapping(bytes.as_ptr(), mem, bytes.len()) };
        mem.cast()
    }

    fn alloc_array<T: Copy>(&self, values: &[T], kind: AllocKind) -> *mut T {
        let mem = self
            .alloc_bytes(size_of::<T>() * values.len(), kind)
            .cast::<T>();
        // SAFETY: calloc memory is suitably aligned and large enough.
        unsafe { ptr::copy_nonoverlapping(values.as_ptr(), mem, values.len()) };
        mem
    }
}

impl ExtensionHost for RecordingHost {
    fn raw_env(&self) -> *mut jvmtiEnv {
        ptr::null_mut()
    }

    fn get_extension_functions(&self) -> Result<RawExtensionTable, JvmtiError> {
        self.enumerations.set(self.enumerations.get() + 1);
        if let Some(code) = self.failure {
            return Err(JvmtiError(code));
        }
        if self.null_table {
            return Ok(RawExtensionTable {
                count: self.count_override.unwrap_or(0),
                entries: ptr::null_mut(),
            });
        }

        let infos = self
            .extensions
            .iter()
            .map(|ext| {
                let params = ext
                    .params
                    .iter()
                    .map(|name| jvmtiParamInfo {
                        name: self.alloc_str(name, AllocKind::ParamName),
                        kind: JVMTI_KIND_IN_PTR,
                        base_type: JVMTI_TYPE_CCHAR,
                        null_ok: 0,
                    })
                    .collect::<Vec<_>>();
                jvmtiExtensionFunctionInfo {
                    func: ext.func,
                    id: self.alloc_str(&ext.id, AllocKind::Id),
                    short_description: match &ext.description {
                        Some(text) => self.alloc_str(text, AllocKind::Description),
                        None => ptr::null_mut(),
                    },
                    param_count: params.len() as jint,
                    params: self.alloc_array(&params, AllocKind::Params),
                    error_count: ext.errors.len() as jint,
                    errors: self.alloc_array(&ext.errors, AllocKind::Errors),
                }
            })
            .collect::<Vec<_>>();

        Ok(RawExtensionTable {
            count: self.count_override.unwrap_or(infos.len() as jint),
            entries: self.alloc_array(&infos, AllocKind::Table),
        })
    }

    unsafe fn deallocate(&self, mem: *mut c_uchar) -> Result<(), JvmtiError> {
        let attempt = self.release_attempts.get() + 1;
        self.release_attempts.set(attempt);
        if self.fail_release_at == Some(attempt) {
            self.failed_releases.set(self.failed_releases.get() + 1);
            return Err(JvmtiError(JVMTI_ERROR_INTERNAL));
        }
        let kind = self.live.borrow_mut().remove(&(mem as usize));
        match kind {
            Some(kind) => {
                self.released.borrow_mut().push(kind);
                libc::free(mem.cast::<c_void>());
                Ok(())
            }
            None => {
                self.bogus_releases.set(self.bogus_releases.get() + 1);
                Err(JvmtiError(JVMTI_ERROR_ILLEGAL_ARGUMENT))
            }
        }
    }
}

impl Drop for RecordingHost {
    fn drop(&mut self) {
        for (&addr, _) in self.live.borrow().iter() {
            // SAFETY: every live entry came from `calloc` and was not freed.
            unsafe { libc::free(addr as *mut c_void) };
        }
    }
}

static SEGMENTS: Mutex<Vec<String>> = Mutex::new(Vec::new());

/// Records the segment; segments ending in `.rejected` fail.
pub unsafe extern "C" fn record_segment(
    _env: *mut jvmtiEnv,
    _loader: jobject,
    segment: *const c_char,
) -> jvmtiError {
    let segment = CStr::from_ptr(segment).to_string_lossy().into_owned();
    let rejected = segment.ends_with(".rejected");
    SEGMENTS.lock().expect("segments lock").push(segment);
    if rejected {
        JVMTI_ERROR_ILLEGAL_ARGUMENT
    } else {
        JVMTI_ERROR_NONE
    }
}

pub unsafe extern "C" fn fail_internal(
    _env: *mut jvmtiEnv,
    _loader: jobject,
    _segment: *const c_char,
) -> jvmtiError {
    JVMTI_ERROR_INTERNAL
}

pub unsafe extern "C" fn fail_wrong_phase(
    _env: *mut jvmtiEnv,
    _loader: jobject,
    _segment: *const c_char,
) -> jvmtiError {
    JVMTI_ERROR_WRONG_PHASE
}

/// Segments passed to [`record_segment`] so far, across all tests in the binary.
pub fn recorded_segments() -> Vec<String> {
    SEGMENTS.lock().expect("segments lock").clone()
}

pub fn variadic(func: AddToDexClassLoaderFn) -> VariadicExtensionFn {
    // SAFETY: identical representation; callers only invoke it with the
    // three-argument signature after `AddToDexClassLoader::from_raw`.
    unsafe { std::mem::transmute::<AddToDexClassLoaderFn, VariadicExtensionFn>(func) }
}

pub fn address_of(func: AddToDexClassLoaderFn) -> *const c_void {
    func as *const c_void
}
