//! JNI entry points for the Java test harness.
//!
//! # Responsibility
//! - Capture the process JVMTI environment when the library is loaded.
//! - Expose extension dispatch and listing to `Main` native methods.
//!
//! # Invariants
//! - Exported functions never unwind into the VM.
//! - Every failure reaches Java as a thrown exception, never a silent return.

#![allow(non_snake_case)]

use crate::jni_support::{
    new_string_utf, throw_new, Utf8Chars, ILLEGAL_STATE_EXCEPTION, NULL_POINTER_EXCEPTION,
    RUNTIME_EXCEPTION,
};
use log::{error, info, warn};
use once_cell::sync::OnceCell;
use std::ffi::{c_char, c_void, CStr};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;
use tiext_core::logging::init_from_config;
use tiext_core::sys::jni::{
    jclass, jint, jobject, jstring, JNIEnv, JavaVM, JNI_OK, JNI_VERSION_1_6,
};
use tiext_core::sys::jvmti::jvmtiEnv;
use tiext_core::{ExtensionError, ExtensionService, JvmtiHost, RuntimeConfig};

static JVMTI_HOST: OnceCell<SharedHost> = OnceCell::new();

struct SharedHost(JvmtiHost);

// SAFETY: a jvmtiEnv may be used from any thread; it is written once here
// and only read afterwards.
unsafe impl Send for SharedHost {}
unsafe impl Sync for SharedHost {}

/// Failure of one exported call, mapped to a Java exception.
#[derive(Debug)]
enum CallFailure {
    /// No JVMTI environment was captured at load time.
    NoEnvironment,
    NullArgument(&'static str),
    /// The VM already has an exception pending for this thread.
    ExceptionPending,
    Extension(ExtensionError),
    /// The extension listing could not be rendered as JSON.
    Serialization(String),
}

impl From<ExtensionError> for CallFailure {
    fn from(value: ExtensionError) -> Self {
        Self::Extension(value)
    }
}

/// Installs an environment obtained by the embedding harness.
///
/// Returns `false` when `env` is null or an environment is already installed.
///
/// # Safety
/// `env` must be a JVMTI environment valid for the rest of the process.
pub unsafe fn install_jvmti_env(env: *mut jvmtiEnv) -> bool {
    match JvmtiHost::from_raw(env) {
        Some(host) => JVMTI_HOST.set(SharedHost(host)).is_ok(),
        None => false,
    }
}

/// Host captured at load time, if any.
pub fn jvmti_host() -> Option<JvmtiHost> {
    JVMTI_HOST.get().map(|shared| shared.0)
}

/// # Safety
/// Called by the VM with its own `JavaVM*`.
#[no_mangle]
pub unsafe extern "system" fn JNI_OnLoad(vm: *mut JavaVM, _reserved: *mut c_void) -> jint {
    if catch_unwind(AssertUnwindSafe(|| on_load(vm))).is_err() {
        error!("event=library_load module=ffi status=error reason=panic");
    }
    JNI_VERSION_1_6
}

/// # Safety
/// Called by the VM with its own `JavaVM*`.
#[no_mangle]
pub unsafe extern "system" fn Agent_OnLoad(
    vm: *mut JavaVM,
    _options: *mut c_char,
    _reserved: *mut c_void,
) -> jint {
    if catch_unwind(AssertUnwindSafe(|| on_load(vm))).is_err() {
        error!("event=agent_load module=ffi status=error reason=panic");
    }
    JNI_OK
}

/// # Safety
/// Called by the VM with its own `JavaVM*`.
#[no_mangle]
pub unsafe extern "system" fn Agent_OnAttach(
    vm: *mut JavaVM,
    options: *mut c_char,
    reserved: *mut c_void,
) -> jint {
    Agent_OnLoad(vm, options, reserved)
}

/// `static native void addToClassLoaderNative(ClassLoader loader, String segment)`.
///
/// # Safety
/// Called by the VM on an attached thread with live local references.
#[no_mangle]
pub unsafe extern "system" fn Java_Main_addToClassLoaderNative(
    env: *mut JNIEnv,
    _class: jclass,
    loader: jobject,
    segment: jstring,
) {
    let outcome = catch_unwind(AssertUnwindSafe(|| add_to_class_loader(env, loader, segment)));
    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(failure)) => throw_failure(env, failure),
        Err(_) => throw_new(env, RUNTIME_EXCEPTION, "panic in addToClassLoaderNative"),
    }
}

/// `static native String listExtensionsNative()`: JSON array of extension metadata.
///
/// # Safety
/// Called by the VM on an attached thread.
#[no_mangle]
pub unsafe extern "system" fn Java_Main_listExtensionsNative(
    env: *mut JNIEnv,
    _class: jclass,
) -> jstring {
    let outcome = catch_unwind(AssertUnwindSafe(list_extensions_json));
    match outcome {
        Ok(Ok(json)) => new_string_utf(env, &json),
        Ok(Err(failure)) => {
            throw_failure(env, failure);
            ptr::null_mut()
        }
        Err(_) => {
            throw_new(env, RUNTIME_EXCEPTION, "panic in listExtensionsNative");
            ptr::null_mut()
        }
    }
}

unsafe fn on_load(vm: *mut JavaVM) {
    let config = RuntimeConfig::from_env();
    if let Err(err) = init_from_config(&config) {
        eprintln!("tiext: logging disabled: {err}");
    }

    if JVMTI_HOST.get().is_some() {
        return;
    }
    let get_env = (**vm).GetEnv;
    for &version in &config.jvmti_versions {
        let mut env: *mut c_void = ptr::null_mut();
        if get_env(vm, &mut env, version) != JNI_OK {
            continue;
        }
        if install_jvmti_env(env.cast()) {
            info!("event=library_load module=ffi status=ok jvmti_version={version:#x}");
        }
        return;
    }
    warn!("event=library_load module=ffi status=warn reason=no_jvmti_env");
}

unsafe fn add_to_class_loader(
    env: *mut JNIEnv,
    loader: jobject,
    segment: jstring,
) -> Result<(), CallFailure> {
    let host = jvmti_host().ok_or(CallFailure::NoEnvironment)?;
    if segment.is_null() {
        return Err(CallFailure::NullArgument("segment"));
    }
    let chars = Utf8Chars::new(env, segment).ok_or(CallFailure::ExceptionPending)?;
    let service = ExtensionService::new(host);
    service.add_to_dex_class_loader(loader, chars.as_c_str())?;
    Ok(())
}

fn list_extensions_json() -> Result<String, CallFailure> {
    let host = jvmti_host().ok_or(CallFailure::NoEnvironment)?;
    let summaries = ExtensionService::new(host).list_extensions()?;
    serde_json::to_string(&summaries).map_err(|err| CallFailure::Serialization(err.to_string()))
}

unsafe fn throw_failure(env: *mut JNIEnv, failure: CallFailure) {
    let (class, message) = failure_exception(&failure);
    if let Some(class) = class {
        throw_new(env, class, &message);
    }
}

fn failure_exception(failure: &CallFailure) -> (Option<&'static CStr>, String) {
    match failure {
        CallFailure::NoEnvironment => (
            Some(ILLEGAL_STATE_EXCEPTION),
            "no JVMTI environment; library was not loaded through JNI_OnLoad or Agent_OnLoad"
                .to_string(),
        ),
        CallFailure::NullArgument(name) => {
            (Some(NULL_POINTER_EXCEPTION), format!("{name} must not be null"))
        }
        CallFailure::ExceptionPending => (None, String::new()),
        CallFailure::Extension(err @ ExtensionError::NotFound(_)) => (
            Some(RUNTIME_EXCEPTION),
            format!("Failed to find extension function: {err}"),
        ),
        CallFailure::Extension(err) => (Some(RUNTIME_EXCEPTION), err.to_string()),
        CallFailure::Serialization(reason) => (
            Some(RUNTIME_EXCEPTION),
            format!("failed to encode extension listing: {reason}"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{failure_exception, CallFailure};
    use tiext_core::sys::jvmti::JVMTI_ERROR_ILLEGAL_ARGUMENT;
    use tiext_core::{ExtensionError, JvmtiError, ADD_TO_DEX_CLASS_LOADER};

    #[test]
    fn not_found_maps_to_runtime_exception_naming_extension() {
        let failure =
            CallFailure::Extension(ExtensionError::NotFound(ADD_TO_DEX_CLASS_LOADER.to_string()));
        let (class, message) = failure_exception(&failure);
        assert_eq!(
            class.map(|c| c.to_str().expect("utf-8")),
            Some("java/lang/RuntimeException")
        );
        assert!(message.starts_with("Failed to find extension function"));
        assert!(message.contains(ADD_TO_DEX_CLASS_LOADER));
    }

    #[test]
    fn invocation_failure_message_carries_host_code() {
        let failure = CallFailure::Extension(ExtensionError::Invocation {
            id: ADD_TO_DEX_CLASS_LOADER.to_string(),
            error: JvmtiError(JVMTI_ERROR_ILLEGAL_ARGUMENT),
        });
        let (_, message) = failure_exception(&failure);
        assert!(message.contains("JVMTI_ERROR_ILLEGAL_ARGUMENT (103)"));
    }

    #[test]
    fn missing_environment_is_illegal_state() {
        let (class, _) = failure_exception(&CallFailure::NoEnvironment);
        assert_eq!(
            class.map(|c| c.to_str().expect("utf-8")),
            Some("java/lang/IllegalStateException")
        );
    }

    #[test]
    fn pending_exception_throws_nothing_new() {
        let (class, _) = failure_exception(&CallFailure::ExceptionPending);
        assert!(class.is_none());
    }

    #[test]
    fn listing_encode_failure_is_thrown_not_swallowed() {
        let failure = CallFailure::Serialization("key must be a string".to_string());
        let (class, message) = failure_exception(&failure);
        assert_eq!(
            class.map(|c| c.to_str().expect("utf-8")),
            Some("java/lang/RuntimeException")
        );
        assert!(message.contains("key must be a string"));
    }

    #[test]
    fn listing_without_environment_fails_instead_of_returning_empty_json() {
        assert!(matches!(
            super::list_extensions_json(),
            Err(CallFailure::NoEnvironment)
        ));
    }

    #[test]
    fn host_is_absent_until_installed() {
        assert!(super::jvmti_host().is_none());
        assert!(!unsafe { super::install_jvmti_env(std::ptr::null_mut()) });
    }
}
