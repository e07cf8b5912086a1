//! Small JNI helpers for the exported entry points.
//!
//! # Invariants
//! - Pinned UTF chars are released exactly once, on drop.
//! - Nothing is thrown while another exception is already pending.

use std::ffi::{c_char, CStr, CString};
use std::ptr;
use tiext_core::sys::jni::{jstring, JNIEnv, JNI_TRUE};

pub const RUNTIME_EXCEPTION: &CStr = c"java/lang/RuntimeException";
pub const ILLEGAL_STATE_EXCEPTION: &CStr = c"java/lang/IllegalStateException";
pub const NULL_POINTER_EXCEPTION: &CStr = c"java/lang/NullPointerException";

/// Modified-UTF-8 contents of a Java string, pinned until drop.
pub struct Utf8Chars {
    env: *mut JNIEnv,
    string: jstring,
    chars: *const c_char,
}

impl Utf8Chars {
    /// Pins `string`.
    ///
    /// Returns `None` when the VM could not produce the chars; an exception
    /// is then pending in `env`.
    ///
    /// # Safety
    /// `env` must be the current thread's JNI environment and `string` a live,
    /// non-null `java.lang.String` reference.
    pub unsafe fn new(env: *mut JNIEnv, string: jstring) -> Option<Self> {
        let get_chars = (**env).GetStringUTFChars;
        let chars = get_chars(env, string, ptr::null_mut());
        if chars.is_null() {
            return None;
        }
        Some(Self { env, string, chars })
    }

    pub fn as_c_str(&self) -> &CStr {
        // SAFETY: JNI returns a NUL-terminated buffer that stays valid until release.
        unsafe { CStr::from_ptr(self.chars) }
    }
}

impl Drop for Utf8Chars {
    fn drop(&mut self) {
        // SAFETY: `chars` came from `GetStringUTFChars` on the same string.
        unsafe {
            let release = (**self.env).ReleaseStringUTFChars;
            release(self.env, self.string, self.chars);
        }
    }
}

/// # Safety
/// `env` must be the current thread's JNI environment.
pub unsafe fn exception_pending(env: *mut JNIEnv) -> bool {
    let check = (**env).ExceptionCheck;
    check(env) == JNI_TRUE
}

/// Throws a new `class_name` with `message` unless an exception is pending.
///
/// # Safety
/// `env` must be the current thread's JNI environment.
pub unsafe fn throw_new(env: *mut JNIEnv, class_name: &CStr, message: &str) {
    if exception_pending(env) {
        return;
    }
    let find_class = (**env).FindClass;
    let class = find_class(env, class_name.as_ptr());
    if class.is_null() {
        // NoClassDefFoundError is pending.
        return;
    }
    let message = to_c_string(message);
    let throw = (**env).ThrowNew;
    throw(env, class, message.as_ptr());
}

/// Creates a Java string, or null with an exception pending.
///
/// # Safety
/// `env` must be the current thread's JNI environment.
pub unsafe fn new_string_utf(env: *mut JNIEnv, value: &str) -> jstring {
    let value = to_c_string(value);
    let new_string = (**env).NewStringUTF;
    new_string(env, value.as_ptr())
}

fn to_c_string(value: &str) -> CString {
    CString::new(value.replace('\0', " ")).unwrap_or_default()
}
