//! Minimal JNI bindings.
//!
//! Only the function-table slots this workspace calls are named; the rest are
//! reserved padding so every named slot sits at its `jni.h` index. Tables are
//! only ever read through pointers handed out by the VM, so the truncated
//! tail is never observed.

#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

use std::ffi::{c_char, c_void};

pub type jint = i32;
pub type jboolean = u8;

pub type jobject = *mut c_void;
pub type jclass = jobject;
pub type jstring = jobject;

pub const JNI_OK: jint = 0;
pub const JNI_TRUE: jboolean = 1;

pub const JNI_VERSION_1_6: jint = 0x0001_0006;

type Reserved = *mut c_void;

/// Prefix of `JNINativeInterface_` up to `ExceptionCheck` (slot 228).
#[repr(C)]
pub struct JNINativeInterface_ {
    _slots_0_5: [Reserved; 6],
    /// 6
    pub FindClass: unsafe extern "system" fn(env: *mut JNIEnv, name: *const c_char) -> jclass,
    _slots_7_13: [Reserved; 7],
    /// 14
    pub ThrowNew:
        unsafe extern "system" fn(env: *mut JNIEnv, clazz: jclass, msg: *const c_char) -> jint,
    _slots_15_166: [Reserved; 152],
    /// 167
    pub NewStringUTF: unsafe extern "system" fn(env: *mut JNIEnv, utf: *const c_char) -> jstring,
    _slot_168: Reserved,
    /// 169
    pub GetStringUTFChars: unsafe extern "system" fn(
        env: *mut JNIEnv,
        str: jstring,
        isCopy: *mut jboolean,
    ) -> *const c_char,
    /// 170
    pub ReleaseStringUTFChars:
        unsafe extern "system" fn(env: *mut JNIEnv, str: jstring, chars: *const c_char),
    _slots_171_227: [Reserved; 57],
    /// 228
    pub ExceptionCheck: unsafe extern "system" fn(env: *mut JNIEnv) -> jboolean,
}

/// C definition: `typedef const struct JNINativeInterface_ *JNIEnv;`
pub type JNIEnv = *const JNINativeInterface_;

/// Prefix of `JNIInvokeInterface_` up to `GetEnv` (slot 6).
#[repr(C)]
pub struct JNIInvokeInterface_ {
    _slots_0_5: [Reserved; 6],
    /// 6
    pub GetEnv:
        unsafe extern "system" fn(vm: *mut JavaVM, penv: *mut *mut c_void, version: jint) -> jint,
}

/// C definition: `typedef const struct JNIInvokeInterface_ *JavaVM;`
pub type JavaVM = *const JNIInvokeInterface_;
