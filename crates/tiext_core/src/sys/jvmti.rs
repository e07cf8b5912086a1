//! Minimal JVMTI bindings for extension-function discovery.
//!
//! `jvmtiInterface_1` numbers its functions from 1 (`reserved1`), so the
//! function documented as number N lives at field index N - 1.

#![allow(non_camel_case_types)]
#![allow(non_upper_case_globals)]
#![allow(non_snake_case)]

use crate::sys::jni::{jboolean, jint};
use std::ffi::{c_char, c_uchar, c_void};

pub type jvmtiError = u32;
pub type jvmtiParamKind = u32;
pub type jvmtiParamTypes = u32;

pub const JVMTI_VERSION_1_2: jint = 0x3001_0200;
/// ART hands out a full-capability environment only for this version.
pub const ART_TI_VERSION: jint = JVMTI_VERSION_1_2 | 0x4000_0000;

pub const JVMTI_ERROR_NONE: jvmtiError = 0;
pub const JVMTI_ERROR_INVALID_THREAD: jvmtiError = 10;
pub const JVMTI_ERROR_INVALID_OBJECT: jvmtiError = 20;
pub const JVMTI_ERROR_INVALID_CLASS: jvmtiError = 21;
pub const JVMTI_ERROR_NOT_FOUND: jvmtiError = 41;
pub const JVMTI_ERROR_INVALID_CLASS_FORMAT: jvmtiError = 60;
pub const JVMTI_ERROR_UNSUPPORTED_VERSION: jvmtiError = 68;
pub const JVMTI_ERROR_NOT_AVAILABLE: jvmtiError = 98;
pub const JVMTI_ERROR_MUST_POSSESS_CAPABILITY: jvmtiError = 99;
pub const JVMTI_ERROR_NULL_POINTER: jvmtiError = 100;
pub const JVMTI_ERROR_ABSENT_INFORMATION: jvmtiError = 101;
pub const JVMTI_ERROR_ILLEGAL_ARGUMENT: jvmtiError = 103;
pub const JVMTI_ERROR_CLASS_LOADER_UNSUPPORTED: jvmtiError = 106;
pub const JVMTI_ERROR_OUT_OF_MEMORY: jvmtiError = 110;
pub const JVMTI_ERROR_ACCESS_DENIED: jvmtiError = 111;
pub const JVMTI_ERROR_WRONG_PHASE: jvmtiError = 112;
pub const JVMTI_ERROR_INTERNAL: jvmtiError = 113;
pub const JVMTI_ERROR_UNATTACHED_THREAD: jvmtiError = 115;
pub const JVMTI_ERROR_INVALID_ENVIRONMENT: jvmtiError = 116;

pub const JVMTI_KIND_IN_PTR: jvmtiParamKind = 92;
pub const JVMTI_TYPE_CCHAR: jvmtiParamTypes = 115;

/// `jvmtiError (JNICALL *)(jvmtiEnv*, ...)`. Varargs force the C convention.
pub type jvmtiExtensionFunction =
    Option<unsafe extern "C" fn(jvmti_env: *mut jvmtiEnv, ...) -> jvmtiError>;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct jvmtiParamInfo {
    pub name: *mut c_char,
    pub kind: jvmtiParamKind,
    pub base_type: jvmtiParamTypes,
    pub null_ok: jboolean,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct jvmtiExtensionFunctionInfo {
    pub func: jvmtiExtensionFunction,
    pub id: *mut c_char,
    pub short_description: *mut c_char,
    pub param_count: jint,
    pub params: *mut jvmtiParamInfo,
    pub error_count: jint,
    pub errors: *mut jvmtiError,
}

type Reserved = *mut c_void;

/// Prefix of `jvmtiInterface_1` up to `GetExtensionFunctions` (function 124).
#[repr(C)]
pub struct jvmtiInterface_1 {
    _functions_1_46: [Reserved; 46],
    /// 47
    pub Deallocate: unsafe extern "system" fn(env: *mut jvmtiEnv, mem: *mut c_uchar) -> jvmtiError,
    _functions_48_123: [Reserved; 76],
    /// 124
    pub GetExtensionFunctions: unsafe extern "system" fn(
        env: *mut jvmtiEnv,
        extension_count_ptr: *mut jint,
        extensions: *mut *mut jvmtiExtensionFunctionInfo,
    ) -> jvmtiError,
}

/// C definition: `typedef const struct jvmtiInterface_1_ *jvmtiEnv;`
pub type jvmtiEnv = *const jvmtiInterface_1;
