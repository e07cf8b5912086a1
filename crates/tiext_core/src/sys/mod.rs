//! Raw JNI/JVMTI declarations.
//!
//! # Invariants
//! - Layouts mirror `jni.h`/`jvmti.h`; slot offsets are asserted in tests.
//! - Nothing here allocates or frees; ownership rules live in `catalog`.

pub mod jni;
pub mod jvmti;
