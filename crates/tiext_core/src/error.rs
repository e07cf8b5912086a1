//! Error taxonomy for extension discovery and dispatch.
//!
//! # Invariants
//! - Discovery failure and "no such extension" are distinct variants.
//! - Host status codes are carried unchanged for diagnostics.

use crate::sys::jvmti::{self, jvmtiError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ExtensionResult<T> = Result<T, ExtensionError>;

/// Raw JVMTI status code returned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JvmtiError(pub jvmtiError);

impl JvmtiError {
    pub const NONE: Self = Self(jvmti::JVMTI_ERROR_NONE);

    /// Maps a raw status to `Ok(())` or the failing code.
    pub fn check(raw: jvmtiError) -> Result<(), Self> {
        if raw == jvmti::JVMTI_ERROR_NONE {
            Ok(())
        } else {
            Err(Self(raw))
        }
    }

    pub fn code(self) -> jvmtiError {
        self.0
    }

    /// Symbolic `JVMTI_ERROR_*` name, or `None` for codes this crate does not know.
    pub fn name(self) -> Option<&'static str> {
        let name = match self.0 {
            jvmti::JVMTI_ERROR_NONE => "JVMTI_ERROR_NONE",
            jvmti::JVMTI_ERROR_INVALID_THREAD => "JVMTI_ERROR_INVALID_THREAD",
            jvmti::JVMTI_ERROR_INVALID_OBJECT => "JVMTI_ERROR_INVALID_OBJECT",
            jvmti::JVMTI_ERROR_INVALID_CLASS => "JVMTI_ERROR_INVALID_CLASS",
            jvmti::JVMTI_ERROR_NOT_FOUND => "JVMTI_ERROR_NOT_FOUND",
            jvmti::JVMTI_ERROR_INVALID_CLASS_FORMAT => "JVMTI_ERROR_INVALID_CLASS_FORMAT",
            jvmti::JVMTI_ERROR_UNSUPPORTED_VERSION => "JVMTI_ERROR_UNSUPPORTED_VERSION",
            jvmti::JVMTI_ERROR_NOT_AVAILABLE => "JVMTI_ERROR_NOT_AVAILABLE",
            jvmti::JVMTI_ERROR_MUST_POSSESS_CAPABILITY => "JVMTI_ERROR_MUST_POSSESS_CAPABILITY",
            jvmti::JVMTI_ERROR_NULL_POINTER => "JVMTI_ERROR_NULL_POINTER",
            jvmti::JVMTI_ERROR_ABSENT_INFORMATION => "JVMTI_ERROR_ABSENT_INFORMATION",
            jvmti::JVMTI_ERROR_ILLEGAL_ARGUMENT => "JVMTI_ERROR_ILLEGAL_ARGUMENT",
            jvmti::JVMTI_ERROR_CLASS_LOADER_UNSUPPORTED => "JVMTI_ERROR_CLASS_LOADER_UNSUPPORTED",
            jvmti::JVMTI_ERROR_OUT_OF_MEMORY => "JVMTI_ERROR_OUT_OF_MEMORY",
            jvmti::JVMTI_ERROR_ACCESS_DENIED => "JVMTI_ERROR_ACCESS_DENIED",
            jvmti::JVMTI_ERROR_WRONG_PHASE => "JVMTI_ERROR_WRONG_PHASE",
            jvmti::JVMTI_ERROR_INTERNAL => "JVMTI_ERROR_INTERNAL",
            jvmti::JVMTI_ERROR_UNATTACHED_THREAD => "JVMTI_ERROR_UNATTACHED_THREAD",
            jvmti::JVMTI_ERROR_INVALID_ENVIRONMENT => "JVMTI_ERROR_INVALID_ENVIRONMENT",
            _ => return None,
        };
        Some(name)
    }
}

impl Display for JvmtiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} ({})", self.0),
            None => write!(f, "unknown JVMTI error ({})", self.0),
        }
    }
}

impl Error for JvmtiError {}

/// Failures surfaced by extension resolution and dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionError {
    /// Requested identifier can never match a host C string.
    InvalidId(String),
    /// The host's extension enumeration call failed.
    Discovery(JvmtiError),
    /// Enumeration succeeded but no descriptor carried this identifier.
    NotFound(String),
    /// The extension ran and reported a non-success status.
    Invocation { id: String, error: JvmtiError },
}

impl ExtensionError {
    /// Host status code, when the failure originated in the host.
    pub fn host_status(&self) -> Option<JvmtiError> {
        match self {
            Self::Discovery(error) | Self::Invocation { error, .. } => Some(*error),
            Self::InvalidId(_) | Self::NotFound(_) => None,
        }
    }
}

impl Display for ExtensionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId(value) => write!(f, "invalid extension id: {value:?}"),
            Self::Discovery(err) => write!(f, "extension discovery failed: {err}"),
            Self::NotFound(id) => write!(f, "extension function not found: {id}"),
            Self::Invocation { id, error } => {
                write!(f, "extension function `{id}` failed: {error}")
            }
        }
    }
}

impl Error for ExtensionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Discovery(err) => Some(err),
            Self::Invocation { error, .. } => Some(error),
            Self::InvalidId(_) | Self::NotFound(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ExtensionError, JvmtiError};
    use crate::sys::jvmti;

    #[test]
    fn check_maps_none_to_ok() {
        assert_eq!(JvmtiError::check(jvmti::JVMTI_ERROR_NONE), Ok(()));
        assert_eq!(
            JvmtiError::check(jvmti::JVMTI_ERROR_WRONG_PHASE),
            Err(JvmtiError(112))
        );
    }

    #[test]
    fn display_includes_symbolic_name_and_code() {
        let text = JvmtiError(jvmti::JVMTI_ERROR_ILLEGAL_ARGUMENT).to_string();
        assert_eq!(text, "JVMTI_ERROR_ILLEGAL_ARGUMENT (103)");

        let unknown = JvmtiError(9999);
        assert_eq!(unknown.name(), None);
        assert!(unknown.to_string().contains("9999"));
    }

    #[test]
    fn discovery_and_not_found_are_distinguishable() {
        let discovery = ExtensionError::Discovery(JvmtiError(jvmti::JVMTI_ERROR_WRONG_PHASE));
        let missing = ExtensionError::NotFound("com.example.add_segment".to_string());

        assert_eq!(discovery.host_status(), Some(JvmtiError(112)));
        assert_eq!(missing.host_status(), None);
        assert!(discovery.to_string().contains("discovery failed"));
        assert!(missing.to_string().contains("com.example.add_segment"));
    }

    #[test]
    fn invocation_error_names_extension() {
        let err = ExtensionError::Invocation {
            id: "com.example.add_segment".to_string(),
            error: JvmtiError(jvmti::JVMTI_ERROR_INVALID_OBJECT),
        };
        let text = err.to_string();
        assert!(text.contains("com.example.add_segment"));
        assert!(text.contains("JVMTI_ERROR_INVALID_OBJECT"));
    }
}
