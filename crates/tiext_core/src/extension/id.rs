//! Extension identifiers.

use crate::error::ExtensionError;
use std::fmt::{Display, Formatter};

/// Identifier under which the host registers one extension function.
///
/// Hosts namespace these in reverse-DNS style, but matching treats the value
/// as an opaque byte sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CapabilityId(String);

impl CapabilityId {
    /// Validates a requested identifier.
    ///
    /// # Errors
    /// - `ExtensionError::InvalidId` when `value` is empty or contains NUL,
    ///   since neither can equal a host C string.
    pub fn new(value: impl Into<String>) -> Result<Self, ExtensionError> {
        let value = value.into();
        if value.is_empty() || value.contains('\0') {
            return Err(ExtensionError::InvalidId(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CapabilityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for CapabilityId {
    type Error = ExtensionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
