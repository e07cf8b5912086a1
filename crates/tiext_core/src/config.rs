//! Process configuration resolved from the environment.
//!
//! # Responsibility
//! - Read logging and JVMTI-version overrides once at load time.
//! - Fall back to build-mode defaults when variables are unset or blank.

use crate::logging::default_log_level;
use crate::sys::jni::jint;
use crate::sys::jvmti::{ART_TI_VERSION, JVMTI_VERSION_1_2};
use std::path::PathBuf;

pub const ENV_LOG_LEVEL: &str = "TIEXT_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TIEXT_LOG_DIR";
pub const ENV_JVMTI_VERSION: &str = "TIEXT_JVMTI_VERSION";

/// JVMTI versions tried in order when no override is configured.
pub const DEFAULT_JVMTI_VERSIONS: &[jint] = &[ART_TI_VERSION, JVMTI_VERSION_1_2];

/// Settings consumed by the FFI load hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Log level passed to `init_logging`.
    pub log_level: String,
    /// Absolute log directory; `None` leaves file logging off.
    pub log_dir: Option<PathBuf>,
    /// Versions requested from `JavaVM::GetEnv`, first success wins.
    pub jvmti_versions: Vec<jint>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            jvmti_versions: DEFAULT_JVMTI_VERSIONS.to_vec(),
        }
    }
}

impl RuntimeConfig {
    /// Reads `TIEXT_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    ///
    /// An unparsable `TIEXT_JVMTI_VERSION` is ignored in favour of defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(level) = non_blank(lookup(ENV_LOG_LEVEL)) {
            config.log_level = level;
        }
        config.log_dir = non_blank(lookup(ENV_LOG_DIR)).map(PathBuf::from);
        if let Some(version) = non_blank(lookup(ENV_JVMTI_VERSION)).and_then(|raw| parse_version(&raw))
        {
            config.jvmti_versions = vec![version];
        }

        config
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

/// Accepts decimal or `0x`-prefixed hex.
fn parse_version(raw: &str) -> Option<jint> {
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => raw.parse::<u32>().ok(),
    }?;
    Some(parsed as jint)
}
