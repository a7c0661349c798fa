//! Runtime configuration
//!
//! Read-only settings consumed by execution contexts: locale and time zone for
//! date/locale-sensitive collaborators, the compilation policy, limits and
//! the cycle collector's allocation threshold.

use serde::Deserialize;

use crate::error::JsError;

/// How compiled function values are prepared for invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompileMode {
    /// Every call performs declaration binding instantiation against a fresh
    /// declarative environment.
    #[default]
    Interpreted,
    /// Code that carries a local slot table is marked fully resolved: its
    /// bindings live in slots and instantiation is skipped at call time.
    Resolved,
}

/// Configuration for a [`crate::Runtime`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// IANA time zone name exposed to collaborators
    pub time_zone: String,
    /// BCP 47 locale tag exposed to collaborators
    pub locale: String,
    pub compile_mode: CompileMode,
    /// File name used for programs that carry none
    pub default_file_name: String,
    /// Maximum number of nested active contexts (0 disables the check)
    pub max_call_depth: usize,
    /// Object allocations between automatic cycle collections (0 disables them)
    pub gc_threshold: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            time_zone: "UTC".to_string(),
            locale: "en-US".to_string(),
            compile_mode: CompileMode::Interpreted,
            default_file_name: "<eval>".to_string(),
            max_call_depth: 512,
            gc_threshold: 256,
        }
    }
}

impl RuntimeConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, JsError> {
        serde_json::from_str(json)
            .map_err(|e| JsError::internal_error(format!("invalid runtime config: {}", e)))
    }
}
