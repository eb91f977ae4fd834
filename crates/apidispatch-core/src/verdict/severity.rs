//! Severity of a finding and its exit code

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How much a finding counts against a document.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Document is valid but not fully routable
    Warning,
    /// Document is invalid and cannot be dispatched
    Error,
}

impl Severity {
    /// Exit code contributed by one finding. Warnings only fail in strict mode.
    #[must_use]
    pub const fn exit_code(self, strict: bool) -> i32 {
        match self {
            Self::Warning if !strict => 0,
            Self::Warning | Self::Error => 1,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
