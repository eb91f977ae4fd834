//! Validation outcome types
//!
//! Document-level problems (schema violations, broken references) are data,
//! collected here. Only packaging defects are raised as errors.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Dialect;

/// An internal reference pointer that does not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BrokenRef {
    /// The pointer exactly as written, e.g. `#/components/schemas/Missing`
    pub pointer: String,
    /// JSON pointer of the mapping that holds the `$ref`
    pub location: String,
}

impl std::fmt::Display for BrokenRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (at {})", self.pointer, self.location)
    }
}

/// Result of one `validate` call. Never mutated after it is returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationResult {
    /// `None` when no dialect marker was found
    pub dialect: Option<Dialect>,
    pub is_valid: bool,
    /// Grammar violations, in validator order
    pub schema_errors: Vec<String>,
    /// Broken internal pointers, in discovery order
    pub ref_errors: Vec<BrokenRef>,
}

impl ValidationResult {
    /// Result for a document that matches no dialect: invalid, nothing checked.
    #[must_use]
    pub fn unknown_dialect() -> Self {
        Self {
            dialect: None,
            is_valid: false,
            schema_errors: Vec::new(),
            ref_errors: Vec::new(),
        }
    }

    /// Combine both independent checks. Valid only if both are clean.
    #[must_use]
    pub fn from_checks(
        dialect: Dialect,
        schema_errors: Vec<String>,
        ref_errors: Vec<BrokenRef>,
    ) -> Self {
        Self {
            dialect: Some(dialect),
            is_valid: schema_errors.is_empty() && ref_errors.is_empty(),
            schema_errors,
            ref_errors,
        }
    }

    /// Total collected problems.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.schema_errors.len() + self.ref_errors.len()
    }

    /// Format as human-readable terminal output.
    #[must_use]
    pub fn to_terminal(&self) -> String {
        let mut lines = Vec::new();
        let Some(dialect) = self.dialect else {
            lines.push("INVALID: no dialect marker (openapi, swagger, swaggerVersion)".into());
            return lines.join("\n");
        };

        let icon = if self.is_valid { "VALID" } else { "INVALID" };
        lines.push(format!("{icon}: {dialect} document"));

        if !self.schema_errors.is_empty() {
            lines.push(format!("\nSchema violations ({}):", self.schema_errors.len()));
            for e in &self.schema_errors {
                lines.push(format!("  - {e}"));
            }
        }
        if !self.ref_errors.is_empty() {
            lines.push(format!("\nBroken references ({}):", self.ref_errors.len()));
            for r in &self.ref_errors {
                lines.push(format!("  - {r}"));
            }
        }
        lines.join("\n")
    }
}

/// Stages of a single `add_api` pipeline run.
///
/// A run only reaches [`PipelineStage::Normalized`] when both the schema and
/// the reference checks passed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Unloaded,
    Loaded,
    DialectDetected,
    SchemaChecked,
    RefsChecked,
    Normalized,
}

impl PipelineStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unloaded => "unloaded",
            Self::Loaded => "loaded",
            Self::DialectDetected => "dialect_detected",
            Self::SchemaChecked => "schema_checked",
            Self::RefsChecked => "refs_checked",
            Self::Normalized => "normalized",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
