//! Machine-readable report emitted by `--output json`
//!
//! The JSON schema of [`Report`] is exported so downstream tooling can
//! consume validation and routing results without linking this crate.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::verdict::Finding;
use crate::{RouteTable, ValidationResult};

/// Top-level report for one document.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Report {
    /// Document path, or `<memory>` for in-memory documents
    pub source: String,
    pub validation: ValidationResult,
    /// Routes this document added to the dispatcher; absent when it was rejected
    /// or only validated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routes: Option<RouteTable>,
    /// Findings after policy filtering
    #[serde(default)]
    pub findings: Vec<Finding>,
}

/// Generate JSON Schema for the report format.
#[must_use]
pub fn generate_schema() -> String {
    let schema = schemars::schema_for!(Report);
    serde_json::to_string_pretty(&schema).expect("schema serialization should not fail")
}
