//! Findings: one entry per problem reported for a document

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Severity;
use crate::{RouteTable, ValidationResult};

/// Kind of finding - determines default severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// No `openapi`, `swagger` or `swaggerVersion` marker
    UnknownDialect,
    /// Document does not match its dialect grammar
    SchemaViolation,
    /// Internal `$ref` pointer does not resolve
    BrokenReference,
    /// Operation declares an id but no handler was found
    UnresolvedHandler,
}

impl FindingKind {
    /// Default severity for this finding kind
    #[must_use]
    pub const fn default_severity(self) -> Severity {
        match self {
            Self::UnknownDialect | Self::SchemaViolation | Self::BrokenReference => {
                Severity::Error
            }
            Self::UnresolvedHandler => Severity::Warning,
        }
    }

    pub const ALL: [Self; 4] = [
        Self::UnknownDialect,
        Self::SchemaViolation,
        Self::BrokenReference,
        Self::UnresolvedHandler,
    ];

    /// Wire name, as used by `ignore` in config and `--ignore`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownDialect => "unknown_dialect",
            Self::SchemaViolation => "schema_violation",
            Self::BrokenReference => "broken_reference",
            Self::UnresolvedHandler => "unresolved_handler",
        }
    }

    /// Human-readable description
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::UnknownDialect => "Document declares no known specification version",
            Self::SchemaViolation => "Document does not match its specification grammar",
            Self::BrokenReference => "Reference pointer does not resolve",
            Self::UnresolvedHandler => "No handler found for operation",
        }
    }
}

impl std::fmt::Display for FindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

impl std::str::FromStr for FindingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown finding kind `{s}` (expected one of {})", names.join(", "))
            })
    }
}

/// A single reported problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Finding {
    pub kind: FindingKind,
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    #[must_use]
    pub fn new(kind: FindingKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            message: message.into(),
        }
    }
}

/// Turn a validation result (and the routes derived from it, if any) into findings.
#[must_use]
pub fn collect_findings(result: &ValidationResult, routes: Option<&RouteTable>) -> Vec<Finding> {
    let mut findings = Vec::new();

    if result.dialect.is_none() {
        findings.push(Finding::new(
            FindingKind::UnknownDialect,
            "no openapi, swagger or swaggerVersion key",
        ));
    }
    findings.extend(
        result
            .schema_errors
            .iter()
            .map(|e| Finding::new(FindingKind::SchemaViolation, e.clone())),
    );
    findings.extend(
        result
            .ref_errors
            .iter()
            .map(|r| Finding::new(FindingKind::BrokenReference, r.to_string())),
    );
    if let Some(table) = routes {
        findings.extend(route_findings(table));
    }

    findings
}

/// One finding per route whose declared operation id has no handler.
#[must_use]
pub fn route_findings(table: &RouteTable) -> Vec<Finding> {
    table
        .unmatched()
        .map(|r| {
            Finding::new(
                FindingKind::UnresolvedHandler,
                format!(
                    "{} ({})",
                    r.label(),
                    r.operation_id.as_deref().unwrap_or_default()
                ),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BrokenRef, Dialect, RouteDescriptor};

    #[test]
    fn kind_names_parse_back() {
        for kind in FindingKind::ALL {
            assert_eq!(kind.as_str().parse::<FindingKind>(), Ok(kind));
            let wire = serde_json::to_value(kind).unwrap();
            assert_eq!(wire, kind.as_str());
        }
        let err = "typo".parse::<FindingKind>().unwrap_err();
        assert!(err.contains("unresolved_handler"));
    }

    #[test]
    fn unknown_dialect_yields_single_error() {
        let findings = collect_findings(&ValidationResult::unknown_dialect(), None);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::UnknownDialect);
        assert_eq!(findings[0].severity, Severity::Error);
    }

    #[test]
    fn schema_and_ref_errors_keep_order() {
        let result = ValidationResult::from_checks(
            Dialect::OpenApi3,
            vec!["first".into(), "second".into()],
            vec![BrokenRef {
                pointer: "#/components/schemas/Missing".into(),
                location: "/paths/~1pets/get/responses/200".into(),
            }],
        );
        let findings = collect_findings(&result, None);
        let kinds: Vec<_> = findings.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![
                FindingKind::SchemaViolation,
                FindingKind::SchemaViolation,
                FindingKind::BrokenReference
            ]
        );
        assert_eq!(findings[0].message, "first");
    }

    #[test]
    fn unresolved_handlers_are_warnings() {
        let result = ValidationResult::from_checks(Dialect::Swagger2_0, vec![], vec![]);
        let mut table = RouteTable::new("Pets");
        table.insert(RouteDescriptor {
            url_template: "/pets".into(),
            method: "GET".into(),
            parameters: vec![],
            operation_id: Some("listPets".into()),
            controller: None,
            handler: None,
        });

        let findings = collect_findings(&result, Some(&table));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Warning);
        assert_eq!(findings[0].message, "GET /pets (listPets)");
    }
}
