//! Document validation: dialect detection, grammar check, reference check

use std::sync::Arc;

use apidispatch_core::{Dialect, ValidationResult};
use serde_json::Value;
use tracing::{debug, error};

use crate::grammar::{GrammarRegistry, InternalSchemaError};
use crate::refs;

/// Check `doc` against the grammar of `dialect`.
///
/// Returns every violation message; empty means the document conforms.
///
/// # Errors
///
/// Returns [`InternalSchemaError`] when the grammar itself is unusable.
pub fn validate_schema(
    doc: &Value,
    dialect: Dialect,
    grammars: &GrammarRegistry,
) -> Result<Vec<String>, InternalSchemaError> {
    Ok(grammars.grammar(dialect)?.violations(doc))
}

/// Validates documents against a shared grammar registry.
///
/// Cheap to clone; clones share the compiled grammars.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    grammars: Arc<GrammarRegistry>,
}

impl Validator {
    #[must_use]
    pub fn new(grammars: Arc<GrammarRegistry>) -> Self {
        Self { grammars }
    }

    #[must_use]
    pub fn grammars(&self) -> &GrammarRegistry {
        &self.grammars
    }

    /// Validate one document.
    ///
    /// An unknown dialect yields an invalid result with no errors. Otherwise
    /// both the grammar and the reference checks run, and their findings
    /// are reported together.
    ///
    /// # Errors
    ///
    /// Returns [`InternalSchemaError`] when the dialect's grammar is unusable.
    pub fn validate(&self, doc: &Value) -> Result<ValidationResult, InternalSchemaError> {
        let Some(dialect) = Dialect::detect(doc) else {
            error!("No dialect marker (openapi, swagger, swaggerVersion) found in document");
            return Ok(ValidationResult::unknown_dialect());
        };
        debug!(%dialect, version = ?dialect.declared_version(doc), "dialect detected");

        let schema_errors = validate_schema(doc, dialect, &self.grammars)?;
        debug!(%dialect, count = schema_errors.len(), "schema checked");

        let ref_errors = refs::resolve_all_refs(doc);
        debug!(%dialect, count = ref_errors.len(), "references checked");

        Ok(ValidationResult::from_checks(dialect, schema_errors, ref_errors))
    }
}
