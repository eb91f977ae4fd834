//! Grammar registry: one JSON-schema grammar per dialect
//!
//! Grammars are compiled lazily, once per dialect, and shared read-only by
//! every validation that runs against the same registry. The JSON-schema
//! draft is taken from each grammar's own `$schema` field.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use apidispatch_core::Dialect;
use serde_json::Value;

const SWAGGER_1_2: &str = include_str!("../data/schemas/swagger-1.2.json");
const SWAGGER_2_0: &str = include_str!("../data/schemas/swagger-2.0.json");
const OPENAPI_3: &str = include_str!("../data/schemas/openapi-3.json");

/// A bundled grammar is missing or corrupt. This is a packaging defect,
/// never a verdict on the validated document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Internal schema error for {dialect} grammar ({origin}): {reason}")]
pub struct InternalSchemaError {
    pub dialect: Dialect,
    pub origin: String,
    pub reason: String,
}

/// Where the grammar text for a dialect comes from.
#[derive(Debug, Clone)]
enum GrammarText {
    Bundled(&'static str),
    File(PathBuf),
    Inline(String),
}

impl GrammarText {
    fn origin(&self) -> String {
        match self {
            Self::Bundled(_) => "bundled".to_string(),
            Self::File(path) => path.display().to_string(),
            Self::Inline(_) => "inline".to_string(),
        }
    }

    fn read(&self) -> Result<String, String> {
        match self {
            Self::Bundled(text) => Ok((*text).to_string()),
            Self::File(path) => std::fs::read_to_string(path).map_err(|e| e.to_string()),
            Self::Inline(text) => Ok(text.clone()),
        }
    }
}

/// A compiled grammar, ready to validate documents.
pub struct Grammar {
    dialect: Dialect,
    draft: String,
    validator: jsonschema::Validator,
}

impl Grammar {
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The `$schema` URI the grammar declares.
    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Every violation of `doc` against this grammar, in validator order.
    #[must_use]
    pub fn violations(&self, doc: &Value) -> Vec<String> {
        self.validator
            .iter_errors(doc)
            .map(|e| e.to_string())
            .collect()
    }
}

impl std::fmt::Debug for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grammar")
            .field("dialect", &self.dialect)
            .field("draft", &self.draft)
            .finish_non_exhaustive()
    }
}

struct Slot {
    text: GrammarText,
    compiled: OnceLock<Result<Grammar, InternalSchemaError>>,
}

impl Slot {
    fn new(text: GrammarText) -> Self {
        Self {
            text,
            compiled: OnceLock::new(),
        }
    }
}

/// Per-dialect grammars. Construct once and share (`Arc`) across threads.
pub struct GrammarRegistry {
    swagger_1_2: Slot,
    swagger_2_0: Slot,
    openapi_3: Slot,
}

impl std::fmt::Debug for GrammarRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("GrammarRegistry");
        for dialect in Dialect::DETECTION_ORDER {
            let slot = self.slot(dialect);
            let state = match slot.compiled.get() {
                None => "pending",
                Some(Ok(_)) => "compiled",
                Some(Err(_)) => "failed",
            };
            s.field(dialect.as_str(), &format_args!("{} ({state})", slot.text.origin()));
        }
        s.finish()
    }
}

impl Default for GrammarRegistry {
    fn default() -> Self {
        Self::bundled()
    }
}

impl GrammarRegistry {
    /// Grammars shipped with this crate.
    #[must_use]
    pub fn bundled() -> Self {
        Self {
            swagger_1_2: Slot::new(GrammarText::Bundled(SWAGGER_1_2)),
            swagger_2_0: Slot::new(GrammarText::Bundled(SWAGGER_2_0)),
            openapi_3: Slot::new(GrammarText::Bundled(OPENAPI_3)),
        }
    }

    /// Grammars read from `dir`, named like the bundled files
    /// (see [`Dialect::grammar_file`]). Files are read on first use.
    #[must_use]
    pub fn from_dir(dir: &Path) -> Self {
        let file = |d: Dialect| Slot::new(GrammarText::File(dir.join(d.grammar_file())));
        Self {
            swagger_1_2: file(Dialect::Swagger1_2),
            swagger_2_0: file(Dialect::Swagger2_0),
            openapi_3: file(Dialect::OpenApi3),
        }
    }

    /// Replace the grammar text for one dialect.
    #[must_use]
    pub fn with_grammar(mut self, dialect: Dialect, text: impl Into<String>) -> Self {
        *self.slot_mut(dialect) = Slot::new(GrammarText::Inline(text.into()));
        self
    }

    /// Compiled grammar for `dialect`, compiling it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`InternalSchemaError`] when the grammar cannot be read, is not
    /// JSON, declares no `$schema`, or does not compile. The failure is cached.
    pub fn grammar(&self, dialect: Dialect) -> Result<&Grammar, InternalSchemaError> {
        let slot = self.slot(dialect);
        slot.compiled
            .get_or_init(|| compile(dialect, &slot.text))
            .as_ref()
            .map_err(Clone::clone)
    }

    fn slot(&self, dialect: Dialect) -> &Slot {
        match dialect {
            Dialect::Swagger1_2 => &self.swagger_1_2,
            Dialect::Swagger2_0 => &self.swagger_2_0,
            Dialect::OpenApi3 => &self.openapi_3,
        }
    }

    fn slot_mut(&mut self, dialect: Dialect) -> &mut Slot {
        match dialect {
            Dialect::Swagger1_2 => &mut self.swagger_1_2,
            Dialect::Swagger2_0 => &mut self.swagger_2_0,
            Dialect::OpenApi3 => &mut self.openapi_3,
        }
    }
}

fn compile(dialect: Dialect, text: &GrammarText) -> Result<Grammar, InternalSchemaError> {
    let origin = text.origin();
    let fail = |reason: String| InternalSchemaError {
        dialect,
        origin: origin.clone(),
        reason,
    };

    let raw = text.read().map_err(&fail)?;
    let schema: Value =
        serde_json::from_str(&raw).map_err(|e| fail(format!("invalid JSON: {e}")))?;
    let draft = schema
        .get("$schema")
        .and_then(Value::as_str)
        .ok_or_else(|| fail("grammar does not declare $schema".to_string()))?
        .to_string();
    let validator =
        jsonschema::validator_for(&schema).map_err(|e| fail(format!("does not compile: {e}")))?;

    tracing::debug!(%dialect, %origin, %draft, "compiled grammar");
    Ok(Grammar {
        dialect,
        draft,
        validator,
    })
}
