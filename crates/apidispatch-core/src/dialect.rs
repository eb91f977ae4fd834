//! Specification dialects and marker-key detection
//!
//! A document declares its dialect through one top-level marker key.
//! When a malformed document carries several markers, the newest dialect wins.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The three specification grammars a document may be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Dialect {
    /// Swagger 1.2 API declaration (`swaggerVersion`)
    #[serde(rename = "swagger-1.2")]
    Swagger1_2,
    /// Swagger 2.0 (`swagger`)
    #[serde(rename = "swagger-2.0")]
    Swagger2_0,
    /// OpenAPI 3.x (`openapi`)
    #[serde(rename = "openapi-3")]
    OpenApi3,
}

impl Dialect {
    /// Detection order. First match wins.
    pub const DETECTION_ORDER: [Self; 3] = [Self::OpenApi3, Self::Swagger2_0, Self::Swagger1_2];

    /// Classify a document by its top-level marker key.
    ///
    /// Returns `None` when the document is not a mapping or carries no marker.
    /// Callers must treat `None` as "cannot validate".
    #[must_use]
    pub fn detect(doc: &Value) -> Option<Self> {
        let root = doc.as_object()?;
        Self::DETECTION_ORDER
            .into_iter()
            .find(|dialect| root.contains_key(dialect.marker_key()))
    }

    /// Top-level key that identifies this dialect.
    #[must_use]
    pub const fn marker_key(self) -> &'static str {
        match self {
            Self::Swagger1_2 => "swaggerVersion",
            Self::Swagger2_0 => "swagger",
            Self::OpenApi3 => "openapi",
        }
    }

    /// File name of the bundled grammar for this dialect.
    #[must_use]
    pub const fn grammar_file(self) -> &'static str {
        match self {
            Self::Swagger1_2 => "swagger-1.2.json",
            Self::Swagger2_0 => "swagger-2.0.json",
            Self::OpenApi3 => "openapi-3.json",
        }
    }

    /// Field holding a parameter's location (`path`, `query`, ...).
    #[must_use]
    pub const fn location_field(self) -> &'static str {
        match self {
            Self::Swagger1_2 => "paramType",
            Self::Swagger2_0 | Self::OpenApi3 => "in",
        }
    }

    /// Version string declared under the marker key, if it is a scalar.
    #[must_use]
    pub fn declared_version(self, doc: &Value) -> Option<String> {
        match doc.get(self.marker_key())? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Human-readable label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Swagger1_2 => "Swagger 1.2",
            Self::Swagger2_0 => "Swagger 2.0",
            Self::OpenApi3 => "OpenAPI 3.x",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detect_each_marker() {
        assert_eq!(
            Dialect::detect(&json!({"openapi": "3.0.0"})),
            Some(Dialect::OpenApi3)
        );
        assert_eq!(
            Dialect::detect(&json!({"swagger": "2.0"})),
            Some(Dialect::Swagger2_0)
        );
        assert_eq!(
            Dialect::detect(&json!({"swaggerVersion": "1.2"})),
            Some(Dialect::Swagger1_2)
        );
    }

    #[test]
    fn detect_without_marker_is_none() {
        assert_eq!(Dialect::detect(&json!({"info": {"title": "x"}})), None);
        assert_eq!(Dialect::detect(&json!({})), None);
    }

    #[test]
    fn detect_non_mapping_is_none() {
        assert_eq!(Dialect::detect(&json!(["openapi"])), None);
        assert_eq!(Dialect::detect(&json!("openapi")), None);
        assert_eq!(Dialect::detect(&serde_json::Value::Null), None);
    }

    #[test]
    fn openapi_wins_over_swagger() {
        let doc = json!({"swagger": "2.0", "openapi": "3.0.0"});
        assert_eq!(Dialect::detect(&doc), Some(Dialect::OpenApi3));
    }

    #[test]
    fn swagger_wins_over_swagger_version() {
        let doc = json!({"swaggerVersion": "1.2", "swagger": "2.0"});
        assert_eq!(Dialect::detect(&doc), Some(Dialect::Swagger2_0));
    }

    #[test]
    fn marker_presence_is_enough() {
        // A null marker still claims the dialect; the grammar rejects it later.
        let doc = json!({"swagger": null});
        assert_eq!(Dialect::detect(&doc), Some(Dialect::Swagger2_0));
    }

    #[test]
    fn declared_version_reads_scalars() {
        assert_eq!(
            Dialect::Swagger2_0.declared_version(&json!({"swagger": "2.0"})),
            Some("2.0".to_string())
        );
        assert_eq!(
            Dialect::Swagger2_0.declared_version(&json!({"swagger": 2.0})),
            Some("2.0".to_string())
        );
        assert_eq!(
            Dialect::OpenApi3.declared_version(&json!({"openapi": {}})),
            None
        );
    }

    #[test]
    fn location_fields() {
        assert_eq!(Dialect::Swagger1_2.location_field(), "paramType");
        assert_eq!(Dialect::Swagger2_0.location_field(), "in");
        assert_eq!(Dialect::OpenApi3.location_field(), "in");
    }

    #[test]
    fn serialization_labels() {
        let json = serde_json::to_string(&Dialect::OpenApi3).unwrap();
        assert_eq!(json, "\"openapi-3\"");
        let back: Dialect = serde_json::from_str("\"swagger-1.2\"").unwrap();
        assert_eq!(back, Dialect::Swagger1_2);
    }
}
