//! Per-dialect extraction: where operations, parameters and base URLs live
//!
//! Swagger 1.2 nests operations under `apis[].operations[]`; Swagger 2.0 and
//! OpenAPI 3.x key them by method under `paths{template}`.

use apidispatch_core::Dialect;
use serde_json::Value;

use crate::refs;

const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// One operation as found in the document, before normalization.
#[derive(Debug, Clone)]
pub(super) struct RawOperation<'a> {
    /// Path template with `{name}` already turned into `<name>`
    pub(super) template: String,
    /// Upper-case method
    pub(super) method: String,
    pub(super) operation: &'a Value,
    /// Parameter objects, `$ref`s already followed
    pub(super) parameters: Vec<&'a Value>,
}

/// Extraction strategy, chosen by dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Strategy {
    /// Swagger 1.2 `apis[].operations[]`
    ApiDeclaration,
    /// Swagger 2.0 / OpenAPI 3.x `paths{template: {method: operation}}`
    PathsMap { servers: bool },
}

impl Strategy {
    pub(super) fn for_dialect(dialect: Dialect) -> Self {
        match dialect {
            Dialect::Swagger1_2 => Self::ApiDeclaration,
            Dialect::Swagger2_0 => Self::PathsMap { servers: false },
            Dialect::OpenApi3 => Self::PathsMap { servers: true },
        }
    }

    pub(super) fn operations<'a>(self, doc: &'a Value) -> Vec<RawOperation<'a>> {
        match self {
            Self::ApiDeclaration => api_declaration_operations(doc),
            Self::PathsMap { .. } => paths_map_operations(doc),
        }
    }

    pub(super) fn base_urls(self, doc: &Value) -> Vec<String> {
        match self {
            Self::ApiDeclaration => doc
                .get("basePath")
                .and_then(Value::as_str)
                .map(|b| vec![b.to_string()])
                .unwrap_or_default(),
            Self::PathsMap { servers } => {
                let server_urls: Vec<String> = if servers {
                    doc.get("servers")
                        .and_then(Value::as_array)
                        .map(|list| {
                            list.iter()
                                .filter_map(|s| s.get("url").and_then(Value::as_str))
                                .map(String::from)
                                .collect()
                        })
                        .unwrap_or_default()
                } else {
                    Vec::new()
                };
                if server_urls.is_empty() {
                    let host = doc.get("host").and_then(Value::as_str).unwrap_or("");
                    let base = doc.get("basePath").and_then(Value::as_str).unwrap_or("");
                    vec![format!("{host}{base}")]
                } else {
                    server_urls
                }
            }
        }
    }
}

/// `{name}` -> `<name>`
pub(super) fn to_placeholders(path: &str) -> String {
    path.replace('{', "<").replace('}', ">")
}

fn api_declaration_operations(doc: &Value) -> Vec<RawOperation<'_>> {
    let mut ops = Vec::new();
    let Some(apis) = doc.get("apis").and_then(Value::as_array) else {
        return ops;
    };

    for api in apis {
        let Some(path) = api.get("path").and_then(Value::as_str) else {
            continue;
        };
        let template = to_placeholders(path);
        let Some(operations) = api.get("operations").and_then(Value::as_array) else {
            continue;
        };
        for operation in operations {
            let Some(method) = operation.get("method").and_then(Value::as_str) else {
                continue;
            };
            ops.push(RawOperation {
                template: template.clone(),
                method: method.to_uppercase(),
                operation,
                parameters: param_list(doc, operation.get("parameters")),
            });
        }
    }
    ops
}

fn paths_map_operations(doc: &Value) -> Vec<RawOperation<'_>> {
    let mut ops = Vec::new();
    let Some(paths) = doc.get("paths").and_then(Value::as_object) else {
        return ops;
    };

    for (path, path_item) in paths {
        let Some(item) = path_item.as_object() else {
            continue;
        };
        let template = to_placeholders(path);
        let shared = param_list(doc, item.get("parameters"));

        // Document order of the path item, not HTTP_METHODS order
        for (key, operation) in item {
            if !HTTP_METHODS.contains(&key.as_str()) || !operation.is_object() {
                continue;
            }
            let own = param_list(doc, operation.get("parameters"));
            ops.push(RawOperation {
                template: template.clone(),
                method: key.to_uppercase(),
                operation,
                parameters: merge_parameters(&shared, own),
            });
        }
    }
    ops
}

/// Parameter objects of a list, following internal `$ref`s.
fn param_list<'a>(doc: &'a Value, list: Option<&'a Value>) -> Vec<&'a Value> {
    list.and_then(Value::as_array)
        .map(|items| items.iter().filter_map(|p| deref(doc, p)).collect())
        .unwrap_or_default()
}

/// Follow a `$ref` object to its target (one level deep per hop, bounded).
pub(super) fn deref<'a>(doc: &'a Value, value: &'a Value) -> Option<&'a Value> {
    let mut current = value;
    for _ in 0..16 {
        match current.get("$ref").and_then(Value::as_str) {
            Some(pointer) if refs::is_internal(pointer) => {
                current = refs::resolve_pointer(doc, pointer)?;
            }
            Some(_) => return None,
            None => return Some(current),
        }
    }
    None
}

/// Path-level parameters, overridden by operation-level ones with the same
/// (name, location). Location is read from either field name.
fn merge_parameters<'a>(shared: &[&'a Value], own: Vec<&'a Value>) -> Vec<&'a Value> {
    let key = |p: &Value| {
        let name = p.get("name").and_then(Value::as_str).unwrap_or("").to_string();
        let location = p.get("in").and_then(Value::as_str).unwrap_or("").to_string();
        (name, location)
    };
    let overridden: Vec<_> = own.iter().map(|p| key(p)).collect();
    let mut merged: Vec<&Value> = shared
        .iter()
        .copied()
        .filter(|p| !overridden.contains(&key(p)))
        .collect();
    merged.extend(own);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn placeholders() {
        assert_eq!(to_placeholders("/pets/{petId}/toys/{toy}"), "/pets/<petId>/toys/<toy>");
        assert_eq!(to_placeholders("/pets"), "/pets");
    }

    #[test]
    fn strategy_per_dialect() {
        assert_eq!(
            Strategy::for_dialect(Dialect::Swagger1_2),
            Strategy::ApiDeclaration
        );
        assert_eq!(
            Strategy::for_dialect(Dialect::OpenApi3),
            Strategy::PathsMap { servers: true }
        );
    }

    #[test]
    fn api_declaration_walks_apis_and_operations() {
        let doc = json!({
            "swaggerVersion": "1.2",
            "basePath": "http://petstore.io/api",
            "apis": [
                {"path": "/pet/{petId}", "operations": [
                    {"method": "get", "nickname": "getPetById", "parameters": []},
                    {"method": "DELETE", "nickname": "deletePet", "parameters": []}
                ]},
                {"path": "/pet", "operations": [
                    {"method": "POST", "nickname": "addPet", "parameters": []}
                ]}
            ]
        });
        let ops = Strategy::ApiDeclaration.operations(&doc);
        let labels: Vec<String> = ops
            .iter()
            .map(|o| format!("{} {}", o.method, o.template))
            .collect();
        assert_eq!(
            labels,
            vec!["GET /pet/<petId>", "DELETE /pet/<petId>", "POST /pet"]
        );
        assert_eq!(
            Strategy::ApiDeclaration.base_urls(&doc),
            vec!["http://petstore.io/api"]
        );
    }

    #[test]
    fn paths_map_skips_non_method_keys() {
        let doc = json!({
            "paths": {
                "/pets": {
                    "summary": "pets",
                    "parameters": [],
                    "x-owner": {"team": "a"},
                    "get": {"responses": {}},
                    "post": {"responses": {}}
                }
            }
        });
        let ops = Strategy::PathsMap { servers: false }.operations(&doc);
        let methods: Vec<&str> = ops.iter().map(|o| o.method.as_str()).collect();
        assert_eq!(methods, vec!["GET", "POST"]);
    }

    #[test]
    fn path_level_parameters_are_merged_and_overridden() {
        let doc = json!({
            "paths": {
                "/pets/{id}": {
                    "parameters": [
                        {"name": "id", "in": "path", "type": "string"},
                        {"name": "trace", "in": "header", "type": "string"}
                    ],
                    "get": {
                        "parameters": [{"name": "id", "in": "path", "type": "integer"}]
                    }
                }
            }
        });
        let ops = Strategy::PathsMap { servers: false }.operations(&doc);
        let params = &ops[0].parameters;
        assert_eq!(params.len(), 2);
        assert_eq!(params[0]["name"], "trace");
        assert_eq!(params[1]["type"], "integer");
    }

    #[test]
    fn parameter_refs_are_followed() {
        let doc = json!({
            "parameters": {"PetId": {"name": "id", "in": "path", "type": "integer"}},
            "paths": {
                "/pets/{id}": {"get": {"parameters": [{"$ref": "#/parameters/PetId"}]}}
            }
        });
        let ops = Strategy::PathsMap { servers: false }.operations(&doc);
        assert_eq!(ops[0].parameters[0]["type"], "integer");
    }

    #[test]
    fn unresolvable_parameter_refs_are_skipped() {
        let doc = json!({
            "paths": {"/a": {"get": {"parameters": [
                {"$ref": "#/parameters/Missing"},
                {"$ref": "other.yaml#/Param"}
            ]}}}
        });
        let ops = Strategy::PathsMap { servers: false }.operations(&doc);
        assert!(ops[0].parameters.is_empty());
    }

    #[test]
    fn circular_refs_terminate() {
        let doc = json!({
            "a": {"$ref": "#/b"},
            "b": {"$ref": "#/a"}
        });
        assert!(deref(&doc, &doc["a"]).is_none());
    }

    #[test]
    fn servers_preferred_over_host() {
        let doc = json!({
            "servers": [{"url": "https://a.io/v1"}, {"url": "https://b.io/v1"}],
            "host": "ignored.io"
        });
        assert_eq!(
            Strategy::PathsMap { servers: true }.base_urls(&doc),
            vec!["https://a.io/v1", "https://b.io/v1"]
        );
    }

    #[test]
    fn host_and_base_path_fallback() {
        let doc = json!({"host": "petstore.io", "basePath": "/v1"});
        assert_eq!(
            Strategy::PathsMap { servers: true }.base_urls(&doc),
            vec!["petstore.io/v1"]
        );
        assert_eq!(
            Strategy::PathsMap { servers: false }.base_urls(&json!({})),
            vec![""]
        );
    }
}
