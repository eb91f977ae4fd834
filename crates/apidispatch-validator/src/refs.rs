//! Internal `$ref` pointer checks
//!
//! Collects every `$ref` in depth-first order (mapping keys in insertion
//! order, then sequence indices) and walks each internal pointer from the
//! document root. External references are never fetched and always pass.

use apidispatch_core::BrokenRef;
use serde_json::Value;

const REF_KEY: &str = "$ref";

/// A `$ref` occurrence found during traversal.
#[derive(Debug, Clone, PartialEq)]
pub struct RefCandidate<'a> {
    /// The `$ref` value
    pub value: &'a Value,
    /// JSON pointer of the mapping holding the `$ref`
    pub location: String,
}

/// Collect every `$ref` value in discovery order.
#[must_use]
pub fn collect_refs(doc: &Value) -> Vec<RefCandidate<'_>> {
    let mut found = Vec::new();
    let mut path = Vec::new();
    visit(doc, &mut path, &mut found);
    found
}

fn visit<'a>(node: &'a Value, path: &mut Vec<String>, found: &mut Vec<RefCandidate<'a>>) {
    match node {
        Value::Object(map) => {
            for (key, child) in map {
                if key == REF_KEY {
                    found.push(RefCandidate {
                        value: child,
                        location: to_pointer(path),
                    });
                    continue;
                }
                path.push(key.clone());
                visit(child, path, found);
                path.pop();
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                path.push(index.to_string());
                visit(child, path, found);
                path.pop();
            }
        }
        _ => {}
    }
}

fn to_pointer(path: &[String]) -> String {
    path.iter()
        .map(|segment| format!("/{}", segment.replace('~', "~0").replace('/', "~1")))
        .collect()
}

/// Check every internal pointer; return the broken ones in discovery order.
#[must_use]
pub fn resolve_all_refs(doc: &Value) -> Vec<BrokenRef> {
    collect_refs(doc)
        .into_iter()
        .filter_map(|candidate| {
            let pointer = match candidate.value {
                Value::String(s) => s.clone(),
                // A non-string $ref can never resolve
                other => other.to_string(),
            };
            let resolves = match candidate.value {
                Value::String(s) => !is_internal(s) || resolve_pointer(doc, s).is_some(),
                _ => false,
            };
            if resolves {
                None
            } else {
                tracing::debug!(%pointer, location = %candidate.location, "broken reference");
                Some(BrokenRef {
                    pointer,
                    location: candidate.location,
                })
            }
        })
        .collect()
}

/// Whether a reference points into the current document.
#[must_use]
pub fn is_internal(reference: &str) -> bool {
    reference.starts_with('#')
}

/// Walk an internal pointer (`#/a/b/c`) from `root`.
///
/// Returns `None` as soon as a segment is missing, or when the target is `null`.
#[must_use]
pub fn resolve_pointer<'a>(root: &'a Value, reference: &str) -> Option<&'a Value> {
    let fragment = reference.strip_prefix('#')?;
    let mut node = root;
    if !fragment.is_empty() {
        for raw in fragment.strip_prefix('/').unwrap_or(fragment).split('/') {
            let segment = decode_segment(raw);
            node = match node {
                Value::Object(map) => map.get(&segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
    }
    (!node.is_null()).then_some(node)
}

/// Decodes a JSON Pointer segment (`~1` -> `/`, `~0` -> `~`).
fn decode_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn valid_graph_has_no_broken_refs() {
        let doc = json!({
            "openapi": "3.0.0",
            "paths": {
                "/pets": {
                    "get": {
                        "responses": {
                            "200": {"$ref": "#/components/responses/PetList"}
                        }
                    }
                }
            },
            "components": {
                "responses": {
                    "PetList": {
                        "description": "pets",
                        "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}}
                    }
                },
                "schemas": {"Pet": {"type": "object"}}
            }
        });
        assert!(resolve_all_refs(&doc).is_empty());
    }

    #[test]
    fn one_missing_target_yields_one_entry() {
        let doc = json!({
            "openapi": "3.0.0",
            "components": {
                "schemas": {
                    "Pets": {"type": "array", "items": {"$ref": "#/components/schemas/Missing"}}
                }
            }
        });
        let broken = resolve_all_refs(&doc);
        assert_eq!(broken.len(), 1);
        assert_eq!(broken[0].pointer, "#/components/schemas/Missing");
        assert_eq!(broken[0].location, "/components/schemas/Pets/items");
    }

    #[test]
    fn discovery_order_is_depth_first() {
        let doc = json!({
            "b": {"$ref": "#/nope/1"},
            "a": [
                {"$ref": "#/nope/2"},
                {"inner": {"$ref": "#/nope/3"}}
            ],
            "c": {"$ref": "#/nope/4"}
        });
        let pointers: Vec<String> = resolve_all_refs(&doc)
            .into_iter()
            .map(|b| b.pointer)
            .collect();
        assert_eq!(pointers, vec!["#/nope/1", "#/nope/2", "#/nope/3", "#/nope/4"]);
    }

    #[test]
    fn repeated_broken_pointer_reported_per_occurrence() {
        let doc = json!({
            "x": {"$ref": "#/missing"},
            "y": {"$ref": "#/missing"}
        });
        let broken = resolve_all_refs(&doc);
        assert_eq!(broken.len(), 2);
        assert_eq!(broken[0].location, "/x");
        assert_eq!(broken[1].location, "/y");
    }

    #[test]
    fn external_references_are_valid() {
        let doc = json!({
            "a": {"$ref": "definitions.json#/Pet"},
            "b": {"$ref": "https://example.com/schemas/pet.json"},
            "c": {"$ref": "Pet"}
        });
        assert!(resolve_all_refs(&doc).is_empty());
    }

    #[test]
    fn non_string_ref_is_broken() {
        let doc = json!({"a": {"$ref": 42}});
        let broken = resolve_all_refs(&doc);
        assert_eq!(broken.len(), 1);
        assert_eq!(broken[0].pointer, "42");
    }

    #[test]
    fn null_target_is_broken() {
        let doc = json!({"defs": {"Pet": null}, "a": {"$ref": "#/defs/Pet"}});
        assert_eq!(resolve_all_refs(&doc).len(), 1);
    }

    #[test]
    fn empty_mapping_target_resolves() {
        let doc = json!({"defs": {"Any": {}}, "a": {"$ref": "#/defs/Any"}});
        assert!(resolve_all_refs(&doc).is_empty());
    }

    #[test]
    fn root_pointer_resolves() {
        let doc = json!({"a": {"$ref": "#"}});
        assert!(resolve_all_refs(&doc).is_empty());
    }

    #[test]
    fn escaped_segments_and_indices() {
        let doc = json!({
            "paths": {"/pets/{id}": {"parameters": [{"name": "id"}]}},
            "x": {"$ref": "#/paths/~1pets~1{id}/parameters/0"},
            "y": {"$ref": "#/paths/~1pets~1{id}/parameters/1"},
            "z": {"$ref": "#/paths/~1pets~1{id}/parameters/first"}
        });
        let broken: Vec<String> = resolve_all_refs(&doc)
            .into_iter()
            .map(|b| b.pointer)
            .collect();
        assert_eq!(
            broken,
            vec![
                "#/paths/~1pets~1{id}/parameters/1",
                "#/paths/~1pets~1{id}/parameters/first"
            ]
        );
    }

    #[test]
    fn walking_through_scalar_fails() {
        let doc = json!({"info": {"title": "x"}, "a": {"$ref": "#/info/title/deeper"}});
        assert_eq!(resolve_all_refs(&doc).len(), 1);
    }

    #[test]
    fn ref_value_itself_is_not_traversed() {
        // An object under $ref is reported once, its contents are not searched.
        let doc = json!({"a": {"$ref": {"$ref": "#/missing"}}});
        let broken = resolve_all_refs(&doc);
        assert_eq!(broken.len(), 1);
        assert_eq!(broken[0].location, "/a");
    }

    #[test]
    fn collect_refs_locations_escape_keys() {
        let doc = json!({"paths": {"/a": {"$ref": "#/x"}}});
        let refs = collect_refs(&doc);
        assert_eq!(refs[0].location, "/paths/~1a");
    }

    #[test]
    fn resolve_pointer_returns_target() {
        let doc = json!({"definitions": {"Pet": {"type": "object"}}});
        assert_eq!(
            resolve_pointer(&doc, "#/definitions/Pet"),
            Some(&json!({"type": "object"}))
        );
        assert_eq!(resolve_pointer(&doc, "definitions/Pet"), None);
    }
}
