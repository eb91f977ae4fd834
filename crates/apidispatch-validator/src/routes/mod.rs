//! Route normalization: validated document -> [`RouteTable`]
//!
//! Only ever called on documents that passed both the schema and the
//! reference checks.

mod strategy;

use apidispatch_core::{Dialect, ParamLocation, RouteDescriptor, RouteParameter, RouteTable};
use serde_json::Value;
use tracing::{debug, warn};

use crate::handler::{HandlerResolver, ModulePath};
use strategy::{RawOperation, Strategy};

const CONTROLLER_KEY: &str = "x-swagger-router-controller";

/// Schema type names that differ from the routing converter name.
const ROUTING_TYPES: [(&str, &str); 1] = [("integer", "int")];

/// Build the route table of a validated document.
///
/// Duplicate (url template, method) pairs keep the first occurrence.
/// Handler lookups that fail are logged and leave the route unresolved.
#[must_use]
pub fn normalize(doc: &Value, dialect: Dialect, resolver: &dyn HandlerResolver) -> RouteTable {
    let strategy = Strategy::for_dialect(dialect);
    let title = doc
        .get("info")
        .and_then(|info| info.get("title"))
        .and_then(Value::as_str)
        .unwrap_or(RouteTable::UNNAMED);

    let mut table = RouteTable::new(title);
    table.dialect = Some(dialect);
    table.base_urls = strategy.base_urls(doc);

    for raw in strategy.operations(doc) {
        let route = describe(doc, dialect, raw, resolver);
        let label = route.label();
        if !table.insert(route) {
            debug!(route = %label, "duplicate route dropped");
        }
    }

    debug!(title = %table.title, routes = table.len(), "normalized");
    table
}

fn describe(
    doc: &Value,
    dialect: Dialect,
    raw: RawOperation<'_>,
    resolver: &dyn HandlerResolver,
) -> RouteDescriptor {
    let parameters: Vec<RouteParameter> = raw
        .parameters
        .iter()
        .filter_map(|p| parameter(doc, dialect, p))
        .collect();

    let operation_id = raw
        .operation
        .get("operationId")
        .or_else(|| raw.operation.get("nickname"))
        .and_then(Value::as_str)
        .map(String::from);
    let controller = raw
        .operation
        .get(CONTROLLER_KEY)
        .and_then(Value::as_str)
        .map(String::from);

    let handler = operation_id.as_deref().and_then(|op| {
        let module = controller.as_deref().and_then(ModulePath::parse);
        match resolver.resolve(module.as_ref(), op) {
            Ok(found) => Some(found),
            Err(e) => {
                warn!(method = %raw.method, path = %raw.template, "{e}");
                None
            }
        }
    });

    RouteDescriptor {
        url_template: typed_template(&raw.template, &parameters),
        method: raw.method,
        parameters,
        operation_id,
        controller,
        handler,
    }
}

fn parameter(doc: &Value, dialect: Dialect, p: &Value) -> Option<RouteParameter> {
    let name = p.get("name").and_then(Value::as_str)?;
    let location = p
        .get(dialect.location_field())
        .and_then(Value::as_str)
        .map_or_else(|| ParamLocation::Other(String::new()), ParamLocation::parse);
    let schema_type = p
        .get("schema")
        .and_then(|s| strategy::deref(doc, s))
        .and_then(|s| s.get("type"))
        .or_else(|| p.get("type"))
        .and_then(Value::as_str)
        .map(String::from);

    Some(RouteParameter {
        name: name.to_string(),
        location,
        schema_type,
        required: p.get("required").and_then(Value::as_bool).unwrap_or(false),
    })
}

/// Converter name used in a typed placeholder.
#[must_use]
pub fn routing_type_name(schema_type: &str) -> &str {
    ROUTING_TYPES
        .iter()
        .find(|(from, _)| *from == schema_type)
        .map_or(schema_type, |(_, to)| *to)
}

/// Rewrite `<name>` to `<type:name>` for every typed path parameter.
///
/// Only word-character names are typed. Placeholders that already carry a
/// converter, or whose parameter has no declared type, are left as they are.
#[must_use]
pub fn typed_template(template: &str, parameters: &[RouteParameter]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('<') {
        let Some(len) = rest[start..].find('>') else {
            break;
        };
        let name = &rest[start + 1..start + len];
        out.push_str(&rest[..start]);

        let typed = is_word(name)
            .then(|| {
                parameters.iter().find(|p| {
                    p.location == ParamLocation::Path && p.name == name && p.schema_type.is_some()
                })
            })
            .flatten()
            .and_then(|p| p.schema_type.as_deref());

        match typed {
            Some(ty) => {
                out.push('<');
                out.push_str(routing_type_name(ty));
                out.push(':');
                out.push_str(name);
                out.push('>');
            }
            None => out.push_str(&rest[start..=start + len]),
        }
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);
    out
}

fn is_word(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}
