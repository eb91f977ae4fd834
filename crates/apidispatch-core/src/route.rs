//! Route descriptors: the dialect-independent routing model
//!
//! Every (path, method) pair of a validated document becomes one
//! [`RouteDescriptor`]. A [`RouteTable`] keeps them in document order and
//! refuses a second descriptor for an already mapped (url template, method).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Dialect;

/// Where a parameter is carried in the request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum ParamLocation {
    Path,
    Query,
    Header,
    Cookie,
    Body,
    /// `form` (Swagger 1.2) and `formData` (Swagger 2.0)
    Form,
    /// Anything the grammar let through that we do not model
    Other(String),
}

impl ParamLocation {
    /// Parse the raw value of `in` / `paramType`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "path" => Self::Path,
            "query" => Self::Query,
            "header" => Self::Header,
            "cookie" => Self::Cookie,
            "body" => Self::Body,
            "form" | "formData" => Self::Form,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Cookie => "cookie",
            Self::Body => "body",
            Self::Form => "form",
            Self::Other(s) => s,
        }
    }
}

/// A declared operation parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RouteParameter {
    pub name: String,
    pub location: ParamLocation,
    /// Declared schema type (`integer`, `string`, ...), if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    #[serde(default)]
    pub required: bool,
}

/// A handler located by the handler resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct HandlerRef {
    /// Dotted module path the handler was found in
    pub module: String,
    /// Handler (function) name
    pub name: String,
}

impl std::fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.module, self.name)
    }
}

/// One routable endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RouteDescriptor {
    /// Path with `<name>` or `<type:name>` placeholders
    pub url_template: String,
    /// Upper-case HTTP method
    pub method: String,
    pub parameters: Vec<RouteParameter>,
    /// `operationId` (or Swagger 1.2 `nickname`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// `x-swagger-router-controller` hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<String>,
    /// `None` when the handler could not be resolved
    #[serde(default)]
    pub handler: Option<HandlerRef>,
}

impl RouteDescriptor {
    /// Operation label, e.g. "GET /pets/<int:id>"
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.url_template)
    }

    /// Whether an operation id was declared but no handler was found.
    #[must_use]
    pub fn is_unmatched(&self) -> bool {
        self.operation_id.is_some() && self.handler.is_none()
    }
}

/// Ordered, de-duplicated set of routes derived from one or more documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RouteTable {
    /// API title (`info.title`)
    pub title: String,
    /// Dialect of the last document added
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialect: Option<Dialect>,
    /// Server URLs / base paths
    pub base_urls: Vec<String>,
    routes: Vec<RouteDescriptor>,
}

impl RouteTable {
    pub const UNNAMED: &'static str = "Unnamed";

    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Add a route unless its (url template, method) is already mapped.
    ///
    /// Returns `false` when the route was dropped as a duplicate.
    pub fn insert(&mut self, route: RouteDescriptor) -> bool {
        if self.contains(&route.url_template, &route.method) {
            return false;
        }
        self.routes.push(route);
        true
    }

    /// Whether (url template, method) is already mapped.
    #[must_use]
    pub fn contains(&self, url_template: &str, method: &str) -> bool {
        self.routes
            .iter()
            .any(|r| r.url_template == url_template && r.method == method)
    }

    /// Merge another table: routes de-duplicated, base URLs appended.
    ///
    /// Returns `other` narrowed to the routes that were new to this table.
    pub fn merge(&mut self, mut other: RouteTable) -> RouteTable {
        self.base_urls.extend(other.base_urls.iter().cloned());
        if other.dialect.is_some() {
            self.dialect = other.dialect;
        }
        for route in std::mem::take(&mut other.routes) {
            if self.insert(route.clone()) {
                other.routes.push(route);
            }
        }
        other
    }

    /// Routes in insertion order.
    #[must_use]
    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RouteDescriptor> {
        self.routes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Routes whose declared operation id has no handler.
    pub fn unmatched(&self) -> impl Iterator<Item = &RouteDescriptor> {
        self.routes.iter().filter(|r| r.is_unmatched())
    }

    /// Format as human-readable terminal output.
    #[must_use]
    pub fn to_terminal(&self) -> String {
        let mut lines = Vec::new();
        let dialect = self
            .dialect
            .map(|d| d.to_string())
            .unwrap_or_else(|| "unknown dialect".to_string());
        lines.push(format!(
            "{} ({dialect}): {} routes",
            self.title,
            self.routes.len()
        ));
        if !self.base_urls.is_empty() {
            lines.push(format!("  Base URLs: {}", self.base_urls.join(", ")));
        }
        for route in &self.routes {
            let handler = match (&route.handler, &route.operation_id) {
                (Some(h), _) => h.to_string(),
                (None, Some(op)) => format!("unresolved ({op})"),
                (None, None) => "unresolved".to_string(),
            };
            lines.push(format!(
                "  {:<7} {} -> {handler}",
                route.method, route.url_template
            ));
        }
        lines.join("\n")
    }
}
