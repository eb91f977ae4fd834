//! Handler resolution: operation id + module hint -> handler reference
//!
//! Resolution failures are reported to the caller, which logs them and emits
//! the route without a handler. They never fail validation.

use std::collections::{BTreeMap, BTreeSet};

use apidispatch_core::HandlerRef;

/// Dotted module path, e.g. `controllers.pets`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModulePath {
    segments: Vec<String>,
}

impl ModulePath {
    /// Parse a dotted hint. Empty segments are dropped; an empty hint is `None`.
    #[must_use]
    pub fn parse(hint: &str) -> Option<Self> {
        let segments: Vec<String> = hint
            .split('.')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        (!segments.is_empty()).then_some(Self { segments })
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Final segment: the module name proper.
    #[must_use]
    pub fn name(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }

    #[must_use]
    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }
}

impl std::fmt::Display for ModulePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.dotted())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("Module {0} not found")]
    ModuleNotFound(String),
    #[error("Handler {handler} not found in {module} module")]
    HandlerNotFound { handler: String, module: String },
    #[error("No module given for handler {0} and no default module configured")]
    NoModule(String),
}

/// Locates the handler for an operation.
pub trait HandlerResolver: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ResolveError`] when the module or the handler is unknown.
    fn resolve(&self, module: Option<&ModulePath>, operation: &str)
    -> Result<HandlerRef, ResolveError>;
}

/// Resolver that knows no handlers. Every route stays unresolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unresolved;

impl HandlerResolver for Unresolved {
    fn resolve(
        &self,
        module: Option<&ModulePath>,
        operation: &str,
    ) -> Result<HandlerRef, ResolveError> {
        match module {
            Some(m) => Err(ResolveError::ModuleNotFound(m.dotted())),
            None => Err(ResolveError::NoModule(operation.to_string())),
        }
    }
}

/// Handlers registered by module.
///
/// A hinted module is looked up by its full dotted path first, then by its
/// final segment. Without a hint the default module is used.
#[derive(Debug, Clone, Default)]
pub struct HandlerRegistry {
    modules: BTreeMap<String, BTreeSet<String>>,
    default_module: Option<String>,
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a `module -> handler names` table (as found in config).
    #[must_use]
    pub fn from_table<'a>(
        table: impl IntoIterator<Item = (&'a String, &'a Vec<String>)>,
    ) -> Self {
        let mut registry = Self::new();
        for (module, handlers) in table {
            for handler in handlers {
                registry.register(module, handler);
            }
        }
        registry
    }

    /// Register one handler under a module.
    pub fn register(&mut self, module: &str, handler: &str) -> &mut Self {
        self.modules
            .entry(module.to_string())
            .or_default()
            .insert(handler.to_string());
        self
    }

    /// Module searched when an operation has no controller hint.
    #[must_use]
    pub fn with_default_module(mut self, module: impl Into<String>) -> Self {
        self.default_module = Some(module.into());
        self
    }

    fn find_module(&self, hint: &ModulePath) -> Option<(&str, &BTreeSet<String>)> {
        let dotted = hint.dotted();
        self.modules
            .get_key_value(&dotted)
            .or_else(|| self.modules.get_key_value(hint.name()))
            .map(|(k, v)| (k.as_str(), v))
    }
}

impl HandlerResolver for HandlerRegistry {
    fn resolve(
        &self,
        module: Option<&ModulePath>,
        operation: &str,
    ) -> Result<HandlerRef, ResolveError> {
        let hint = match module {
            Some(m) => m.clone(),
            None => self
                .default_module
                .as_deref()
                .and_then(ModulePath::parse)
                .ok_or_else(|| ResolveError::NoModule(operation.to_string()))?,
        };

        let (name, handlers) = self
            .find_module(&hint)
            .ok_or_else(|| ResolveError::ModuleNotFound(hint.dotted()))?;

        if handlers.contains(operation) {
            Ok(HandlerRef {
                module: name.to_string(),
                name: operation.to_string(),
            })
        } else {
            Err(ResolveError::HandlerNotFound {
                handler: operation.to_string(),
                module: name.to_string(),
            })
        }
    }
}
