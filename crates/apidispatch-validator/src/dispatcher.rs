//! Dispatcher: accumulates the routes of every API added to it
//!
//! Each `add_api` call runs the full pipeline (load, detect, schema check,
//! reference check, normalize). Routes are only added when both checks pass.

use std::sync::Arc;

use apidispatch_core::{Config, Dialect, PipelineStage, RouteTable, ValidationResult};
use tracing::{debug, info, warn};

use crate::grammar::{GrammarRegistry, InternalSchemaError};
use crate::handler::{HandlerRegistry, HandlerResolver, ModulePath, ResolveError};
use crate::loader::{self, DocumentSource, LoadError};
use crate::routes;
use crate::validate::Validator;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Internal(#[from] InternalSchemaError),
}

/// Per-call options of [`Dispatcher::add_api_with`].
#[derive(Debug, Clone)]
pub struct AddApiOptions {
    /// Take the title of the added API
    pub overwrite_name: bool,
    /// Module searched for handlers of operations without a controller hint
    pub methods_module: Option<String>,
}

impl Default for AddApiOptions {
    fn default() -> Self {
        Self {
            overwrite_name: true,
            methods_module: None,
        }
    }
}

/// What an `add_api` call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddApiOutcome {
    /// Document was valid; its routes were merged.
    Added {
        dialect: Dialect,
        /// Routes new to the dispatcher
        added: usize,
        /// The document's table, narrowed to the routes that were added
        routes: RouteTable,
        /// Routes dropped because the dispatcher already mapped them
        duplicates: usize,
    },
    /// Document was invalid; nothing was merged.
    Rejected {
        /// Last stage the pipeline completed
        stage: PipelineStage,
        result: ValidationResult,
    },
}

impl AddApiOutcome {
    #[must_use]
    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added { .. })
    }

    /// Validation result of an added document, which is always clean.
    #[must_use]
    pub fn validation(&self) -> ValidationResult {
        match self {
            Self::Added { dialect, .. } => ValidationResult::from_checks(*dialect, vec![], vec![]),
            Self::Rejected { result, .. } => result.clone(),
        }
    }

    /// Final stage reached by the call.
    #[must_use]
    pub fn stage(&self) -> PipelineStage {
        match self {
            Self::Added { .. } => PipelineStage::Normalized,
            Self::Rejected { stage, .. } => *stage,
        }
    }
}

/// Falls back to a per-call module when an operation carries no hint.
struct WithModule<'a, R: ?Sized> {
    inner: &'a R,
    module: Option<ModulePath>,
}

impl<R: HandlerResolver + ?Sized> HandlerResolver for WithModule<'_, R> {
    fn resolve(
        &self,
        module: Option<&ModulePath>,
        operation: &str,
    ) -> Result<apidispatch_core::HandlerRef, ResolveError> {
        self.inner.resolve(module.or(self.module.as_ref()), operation)
    }
}

/// Accumulates routes across APIs.
pub struct Dispatcher {
    validator: Validator,
    resolver: Box<dyn HandlerResolver>,
    options: AddApiOptions,
    table: RouteTable,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Validator::default())
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("validator", &self.validator)
            .field("options", &self.options)
            .field("routes", &self.table.len())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Dispatcher with no known handlers.
    #[must_use]
    pub fn new(validator: Validator) -> Self {
        Self {
            validator,
            resolver: Box::new(crate::handler::Unresolved),
            options: AddApiOptions::default(),
            table: RouteTable::new(RouteTable::UNNAMED),
        }
    }

    /// Build from configuration: grammar directory, handler table, defaults.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let grammars = config
            .schemas_dir
            .as_deref()
            .map_or_else(GrammarRegistry::bundled, GrammarRegistry::from_dir);
        let mut dispatcher = Self::new(Validator::new(Arc::new(grammars)));
        if !config.handlers.is_empty() {
            dispatcher.resolver = Box::new(HandlerRegistry::from_table(&config.handlers));
        }
        dispatcher.options = AddApiOptions {
            overwrite_name: config.overwrite_name,
            methods_module: config.methods_module.clone(),
        };
        dispatcher
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: impl HandlerResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: AddApiOptions) -> Self {
        self.options = options;
        self
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Routes accumulated so far.
    pub fn routes(&self) -> &RouteTable {
        &self.table
    }

    pub fn title(&self) -> &str {
        &self.table.title
    }

    pub fn base_urls(&self) -> &[String] {
        &self.table.base_urls
    }

    pub fn into_routes(self) -> RouteTable {
        self.table
    }

    /// Add an API with the dispatcher's default options.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::add_api_with`].
    pub fn add_api(
        &mut self,
        source: impl Into<DocumentSource>,
    ) -> Result<AddApiOutcome, DispatchError> {
        let options = self.options.clone();
        self.add_api_with(source, &options)
    }

    /// Load, validate and, if valid, merge the routes of one document.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Load`] when the document cannot be read or
    /// parsed, and [`DispatchError::Internal`] when a grammar is unusable.
    /// An invalid document is not an error: it yields
    /// [`AddApiOutcome::Rejected`].
    pub fn add_api_with(
        &mut self,
        source: impl Into<DocumentSource>,
        options: &AddApiOptions,
    ) -> Result<AddApiOutcome, DispatchError> {
        let source = source.into();
        let label = source.label();
        debug!(source = %label, stage = %PipelineStage::Unloaded, "add_api");

        let doc = loader::load(source)?;
        debug!(source = %label, stage = %PipelineStage::Loaded, "add_api");

        let result = self.validator.validate(&doc)?;
        let Some(dialect) = result.dialect else {
            return Ok(AddApiOutcome::Rejected {
                stage: PipelineStage::Loaded,
                result,
            });
        };
        debug!(source = %label, stage = %PipelineStage::RefsChecked, valid = result.is_valid, "add_api");

        if !result.is_valid {
            warn!(
                source = %label,
                errors = result.error_count(),
                "document rejected"
            );
            return Ok(AddApiOutcome::Rejected {
                stage: PipelineStage::RefsChecked,
                result,
            });
        }

        let resolver = WithModule {
            inner: self.resolver.as_ref(),
            module: options.methods_module.as_deref().and_then(ModulePath::parse),
        };
        let table = routes::normalize(&doc, dialect, &resolver);
        let total = table.len();

        let new_routes = self.table.merge(table);
        let added = new_routes.len();
        if options.overwrite_name {
            self.table.title.clone_from(&new_routes.title);
        }
        debug!(source = %label, stage = %PipelineStage::Normalized, "add_api");
        info!(source = %label, %dialect, added, "API added");

        Ok(AddApiOutcome::Added {
            dialect,
            added,
            routes: new_routes,
            duplicates: total - added,
        })
    }
}
