//! apidispatch-validator: validation and routing engine
//!
//! Loads Swagger 1.2, Swagger 2.0 and OpenAPI 3.x documents, checks them
//! against the bundled grammars and their internal `$ref` pointers, and
//! turns valid documents into route tables.

pub mod dispatcher;
pub mod grammar;
pub mod handler;
pub mod loader;
pub mod refs;
pub mod routes;
pub mod validate;

pub use dispatcher::{AddApiOptions, AddApiOutcome, DispatchError, Dispatcher};
pub use grammar::{Grammar, GrammarRegistry, InternalSchemaError};
pub use handler::{HandlerRegistry, HandlerResolver, ModulePath, ResolveError, Unresolved};
pub use loader::{DocumentSource, Format, LoadError, load, load_str};
pub use refs::resolve_all_refs;
pub use routes::{normalize, typed_template};
pub use validate::{Validator, validate_schema};
