//! apidispatch-core: Core types for specification-driven route dispatch
//!
//! This crate provides the dialect model, the validation result and route
//! descriptor types, configuration, and the verdict policy shared by the
//! validator engine and the CLI.

pub mod config;
pub mod dialect;
pub mod report;
pub mod route;
pub mod validation;
pub mod verdict;

pub use config::{Config, ConfigError};
pub use dialect::Dialect;
pub use report::Report;
pub use route::{HandlerRef, ParamLocation, RouteDescriptor, RouteParameter, RouteTable};
pub use validation::{BrokenRef, PipelineStage, ValidationResult};
pub use verdict::{
    Finding, FindingKind, Severity, Verdict, VerdictPolicy, VerdictStatus, collect_findings,
    route_findings,
};
