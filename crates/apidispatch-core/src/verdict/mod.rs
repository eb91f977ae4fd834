//! Verdict module - finding classification, severity, and policy

mod finding;
mod policy;
mod severity;

pub use finding::{Finding, FindingKind, collect_findings, route_findings};
pub use policy::{Verdict, VerdictPolicy, VerdictStatus};
pub use severity::Severity;
