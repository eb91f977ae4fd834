//! Verdict policy - determines how findings are judged

use super::{Finding, FindingKind, Severity};

/// Policy for judging findings
#[derive(Debug, Clone)]
pub struct VerdictPolicy {
    /// Strict mode: warnings become errors
    pub strict: bool,
    /// Finding kinds to ignore
    pub ignore_kinds: Vec<FindingKind>,
}

impl Default for VerdictPolicy {
    fn default() -> Self {
        Self {
            strict: true, // Default is strict - explicit opt-out required
            ignore_kinds: vec![],
        }
    }
}

impl VerdictPolicy {
    /// Filter findings according to policy
    #[must_use]
    pub fn filter(&self, findings: Vec<Finding>) -> Vec<Finding> {
        findings
            .into_iter()
            .filter(|f| !self.ignore_kinds.contains(&f.kind))
            .collect()
    }

    /// Highest exit code among all findings, 0 when there are none.
    #[must_use]
    pub fn exit_code(&self, findings: &[Finding]) -> i32 {
        findings
            .iter()
            .map(|f| f.severity.exit_code(self.strict))
            .max()
            .unwrap_or(0)
    }

    /// Determine verdict from findings.
    #[must_use]
    pub fn verdict(&self, findings: &[Finding]) -> Verdict {
        let exit_code = self.exit_code(findings);
        let status = if exit_code == 0 {
            VerdictStatus::Pass
        } else {
            VerdictStatus::Fail
        };

        let reason = if findings.is_empty() {
            "Document is valid".to_string()
        } else {
            let count = |s: Severity| findings.iter().filter(|f| f.severity == s).count();
            format!(
                "{} findings ({} error, {} warning)",
                findings.len(),
                count(Severity::Error),
                count(Severity::Warning)
            )
        };

        Verdict {
            status,
            exit_code,
            reason,
        }
    }
}

/// Final verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub status: VerdictStatus,
    pub exit_code: i32,
    pub reason: String,
}

/// Pass or fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictStatus {
    Pass,
    Fail,
}

impl std::fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}
