//! Check verdicts and the rule for combining them.
//!
//! Each element's status is folded into one run-wide verdict. The fold only
//! ever raises the verdict: once a WARNING or CRITICAL has been seen, later
//! healthy elements leave it untouched.

use serde::{Deserialize, Serialize};

/// Verdict of a check run, in monitoring-plugin exit code order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Ok,
    Warning,
    Critical,
    /// Nothing conclusive observed yet, or the run was aborted.
    #[default]
    Unknown,
}

impl Severity {
    /// Process exit code for this verdict.
    pub fn exit_code(self) -> i32 {
        match self {
            Severity::Ok => 0,
            Severity::Warning => 1,
            Severity::Critical => 2,
            Severity::Unknown => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
            Severity::Unknown => "UNKNOWN",
        }
    }

    fn is_bad(self) -> bool {
        matches!(self, Severity::Warning | Severity::Critical)
    }

    /// Combine the running verdict with one element's verdict.
    ///
    /// CRITICAL always wins. WARNING raises anything but CRITICAL. OK only
    /// replaces a verdict that is not yet WARNING or CRITICAL. An UNKNOWN
    /// candidate never changes the running verdict.
    pub fn fold(self, candidate: Severity) -> Severity {
        match candidate {
            Severity::Critical => Severity::Critical,
            Severity::Warning if self != Severity::Critical => Severity::Warning,
            Severity::Ok if !self.is_bad() => Severity::Ok,
            _ => self,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
