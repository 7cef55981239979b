//! Shared data models: findings, severities, and per-chapter status records.

pub mod status;

pub use status::{ChapterStatus, PrivacyStatus, ServiceStatus, StatusStore};

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
/// Finding severity, ordered by ascending strictness.
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    PolicyViolation,
}

impl Severity {
    /// Fixed console prefix. Carries no meaning beyond display.
    pub fn prefix(self) -> &'static str {
        match self {
            Severity::Info => "[INFO]",
            Severity::Low => "[LOW]",
            Severity::Medium => "[MEDIUM]",
            Severity::High => "[HIGH]",
            Severity::PolicyViolation => "[POLICY]",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A single observation made while auditing a chapter.
pub struct Finding {
    pub chapter: String,
    pub rule: &'static str,
    pub severity: Severity,
    pub file: String,
    /// 1-based line number; `None` for path- or directory-level findings.
    pub line: Option<usize>,
    pub message: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
/// Aggregated counts used by printers.
pub struct Summary {
    pub chapters: usize,
    pub policy_violations: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
}

impl Summary {
    pub fn record(&mut self, severity: Severity) {
        match severity {
            Severity::PolicyViolation => self.policy_violations += 1,
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
            Severity::Info => self.info += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_order_is_ascending_strictness() {
        let mut all = vec![
            Severity::PolicyViolation,
            Severity::Info,
            Severity::High,
            Severity::Low,
            Severity::Medium,
        ];
        all.sort();
        assert_eq!(
            all,
            vec![
                Severity::Info,
                Severity::Low,
                Severity::Medium,
                Severity::High,
                Severity::PolicyViolation
            ]
        );
    }

    #[test]
    fn test_summary_record() {
        let mut s = Summary::default();
        s.record(Severity::PolicyViolation);
        s.record(Severity::Info);
        s.record(Severity::Info);
        assert_eq!(s.policy_violations, 1);
        assert_eq!(s.info, 2);
        assert_eq!(s.high, 0);
    }
}
