//! Finding sinks and printers.
//!
//! Detection code never prints: it hands every `Finding` to a
//! `FindingSink`. The sink decides where the finding goes:
//! - `ConsoleSink` streams human output as findings are discovered.
//! - `JsonSink` collects findings and prints one document at the end.
//! - `CollectSink` keeps findings in memory (tests, embedding).
//!
//! `PolicyGate` sits in front of any sink and implements policy-only mode.

use crate::models::{Finding, Severity, Summary};
use crate::utils::use_colors;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

/// Destination for findings produced during an audit.
pub trait FindingSink {
    fn emit(&mut self, finding: Finding);
}

impl<S: FindingSink + ?Sized> FindingSink for &mut S {
    fn emit(&mut self, finding: Finding) {
        (**self).emit(finding)
    }
}

/// Drops findings below `PolicyViolation` when policy-only mode is on.
///
/// Only the visible message is suppressed; checks have already updated the
/// chapter status by the time a finding reaches the gate.
pub struct PolicyGate<S> {
    inner: S,
    policy_only: bool,
}

impl<S: FindingSink> PolicyGate<S> {
    pub fn new(inner: S, policy_only: bool) -> Self {
        Self { inner, policy_only }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: FindingSink> FindingSink for PolicyGate<S> {
    fn emit(&mut self, finding: Finding) {
        if self.policy_only && finding.severity < Severity::PolicyViolation {
            return;
        }
        self.inner.emit(finding);
    }
}

#[derive(Default)]
pub struct CollectSink {
    pub findings: Vec<Finding>,
}

impl FindingSink for CollectSink {
    fn emit(&mut self, finding: Finding) {
        self.findings.push(finding);
    }
}

/// Streams each finding to stdout the moment it is reported.
pub struct ConsoleSink {
    color: bool,
    summary: Summary,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            color: use_colors(),
            summary: Summary::default(),
        }
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl FindingSink for ConsoleSink {
    fn emit(&mut self, finding: Finding) {
        self.summary.record(finding.severity);
        println!("{}", render_line(&finding, self.color));
    }
}

/// Render one finding as a single human-readable line.
pub fn render_line(f: &Finding, color: bool) -> String {
    let prefix = f.severity.prefix();
    let sev = if color {
        match f.severity {
            Severity::PolicyViolation => prefix.red().bold().to_string(),
            Severity::High => prefix.magenta().bold().to_string(),
            Severity::Medium => prefix.yellow().bold().to_string(),
            Severity::Low => prefix.cyan().to_string(),
            Severity::Info => prefix.blue().to_string(),
        }
    } else {
        prefix.to_string()
    };
    let loc = match f.line {
        Some(n) => format!("{}:{}", f.file, n),
        None => f.file.clone(),
    };
    let loc = if color { loc.bold().to_string() } else { loc };
    format!("{} {} ❲{}❳ {}", sev, loc, f.rule, f.message)
}

/// Collects findings and prints them as one JSON document on `finish`.
#[derive(Default)]
pub struct JsonSink {
    findings: Vec<Finding>,
    summary: Summary,
}

impl JsonSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Print the collected document to stdout.
    pub fn finish(mut self, chapters: usize) -> Result<(), serde_json::Error> {
        self.summary.chapters = chapters;
        let doc = compose_findings_json(&self.findings, &self.summary);
        println!("{}", serde_json::to_string_pretty(&doc)?);
        Ok(())
    }
}

impl FindingSink for JsonSink {
    fn emit(&mut self, finding: Finding) {
        self.summary.record(finding.severity);
        self.findings.push(finding);
    }
}

/// Compose the JSON findings document (pure) for testing purposes.
pub fn compose_findings_json(findings: &[Finding], summary: &Summary) -> JsonVal {
    json!({
        "findings": findings,
        "summary": summary,
    })
}

/// Print the closing human summary line.
pub fn print_summary(summary: &Summary) {
    let line = format!(
        "— Summary — chapters={} policy={} high={} medium={} low={} info={}",
        summary.chapters,
        summary.policy_violations,
        summary.high,
        summary.medium,
        summary.low,
        summary.info
    );
    if use_colors() {
        println!("{}", line.bold());
    } else {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(severity: Severity) -> Finding {
        Finding {
            chapter: "www-chapter-x".into(),
            rule: "test",
            severity,
            file: "www-chapter-x/index.md".into(),
            line: Some(3),
            message: "msg".into(),
        }
    }

    fn all_severities() -> Vec<Finding> {
        [
            Severity::Info,
            Severity::Low,
            Severity::Medium,
            Severity::High,
            Severity::PolicyViolation,
            Severity::PolicyViolation,
        ]
        .into_iter()
        .map(finding)
        .collect()
    }

    #[test]
    fn test_gate_passes_everything_when_disabled() {
        let mut gate = PolicyGate::new(CollectSink::default(), false);
        for f in all_severities() {
            gate.emit(f);
        }
        assert_eq!(gate.into_inner().findings.len(), 6);
    }

    #[test]
    fn test_gate_is_exact_policy_subset() {
        let mut open = PolicyGate::new(CollectSink::default(), false);
        let mut strict = PolicyGate::new(CollectSink::default(), true);
        for f in all_severities() {
            open.emit(f.clone());
            strict.emit(f);
        }
        let open = open.into_inner().findings;
        let strict = strict.into_inner().findings;
        let expected: Vec<Finding> = open
            .iter()
            .filter(|f| f.severity == Severity::PolicyViolation)
            .cloned()
            .collect();
        assert_eq!(strict, expected);
        assert!(strict.iter().all(|f| open.contains(f)));
    }

    #[test]
    fn test_render_line_plain() {
        let line = render_line(&finding(Severity::High), false);
        assert_eq!(line, "[HIGH] www-chapter-x/index.md:3 ❲test❳ msg");
        let mut f = finding(Severity::Info);
        f.line = None;
        assert_eq!(render_line(&f, false), "[INFO] www-chapter-x/index.md ❲test❳ msg");
    }

    #[test]
    fn test_compose_findings_json_shape() {
        let mut summary = Summary::default();
        summary.record(Severity::PolicyViolation);
        summary.chapters = 1;
        let out = compose_findings_json(&[finding(Severity::PolicyViolation)], &summary);
        assert_eq!(out["summary"]["policy_violations"], 1);
        assert_eq!(out["findings"][0]["severity"], "policy_violation");
        assert_eq!(out["findings"][0]["line"], 3);
    }
}
