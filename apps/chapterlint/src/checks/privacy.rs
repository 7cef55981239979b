//! Third-party form links.
//!
//! A form hosted under the organization's own Google Workspace domain
//! (`docs.google.com/a/<domain>/forms/...`) is acceptable; a domain-scoped
//! form under any other domain is not. Generic form links cannot be traced
//! to an owner and are reported as unknown. The domain comparison is
//! case-insensitive and looks only at the `/a/<domain>/` path segment.

use super::{CheckContext, Rule, SourceFile};
use crate::models::{PrivacyStatus, Severity};

const SCOPED_PREFIX: &str = "docs.google.com/a/";
const GENERIC_FORMS: [&str; 2] = ["docs.google.com/forms", "forms.gle/"];

/// Classify one line; `None` when it holds no form link.
pub fn classify_line(line: &str, org_domain: &str) -> Option<PrivacyStatus> {
    let lower = line.to_lowercase();
    if let Some(idx) = lower.find(SCOPED_PREFIX) {
        let rest = &lower[idx + SCOPED_PREFIX.len()..];
        let (domain, path) = rest.split_once('/').unwrap_or((rest, ""));
        if path.starts_with("forms") {
            return Some(if domain.contains(&org_domain.to_lowercase()) {
                PrivacyStatus::CompliantDomain
            } else {
                PrivacyStatus::NonCompliant
            });
        }
    }
    if GENERIC_FORMS.iter().any(|g| lower.contains(g)) {
        return Some(PrivacyStatus::Unknown);
    }
    None
}

pub fn check_form_privacy(file: &SourceFile<'_>, ctx: &mut CheckContext<'_>) {
    for (n, line) in file.numbered_lines() {
        let Some(seen) = classify_line(line, ctx.org_domain) else {
            continue;
        };
        let (severity, message) = match seen {
            PrivacyStatus::NonCompliant => (
                Severity::PolicyViolation,
                "Form hosted outside the organization domain",
            ),
            PrivacyStatus::CompliantDomain => {
                (Severity::High, "Form hosted on the organization domain")
            }
            _ => (Severity::High, "Third-party form with unknown owner"),
        };
        ctx.status.escalate_privacy(seen);
        ctx.report(Rule::FormPrivacy.id(), severity, file.path, Some(n), message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::testing::Harness;

    #[test]
    fn test_classify_line() {
        let d = "owasp.org";
        assert_eq!(
            classify_line("https://docs.google.com/forms/d/e/1FAI/viewform", d),
            Some(PrivacyStatus::Unknown)
        );
        assert_eq!(
            classify_line("https://forms.gle/abc123", d),
            Some(PrivacyStatus::Unknown)
        );
        assert_eq!(
            classify_line("https://docs.google.com/a/OWASP.org/forms/d/xyz/viewform", d),
            Some(PrivacyStatus::CompliantDomain)
        );
        assert_eq!(
            classify_line("https://docs.google.com/a/example.com/forms/d/xyz", d),
            Some(PrivacyStatus::NonCompliant)
        );
        assert_eq!(
            classify_line("https://docs.google.com/a/owasp.org/document/d/xyz", d),
            None
        );
        assert_eq!(classify_line("plain text", d), None);
    }

    #[test]
    fn test_non_compliant_is_policy_violation() {
        let mut h = Harness::new();
        h.run(
            "index.md",
            "[Register](https://docs.google.com/a/gmail.com/forms/d/1/viewform)\n",
            None,
            check_form_privacy,
        );
        assert_eq!(h.status.form_privacy, PrivacyStatus::NonCompliant);
        assert_eq!(h.severities(), vec![Severity::PolicyViolation]);
    }

    #[test]
    fn test_worst_observation_wins() {
        let mut h = Harness::new();
        h.run(
            "index.md",
            "https://docs.google.com/forms/d/1\nhttps://docs.google.com/a/owasp.org/forms/d/2\n",
            None,
            check_form_privacy,
        );
        assert_eq!(h.status.form_privacy, PrivacyStatus::Unknown);
        assert_eq!(h.severities(), vec![Severity::High, Severity::High]);
    }
}
