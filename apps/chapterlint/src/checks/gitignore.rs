//! Stale `.gitignore` detection.

use super::{CheckContext, Rule, SourceFile};
use crate::models::Severity;

/// Entries every chapter `.gitignore` is expected to carry.
pub const REQUIRED_ENTRIES: [&str; 2] = ["_site", "Gemfile.lock"];

fn has_entry(text: &str, entry: &str) -> bool {
    text.lines()
        .map(|l| l.trim())
        .filter(|l| !l.starts_with('#'))
        .any(|l| l.trim_matches('/') == entry)
}

/// One `Info` finding per missing entry.
pub fn check_gitignore(file: &SourceFile<'_>, ctx: &mut CheckContext<'_>) {
    for entry in REQUIRED_ENTRIES {
        if has_entry(file.text, entry) {
            continue;
        }
        ctx.status.legacy_gitignore = true;
        ctx.report(
            Rule::GitIgnore.id(),
            Severity::Info,
            file.path,
            None,
            format!("Out of date .gitignore: missing '{}'", entry),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::testing::Harness;

    #[test]
    fn test_both_missing_reports_two_infos() {
        let mut h = Harness::new();
        h.run(".gitignore", "node_modules\n.DS_Store\n", None, check_gitignore);
        assert!(h.status.legacy_gitignore);
        assert_eq!(h.severities(), vec![Severity::Info, Severity::Info]);
    }

    #[test]
    fn test_current_gitignore_is_clean() {
        let mut h = Harness::new();
        h.run(".gitignore", "/_site/\nGemfile.lock\n", None, check_gitignore);
        assert!(!h.status.legacy_gitignore);
        assert!(h.sink.findings.is_empty());
    }

    #[test]
    fn test_commented_entry_does_not_count() {
        let mut h = Harness::new();
        h.run(".gitignore", "# _site\nGemfile.lock\n", None, check_gitignore);
        assert_eq!(h.sink.findings.len(), 1);
        assert!(h.sink.findings[0].message.contains("_site"));
    }
}
