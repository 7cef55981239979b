//! Leader count from the canonical `leaders.md`.
//!
//! Only `<chapter>/leaders.md` counts. `tab_leaders.md` and copies in
//! nested directories are ignored. A line counts once when it carries a
//! syntactically valid address in one of these forms, after an optional
//! `*`/`-` bullet:
//! - `user@example.org`
//! - `[Name](mailto:user@example.org)`
//! - `[Name](user@example.org)`

use super::{CheckContext, Rule, SourceFile};
use crate::models::Severity;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

pub const LEADERS_FILE: &str = "leaders.md";
pub const MIN_LEADERS: u32 = 2;
pub const MAX_LEADERS: u32 = 5;

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
            .expect("email pattern is valid")
    })
}

pub fn is_valid_email(s: &str) -> bool {
    email_re().is_match(s)
}

/// True only for the leaders file sitting directly in the chapter root.
pub fn is_canonical(path: &Path, chapter_root: &Path) -> bool {
    path.file_name().is_some_and(|n| n == LEADERS_FILE) && path.parent() == Some(chapter_root)
}

/// Extract the address a leaders line refers to, if any.
pub fn extract_email(line: &str) -> Option<&str> {
    let s = line.trim();
    if s.is_empty() || s.starts_with('#') || !s.contains('@') {
        return None;
    }
    let s = s.trim_start_matches(['*', '-']).trim_start();

    if let Some(start) = s.find("](") {
        let rest = &s[start + 2..];
        if let Some(end) = rest.find(')') {
            let target = rest[..end].trim();
            let target = target.strip_prefix("mailto:").unwrap_or(target);
            if is_valid_email(target) {
                return Some(target);
            }
        }
    }

    s.split(|c: char| c.is_whitespace() || matches!(c, '<' | '>' | '(' | ')' | '[' | ']' | ',' | ';'))
        .map(|t| t.strip_prefix("mailto:").unwrap_or(t).trim_end_matches('.'))
        .find(|t| is_valid_email(t))
}

/// Number of lines in `text` that carry a valid leader address.
pub fn count_leaders(text: &str) -> u32 {
    text.lines().filter(|l| extract_email(l).is_some()).count() as u32
}

pub fn check_leader_count(file: &SourceFile<'_>, ctx: &mut CheckContext<'_>) {
    if !is_canonical(file.path, ctx.chapter_root) {
        return;
    }
    let count = count_leaders(file.text);
    ctx.status.leader_count = count;
    if !(MIN_LEADERS..=MAX_LEADERS).contains(&count) {
        ctx.report(
            Rule::LeaderCount.id(),
            Severity::PolicyViolation,
            file.path,
            None,
            format!(
                "Chapter lists {} leaders (expected {} to {})",
                count, MIN_LEADERS, MAX_LEADERS
            ),
        );
    }
}

/// Reported once at chapter finalization when no canonical leaders file
/// was seen in the chapter subtree.
pub fn report_missing(ctx: &mut CheckContext<'_>) {
    ctx.status.leader_count = 0;
    let path = ctx.chapter_root.join(LEADERS_FILE);
    ctx.report(
        Rule::LeaderCount.id(),
        Severity::PolicyViolation,
        &path,
        None,
        "Chapter has no leaders.md",
    );
}
