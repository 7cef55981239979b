//! Meetup front matter and event-widget checks.

use super::{CheckContext, Rule, SourceFile};
use crate::models::{ServiceStatus, Severity};
use crate::resolver::apply_meetup;

pub const HEADER_PREFIX: &str = "meetup-group:";
pub const WIDGET_MARKER: &str = "include chapter_events.html";

/// Slug from a `meetup-group: <slug>` line; empty when none is given.
pub fn header_slug(line: &str) -> &str {
    line.strip_prefix(HEADER_PREFIX).unwrap_or(line).trim()
}

/// Resolve the group named in `index.md` front matter.
///
/// Registered only when meetup resolution is enabled for the run.
pub fn check_meetup_header(file: &SourceFile<'_>, ctx: &mut CheckContext<'_>) {
    let Some((n, line)) = file
        .numbered_lines()
        .find(|(_, l)| l.starts_with(HEADER_PREFIX))
    else {
        return;
    };
    let slug = header_slug(line);
    if slug.is_empty() {
        ctx.status.meetup_status = ServiceStatus::Nonexistent;
        ctx.report(
            Rule::MeetupHeader.id(),
            Severity::PolicyViolation,
            file.path,
            Some(n),
            "Meetup header present but no group is named",
        );
        return;
    }
    if let Some(lookup) = ctx.meetup {
        let result = lookup.group(slug);
        apply_meetup(slug, result, file.path, Some(n), ctx);
    }
}

/// Header and event widget must appear together.
pub fn check_meetup_metadata(file: &SourceFile<'_>, ctx: &mut CheckContext<'_>) {
    let header = file.text.lines().any(|l| l.starts_with(HEADER_PREFIX));
    let widget = file.text.lines().any(|l| l.contains(WIDGET_MARKER));
    match (header, widget) {
        (true, true) => {
            ctx.status.meetup_metadata_status = ServiceStatus::Active;
            ctx.report(
                Rule::MeetupMetadata.id(),
                Severity::Info,
                file.path,
                None,
                "Meetup header and event widget present",
            );
        }
        (true, false) | (false, true) => {
            ctx.status.meetup_metadata_status = ServiceStatus::Inactive;
            let missing = if header { "event widget" } else { "meetup-group header" };
            ctx.report(
                Rule::MeetupMetadata.id(),
                Severity::Medium,
                file.path,
                None,
                format!("Meetup metadata inconsistent: missing {}", missing),
            );
        }
        (false, false) => {}
    }
}
