//! Leftovers from the chapter page template.

use super::{CheckContext, Rule, SourceFile};
use crate::models::Severity;

pub const TEMPLATE_MARKER: &str = "Standard Chapter Page Template";
pub const EXAMPLE_TAB: &str = "tab_example.md";
pub const MIGRATION_MARKER: &str = "auto-migrated: 1";

/// Template placeholder text still present in a page.
pub fn check_default_text(file: &SourceFile<'_>, ctx: &mut CheckContext<'_>) {
    for (n, line) in file.numbered_lines() {
        if line.contains(TEMPLATE_MARKER) {
            ctx.status.default_text = true;
            ctx.report(
                Rule::DefaultText.id(),
                Severity::PolicyViolation,
                file.path,
                Some(n),
                "Default template text found",
            );
        }
    }
}

/// The example tab shipped with the template was never removed.
pub fn check_example_tab(file: &SourceFile<'_>, ctx: &mut CheckContext<'_>) {
    ctx.status.example_tab = true;
    ctx.report(
        Rule::ExampleTab.id(),
        Severity::Low,
        file.path,
        None,
        "Default example tab is present",
    );
}

/// Front matter still carries the automatic migration marker.
pub fn check_migration_header(file: &SourceFile<'_>, ctx: &mut CheckContext<'_>) {
    for (n, line) in file.numbered_lines() {
        if line.contains(MIGRATION_MARKER) {
            ctx.status.migration_header = true;
            ctx.report(
                Rule::MigrationHeader.id(),
                Severity::PolicyViolation,
                file.path,
                Some(n),
                "Auto-migration header is still set",
            );
        }
    }
}
