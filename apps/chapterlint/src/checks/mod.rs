//! Rule catalogue: the fixed set of file-level content checks.
//!
//! Every check is a function of the file path, its text, and an explicit
//! `CheckContext` that carries the current chapter. Checks only touch the
//! status fields they own and never depend on each other's order. The
//! dispatcher reads a file at most once and shares the text with every
//! applicable check.

pub mod content;
pub mod gitignore;
pub mod leaders;
pub mod legacy;
pub mod meetup;
pub mod privacy;

use crate::models::{ChapterStatus, Finding, Severity};
use crate::output::FindingSink;
use crate::resolver::MeetupLookup;
use std::fs;
use std::path::Path;

/// Everything a check may read or mutate while a chapter is being audited.
pub struct CheckContext<'a> {
    pub chapter: &'a str,
    /// Directory of the chapter; used to tell canonical files from nested ones.
    pub chapter_root: &'a Path,
    /// Base used to print source paths relative to the audit root.
    pub audit_root: &'a Path,
    pub status: &'a mut ChapterStatus,
    pub sink: &'a mut dyn FindingSink,
    /// Present only when meetup resolution is enabled for this run.
    pub meetup: Option<&'a dyn MeetupLookup>,
    pub org_domain: &'a str,
}

impl CheckContext<'_> {
    /// Hand a finding for the current chapter to the sink.
    pub fn report(
        &mut self,
        rule: &'static str,
        severity: Severity,
        file: &Path,
        line: Option<usize>,
        message: impl Into<String>,
    ) {
        let file = display_path(self.audit_root, file);
        self.sink.emit(Finding {
            chapter: self.chapter.to_string(),
            rule,
            severity,
            file,
            line,
            message: message.into(),
        });
    }
}

/// Path relative to `base` when possible, otherwise as given.
pub fn display_path(base: &Path, path: &Path) -> String {
    pathdiff::diff_paths(path, base)
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| path.to_path_buf())
        .to_string_lossy()
        .to_string()
}

/// A file handed to the catalogue.
pub struct SourceFile<'a> {
    pub path: &'a Path,
    pub name: &'a str,
    pub text: &'a str,
}

impl SourceFile<'_> {
    /// Lines paired with their 1-based line number.
    pub fn numbered_lines(&self) -> impl Iterator<Item = (usize, &str)> {
        self.text.lines().enumerate().map(|(i, l)| (i + 1, l))
    }

    pub fn is_markdown(&self) -> bool {
        is_markdown(self.name)
    }
}

fn is_markdown(name: &str) -> bool {
    name.ends_with(".md")
}

/// Migrated wiki dumps legitimately contain old links and are skipped by
/// the link-oriented checks.
pub(crate) fn is_migrated_dump(name: &str) -> bool {
    name == "migrated_content.md"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Catalogue entries, listed in execution order.
pub enum Rule {
    DefaultText,
    ExampleTab,
    MigrationHeader,
    LeaderCount,
    GitIgnore,
    MeetupHeader,
    MeetupMetadata,
    LegacyWiki,
    LegacyDonation,
    LegacyPolicy,
    FormPrivacy,
}

impl Rule {
    pub const CATALOGUE: [Rule; 11] = [
        Rule::DefaultText,
        Rule::ExampleTab,
        Rule::MigrationHeader,
        Rule::LeaderCount,
        Rule::GitIgnore,
        Rule::MeetupHeader,
        Rule::MeetupMetadata,
        Rule::LegacyWiki,
        Rule::LegacyDonation,
        Rule::LegacyPolicy,
        Rule::FormPrivacy,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Rule::DefaultText => "default-text",
            Rule::ExampleTab => "example-tab",
            Rule::MigrationHeader => "migration-header",
            Rule::LeaderCount => "leader-count",
            Rule::GitIgnore => "gitignore",
            Rule::MeetupHeader => "meetup-header",
            Rule::MeetupMetadata => "meetup-metadata",
            Rule::LegacyWiki => "legacy-wiki",
            Rule::LegacyDonation => "legacy-donation",
            Rule::LegacyPolicy => "legacy-policy",
            Rule::FormPrivacy => "form-privacy",
        }
    }

    /// Filename/suffix filter for the rule.
    pub fn applies_to(self, path: &Path, name: &str, ctx: &CheckContext<'_>) -> bool {
        match self {
            Rule::DefaultText | Rule::MeetupMetadata | Rule::LegacyDonation => is_markdown(name),
            Rule::ExampleTab => path.to_string_lossy().contains(content::EXAMPLE_TAB),
            Rule::MigrationHeader => name == "index.md",
            Rule::LeaderCount => leaders::is_canonical(path, ctx.chapter_root),
            Rule::GitIgnore => name.ends_with(".gitignore"),
            Rule::MeetupHeader => name == "index.md" && ctx.meetup.is_some(),
            Rule::LegacyWiki | Rule::LegacyPolicy | Rule::FormPrivacy => {
                is_markdown(name) && !is_migrated_dump(name)
            }
        }
    }

    /// Whether the rule looks at file content or only at the path.
    pub fn needs_content(self) -> bool {
        !matches!(self, Rule::ExampleTab)
    }

    fn run(self, file: &SourceFile<'_>, ctx: &mut CheckContext<'_>) {
        match self {
            Rule::DefaultText => content::check_default_text(file, ctx),
            Rule::ExampleTab => content::check_example_tab(file, ctx),
            Rule::MigrationHeader => content::check_migration_header(file, ctx),
            Rule::LeaderCount => leaders::check_leader_count(file, ctx),
            Rule::GitIgnore => gitignore::check_gitignore(file, ctx),
            Rule::MeetupHeader => meetup::check_meetup_header(file, ctx),
            Rule::MeetupMetadata => meetup::check_meetup_metadata(file, ctx),
            Rule::LegacyWiki => legacy::check_legacy_wiki(file, ctx),
            Rule::LegacyDonation => legacy::check_donation(file, ctx),
            Rule::LegacyPolicy => legacy::check_legacy_policy(file, ctx),
            Rule::FormPrivacy => privacy::check_form_privacy(file, ctx),
        }
    }
}

/// Run every applicable catalogue rule against one regular file.
///
/// A read failure is reported as a single `Info` finding and no content
/// rule runs for that file; the audit continues.
pub fn run_file_checks(path: &Path, ctx: &mut CheckContext<'_>) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let rules: Vec<Rule> = Rule::CATALOGUE
        .into_iter()
        .filter(|r| r.applies_to(path, &name, &*ctx))
        .collect();
    if rules.is_empty() {
        return;
    }

    let text = if rules.iter().any(|r| r.needs_content()) {
        match fs::read(path) {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => {
                ctx.report(
                    "read",
                    Severity::Info,
                    path,
                    None,
                    format!("could not read file: {}", e),
                );
                None
            }
        }
    } else {
        None
    };

    for rule in rules {
        if rule.needs_content() && text.is_none() {
            continue;
        }
        let file = SourceFile {
            path,
            name: &name,
            text: text.as_deref().unwrap_or(""),
        };
        tracing::trace!(rule = rule.id(), file = %path.display(), "running check");
        rule.run(&file, ctx);
    }
}
