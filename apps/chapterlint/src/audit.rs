//! Traversal and dispatch: walks the chapter tree and runs every check.
//!
//! The walk is depth-first and pre-order, sorted by file name so repeated
//! runs print findings in the same order. A directory whose name carries the
//! chapter prefix opens a new chapter context (the root included);
//! everything below it is attributed to that chapter until the walk leaves
//! its subtree. The chapter filter selects paths, not chapters: a record is
//! opened when the first selected path of a chapter is seen.
//!
//! Directory-level checks run once per chapter, on entry, in this order:
//! source sync, pages resolution, built-site artifact, local build. Each of
//! sync, pages, and build is enabled by supplying its collaborator.

use crate::checks::{self, leaders, CheckContext};
use crate::models::{ChapterStatus, Severity, StatusStore};
use crate::output::FindingSink;
use crate::resolver::{apply_pages, MeetupLookup, PagesLookup};
use crate::tools::{SiteBuild, SourceSync};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Conventional build-output directory name.
pub const SITE_DIR: &str = "_site";

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit root is not a directory: {0}")]
    NotADirectory(String),

    #[error("cannot walk {path}: {source}")]
    Walk {
        path: String,
        #[source]
        source: walkdir::Error,
    },
}

#[derive(Debug, Clone)]
/// Run-scoped settings for the traversal.
pub struct AuditOptions {
    pub chapter_prefix: String,
    /// Substring that every processed path must contain.
    pub chapter_filter: Option<String>,
    /// Directory names never descended into.
    pub skip_dirs: Vec<String>,
    pub org_domain: String,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            chapter_prefix: "www-chapter-".to_string(),
            chapter_filter: None,
            skip_dirs: vec![".git".to_string()],
            org_domain: "owasp.org".to_string(),
        }
    }
}

#[derive(Default, Clone, Copy)]
/// Optional collaborators; `None` disables the matching check.
pub struct Collaborators<'a> {
    pub sync: Option<&'a dyn SourceSync>,
    pub pages: Option<&'a dyn PagesLookup>,
    pub build: Option<&'a dyn SiteBuild>,
    pub meetup: Option<&'a dyn MeetupLookup>,
}

struct Current {
    id: String,
    root: PathBuf,
    leaders_seen: bool,
    /// Record opened and directory-level checks run.
    active: bool,
}

pub struct Auditor<'a> {
    opts: &'a AuditOptions,
    tools: Collaborators<'a>,
}

impl<'a> Auditor<'a> {
    pub fn new(opts: &'a AuditOptions, tools: Collaborators<'a>) -> Self {
        Self { opts, tools }
    }

    fn context<'c>(
        &'c self,
        cur: &'c Current,
        status: &'c mut ChapterStatus,
        audit_root: &'c Path,
        sink: &'c mut dyn FindingSink,
    ) -> CheckContext<'c> {
        CheckContext {
            chapter: &cur.id,
            chapter_root: &cur.root,
            audit_root,
            status,
            sink,
            meetup: self.tools.meetup,
            org_domain: &self.opts.org_domain,
        }
    }

    /// Whether `path` passes the chapter filter.
    fn selects(&self, path: &Path) -> bool {
        match &self.opts.chapter_filter {
            Some(filter) => path.to_string_lossy().contains(filter.as_str()),
            None => true,
        }
    }

    /// Walk `root` and audit every chapter at or below it.
    ///
    /// An empty store means no chapter matched; that is not an error. A
    /// filesystem error stops the walk and is returned.
    pub fn run(&self, root: &Path, sink: &mut dyn FindingSink) -> Result<StatusStore, AuditError> {
        if !root.is_dir() {
            return Err(AuditError::NotADirectory(root.to_string_lossy().to_string()));
        }
        let mut store = StatusStore::new();
        let mut current: Option<Current> = None;
        let skip = &self.opts.skip_dirs;

        let mut walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                !(e.depth() > 0
                    && e.file_type().is_dir()
                    && skip.iter().any(|s| e.file_name() == s.as_str()))
            });

        while let Some(entry) = walker.next() {
            let entry = entry.map_err(|source| AuditError::Walk {
                path: source
                    .path()
                    .unwrap_or(root)
                    .to_string_lossy()
                    .to_string(),
                source,
            })?;
            let path = entry.path();

            if current.as_ref().is_some_and(|c| !path.starts_with(&c.root)) {
                if let Some(done) = current.take() {
                    self.finalize(&done, &mut store, root, sink);
                }
            }

            let is_dir = entry.file_type().is_dir();
            let name = entry.file_name().to_string_lossy();
            // a prefixed directory inside a chapter is just a subdirectory
            if is_dir && current.is_none() && name.starts_with(self.opts.chapter_prefix.as_str()) {
                current = Some(Current {
                    id: name.to_string(),
                    root: path.to_path_buf(),
                    leaders_seen: false,
                    active: false,
                });
            }
            let Some(cur) = current.as_mut() else {
                tracing::trace!(path = %path.display(), "outside any chapter");
                continue;
            };
            let is_site = is_dir && name == SITE_DIR && path != cur.root;

            if entry.file_type().is_file() && leaders::is_canonical(path, &cur.root) {
                cur.leaders_seen = true;
            }
            if !self.selects(path) {
                if is_site {
                    walker.skip_current_dir();
                }
                continue;
            }
            if !cur.active {
                cur.active = true;
                if store.open(&cur.id) {
                    self.enter_chapter(cur, &mut store, root, sink);
                } else {
                    tracing::warn!(chapter = %cur.id, path = %cur.root.display(), "chapter seen twice; keeping first record");
                }
            }
            let cur: &Current = cur;

            if is_site {
                // the chapter-level artifact was handled on entry
                if path.parent() != Some(cur.root.as_path()) {
                    if let Some(status) = store.get_mut(&cur.id) {
                        let mut ctx = self.context(cur, status, root, sink);
                        report_site_artifact(path, &mut ctx);
                    }
                }
                walker.skip_current_dir();
                continue;
            }
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(status) = store.get_mut(&cur.id) {
                let mut ctx = self.context(cur, status, root, sink);
                checks::run_file_checks(path, &mut ctx);
            }
        }

        if let Some(done) = current.take() {
            self.finalize(&done, &mut store, root, sink);
        }
        Ok(store)
    }

    /// Directory-level checks, in their fixed order.
    fn enter_chapter(
        &self,
        cur: &Current,
        store: &mut StatusStore,
        audit_root: &Path,
        sink: &mut dyn FindingSink,
    ) {
        let Some(status) = store.get_mut(&cur.id) else {
            return;
        };
        tracing::debug!(chapter = %cur.id, "entering chapter");
        let mut ctx = self.context(cur, status, audit_root, sink);

        if let Some(sync) = self.tools.sync {
            match sync.sync(&cur.root) {
                Ok(out) => tracing::info!(chapter = %cur.id, "{}", out.trim()),
                Err(e) => ctx.report(
                    "source-sync",
                    Severity::High,
                    &cur.root,
                    None,
                    format!("git pull failed: {}", e),
                ),
            }
        }

        if let Some(pages) = self.tools.pages {
            let result = pages.pages(&cur.id);
            apply_pages(result, &cur.root, &mut ctx);
        }

        let site = cur.root.join(SITE_DIR);
        if site.is_dir() {
            report_site_artifact(&site, &mut ctx);
        }

        if let Some(build) = self.tools.build {
            match build.build(&cur.root) {
                Ok(()) => ctx.report(
                    "site-build",
                    Severity::Info,
                    &cur.root,
                    None,
                    "Site builds",
                ),
                Err(e) => {
                    ctx.status.build_failed = true;
                    ctx.report(
                        "site-build",
                        Severity::High,
                        &cur.root,
                        None,
                        format!("Site build failed: {}", e),
                    );
                }
            }
        }
    }

    /// Rules that can only be decided once the whole subtree was seen.
    fn finalize(
        &self,
        cur: &Current,
        store: &mut StatusStore,
        audit_root: &Path,
        sink: &mut dyn FindingSink,
    ) {
        if cur.leaders_seen || !cur.active {
            return;
        }
        if let Some(status) = store.get_mut(&cur.id) {
            let mut ctx = self.context(cur, status, audit_root, sink);
            leaders::report_missing(&mut ctx);
        }
    }
}

fn report_site_artifact(path: &Path, ctx: &mut CheckContext<'_>) {
    ctx.status.site_artifact = true;
    ctx.report(
        "site-artifact",
        Severity::Low,
        path,
        None,
        "Built site directory is present",
    );
}
