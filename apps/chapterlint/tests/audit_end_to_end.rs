use chapterlint::audit::{AuditOptions, Auditor, Collaborators};
use chapterlint::models::{PrivacyStatus, ServiceStatus, Severity, StatusStore};
use chapterlint::output::{CollectSink, FindingSink, PolicyGate};
use chapterlint::report::write_report;
use chapterlint::resolver::{MeetupLookup, MeetupOutcome, ResolveError};
use std::cell::Cell;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[derive(Default)]
struct CountingMeetup {
    calls: Cell<usize>,
}

impl MeetupLookup for CountingMeetup {
    fn group(&self, _slug: &str) -> Result<MeetupOutcome, ResolveError> {
        self.calls.set(self.calls.get() + 1);
        Ok(MeetupOutcome::Missing)
    }
}

fn write(root: &Path, rel: &str, text: &str) {
    let p = root.join(rel);
    fs::create_dir_all(p.parent().unwrap()).unwrap();
    fs::write(p, text).unwrap();
}

fn audit(
    root: &Path,
    meetup: Option<&dyn MeetupLookup>,
    sink: &mut dyn FindingSink,
) -> StatusStore {
    let opts = AuditOptions::default();
    let tools = Collaborators {
        meetup,
        ..Default::default()
    };
    Auditor::new(&opts, tools).run(root, sink).unwrap()
}

#[test]
fn migrated_chapter_with_three_leaders() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "www-chapter-x/leaders.md",
        "### Leaders\n\n* [Ann](mailto:ann@example.org)\n* [Bob](mailto:bob@example.org)\n* [Cy](mailto:cy@example.org)\n",
    );
    write(
        root,
        "www-chapter-x/index.md",
        "---\nlayout: col-sidebar\ntitle: OWASP X\nauto-migrated: 1\n---\n\nWelcome to the chapter.\n",
    );
    write(root, "www-chapter-x/.gitignore", "_site\nGemfile.lock\n");

    let meetup = CountingMeetup::default();
    let mut sink = CollectSink::default();
    let store = audit(root, Some(&meetup), &mut sink);

    let status = store.get("www-chapter-x").unwrap();
    assert_eq!(status.leader_count, 3);
    assert!(status.migration_header);
    assert_eq!(status.meetup_status, ServiceStatus::Unknown);
    assert_eq!(status.pages_status, ServiceStatus::Unknown);
    assert_eq!(status.form_privacy, PrivacyStatus::NotPresent);
    assert_eq!(meetup.calls.get(), 0);

    let serious: Vec<_> = sink
        .findings
        .iter()
        .filter(|f| f.severity >= Severity::High)
        .collect();
    assert_eq!(serious.len(), 1);
    assert_eq!(serious[0].rule, "migration-header");
    assert_eq!(serious[0].severity, Severity::PolicyViolation);
    assert_eq!(serious[0].line, Some(4));
    assert_eq!(serious[0].chapter, "www-chapter-x");
}

#[test]
fn gitignore_missing_both_entries() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "www-chapter-y/leaders.md",
        "* a@example.org\n* b@example.org\n",
    );
    write(root, "www-chapter-y/.gitignore", "# build output\nnode_modules\n");

    let mut sink = CollectSink::default();
    let store = audit(root, None, &mut sink);

    assert!(store.get("www-chapter-y").unwrap().legacy_gitignore);
    let hits: Vec<_> = sink
        .findings
        .iter()
        .filter(|f| f.rule == "gitignore")
        .collect();
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|f| f.severity == Severity::Info));
}

#[test]
fn policy_only_run_writes_same_report() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("chapters");
    write(
        &root,
        "www-chapter-z/index.md",
        "Standard Chapter Page Template\nhttps://www.owasp.org/index.php/Old_Page\n",
    );
    write(&root, "www-chapter-z/leaders.md", "* solo@example.org\n");

    let mut full = CollectSink::default();
    let full_store = audit(&root, None, &mut full);
    let mut gate = PolicyGate::new(CollectSink::default(), true);
    let gated_store = audit(&root, None, &mut gate);
    let gated = gate.into_inner();

    assert!(gated
        .findings
        .iter()
        .all(|f| f.severity == Severity::PolicyViolation));
    let expected: Vec<_> = full
        .findings
        .iter()
        .filter(|f| f.severity == Severity::PolicyViolation)
        .map(|f| (f.rule, f.line))
        .collect();
    let got: Vec<_> = gated.findings.iter().map(|f| (f.rule, f.line)).collect();
    assert_eq!(got, expected);

    let a = dir.path().join("a.json");
    let b = dir.path().join("b.json");
    write_report(&a, &full_store).unwrap();
    write_report(&b, &gated_store).unwrap();
    assert_eq!(fs::read_to_string(&a).unwrap(), fs::read_to_string(&b).unwrap());

    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&a).unwrap()).unwrap();
    assert_eq!(v["www-chapter-z"]["leader_count"], 1);
    assert_eq!(v["www-chapter-z"]["default_text"], true);
    assert_eq!(v["www-chapter-z"]["legacy_wiki_link"], true);
}
