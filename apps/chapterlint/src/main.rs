//! chapterlint CLI binary entry point.
//! Resolves configuration, wires collaborators, runs the audit, and writes
//! the status report.

use chapterlint::audit::{Auditor, Collaborators};
use chapterlint::cli::Cli;
use chapterlint::config::{self, Effective};
use chapterlint::models::{StatusStore, Summary};
use chapterlint::output::{self, ConsoleSink, FindingSink, JsonSink, PolicyGate};
use chapterlint::report;
use chapterlint::resolver::{GithubClient, HttpConfig, MeetupClient, MeetupLookup, PagesLookup};
use chapterlint::tools::{GitPull, JekyllBuild, SiteBuild, SourceSync};
use chapterlint::utils::{error_prefix, info_prefix, init_logging, note_prefix};
use clap::Parser;
use std::fmt::Display;

fn fail(msg: impl Display) -> ! {
    eprintln!("{} {}", error_prefix(), msg);
    std::process::exit(2);
}

fn run_audit(auditor: &Auditor<'_>, eff: &Effective, sink: &mut dyn FindingSink) -> StatusStore {
    match auditor.run(&eff.root, sink) {
        Ok(store) => store,
        Err(e) => fail(e),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let eff = config::resolve_effective(&cli.overrides());
    if eff.output != "human" && eff.output != "json" {
        fail(format!("Unknown output mode '{}' (expected human|json)", eff.output));
    }
    if config::load_config(&eff.config_dir).is_none() {
        eprintln!(
            "{} No chapterlint.toml found; using defaults.",
            note_prefix()
        );
    }
    if eff.meetup_username.is_some() || eff.meetup_password.is_some() {
        tracing::debug!("meetup credentials supplied; the group lookup does not use them");
    }

    let http = HttpConfig::default();
    let github = eff.pages.then(|| {
        GithubClient::new(&http, &eff.github_api, &eff.org, eff.github_token.clone())
            .unwrap_or_else(|e| fail(e))
    });
    let meetup = eff
        .meetup
        .then(|| MeetupClient::new(&http, &eff.meetup_api).unwrap_or_else(|e| fail(e)));
    let git = GitPull;
    let jekyll = JekyllBuild::new();

    let tools = Collaborators {
        sync: eff.git_pull.then_some(&git as &dyn SourceSync),
        pages: github.as_ref().map(|c| c as &dyn PagesLookup),
        build: eff.build.then_some(&jekyll as &dyn SiteBuild),
        meetup: meetup.as_ref().map(|c| c as &dyn MeetupLookup),
    };
    let opts = eff.audit_options();
    let auditor = Auditor::new(&opts, tools);

    let (store, summary) = if eff.output == "json" {
        let mut gate = PolicyGate::new(JsonSink::new(), eff.policy_only);
        let store = run_audit(&auditor, &eff, &mut gate);
        let sink = gate.into_inner();
        let summary = sink.summary().clone();
        if let Err(e) = sink.finish(store.len()) {
            fail(e);
        }
        (store, summary)
    } else {
        let mut gate = PolicyGate::new(ConsoleSink::new(), eff.policy_only);
        let store = run_audit(&auditor, &eff, &mut gate);
        let summary = gate.into_inner().summary().clone();
        (store, summary)
    };

    if store.is_empty() {
        eprintln!(
            "{} No chapters found under {}; nothing to do.",
            note_prefix(),
            eff.root.display()
        );
        return;
    }
    if let Err(e) = report::write_report(&eff.report, &store) {
        fail(e);
    }
    if eff.output != "json" {
        output::print_summary(&Summary {
            chapters: store.len(),
            ..summary
        });
        eprintln!(
            "{} Report written to {}",
            info_prefix(),
            eff.report.display()
        );
    }
}
