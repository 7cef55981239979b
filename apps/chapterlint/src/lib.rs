//! chapterlint core library.
//!
//! This crate audits a directory of chapter website repositories: every
//! file in a chapter is run through a catalogue of content and policy
//! rules, external services are queried for hosting and meetup state, and
//! a per-chapter status report is produced.
//!
//! High-level modules:
//! - `audit`: Directory traversal, chapter lifecycle, and rule dispatch.
//! - `checks`: The rule catalogue and its per-file checks.
//! - `resolver`: GitHub Pages and Meetup lookups with rate limiting.
//! - `tools`: `git pull` and Jekyll build collaborators.
//! - `models`: Severity, findings, and the per-chapter status store.
//! - `output`: Finding sinks (human/JSON) and the policy-only gate.
//! - `report`: Writing the JSON status report.
//! - `cli` / `config`: Argument parsing and effective configuration.
//! - `utils`: Console prefixes and logging setup.
pub mod audit;
pub mod checks;
pub mod cli;
pub mod config;
pub mod models;
pub mod output;
pub mod report;
pub mod resolver;
pub mod tools;
pub mod utils;
