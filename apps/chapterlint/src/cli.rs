//! CLI argument parsing via `clap`.

use crate::config::Overrides;
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "chapterlint",
    version,
    about = "Audit chapter website repositories for compliance",
    long_about = "chapterlint walks a directory of chapter website checkouts, applies content and policy rules to every file, and writes a per-chapter status report.\n\nConfiguration precedence: CLI > chapterlint.toml > defaults.",
    after_help = "Examples:\n  chapterlint --root ../chapters --gitpull=false\n  chapterlint --chapter london --pages --meetup --policy\n  chapterlint --output json --report out/chapters.json"
)]
/// Top-level CLI options.
pub struct Cli {
    #[arg(long, help = "Directory containing chapter checkouts (default: ../chapters)")]
    pub root: Option<String>,
    #[arg(long, help = "Only audit chapters whose path contains this text")]
    pub chapter: Option<String>,
    #[arg(long, num_args = 0..=1, default_missing_value = "true", help = "Run git pull in each chapter (default: true)")]
    pub gitpull: Option<bool>,
    #[arg(long, num_args = 0..=1, default_missing_value = "true", help = "Verify each chapter site builds with Jekyll")]
    pub build: Option<bool>,
    #[arg(long, num_args = 0..=1, default_missing_value = "true", help = "Query GitHub Pages status per chapter")]
    pub pages: Option<bool>,
    #[arg(long, num_args = 0..=1, default_missing_value = "true", help = "Query Meetup group status per chapter")]
    pub meetup: Option<bool>,
    #[arg(long, num_args = 0..=1, default_missing_value = "true", help = "Print policy violations only")]
    pub policy: Option<bool>,
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, help = "GitHub API token")]
    pub githubkey: Option<String>,
    #[arg(long, env = "MEETUP_USERNAME", help = "Meetup username")]
    pub username: Option<String>,
    #[arg(long, env = "MEETUP_PASSWORD", hide_env_values = true, help = "Meetup password")]
    pub password: Option<String>,
    #[arg(long, help = "Output mode: human|json (default: human)")]
    pub output: Option<String>,
    #[arg(long, help = "Path of the JSON status report (default: chapters.json)")]
    pub report: Option<String>,
    #[arg(long, short, action = clap::ArgAction::SetTrue, help = "Enable debug logging on stderr")]
    pub verbose: bool,
}

impl Cli {
    /// Flags as config overrides; discovery starts in the current directory.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            start: None,
            root: self.root.clone(),
            chapter: self.chapter.clone(),
            gitpull: self.gitpull,
            build: self.build,
            pages: self.pages,
            meetup: self.meetup,
            policy: self.policy,
            github_token: self.githubkey.clone(),
            meetup_username: self.username.clone(),
            meetup_password: self.password.clone(),
            output: self.output.clone(),
            report: self.report.clone(),
        }
    }
}
