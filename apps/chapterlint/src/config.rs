//! Configuration discovery and effective settings resolution.
//!
//! chapterlint reads `chapterlint.toml|yaml|yml` from the starting directory
//! (or closest ancestor) and merges it with CLI flags to produce an
//! `Effective` config.
//! Defaults:
//! - `root`: `../chapters`
//! - `prefix`: `www-chapter-`
//! - `org` / `org_domain`: `OWASP` / `owasp.org`
//! - `checks.gitpull`: true; `checks.{build,pages,meetup,policy}`: false
//! - `output`: `human`; `report`: `chapters.json`
//! - `skip_dirs`: `[".git"]`
//!
//! Overrides precedence: CLI > config file > defaults. Paths from the
//! config file are relative to the file's directory; CLI paths are relative
//! to the current directory.

use crate::audit::AuditOptions;
use crate::resolver::{github, meetup};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_NAMES: [&str; 3] = ["chapterlint.toml", "chapterlint.yaml", "chapterlint.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Enable flags under `[checks]`.
pub struct ChecksCfg {
    pub gitpull: Option<bool>,
    pub build: Option<bool>,
    pub pages: Option<bool>,
    pub meetup: Option<bool>,
    pub policy: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// `[github]` section.
pub struct GithubCfg {
    pub api: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// `[meetup]` section. Credentials are carried for API variants that need
/// them; the group lookup itself is anonymous.
pub struct MeetupCfg {
    pub api: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `chapterlint.toml|yaml`.
pub struct ChapterlintConfig {
    pub root: Option<String>,
    pub chapter: Option<String>,
    pub prefix: Option<String>,
    pub org: Option<String>,
    pub org_domain: Option<String>,
    pub output: Option<String>,
    pub report: Option<String>,
    pub skip_dirs: Option<Vec<String>>,
    #[serde(default)]
    pub checks: Option<ChecksCfg>,
    #[serde(default)]
    pub github: Option<GithubCfg>,
    #[serde(default)]
    pub meetup: Option<MeetupCfg>,
}

/// Values taken from the command line; `None` means "not given".
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub start: Option<String>,
    pub root: Option<String>,
    pub chapter: Option<String>,
    pub gitpull: Option<bool>,
    pub build: Option<bool>,
    pub pages: Option<bool>,
    pub meetup: Option<bool>,
    pub policy: Option<bool>,
    pub github_token: Option<String>,
    pub meetup_username: Option<String>,
    pub meetup_password: Option<String>,
    pub output: Option<String>,
    pub report: Option<String>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by the audit after applying precedence.
pub struct Effective {
    pub config_dir: PathBuf,
    pub root: PathBuf,
    pub chapter: Option<String>,
    pub chapter_prefix: String,
    pub org: String,
    pub org_domain: String,
    pub skip_dirs: Vec<String>,
    pub git_pull: bool,
    pub build: bool,
    pub pages: bool,
    pub meetup: bool,
    pub policy_only: bool,
    pub github_api: String,
    pub github_token: Option<String>,
    pub meetup_api: String,
    pub meetup_username: Option<String>,
    pub meetup_password: Option<String>,
    pub output: String,
    pub report: PathBuf,
}

impl Effective {
    pub fn audit_options(&self) -> AuditOptions {
        AuditOptions {
            chapter_prefix: self.chapter_prefix.clone(),
            chapter_filter: self.chapter.clone(),
            skip_dirs: self.skip_dirs.clone(),
            org_domain: self.org_domain.clone(),
        }
    }
}

/// Walk upward from `start` to find the directory holding the config.
///
/// Stops when a `chapterlint.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_config_dir(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_NAMES.iter().any(|n| cur.join(n).exists()) {
            return cur.to_path_buf();
        }
        if cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `ChapterlintConfig` from `chapterlint.toml` or `chapterlint.yaml|yml`.
///
/// A file that exists but does not parse is logged and treated as absent.
pub fn load_config(dir: &Path) -> Option<ChapterlintConfig> {
    let toml_path = dir.join(CONFIG_NAMES[0]);
    if toml_path.exists() {
        let s = fs::read_to_string(&toml_path).ok()?;
        return match toml::from_str(&s) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                tracing::warn!(path = %toml_path.display(), error = %e, "ignoring invalid config");
                None
            }
        };
    }
    for yml in &CONFIG_NAMES[1..] {
        let p = dir.join(yml);
        if p.exists() {
            let s = fs::read_to_string(&p).ok()?;
            return match serde_yaml::from_str(&s) {
                Ok(cfg) => Some(cfg),
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "ignoring invalid config");
                    None
                }
            };
        }
    }
    None
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(cli: &Overrides) -> Effective {
    let start = PathBuf::from(cli.start.as_deref().unwrap_or("."));
    let config_dir = detect_config_dir(&start);
    let cfg = load_config(&config_dir).unwrap_or_default();
    let checks = cfg.checks.clone().unwrap_or_default();
    let gh = cfg.github.clone().unwrap_or_default();
    let mu = cfg.meetup.clone().unwrap_or_default();

    let root = match (&cli.root, &cfg.root) {
        (Some(r), _) => PathBuf::from(r),
        (None, Some(r)) => config_dir.join(r),
        (None, None) => PathBuf::from("../chapters"),
    };
    let report = match (&cli.report, &cfg.report) {
        (Some(r), _) => PathBuf::from(r),
        (None, Some(r)) => config_dir.join(r),
        (None, None) => PathBuf::from("chapters.json"),
    };

    let chapter = cli
        .chapter
        .clone()
        .or(cfg.chapter)
        .filter(|c| !c.is_empty());

    Effective {
        root,
        chapter,
        chapter_prefix: cfg.prefix.unwrap_or_else(|| "www-chapter-".to_string()),
        org: cfg.org.unwrap_or_else(|| "OWASP".to_string()),
        org_domain: cfg.org_domain.unwrap_or_else(|| "owasp.org".to_string()),
        skip_dirs: cfg.skip_dirs.unwrap_or_else(|| vec![".git".to_string()]),
        git_pull: cli.gitpull.or(checks.gitpull).unwrap_or(true),
        build: cli.build.or(checks.build).unwrap_or(false),
        pages: cli.pages.or(checks.pages).unwrap_or(false),
        meetup: cli.meetup.or(checks.meetup).unwrap_or(false),
        policy_only: cli.policy.or(checks.policy).unwrap_or(false),
        github_api: gh.api.unwrap_or_else(|| github::DEFAULT_API.to_string()),
        github_token: cli.github_token.clone().or(gh.token).filter(|t| !t.is_empty()),
        meetup_api: mu.api.unwrap_or_else(|| meetup::DEFAULT_API.to_string()),
        meetup_username: cli.meetup_username.clone().or(mu.username),
        meetup_password: cli.meetup_password.clone().or(mu.password),
        output: cli
            .output
            .clone()
            .or(cfg.output)
            .unwrap_or_else(|| "human".to_string()),
        report,
        config_dir,
    }
}
