//! External tools run per chapter directory: source sync and site build.
//!
//! Both sit behind traits so the audit can run without git or Ruby and so
//! tests can substitute them. A failing tool is a finding for that chapter,
//! never a reason to stop the run.

use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
}

/// Bring a chapter checkout up to date.
pub trait SourceSync {
    /// Returns the tool's standard output.
    fn sync(&self, dir: &Path) -> Result<String, ToolError>;
}

/// Verify that a chapter site builds.
pub trait SiteBuild {
    fn build(&self, dir: &Path) -> Result<(), ToolError>;
}

/// Run `program` in `dir`, capturing stdout on success.
pub fn run_tool(program: &str, args: &[&str], dir: &Path) -> Result<String, ToolError> {
    tracing::debug!(program, ?args, dir = %dir.display(), "running tool");
    let out = Command::new(program)
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|source| ToolError::Spawn {
            program: program.to_string(),
            source,
        })?;
    if !out.status.success() {
        return Err(ToolError::Failed {
            program: program.to_string(),
            status: out.status.to_string(),
            stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&out.stdout).into_owned())
}

/// `git pull` in the chapter directory.
pub struct GitPull;

impl SourceSync for GitPull {
    fn sync(&self, dir: &Path) -> Result<String, ToolError> {
        run_tool("git", &["pull"], dir)
    }
}

/// `bundle exec jekyll build`, writing into a scratch directory so the
/// audit never sees its own build output as a committed `_site`.
pub struct JekyllBuild {
    scratch: PathBuf,
}

impl JekyllBuild {
    pub fn new() -> Self {
        Self {
            scratch: std::env::temp_dir().join("chapterlint-build"),
        }
    }
}

impl Default for JekyllBuild {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteBuild for JekyllBuild {
    fn build(&self, dir: &Path) -> Result<(), ToolError> {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "site".to_string());
        let dest = self.scratch.join(name);
        let dest_str = dest.to_string_lossy().to_string();
        let result = run_tool(
            "bundle",
            &["exec", "jekyll", "build", "--destination", &dest_str],
            dir,
        );
        if let Err(e) = std::fs::remove_dir_all(&dest) {
            tracing::trace!(error = %e, "no build output to clean up");
        }
        result.map(|_| ())
    }
}
