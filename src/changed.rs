//! Sources for the list of files changed between two revisions.
//!
//! The coverage engine only needs `{filePath, url}` pairs; how the list is
//! obtained (GitHub compare API, local git, a piped list) is up to the
//! [`ChangedFilesSource`] in use.

use std::process::Command;

use anyhow::{Context, Result};

use crate::github;
use crate::model::ChangedFile;

/// A source for obtaining changed files.
pub trait ChangedFilesSource {
    fn changed_files(&self) -> Result<Vec<ChangedFile>>;
}

/// Newline-separated paths read from stdin.
pub struct StdinList;

impl ChangedFilesSource for StdinList {
    fn changed_files(&self) -> Result<Vec<ChangedFile>> {
        let text = std::io::read_to_string(std::io::stdin())
            .context("Failed to read changed files from stdin")?;
        Ok(parse_path_list(&text))
    }
}

/// Paths listed by `git diff --name-only <args>`.
pub struct GitNameOnly {
    /// Arguments to pass to `git diff`, e.g. "main...HEAD".
    pub args: String,
}

impl ChangedFilesSource for GitNameOnly {
    fn changed_files(&self) -> Result<Vec<ChangedFile>> {
        let diff_args: Vec<&str> = self.args.split_whitespace().collect();
        let output = Command::new("git")
            .arg("diff")
            .arg("--name-only")
            .args(&diff_args)
            .output()
            .context("Failed to run git diff")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("git diff failed: {stderr}");
        }

        let text = String::from_utf8(output.stdout).context("git diff output not valid UTF-8")?;
        Ok(parse_path_list(&text))
    }
}

/// Files reported by GitHub's compare API between the event's base and head.
pub struct GitHubCompare<'a> {
    pub context: &'a github::Context,
    pub base: String,
    pub head: String,
}

impl ChangedFilesSource for GitHubCompare<'_> {
    fn changed_files(&self) -> Result<Vec<ChangedFile>> {
        self.context.compare_commits(&self.base, &self.head)
    }
}

/// One changed file per non-blank line; no URL is known for these.
#[must_use]
pub fn parse_path_list(text: &str) -> Vec<ChangedFile> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|path| ChangedFile::new(path, ""))
        .collect()
}
