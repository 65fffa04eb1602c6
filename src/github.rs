//! GitHub API helpers: event details, the compare API for changed files,
//! and creating or updating the coverage comment on a pull request.

use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::Path;

use anyhow::{bail, Context as _, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::model::ChangedFile;

const DEFAULT_API_URL: &str = "https://api.github.com";

/// The revisions an event compares, and the pull request it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDetails {
    pub pr_number: Option<u64>,
    pub base: String,
    pub head: String,
}

impl EventDetails {
    /// Extract details from a webhook event payload.
    pub fn from_payload(event: &str, payload: &Value) -> Result<Self> {
        match event {
            "pull_request" | "pull_request_target" => {
                let pr = &payload["pull_request"];
                Ok(Self {
                    pr_number: pr["number"].as_u64(),
                    base: sha(&pr["base"]["sha"], "pull_request.base.sha")?,
                    head: sha(&pr["head"]["sha"], "pull_request.head.sha")?,
                })
            }
            "push" => Ok(Self {
                pr_number: None,
                base: sha(&payload["before"], "before")?,
                head: sha(&payload["after"], "after")?,
            }),
            other => bail!("Only pull requests and pushes are supported, {other} not supported."),
        }
    }
}

fn sha(value: &Value, field: &str) -> Result<String> {
    value
        .as_str()
        .map(str::to_owned)
        .with_context(|| format!("event payload is missing `{field}`"))
}

/// Resolved GitHub Actions context.
pub struct Context {
    token: String,
    repo: String,
    api_url: String,
    pub event_name: String,
    pub payload: Value,
}

impl Context {
    /// Build a context from the standard GitHub Actions environment
    /// (`GITHUB_REPOSITORY`, `GITHUB_EVENT_NAME`, `GITHUB_EVENT_PATH`,
    /// optionally `GITHUB_API_URL`).
    pub fn from_env(token: String) -> Result<Self> {
        let repo = std::env::var("GITHUB_REPOSITORY")
            .context("GITHUB_REPOSITORY environment variable is required")?;
        let event_name = std::env::var("GITHUB_EVENT_NAME")
            .context("GITHUB_EVENT_NAME environment variable is required")?;
        let event_path = std::env::var("GITHUB_EVENT_PATH")
            .context("GITHUB_EVENT_PATH environment variable is required")?;
        let payload = read_payload(Path::new(&event_path))?;
        let api_url = std::env::var("GITHUB_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Ok(Self {
            token,
            repo,
            api_url,
            event_name,
            payload,
        })
    }

    pub fn details(&self) -> Result<EventDetails> {
        EventDetails::from_payload(&self.event_name, &self.payload)
    }

    /// Files changed between `base` and `head`.
    pub fn compare_commits(&self, base: &str, head: &str) -> Result<Vec<ChangedFile>> {
        let url = format!("{}/repos/{}/compare/{}...{}", self.api_url, self.repo, base, head);
        debug!(%url, "comparing commits");
        let resp = self
            .get(&url)
            .call()
            .context("Failed to compare commits on GitHub")?;
        let compare: CompareResponse = resp.into_json().context("Failed to parse compare JSON")?;
        Ok(compare.into_changed_files())
    }

    /// Post `body` on the pull request. With a title and `update_comment`
    /// set, an existing comment starting with `### {title}` is edited instead.
    pub fn add_comment(
        &self,
        pr_number: u64,
        title: Option<&str>,
        body: &str,
        update_comment: bool,
    ) -> Result<()> {
        if let (Some(title), true) = (title, update_comment) {
            if let Some(comment_id) = self.find_titled_comment(pr_number, title)? {
                let url = format!("{}/repos/{}/issues/comments/{}", self.api_url, self.repo, comment_id);
                send(self.request(ureq::patch(&url)), body, "updating comment")?;
                info!("Updated comment {} on {}/pull/{}", comment_id, self.repo, pr_number);
                return Ok(());
            }
        }

        let url = format!("{}/repos/{}/issues/{}/comments", self.api_url, self.repo, pr_number);
        send(self.request(ureq::post(&url)), body, "creating comment")?;
        info!("Comment posted to {}/pull/{}", self.repo, pr_number);
        Ok(())
    }

    fn find_titled_comment(&self, pr_number: u64, title: &str) -> Result<Option<u64>> {
        let mut page = 1u32;
        loop {
            let url = format!(
                "{}/repos/{}/issues/{}/comments?per_page=100&page={}",
                self.api_url, self.repo, pr_number, page
            );
            let comments: Vec<Comment> = self
                .get(&url)
                .call()
                .context("Failed to list PR comments")?
                .into_json()
                .context("Failed to parse comments JSON")?;
            if comments.is_empty() {
                return Ok(None);
            }
            if let Some(id) = find_titled_comment(&comments, title) {
                return Ok(Some(id));
            }
            page += 1;
        }
    }

    fn get(&self, url: &str) -> ureq::Request {
        self.request(ureq::get(url))
    }

    fn request(&self, req: ureq::Request) -> ureq::Request {
        req.set("Authorization", &format!("Bearer {}", self.token))
            .set("Accept", "application/vnd.github+json")
            .set("User-Agent", "kover-report")
            .set("X-GitHub-Api-Version", "2022-11-28")
    }
}

fn send(req: ureq::Request, body: &str, action: &str) -> Result<()> {
    match req.send_json(serde_json::json!({ "body": body })) {
        Ok(_) => Ok(()),
        Err(ureq::Error::Status(code, resp)) => {
            let body = resp.into_string().unwrap_or_default();
            bail!("GitHub API error {} (HTTP {}): {}", action, code, body)
        }
        Err(e) => bail!("Failed {}: {}", action, e),
    }
}

fn read_payload(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read event payload {}", path.display()))?;
    serde_json::from_str(&text).context("Failed to parse event payload JSON")
}

/// Response of `GET /repos/{repo}/compare/{base}...{head}`.
#[derive(Debug, Deserialize)]
pub struct CompareResponse {
    #[serde(default)]
    files: Option<Vec<CompareFile>>,
}

#[derive(Debug, Deserialize)]
struct CompareFile {
    filename: String,
    #[serde(default)]
    blob_url: Option<String>,
}

impl CompareResponse {
    #[must_use]
    pub fn into_changed_files(self) -> Vec<ChangedFile> {
        self.files
            .unwrap_or_default()
            .into_iter()
            .map(|f| ChangedFile::new(f.filename, f.blob_url.unwrap_or_default()))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub body: Option<String>,
}

/// Id of the first comment whose body starts with `### {title}`.
#[must_use]
pub fn find_titled_comment(comments: &[Comment], title: &str) -> Option<u64> {
    let heading = format!("### {title}");
    comments
        .iter()
        .find(|c| c.body.as_deref().is_some_and(|b| b.starts_with(&heading)))
        .map(|c| c.id)
}

/// Set a step output through `$GITHUB_OUTPUT`. Does nothing outside Actions.
pub fn set_output(name: &str, value: &str) -> Result<()> {
    match std::env::var_os("GITHUB_OUTPUT") {
        Some(path) => write_output(Path::new(&path), name, value),
        None => {
            debug!(name, value, "GITHUB_OUTPUT not set, skipping output");
            Ok(())
        }
    }
}

/// Append a `name=value` line to an outputs file.
pub fn write_output(path: &Path, name: &str, value: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    writeln!(file, "{name}={value}").with_context(|| format!("Failed to write {}", path.display()))
}
