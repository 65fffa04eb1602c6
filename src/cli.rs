//! Command handler functions for the kover-report CLI.
//!
//! Each `cmd_*` function returns its output as a `String`, making them easy
//! to test without capturing stdout.

use std::fmt::Write;

use anyhow::{Context as _, Result};
use clap::ValueEnum;
use tracing::info;

use crate::action::{evaluate, evaluate_report, load_report};
use crate::changed::{ChangedFilesSource, GitHubCompare};
use crate::combine::{combine, CombinedCoverage};
use crate::github;
use crate::model::{ChangedFile, CounterKind, Coverage};
use crate::render::{JsonFormatter, MarkdownFormatter, ReportFormatter, TextFormatter};

/// Output style for the `files` command.
#[derive(Clone, Debug, ValueEnum)]
pub enum Style {
    Text,
    Markdown,
    Json,
}

/// Settings for posting the pull-request comment.
#[derive(Debug, Clone, Default)]
pub struct CommentOptions {
    pub markdown: MarkdownFormatter,
    pub update_comment: bool,
}

fn describe(coverage: Option<&Coverage>) -> String {
    match coverage {
        Some(c) => match c.percentage {
            Some(p) => format!("{p:.2}% ({}/{})", c.covered, c.total()),
            None => format!("n/a (0/{})", c.total()),
        },
        None => "no counter".to_string(),
    }
}

/// Overall coverage per report and combined.
pub fn cmd_summary(paths: &[String], kind: &CounterKind) -> Result<String> {
    if paths.is_empty() {
        anyhow::bail!("At least one path must be provided");
    }

    let mut out = String::new();
    writeln!(out, "Counter:  {kind}").unwrap();

    let mut per_report = Vec::with_capacity(paths.len());
    for path in paths {
        let report = load_report(path)?;
        let result = evaluate_report(path, &report, &[], kind)?;
        writeln!(out, "{:<60} {}", path.trim(), describe(result.overall.as_ref())).unwrap();
        per_report.push(result);
    }

    let combined = combine(&per_report);
    writeln!(out, "{:<60} {}", "TOTAL", describe(Some(&combined.overall))).unwrap();
    Ok(out)
}

/// Overall and changed-file coverage, rendered in `style`.
pub fn cmd_files(
    paths: &[String],
    kind: &CounterKind,
    source: &dyn ChangedFilesSource,
    style: &Style,
    markdown: &MarkdownFormatter,
) -> Result<String> {
    let changed_files = source.changed_files()?;
    info!("{} changed files", changed_files.len());
    let combined = evaluate(paths, &changed_files, kind)?;

    let output = match style {
        Style::Text => TextFormatter.format(&combined),
        Style::Markdown => markdown.format(&combined),
        Style::Json => JsonFormatter.format(&combined),
    };
    Ok(output)
}

/// Evaluate the reports against `changed_files` and render the comment body.
pub fn comment_body(
    paths: &[String],
    kind: &CounterKind,
    changed_files: &[ChangedFile],
    markdown: &MarkdownFormatter,
) -> Result<(CombinedCoverage, String)> {
    let combined = evaluate(paths, changed_files, kind)?;
    let body = markdown.format(&combined);
    Ok((combined, body))
}

/// The GitHub Actions flow: resolve the event, fetch changed files, evaluate,
/// publish step outputs and post (or update) the pull-request comment.
pub fn cmd_comment(
    ctx: &github::Context,
    paths: &[String],
    kind: &CounterKind,
    options: &CommentOptions,
) -> Result<String> {
    info!("Event is {}", ctx.event_name);
    let details = ctx.details()?;

    let source = GitHubCompare {
        context: ctx,
        base: details.base.clone(),
        head: details.head.clone(),
    };
    let changed_files = source.changed_files()?;
    info!("{} changed files between {} and {}", changed_files.len(), details.base, details.head);

    let (combined, body) = comment_body(paths, kind, &changed_files, &options.markdown)?;

    let overall = combined
        .overall
        .percentage
        .context("No project coverage detected")?;
    github::set_output("coverage-overall", &overall.to_string())?;
    github::set_output(
        "coverage-changed-files",
        &combined.changed_files.percentage.to_string(),
    )?;

    match details.pr_number {
        Some(pr_number) => ctx.add_comment(
            pr_number,
            options.markdown.title.as_deref(),
            &body,
            options.update_comment,
        )?,
        None => info!("Not a pull request, skipping comment"),
    }

    Ok(body)
}
