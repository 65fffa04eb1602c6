use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use kover_report::changed::{ChangedFilesSource, GitNameOnly, StdinList};
use kover_report::cli::{self, CommentOptions, Style};
use kover_report::github;
use kover_report::model::CounterKind;
use kover_report::render::MarkdownFormatter;

/// Coverage summaries from Kover XML reports for pull requests.
///
/// Every option can also be supplied through the `INPUT_*` environment
/// variables GitHub Actions sets for action inputs.
#[derive(Parser)]
#[command(name = "kover-report", version, about)]
struct Cli {
    /// Log filter (trace, debug, info, warn, error, or an EnvFilter directive).
    #[arg(long, global = true, env = "KOVER_REPORT_LOG", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ReportArgs {
    /// Path to a Kover XML report. Repeat for multi-module builds.
    #[arg(long = "path", env = "INPUT_PATH", value_delimiter = '\n', required = true)]
    paths: Vec<String>,

    /// Counter used for every percentage (INSTRUCTION, BRANCH, LINE, METHOD, CLASS).
    #[arg(long, env = "INPUT_COVERAGE-COUNTER-TYPE", default_value = "LINE")]
    counter_type: CounterKind,
}

impl ReportArgs {
    /// Paths with blank entries (e.g. a trailing newline in the env value) removed.
    fn paths(&self) -> Vec<String> {
        self.paths
            .iter()
            .filter(|p| !p.trim().is_empty())
            .cloned()
            .collect()
    }
}

#[derive(Args)]
struct CommentArgs {
    /// Heading of the comment; also used to find it again with --update-comment.
    #[arg(long, env = "INPUT_TITLE")]
    title: Option<String>,

    /// Minimum overall coverage; adds a pass/fail column when set and non-zero.
    #[arg(long, env = "INPUT_MIN-COVERAGE-OVERALL")]
    min_coverage_overall: Option<f64>,

    /// Minimum coverage per changed file; adds a pass/fail column when set and non-zero.
    #[arg(long, env = "INPUT_MIN-COVERAGE-CHANGED-FILES")]
    min_coverage_changed_files: Option<f64>,
}

impl CommentArgs {
    fn formatter(self) -> MarkdownFormatter {
        MarkdownFormatter {
            title: self.title,
            min_coverage_overall: self.min_coverage_overall,
            min_coverage_changed_files: self.min_coverage_changed_files,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show overall coverage of each report and the combined total.
    Summary {
        #[command(flatten)]
        report: ReportArgs,
    },

    /// Show coverage of changed files. Reads one path per line from stdin
    /// unless --git-diff is given.
    Files {
        #[command(flatten)]
        report: ReportArgs,

        #[command(flatten)]
        comment: CommentArgs,

        /// Git diff arguments, e.g. "main...HEAD", passed to `git diff --name-only`.
        #[arg(long)]
        git_diff: Option<String>,

        /// Output style.
        #[arg(long, value_enum, default_value = "text")]
        style: Style,
    },

    /// Run in GitHub Actions: compare the event's commits, set step outputs
    /// and post the coverage comment on the pull request.
    Comment {
        #[command(flatten)]
        report: ReportArgs,

        #[command(flatten)]
        comment: CommentArgs,

        /// Update the existing comment with the same title instead of adding one.
        #[arg(long, env = "INPUT_UPDATE-COMMENT")]
        update_comment: bool,

        /// GitHub token (falls back to GITHUB_TOKEN).
        #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_logging(&args.log_level);

    let output = match args.command {
        Commands::Summary { report } => cli::cmd_summary(&report.paths(), &report.counter_type)?,
        Commands::Files {
            report,
            comment,
            git_diff,
            style,
        } => {
            let source: Box<dyn ChangedFilesSource> = match git_diff {
                Some(args) => Box::new(GitNameOnly { args }),
                None => Box::new(StdinList),
            };
            cli::cmd_files(
                &report.paths(),
                &report.counter_type,
                source.as_ref(),
                &style,
                &comment.formatter(),
            )?
        }
        Commands::Comment {
            report,
            comment,
            update_comment,
            token,
        } => {
            let token = match token {
                Some(t) => t,
                None => std::env::var("GITHUB_TOKEN")
                    .context("a GitHub token is required (--token, INPUT_TOKEN or GITHUB_TOKEN)")?,
            };
            let ctx = github::Context::from_env(token)?;
            let options = CommentOptions {
                markdown: comment.formatter(),
                update_comment,
            };
            let mut body = cli::cmd_comment(&ctx, &report.paths(), &report.counter_type, &options)?;
            body.push('\n');
            body
        }
    };

    print!("{output}");
    Ok(())
}
