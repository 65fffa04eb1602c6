//! Output formatting for combined coverage results.

use std::fmt::Write;

use crate::combine::CombinedCoverage;

/// Trait for formatting combined coverage.
pub trait ReportFormatter {
    /// Format the results to a string.
    fn format(&self, coverage: &CombinedCoverage) -> String;
}

fn format_percentage(percentage: Option<f64>) -> String {
    match percentage {
        Some(p) => format!("{p:.2}%"),
        None => "n/a".to_string(),
    }
}

/// Status cell for a percentage checked against a minimum. An undefined
/// percentage never passes.
#[must_use]
pub fn render_emoji(percentage: Option<f64>, min_percentage: f64) -> &'static str {
    match percentage {
        Some(p) if p >= min_percentage => ":white_check_mark:|",
        _ => ":hankey:|",
    }
}

/// Markdown table comment for a pull request.
#[derive(Debug, Clone, Default)]
pub struct MarkdownFormatter {
    /// Rendered as a `### {title}` heading; also the marker used to find the
    /// comment again when updating.
    pub title: Option<String>,
    /// A minimum of `0` is the same as no minimum: no status column.
    pub min_coverage_overall: Option<f64>,
    pub min_coverage_changed_files: Option<f64>,
}

/// A minimum that adds a status column, `None` for unset or zero.
fn threshold(min: Option<f64>) -> Option<f64> {
    min.filter(|m| *m != 0.0)
}

impl ReportFormatter for MarkdownFormatter {
    fn format(&self, coverage: &CombinedCoverage) -> String {
        let mut md = String::new();

        if let Some(title) = &self.title {
            writeln!(md, "### {title}").unwrap();
        }

        let min_changed = threshold(self.min_coverage_changed_files);
        let min_overall = threshold(self.min_coverage_overall);

        let changed = &coverage.changed_files;
        if !changed.files.is_empty() {
            let emoji_header = if min_changed.is_some() {
                ":-:|"
            } else {
                ""
            };
            writeln!(
                md,
                "|File|Coverage [{:.2}%]|{emoji_header}",
                changed.percentage
            )
            .unwrap();
            writeln!(md, "|:-|:-:|{emoji_header}").unwrap();

            for f in &changed.files {
                let emoji = min_changed
                    .map(|min| render_emoji(f.coverage.percentage, min))
                    .unwrap_or("");
                writeln!(
                    md,
                    "|[{}]({})|{}|{emoji}",
                    f.file.file_name(),
                    f.file.url,
                    format_percentage(f.coverage.percentage)
                )
                .unwrap();
            }
            md.push('\n');
        }

        let total_emoji = min_overall
            .map(|min| render_emoji(coverage.overall.percentage, min))
            .unwrap_or("");
        let total_emoji_header = if min_overall.is_some() {
            ":-:|"
        } else {
            ""
        };
        write!(
            md,
            "|Total Project Coverage|{}|{total_emoji}\n|:-|:-:|{total_emoji_header}",
            format_percentage(coverage.overall.percentage)
        )
        .unwrap();

        md
    }
}

/// Plain text formatter.
pub struct TextFormatter;

impl ReportFormatter for TextFormatter {
    fn format(&self, coverage: &CombinedCoverage) -> String {
        let mut out = String::new();
        let overall = &coverage.overall;

        writeln!(
            out,
            "Project coverage: {} ({}/{} covered)",
            format_percentage(overall.percentage),
            overall.covered,
            overall.total()
        )
        .unwrap();

        let changed = &coverage.changed_files;
        if changed.files.is_empty() {
            out.push_str("No changed files found in the report.\n");
            return out;
        }

        writeln!(out, "Changed files coverage: {:.2}%", changed.percentage).unwrap();
        out.push('\n');
        for f in &changed.files {
            writeln!(
                out,
                "  {:<60} {:>8}/{:<8} {:>8}",
                f.file.file_path,
                f.coverage.covered,
                f.coverage.total(),
                format_percentage(f.coverage.percentage)
            )
            .unwrap();
        }

        out
    }
}

/// JSON formatter, for scripting.
pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn format(&self, coverage: &CombinedCoverage) -> String {
        // Serializing plain structs with string keys cannot fail.
        let mut json = serde_json::to_string_pretty(coverage).unwrap_or_default();
        json.push('\n');
        json
    }
}
