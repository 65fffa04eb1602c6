//! Merging per-report results when coverage is split across several report
//! documents (one per module in a multi-module build).

use serde::Serialize;

use crate::model::{ChangedFilesCoverage, Coverage};

/// Results computed from a single report document.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportCoverage {
    /// `None` when the report has no root counter of the requested kind.
    pub overall: Option<Coverage>,
    pub changed_files: ChangedFilesCoverage,
}

/// Final results for an invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedCoverage {
    pub overall: Coverage,
    pub changed_files: ChangedFilesCoverage,
}

/// Combine per-report results, in input order.
///
/// Counts are summed, but both percentages are the plain mean of each
/// report's own percentage, so a small module weighs as much as a large one.
/// A report without overall coverage counts as 0% in that mean. Neither mean
/// is rounded.
// TODO: switch the overall percentage to summed counts once the comment
// consumers agree on the changed numbers.
#[must_use]
pub fn combine(reports: &[ReportCoverage]) -> CombinedCoverage {
    if reports.is_empty() {
        return CombinedCoverage {
            overall: Coverage::default(),
            changed_files: ChangedFilesCoverage::default(),
        };
    }

    let count = reports.len() as f64;
    let mut missed: u64 = 0;
    let mut covered: u64 = 0;
    let mut overall_sum = 0.0;
    let mut files_sum = 0.0;
    let mut files = Vec::new();

    for report in reports {
        if let Some(overall) = &report.overall {
            missed = missed.saturating_add(overall.missed);
            covered = covered.saturating_add(overall.covered);
            overall_sum += overall.percentage.unwrap_or(0.0);
        }
        files_sum += report.changed_files.percentage;
        files.extend(report.changed_files.files.iter().cloned());
    }

    CombinedCoverage {
        overall: Coverage {
            missed,
            covered,
            percentage: Some(overall_sum / count),
        },
        changed_files: ChangedFilesCoverage {
            percentage: files_sum / count,
            files,
        },
    }
}
