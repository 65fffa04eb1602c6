use std::path::Path;

use tracing::{debug, info};

use crate::combine::{combine, CombinedCoverage, ReportCoverage};
use crate::coverage::{file_coverage, overall_coverage};
use crate::error::{KoverError, Result};
use crate::model::{ChangedFile, CounterKind, Report};
use crate::parsers::jacoco::JacocoParser;
use crate::parsers::Parser;

/// Read and parse the report at `path`. Surrounding whitespace in the path
/// is ignored since paths usually arrive as lines of a multi-line input.
pub fn load_report(path: &str) -> Result<Report> {
    let path = path.trim();
    let content = std::fs::read(Path::new(path)).map_err(|source| KoverError::ReadReport {
        path: path.to_string(),
        source,
    })?;
    debug!(path, bytes = content.len(), "read report");

    JacocoParser
        .parse(&content)
        .map_err(|source| KoverError::InvalidReport {
            path: path.to_string(),
            source: Box::new(source),
        })
}

/// Overall and changed-file coverage for one parsed report.
///
/// A report without any root counters carries no coverage at all and is
/// rejected; one that merely lacks `kind` yields `overall: None`.
pub fn evaluate_report(
    path: &str,
    report: &Report,
    changed_files: &[ChangedFile],
    kind: &CounterKind,
) -> Result<ReportCoverage> {
    if report.counters.is_empty() {
        return Err(KoverError::NoCoverageData(path.trim().to_string()));
    }
    Ok(ReportCoverage {
        overall: overall_coverage(report, kind),
        changed_files: file_coverage(report, changed_files, kind),
    })
}

/// Evaluate every report path, one at a time and in order, then combine.
/// The first failure aborts the whole evaluation.
pub fn evaluate<S: AsRef<str>>(
    paths: &[S],
    changed_files: &[ChangedFile],
    kind: &CounterKind,
) -> Result<CombinedCoverage> {
    if paths.is_empty() {
        return Err(KoverError::Other(
            "At least one path must be provided".to_string(),
        ));
    }

    let mut per_report = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        let report = load_report(path)?;
        let result = evaluate_report(path, &report, changed_files, kind)?;
        info!(
            path = path.trim(),
            overall = ?result.overall.and_then(|c| c.percentage),
            changed_files = result.changed_files.files.len(),
            "evaluated report"
        );
        per_report.push(result);
    }

    Ok(combine(&per_report))
}
