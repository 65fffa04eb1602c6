//! Coverage extraction from a parsed report: per counter kind, for the whole
//! report, and for a list of changed files matched against the report's
//! package/source-file hierarchy.

use crate::model::{
    percentage, ChangedFile, ChangedFileWithCoverage, ChangedFilesCoverage, Counter, CounterKind,
    Coverage, Report,
};

/// Percentage reported for changed files when nothing matched: no changed
/// lines means nothing is uncovered.
pub const VACUOUS_PERCENTAGE: f64 = 100.0;

/// Coverage from the first counter of `kind`, if there is one.
///
/// Duplicate kinds at the same level are not validated; the first wins.
#[must_use]
pub fn coverage_for_kind(counters: &[Counter], kind: &CounterKind) -> Option<Coverage> {
    counters
        .iter()
        .find(|c| c.kind.matches(kind))
        .map(|c| Coverage::new(c.missed, c.covered))
}

/// Whole-report coverage from the root-level counters.
#[must_use]
pub fn overall_coverage(report: &Report, kind: &CounterKind) -> Option<Coverage> {
    coverage_for_kind(&report.counters, kind)
}

/// Whether `file_path` refers to `{package}/{source_file}`. Paths may carry a
/// repository prefix the report does not know about, so this is a suffix test.
#[must_use]
pub fn matches_source_file(file_path: &str, package: &str, source_file: &str) -> bool {
    file_path.ends_with(&format!("{package}/{source_file}"))
}

/// Coverage for each changed file found in the report, plus the aggregate.
///
/// Every structural match yields an entry: when packages share a filename a
/// single changed file can appear more than once. Source files without a
/// counter of `kind` are skipped, as are changed files with no match.
/// Entries keep changed-file order, then package/source-file order.
#[must_use]
pub fn file_coverage(
    report: &Report,
    changed_files: &[ChangedFile],
    kind: &CounterKind,
) -> ChangedFilesCoverage {
    let mut files = Vec::new();

    for changed in changed_files {
        for package in &report.packages {
            for source_file in &package.source_files {
                if !matches_source_file(&changed.file_path, &package.name, &source_file.name) {
                    continue;
                }
                if let Some(coverage) = coverage_for_kind(&source_file.counters, kind) {
                    files.push(ChangedFileWithCoverage {
                        file: changed.clone(),
                        coverage,
                    });
                }
            }
        }
    }

    ChangedFilesCoverage {
        percentage: total_percentage(&files).unwrap_or(VACUOUS_PERCENTAGE),
        files,
    }
}

/// Percentage over the summed counts of `files` (not the mean of their
/// percentages). `None` when the files hold no instrumented lines.
#[must_use]
pub fn total_percentage(files: &[ChangedFileWithCoverage]) -> Option<f64> {
    let (missed, covered) = files.iter().fold((0u64, 0u64), |(missed, covered), f| {
        (
            missed.saturating_add(f.coverage.missed),
            covered.saturating_add(f.coverage.covered),
        )
    });
    percentage(missed, covered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Package, SourceFile};
    use crate::parsers::jacoco;

    fn counter(kind: CounterKind, missed: u64, covered: u64) -> Counter {
        Counter { kind, missed, covered }
    }

    fn sample_counters() -> Vec<Counter> {
        vec![
            counter(CounterKind::Instruction, 7418, 25767),
            counter(CounterKind::Branch, 665, 874),
            counter(CounterKind::Line, 900, 3346),
            counter(CounterKind::Method, 230, 602),
            counter(CounterKind::Class, 160, 330),
        ]
    }

    fn packages_report() -> Report {
        jacoco::parse(include_bytes!("../tests/fixtures/report_packages.xml")).unwrap()
    }

    fn with_coverage(path: &str, missed: u64, covered: u64) -> ChangedFileWithCoverage {
        ChangedFileWithCoverage {
            file: ChangedFile::new(path, format!("url-{path}")),
            coverage: Coverage::new(missed, covered),
        }
    }

    // -- coverage_for_kind ---------------------------------------------------

    #[test]
    fn test_coverage_for_kind_line() {
        let coverage = coverage_for_kind(&sample_counters(), &CounterKind::Line).unwrap();
        assert_eq!(coverage, Coverage { missed: 900, covered: 3346, percentage: Some(78.8) });
    }

    #[test]
    fn test_coverage_for_kind_branch() {
        let coverage = coverage_for_kind(&sample_counters(), &CounterKind::Branch).unwrap();
        assert_eq!(coverage.percentage, Some(56.79));
    }

    #[test]
    fn test_coverage_for_kind_absent() {
        let counters: Vec<Counter> = sample_counters()
            .into_iter()
            .filter(|c| c.kind != CounterKind::Line)
            .collect();
        assert_eq!(coverage_for_kind(&counters, &CounterKind::Line), None);
        assert_eq!(coverage_for_kind(&[], &CounterKind::Line), None);
    }

    #[test]
    fn test_coverage_for_kind_first_duplicate_wins() {
        let counters = vec![
            counter(CounterKind::Line, 1, 3),
            counter(CounterKind::Line, 3, 1),
        ];
        let coverage = coverage_for_kind(&counters, &CounterKind::Line).unwrap();
        assert_eq!(coverage.percentage, Some(75.0));
    }

    #[test]
    fn test_coverage_for_kind_skips_unknown_kinds() {
        let counters = vec![
            counter(CounterKind::Other("LINE_EXTRA".to_string()), 1, 1),
            counter(CounterKind::Line, 0, 4),
        ];
        let coverage = coverage_for_kind(&counters, &CounterKind::Line).unwrap();
        assert_eq!(coverage.percentage, Some(100.0));
        let query = CounterKind::Other("LINE_EXTRA".to_string());
        assert_eq!(coverage_for_kind(&counters, &query), None);
    }

    #[test]
    fn test_coverage_for_kind_zero_total() {
        let coverage = coverage_for_kind(&[counter(CounterKind::Line, 0, 0)], &CounterKind::Line)
            .unwrap();
        assert_eq!(coverage.total(), 0);
        assert_eq!(coverage.percentage, None);
    }

    // -- overall_coverage ----------------------------------------------------

    #[test]
    fn test_overall_coverage() {
        let report = Report {
            name: "r".to_string(),
            counters: sample_counters(),
            ..Default::default()
        };
        let coverage = overall_coverage(&report, &CounterKind::Line).unwrap();
        assert_eq!(coverage, Coverage { missed: 900, covered: 3346, percentage: Some(78.8) });
    }

    #[test]
    fn test_overall_coverage_no_counters() {
        assert_eq!(overall_coverage(&Report::default(), &CounterKind::Line), None);
    }

    #[test]
    fn test_overall_coverage_from_parsed_report() {
        let coverage = overall_coverage(&packages_report(), &CounterKind::Line).unwrap();
        assert_eq!(coverage.missed, 26);
        assert_eq!(coverage.covered, 44);
        assert_eq!(coverage.percentage, Some(62.86));
    }

    // -- matching ------------------------------------------------------------

    #[test]
    fn test_matches_source_file_suffix() {
        assert!(matches_source_file("a/b/Foo.kt", "b", "Foo.kt"));
        assert!(matches_source_file("b/Foo.kt", "b", "Foo.kt"));
        assert!(!matches_source_file("a/c/Foo.kt", "b", "Foo.kt"));
        assert!(!matches_source_file("Foo.kt", "b", "Foo.kt"));
    }

    // -- file_coverage -------------------------------------------------------

    #[test]
    fn test_file_coverage() {
        let changed = vec![
            ChangedFile::new(
                "src/main/kotlin/com/github/mikas/parceldeliverydetails/domain/ParcelDeliveryDetails.kt",
                "url-details",
            ),
            ChangedFile::new(
                "src/main/kotlin/com/github/mikas/parceldeliverydetails/domain/ParcelDeliveryDetailsService.kt",
                "url-service",
            ),
        ];
        let result = file_coverage(&packages_report(), &changed, &CounterKind::Line);

        assert_eq!(result.files.len(), 2);
        assert_eq!(result.files[0].file.url, "url-details");
        assert_eq!(result.files[0].coverage, Coverage { missed: 5, covered: 2, percentage: Some(28.57) });
        assert_eq!(result.files[1].file.url, "url-service");
        assert_eq!(result.files[1].coverage, Coverage { missed: 21, covered: 32, percentage: Some(60.38) });
        // 34 / 60, not the mean of 28.57 and 60.38.
        assert_eq!(result.percentage, 56.67);
    }

    #[test]
    fn test_file_coverage_drops_unmatched_files() {
        let changed = vec![
            ChangedFile::new("README.md", "url-readme"),
            ChangedFile::new("app/com/github/mikas/parceldeliverydetails/util/Strings.kt", "url-strings"),
        ];
        let result = file_coverage(&packages_report(), &changed, &CounterKind::Line);
        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].file.file_path, changed[1].file_path);
        assert_eq!(result.percentage, 100.0);
    }

    #[test]
    fn test_file_coverage_drops_files_without_kind() {
        let changed = vec![
            ChangedFile::new("com/github/mikas/parceldeliverydetails/domain/ParcelDeliveryDetails.kt", ""),
            ChangedFile::new("com/github/mikas/parceldeliverydetails/domain/ParcelDeliveryDetailsService.kt", ""),
        ];
        // Only ParcelDeliveryDetails.kt has a BRANCH counter.
        let result = file_coverage(&packages_report(), &changed, &CounterKind::Branch);
        assert_eq!(result.files.len(), 1);
        assert_eq!(result.percentage, 50.0);
    }

    #[test]
    fn test_file_coverage_empty_changed_files() {
        let result = file_coverage(&packages_report(), &[], &CounterKind::Line);
        assert!(result.files.is_empty());
        assert_eq!(result.percentage, 100.0);
    }

    #[test]
    fn test_file_coverage_no_matches() {
        let changed = vec![ChangedFile::new("src/Other.kt", "")];
        let result = file_coverage(&packages_report(), &changed, &CounterKind::Line);
        assert_eq!(result, ChangedFilesCoverage { percentage: 100.0, files: vec![] });
    }

    #[test]
    fn test_file_coverage_multiple_matches_are_kept() {
        let source = |missed, covered| SourceFile {
            name: "Foo.kt".to_string(),
            counters: vec![counter(CounterKind::Line, missed, covered)],
        };
        let report = Report {
            name: "r".to_string(),
            packages: vec![
                Package {
                    name: "b".to_string(),
                    source_files: vec![source(1, 1)],
                    ..Default::default()
                },
                Package {
                    name: "a/b".to_string(),
                    source_files: vec![source(0, 2)],
                    ..Default::default()
                },
            ],
            counters: vec![],
        };
        let changed = vec![ChangedFile::new("a/b/Foo.kt", "url")];
        let result = file_coverage(&report, &changed, &CounterKind::Line);

        assert_eq!(result.files.len(), 2);
        assert_eq!(result.files[0].coverage.percentage, Some(50.0));
        assert_eq!(result.files[1].coverage.percentage, Some(100.0));
        assert_eq!(result.percentage, 75.0);
    }

    #[test]
    fn test_file_coverage_preserves_changed_file_order() {
        let changed = vec![
            ChangedFile::new("com/github/mikas/parceldeliverydetails/util/Strings.kt", "first"),
            ChangedFile::new("com/github/mikas/parceldeliverydetails/domain/ParcelDeliveryDetails.kt", "second"),
        ];
        let result = file_coverage(&packages_report(), &changed, &CounterKind::Line);
        let urls: Vec<&str> = result.files.iter().map(|f| f.file.url.as_str()).collect();
        assert_eq!(urls, ["first", "second"]);
    }

    // -- total_percentage ----------------------------------------------------

    #[test]
    fn test_total_percentage() {
        let files = vec![
            with_coverage("Details.kt", 250, 1000),
            with_coverage("Util.kt", 1000, 1000),
        ];
        assert_eq!(total_percentage(&files), Some(61.54));
    }

    #[test]
    fn test_total_percentage_empty() {
        assert_eq!(total_percentage(&[]), None);
    }
}
