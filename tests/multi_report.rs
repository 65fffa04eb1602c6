mod common;

use kover_report::action::evaluate;
use kover_report::error::KoverError;
use kover_report::model::{ChangedFile, CounterKind};

#[test]
fn combines_reports_in_path_order() {
    let paths = [
        common::fixture("report_module_b.xml"),
        common::fixture("report_packages.xml"),
    ];
    let changed = vec![
        ChangedFile::new("com/github/mikas/parceldeliverydetails/util/Strings.kt", "strings"),
        ChangedFile::new("com/github/mikas/billing/Invoice.kt", "invoice"),
    ];

    let combined = evaluate(&paths, &changed, &CounterKind::Line).unwrap();

    assert_eq!(combined.overall.missed, 665 + 26);
    assert_eq!(combined.overall.covered, 874 + 44);
    // Mean of 56.79 and 62.86, not 918 / 1609.
    let overall = combined.overall.percentage.unwrap();
    assert!((overall - 59.825).abs() < 1e-9, "got {overall}");

    let urls: Vec<&str> = combined
        .changed_files
        .files
        .iter()
        .map(|f| f.file.url.as_str())
        .collect();
    assert_eq!(urls, ["invoice", "strings"]);
    // Mean of 75 and 100.
    assert_eq!(combined.changed_files.percentage, 87.5);
}

#[test]
fn report_without_requested_kind_counts_as_zero() {
    let paths = [common::fixture("report.xml"), common::fixture("report_packages.xml")];
    let combined = evaluate(&paths, &[], &CounterKind::Branch).unwrap();
    // report_packages.xml has no root BRANCH counter.
    assert_eq!(combined.overall.missed, 665);
    assert_eq!(combined.overall.covered, 874);
    let overall = combined.overall.percentage.unwrap();
    assert!((overall - 28.395).abs() < 1e-9, "got {overall}");
}

#[test]
fn empty_report_aborts_invocation() {
    let paths = [common::fixture("report.xml"), common::fixture("empty_report.xml")];
    let err = evaluate(&paths, &[], &CounterKind::Line).unwrap_err();
    assert!(matches!(err, KoverError::NoCoverageData(ref p) if p.ends_with("empty_report.xml")));
}

#[test]
fn malformed_report_aborts_invocation() {
    let paths = [common::fixture("report.xml"), common::fixture("malformed_report.xml")];
    let err = evaluate(&paths, &[], &CounterKind::Line).unwrap_err();
    assert!(err.is_malformed());
}
