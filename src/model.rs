//! In-memory representation of a Kover/JaCoCo XML report, plus the derived
//! coverage values computed from it. The report tree is owned top-down
//! (report → packages → source files → counters) and never mutated after
//! parsing.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::KoverError;

/// Round to two decimal places, half away from zero.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Covered share of `covered + missed` as a percentage rounded to two
/// decimals, or `None` when nothing was instrumented.
#[must_use]
pub fn percentage(missed: u64, covered: u64) -> Option<f64> {
    let total = missed.saturating_add(covered);
    if total == 0 {
        None
    } else {
        Some(round2(covered as f64 / total as f64 * 100.0))
    }
}

/// The granularity a counter measures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum CounterKind {
    Instruction,
    Branch,
    #[default]
    Line,
    Method,
    Class,
    /// A counter type this crate does not know. Kept so the parsed tree
    /// mirrors the document, but never matched by a query.
    Other(String),
}

impl CounterKind {
    /// Map a report `type` attribute onto a kind. Never fails: unrecognised
    /// values become [`CounterKind::Other`].
    pub fn from_report_attr(value: &str) -> Self {
        match value {
            "INSTRUCTION" => CounterKind::Instruction,
            "BRANCH" => CounterKind::Branch,
            "LINE" => CounterKind::Line,
            "METHOD" => CounterKind::Method,
            "CLASS" => CounterKind::Class,
            other => CounterKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CounterKind::Instruction => "INSTRUCTION",
            CounterKind::Branch => "BRANCH",
            CounterKind::Line => "LINE",
            CounterKind::Method => "METHOD",
            CounterKind::Class => "CLASS",
            CounterKind::Other(raw) => raw,
        }
    }

    /// Whether a counter of this kind answers a query for `query`.
    /// `Other` never matches, not even another `Other` with the same text.
    #[must_use]
    pub fn matches(&self, query: &CounterKind) -> bool {
        !matches!(self, CounterKind::Other(_)) && self == query
    }
}

impl FromStr for CounterKind {
    type Err = KoverError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match CounterKind::from_report_attr(&s.trim().to_uppercase()) {
            CounterKind::Other(_) => Err(KoverError::UnknownCounterType(s.to_string())),
            kind => Ok(kind),
        }
    }
}

impl fmt::Display for CounterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `<counter>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counter {
    pub kind: CounterKind,
    pub missed: u64,
    pub covered: u64,
}

/// A `<sourcefile>` inside a package.
#[derive(Debug, Clone, Default)]
pub struct SourceFile {
    pub name: String,
    pub counters: Vec<Counter>,
}

/// A `<class>` inside a package. Not used for changed-file matching.
#[derive(Debug, Clone, Default)]
pub struct Class {
    pub name: String,
    pub source_file_name: Option<String>,
    pub counters: Vec<Counter>,
}

/// A `<package>`; `name` is slash-delimited, e.g. `com/example/app`.
#[derive(Debug, Clone, Default)]
pub struct Package {
    pub name: String,
    pub source_files: Vec<SourceFile>,
    pub classes: Vec<Class>,
    pub counters: Vec<Counter>,
}

/// The root `<report>` element.
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub name: String,
    pub packages: Vec<Package>,
    pub counters: Vec<Counter>,
}

/// Missed/covered counts and the percentage derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Coverage {
    pub missed: u64,
    pub covered: u64,
    pub percentage: Option<f64>,
}

impl Coverage {
    #[must_use]
    pub fn new(missed: u64, covered: u64) -> Self {
        Self {
            missed,
            covered,
            percentage: percentage(missed, covered),
        }
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.missed.saturating_add(self.covered)
    }
}

/// A file touched between two revisions, supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangedFile {
    /// Repository-relative, slash-delimited path.
    pub file_path: String,
    pub url: String,
}

impl ChangedFile {
    pub fn new(file_path: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            url: url.into(),
        }
    }

    /// Last path segment, e.g. `Foo.kt` for `src/main/kotlin/a/Foo.kt`.
    pub fn file_name(&self) -> &str {
        self.file_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.file_path)
    }
}

/// A changed file that matched a report source file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangedFileWithCoverage {
    #[serde(flatten)]
    pub file: ChangedFile,
    #[serde(flatten)]
    pub coverage: Coverage,
}

/// Coverage of the changed files found in a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangedFilesCoverage {
    pub percentage: f64,
    pub files: Vec<ChangedFileWithCoverage>,
}

impl Default for ChangedFilesCoverage {
    fn default() -> Self {
        Self {
            percentage: 100.0,
            files: Vec::new(),
        }
    }
}
