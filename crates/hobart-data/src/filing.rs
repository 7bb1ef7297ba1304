//! Filing documents and the raw facts extracted from them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One company's accounts document for one period, read from an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filing {
    /// File name of the archive the filing came from
    pub source_archive: String,

    /// Entry name inside the archive
    pub entry_name: String,

    /// Company number taken from the entry name (may be empty)
    pub company_number: String,

    /// Balance sheet date taken from the entry name
    pub period_end: Option<NaiveDate>,

    /// Document markup, decoded lossily as UTF-8
    pub content: String,
}

impl Filing {
    /// Builds a filing, deriving company number and period from the entry name.
    pub fn new(
        source_archive: impl Into<String>,
        entry_name: impl Into<String>,
        content: String,
    ) -> Self {
        let entry_name = entry_name.into();
        let (company_number, period_end) = parse_entry_name(&entry_name);
        Self {
            source_archive: source_archive.into(),
            entry_name,
            company_number: company_number.unwrap_or_default(),
            period_end,
            content,
        }
    }
}

/// Splits a bulk accounts entry name into company number and period end.
///
/// Entries are named `Prod<run>_<seq>_<company>_<yyyymmdd>.html`. Names that
/// do not follow the pattern give `(None, None)` or a partial result.
pub fn parse_entry_name(entry_name: &str) -> (Option<String>, Option<NaiveDate>) {
    let file_name = entry_name.rsplit('/').next().unwrap_or(entry_name);
    let stem = file_name.split('.').next().unwrap_or(file_name);
    let parts: Vec<&str> = stem.split('_').collect();
    if parts.len() < 4 {
        return (None, None);
    }

    let company = parts[parts.len() - 2].trim();
    let company = (!company.is_empty()).then(|| company.to_string());
    let period_end = NaiveDate::parse_from_str(parts[parts.len() - 1], "%Y%m%d").ok();
    (company, period_end)
}

/// Reporting period of a fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    /// Point in time, e.g. a balance sheet date
    Instant(NaiveDate),
    /// Span of time, e.g. a profit and loss year
    Duration {
        /// First day of the period
        start: NaiveDate,
        /// Last day of the period
        end: NaiveDate,
    },
}

impl Period {
    /// Last day of the period (the date itself for instants).
    pub const fn end(&self) -> NaiveDate {
        match self {
            Self::Instant(date) => *date,
            Self::Duration { end, .. } => *end,
        }
    }

    /// First day of a duration period.
    pub const fn start(&self) -> Option<NaiveDate> {
        match self {
            Self::Instant(_) => None,
            Self::Duration { start, .. } => Some(*start),
        }
    }

    /// Returns true for point-in-time periods.
    pub const fn is_instant(&self) -> bool {
        matches!(self, Self::Instant(_))
    }

    /// Length of a duration period in days.
    pub fn duration_days(&self) -> Option<i64> {
        self.start()
            .map(|start| self.end().signed_duration_since(start).num_days())
    }
}

/// Value of a fact as found in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FactValue {
    /// Parsed numeric amount
    Number(f64),
    /// Text that did not parse as a number
    Text(String),
}

impl FactValue {
    /// Numeric amount, if the value parsed.
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

/// How a fact was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactSource {
    /// Inline XBRL tag
    Structured,
    /// Heuristic table scan
    Table,
}

impl fmt::Display for FactSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structured => write!(f, "structured"),
            Self::Table => write!(f, "table"),
        }
    }
}

/// A metric as found in one filing, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFact {
    /// Company the fact belongs to
    pub company_number: String,

    /// Label as found in the source: concept local name or row heading
    pub label: String,

    /// Full concept name for structured facts (e.g. "core:TurnoverRevenue")
    pub concept: Option<String>,

    /// Reported value
    pub value: FactValue,

    /// Unit measure (e.g. "GBP")
    pub unit: Option<String>,

    /// Reporting period, when known
    pub period: Option<Period>,

    /// Context id the fact referenced (structured facts only)
    pub context_ref: Option<String>,

    /// Extraction method
    pub source: FactSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entry_name() {
        let (company, period) = parse_entry_name("Prod223_3525_01234567_20230331.html");
        assert_eq!(company.as_deref(), Some("01234567"));
        assert_eq!(period, NaiveDate::from_ymd_opt(2023, 3, 31));
    }

    #[test]
    fn test_parse_entry_name_nested_path() {
        let (company, period) = parse_entry_name("April/Prod224_0001_SC123456_20240131.xhtml");
        assert_eq!(company.as_deref(), Some("SC123456"));
        assert_eq!(period, NaiveDate::from_ymd_opt(2024, 1, 31));
    }

    #[test]
    fn test_parse_entry_name_unrecognised() {
        assert_eq!(parse_entry_name("report.html"), (None, None));
    }

    #[test]
    fn test_period_instant_vs_duration() {
        let end = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        let instant = Period::Instant(end);
        assert!(instant.is_instant());
        assert_eq!(instant.start(), None);
        assert_eq!(instant.duration_days(), None);

        let duration = Period::Duration {
            start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            end,
        };
        assert!(!duration.is_instant());
        assert_eq!(duration.end(), end);
        assert_eq!(duration.duration_days(), Some(364));
    }

    #[test]
    fn test_filing_new_reads_entry_name() {
        let filing = Filing::new(
            "bundle.zip",
            "Prod223_3525_00000001_20221231.html",
            String::new(),
        );
        assert_eq!(filing.company_number, "00000001");
        assert_eq!(filing.period_end, NaiveDate::from_ymd_opt(2022, 12, 31));
    }
}
