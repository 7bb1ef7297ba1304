//! The normalized metric row.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One fact mapped onto a vocabulary tag.
///
/// Field order is the column order of the metrics dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRow {
    /// Company identifier
    pub company_number: String,
    /// Start of the reporting period (None for point-in-time facts)
    pub period_start: Option<NaiveDate>,
    /// End of the reporting period, or the balance sheet date
    pub period_end: Option<NaiveDate>,
    /// Vocabulary tag
    pub metric_tag: String,
    /// Numeric value; None when the source text did not parse
    pub value: Option<f64>,
    /// Unit measure (e.g. "GBP")
    pub unit: Option<String>,
    /// Label or concept name the tag was resolved from
    pub metric_label: String,
}

impl NormalizedRow {
    /// Column names in output order.
    pub const COLUMNS: [&'static str; 7] = [
        "company_number",
        "period_start",
        "period_end",
        "metric_tag",
        "value",
        "unit",
        "metric_label",
    ];
}
