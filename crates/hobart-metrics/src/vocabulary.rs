//! Concept vocabulary
//!
//! The closed set of metric tags a run may emit, each with the labels and
//! concept names that map onto it. The built-in table covers the figures
//! small-company accounts disclose; a JSON file with the same shape can
//! replace it.

use crate::error::{Result, VocabularyError};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Version of the built-in vocabulary.
pub const BUILTIN_VERSION: &str = "2024.1";

/// One metric tag and the labels that denote it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    /// Canonical tag written to the output (e.g. "revenue")
    pub tag: String,
    /// What the metric measures
    #[serde(default)]
    pub description: String,
    /// Labels and concept names mapping to the tag
    pub labels: Vec<String>,
}

/// Versioned table of concepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Version string carried alongside outputs
    pub version: String,
    /// Concepts in the vocabulary
    pub concepts: Vec<Concept>,
}

impl Vocabulary {
    /// The built-in vocabulary.
    pub fn builtin() -> Self {
        let concepts = BUILTIN
            .iter()
            .map(|(tag, description, labels)| Concept {
                tag: (*tag).to_string(),
                description: (*description).to_string(),
                labels: labels.iter().map(|l| (*l).to_string()).collect(),
            })
            .collect();
        Self {
            version: BUILTIN_VERSION.to_string(),
            concepts,
        }
    }

    /// Parses and validates a vocabulary from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let vocabulary: Self = serde_json::from_str(json)?;
        vocabulary.validate()?;
        Ok(vocabulary)
    }

    /// Reads and validates a vocabulary file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Pretty-printed JSON, loadable with [`Vocabulary::from_json`].
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks that tags are non-empty and unique, and that no label maps to
    /// two different tags.
    pub fn validate(&self) -> Result<()> {
        let mut tags = HashSet::new();
        let mut owners: HashMap<String, &str> = HashMap::new();

        for concept in &self.concepts {
            if concept.tag.trim().is_empty() {
                return Err(VocabularyError::EmptyTag);
            }
            if !tags.insert(concept.tag.as_str()) {
                return Err(VocabularyError::DuplicateTag(concept.tag.clone()));
            }
            for label in &concept.labels {
                let key = crate::label::normalize_label(label);
                if key.is_empty() {
                    continue;
                }
                if let Some(owner) = owners.insert(key, &concept.tag)
                    && owner != concept.tag
                {
                    return Err(VocabularyError::ConflictingLabel {
                        label: label.clone(),
                        first: owner.to_string(),
                        second: concept.tag.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Looks up a concept by tag.
    pub fn concept(&self, tag: &str) -> Option<&Concept> {
        self.concepts.iter().find(|c| c.tag == tag)
    }

    /// All tags, in table order.
    pub fn tags(&self) -> Vec<&str> {
        self.concepts.iter().map(|c| c.tag.as_str()).collect()
    }

    /// Returns true if `tag` belongs to the vocabulary.
    pub fn contains(&self, tag: &str) -> bool {
        self.concept(tag).is_some()
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::builtin()
    }
}

type BuiltinConcept = (&'static str, &'static str, &'static [&'static str]);

const BUILTIN: &[BuiltinConcept] = &[
    // Profit and loss
    (
        "revenue",
        "Turnover from ordinary activities",
        &[
            "Turnover",
            "Revenue",
            "Sales",
            "Net sales",
            "TurnoverRevenue",
            "TurnoverGrossOperatingRevenue",
        ],
    ),
    (
        "cost_of_sales",
        "Direct costs of generating turnover",
        &["Cost of sales", "CostSales"],
    ),
    (
        "gross_profit",
        "Turnover less cost of sales",
        &["Gross profit", "GrossProfitLoss", "Gross profit (loss)"],
    ),
    (
        "administrative_expenses",
        "Administrative expenses",
        &["Administrative expenses", "AdministrativeExpenses"],
    ),
    (
        "operating_profit",
        "Profit from operations before interest and tax",
        &["Operating profit", "OperatingProfitLoss", "Operating profit (loss)"],
    ),
    (
        "profit_before_tax",
        "Profit on ordinary activities before taxation",
        &[
            "Profit before tax",
            "Profit before taxation",
            "Profit on ordinary activities before taxation",
            "ProfitLossOnOrdinaryActivitiesBeforeTax",
        ],
    ),
    (
        "tax",
        "Tax charge or credit on ordinary activities",
        &[
            "Tax on profit",
            "Taxation",
            "TaxTaxCreditOnProfitOrLossOnOrdinaryActivities",
        ],
    ),
    (
        "profit",
        "Profit or loss for the financial year",
        &[
            "Profit",
            "Profit for the financial year",
            "Profit for the year",
            "Net profit",
            "ProfitLoss",
            "Profit (loss)",
        ],
    ),
    // Balance sheet
    (
        "intangible_assets",
        "Intangible fixed assets",
        &["Intangible assets", "IntangibleAssets"],
    ),
    (
        "tangible_assets",
        "Property, plant and equipment",
        &[
            "Tangible assets",
            "Tangible fixed assets",
            "PropertyPlantEquipment",
        ],
    ),
    (
        "fixed_assets",
        "Total fixed assets",
        &["Fixed assets", "FixedAssets"],
    ),
    (
        "stocks",
        "Stocks and work in progress",
        &["Stocks", "Stock", "Inventories"],
    ),
    (
        "debtors",
        "Amounts owed to the company",
        &["Debtors", "Trade debtors"],
    ),
    (
        "cash",
        "Cash at bank and in hand",
        &["Cash at bank and in hand", "Cash at bank", "Cash", "CashBankOnHand"],
    ),
    (
        "current_assets",
        "Total current assets",
        &["Current assets", "CurrentAssets"],
    ),
    (
        "creditors",
        "Creditors, not split by maturity",
        &["Creditors", "Trade creditors"],
    ),
    (
        "creditors_within_one_year",
        "Creditors falling due within one year",
        &[
            "Creditors: amounts falling due within one year",
            "Creditors due within one year",
        ],
    ),
    (
        "creditors_after_one_year",
        "Creditors falling due after more than one year",
        &[
            "Creditors: amounts falling due after more than one year",
            "Creditors due after one year",
        ],
    ),
    (
        "net_current_assets",
        "Current assets less current liabilities",
        &[
            "Net current assets",
            "Net current liabilities",
            "NetCurrentAssetsLiabilities",
        ],
    ),
    (
        "total_assets_less_current_liabilities",
        "Total assets less current liabilities",
        &[
            "Total assets less current liabilities",
            "TotalAssetsLessCurrentLiabilities",
        ],
    ),
    (
        "net_assets",
        "Total assets less total liabilities",
        &[
            "Net assets",
            "Net liabilities",
            "NetAssetsLiabilities",
            "Net assets (liabilities)",
        ],
    ),
    (
        "called_up_share_capital",
        "Called up share capital",
        &["Called up share capital", "CalledUpShareCapital", "Share capital"],
    ),
    (
        "retained_earnings",
        "Profit and loss reserve",
        &[
            "Profit and loss account",
            "Retained earnings",
            "RetainedEarningsAccumulatedLosses",
        ],
    ),
    (
        "total_equity",
        "Shareholders' funds",
        &[
            "Total equity",
            "Equity",
            "Shareholders' funds",
            "Total shareholders' funds",
            "Capital and reserves",
        ],
    ),
    // Other disclosures
    (
        "employees",
        "Average number of employees",
        &[
            "Average number of employees",
            "Employees",
            "AverageNumberEmployeesDuringPeriod",
        ],
    ),
];
