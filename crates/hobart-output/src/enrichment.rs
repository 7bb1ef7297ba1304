//! Company snapshot loading.
//!
//! The enrichment side of the join is the Companies House basic company
//! snapshot: one CSV row per company, shipped either bare or zipped. Header
//! names in the published file carry stray spaces (`" CompanyNumber"`), so
//! headers and fields are trimmed before lookup.

use crate::error::{OutputError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Enrichment columns appended to each merged row, in order.
pub const ENRICHMENT_COLUMNS: [&str; 4] = ["company_name", "postcode", "category", "status"];

const SNAPSHOT_KEY: &str = "CompanyNumber";
const SNAPSHOT_FIELDS: [&str; 4] = [
    "CompanyName",
    "RegAddress.PostCode",
    "CompanyCategory",
    "CompanyStatus",
];

/// Registry attributes of one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentRecord {
    /// Company identifier, the join key
    pub company_number: String,
    /// Registered name
    pub company_name: String,
    /// Registered office postcode
    pub postcode: String,
    /// Company category (e.g. "Private Limited Company")
    pub category: String,
    /// Company status (e.g. "Active")
    pub status: String,
}

impl EnrichmentRecord {
    /// The appended fields, in [`ENRICHMENT_COLUMNS`] order.
    pub fn fields(&self) -> [&str; 4] {
        [
            self.company_name.as_str(),
            self.postcode.as_str(),
            self.category.as_str(),
            self.status.as_str(),
        ]
    }
}

/// In-memory lookup from company number to record.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentMap {
    records: HashMap<String, EnrichmentRecord>,
    duplicates: usize,
}

impl EnrichmentMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record. The first record for a company number wins; later
    /// ones are counted as duplicates and ignored.
    pub fn insert(&mut self, record: EnrichmentRecord) -> bool {
        if self.records.contains_key(&record.company_number) {
            self.duplicates += 1;
            return false;
        }
        self.records.insert(record.company_number.clone(), record);
        true
    }

    /// Looks up a company number.
    pub fn get(&self, company_number: &str) -> Option<&EnrichmentRecord> {
        self.records.get(company_number)
    }

    /// Number of companies.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the map holds no companies.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records ignored because their company number was already present.
    pub const fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Loads a snapshot CSV from any reader.
    ///
    /// Requires the `CompanyNumber`, `CompanyName`, `RegAddress.PostCode`,
    /// `CompanyCategory` and `CompanyStatus` columns; any others are ignored.
    /// Rows with a blank company number are skipped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let key_idx = column(&headers, SNAPSHOT_KEY)?;
        let mut field_idx = [0usize; 4];
        for (slot, name) in field_idx.iter_mut().zip(SNAPSHOT_FIELDS) {
            *slot = column(&headers, name)?;
        }

        let mut map = Self::new();
        let mut blank = 0usize;
        for record in csv_reader.records() {
            let record = record?;
            let company_number = record.get(key_idx).unwrap_or_default();
            if company_number.is_empty() {
                blank += 1;
                continue;
            }
            let field = |idx: usize| record.get(field_idx[idx]).unwrap_or_default().to_string();
            map.insert(EnrichmentRecord {
                company_number: company_number.to_string(),
                company_name: field(0),
                postcode: field(1),
                category: field(2),
                status: field(3),
            });
        }

        if blank > 0 {
            debug!("Skipped {} snapshot rows without a company number", blank);
        }
        if map.duplicates > 0 {
            debug!("Ignored {} repeated company numbers in snapshot", map.duplicates);
        }
        Ok(map)
    }

    /// Loads a snapshot from a `.csv` file, or from the first `.csv` entry
    /// of a `.zip` file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let is_zip = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));

        let map = if is_zip {
            let mut archive = zip::ZipArchive::new(File::open(path)?)?;
            let entry_name = archive
                .file_names()
                .filter(|name| name.to_ascii_lowercase().ends_with(".csv"))
                .min()
                .map(str::to_string)
                .ok_or_else(|| OutputError::NoCsvEntry(path.to_path_buf()))?;
            debug!("Reading snapshot entry {} from {}", entry_name, path.display());
            Self::from_reader(archive.by_name(&entry_name)?)?
        } else {
            Self::from_reader(File::open(path)?)?
        };

        info!("Loaded {} companies from {}", map.len(), path.display());
        Ok(map)
    }
}

impl FromIterator<EnrichmentRecord> for EnrichmentMap {
    fn from_iter<I: IntoIterator<Item = EnrichmentRecord>>(iter: I) -> Self {
        let mut map = Self::new();
        for record in iter {
            map.insert(record);
        }
        map
    }
}

fn column(headers: &csv::StringRecord, name: &'static str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or(OutputError::MissingColumn {
            column: name,
            input: "company snapshot",
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    const SNAPSHOT: &str = "\
CompanyName, CompanyNumber,RegAddress.CareOf,RegAddress.PostCode,CompanyCategory,CompanyStatus
ACME LTD,00000001,,AB1 2CD,Private Limited Company,Active
  WIDGETS PLC  ,00000002,,EF3 4GH,Public Limited Company,Liquidation
DUPLICATE LTD,00000001,,ZZ9 9ZZ,Private Limited Company,Dissolved
NO NUMBER LTD,,,,Private Limited Company,Active
";

    #[test]
    fn test_from_reader_trims_headers_and_fields() {
        let map = EnrichmentMap::from_reader(SNAPSHOT.as_bytes()).unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map.duplicates(), 1);

        let acme = map.get("00000001").unwrap();
        assert_eq!(acme.company_name, "ACME LTD");
        assert_eq!(acme.postcode, "AB1 2CD");
        assert_eq!(acme.status, "Active");

        let widgets = map.get("00000002").unwrap();
        assert_eq!(widgets.company_name, "WIDGETS PLC");
        assert_eq!(
            widgets.fields(),
            ["WIDGETS PLC", "EF3 4GH", "Public Limited Company", "Liquidation"]
        );
    }

    #[test]
    fn test_missing_company_number_column() {
        let csv = "CompanyName,RegAddress.PostCode,CompanyCategory,CompanyStatus\n\
                   ACME,AB1,Private,Active\n";
        let result = EnrichmentMap::from_reader(csv.as_bytes());
        assert!(matches!(
            result,
            Err(OutputError::MissingColumn { column: "CompanyNumber", .. })
        ));
    }

    #[test]
    fn test_from_zipped_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("BasicCompanyData.zip");

        let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
        let options = SimpleFileOptions::default();
        writer.start_file("README.txt", options).unwrap();
        writer.write_all(b"not the data").unwrap();
        writer.start_file("BasicCompanyDataAsOneFile.csv", options).unwrap();
        writer.write_all(SNAPSHOT.as_bytes()).unwrap();
        writer.finish().unwrap();

        let map = EnrichmentMap::from_path(&path).unwrap();
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_zip_without_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.zip");
        let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
        writer.start_file("notes.txt", SimpleFileOptions::default()).unwrap();
        writer.write_all(b"nothing").unwrap();
        writer.finish().unwrap();

        assert!(matches!(
            EnrichmentMap::from_path(&path),
            Err(OutputError::NoCsvEntry(_))
        ));
    }

    #[test]
    fn test_from_iterator_keeps_first() {
        let record = |name: &str| EnrichmentRecord {
            company_number: "001".to_string(),
            company_name: name.to_string(),
            postcode: String::new(),
            category: String::new(),
            status: String::new(),
        };
        let map: EnrichmentMap = [record("First"), record("Second")].into_iter().collect();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("001").unwrap().company_name, "First");
    }
}
