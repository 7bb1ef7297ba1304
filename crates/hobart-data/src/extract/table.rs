//! Heuristic table scan for filings without inline tags.
//!
//! Older and paper-derived accounts are plain HTML: the figures live in
//! `<table>` rows with a text heading in the first cell. The scan parses the
//! markup leniently with `scraper`, keeps rows whose heading is a known
//! label, and takes the figure for the filing's year.

use crate::error::{DataError, Result};
use crate::extract::KnownLabels;
use crate::extract::value::{find_year, parse_amount};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// A known label found in a table row, with its figure if it parsed.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TableHit {
    pub(crate) label: String,
    pub(crate) value: Option<f64>,
}

/// Compiled selectors for the table scan.
#[derive(Debug)]
pub(crate) struct TableScanner {
    tables: Selector,
    rows: Selector,
}

impl TableScanner {
    pub(crate) fn new() -> Result<Self> {
        Ok(Self {
            tables: selector("table")?,
            rows: selector("tr")?,
        })
    }

    /// Scans every table in `html` for rows headed by a known label.
    ///
    /// When a table has a header row with years, only the column for
    /// `period_year` is read (the first year column if none matches); a
    /// blank cell there yields no hit. Otherwise the first non-blank cell
    /// after the heading is read. Each label is reported once, from its
    /// first occurrence with a figure.
    pub(crate) fn scan(
        &self,
        html: &str,
        period_year: Option<i32>,
        labels: &dyn KnownLabels,
    ) -> Vec<TableHit> {
        let document = Html::parse_document(html);
        let mut hits = Vec::new();
        let mut seen = HashSet::new();

        for table in document.select(&self.tables) {
            let rows: Vec<Vec<String>> = table
                .select(&self.rows)
                .map(row_cells)
                .filter(|cells| !cells.is_empty())
                .collect();

            let mut year_columns: Vec<(usize, i32)> = Vec::new();
            for cells in &rows {
                if cells.len() < 2 {
                    continue;
                }
                let label = &cells[0];
                let has_letters = label.chars().any(char::is_alphabetic);

                if !has_letters || !labels.is_known(label) {
                    if year_columns.is_empty() {
                        year_columns = header_years(cells);
                    }
                    continue;
                }
                let key = label.to_lowercase();
                if seen.contains(&key) {
                    continue;
                }

                let value = if year_columns.is_empty() {
                    let figure = first_figure(&cells[1..]);
                    if figure.is_none() && cells[1..].iter().all(|c| is_blank(c)) {
                        continue;
                    }
                    figure
                } else {
                    // Other columns hold notes or prior years.
                    let target = target_column(&year_columns, period_year);
                    match target.and_then(|idx| cells.get(idx)) {
                        Some(cell) if !is_blank(cell) => parse_amount(cell),
                        _ => continue,
                    }
                };
                seen.insert(key);
                hits.push(TableHit {
                    label: label.clone(),
                    value,
                });
            }
        }

        hits
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|_| DataError::Selector(css.to_string()))
}

/// Text of the direct `td`/`th` children of a row, whitespace-collapsed.
fn row_cells(row: ElementRef<'_>) -> Vec<String> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| matches!(cell.value().name(), "td" | "th"))
        .map(|cell| {
            let text: String = cell.text().collect::<Vec<_>>().join(" ");
            text.split_whitespace().collect::<Vec<_>>().join(" ")
        })
        .collect()
}

/// Columns (after the heading) whose text carries a year.
fn header_years(cells: &[String]) -> Vec<(usize, i32)> {
    let years: Vec<(usize, i32)> = cells
        .iter()
        .enumerate()
        .skip(1)
        .filter_map(|(idx, cell)| find_year(cell).map(|year| (idx, year)))
        .collect();
    // A single stray number is more likely a figure than a header.
    if years.len() >= 2 || (years.len() == 1 && cells.len() <= 3) {
        years
    } else {
        Vec::new()
    }
}

fn target_column(year_columns: &[(usize, i32)], period_year: Option<i32>) -> Option<usize> {
    period_year
        .and_then(|year| year_columns.iter().find(|(_, y)| *y == year))
        .or_else(|| year_columns.first())
        .map(|(idx, _)| *idx)
}

/// First cell after the heading that parses as a figure.
fn first_figure(cells: &[String]) -> Option<f64> {
    cells
        .iter()
        .filter(|c| !is_blank(c))
        .find_map(|c| parse_amount(c))
}

/// Empty, or only currency symbols.
fn is_blank(cell: &str) -> bool {
    cell.chars()
        .all(|c| c.is_whitespace() || matches!(c, '£' | '€' | '$'))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Labels(&'static [&'static str]);

    impl KnownLabels for Labels {
        fn is_known(&self, label: &str) -> bool {
            let lower = label.to_lowercase();
            self.0.iter().any(|known| lower.contains(known))
        }
    }

    const LABELS: Labels = Labels(&["turnover", "net assets", "total equity"]);

    #[test]
    fn test_scan_year_columns() {
        let html = r#"<html><body><table>
            <tr><td></td><td>Notes</td><td>2023</td><td>2022</td></tr>
            <tr><td></td><td></td><td>£</td><td>£</td></tr>
            <tr><td>Turnover</td><td>3</td><td>120,000</td><td>95,000</td></tr>
            <tr><td>Net assets</td><td>4</td><td>(1,234)</td><td>500</td></tr>
            <tr><td>Directors' loans</td><td></td><td>10</td><td>10</td></tr>
        </table></body></html>"#;

        let scanner = TableScanner::new().unwrap();
        let hits = scanner.scan(html, Some(2023), &LABELS);
        assert_eq!(
            hits,
            vec![
                TableHit {
                    label: "Turnover".to_string(),
                    value: Some(120_000.0)
                },
                TableHit {
                    label: "Net assets".to_string(),
                    value: Some(-1234.0)
                },
            ]
        );

        let prior = scanner.scan(html, Some(2022), &LABELS);
        assert_eq!(prior[0].value, Some(95_000.0));
    }

    #[test]
    fn test_scan_blank_year_cell_never_reads_notes() {
        let html = r#"<table>
            <tr><td></td><td>Notes</td><td>2023</td><td>2022</td></tr>
            <tr><td>Turnover</td><td>3</td><td></td><td>95,000</td></tr>
            <tr><td>Net assets</td><td>4</td><td>£</td><td>500</td></tr>
        </table>"#;

        let scanner = TableScanner::new().unwrap();
        assert!(scanner.scan(html, Some(2023), &LABELS).is_empty());

        let prior = scanner.scan(html, Some(2022), &LABELS);
        assert_eq!(prior.len(), 2);
        assert_eq!(prior[0].value, Some(95_000.0));
        assert_eq!(prior[1].value, Some(500.0));
    }

    #[test]
    fn test_scan_later_table_fills_blank_year_cell() {
        let html = r#"
            <table>
                <tr><td></td><td>2023</td><td>2022</td></tr>
                <tr><td>Turnover</td><td></td><td>95,000</td></tr>
            </table>
            <table>
                <tr><td></td><td>2023</td><td>2022</td></tr>
                <tr><td>Turnover</td><td>120,000</td><td>95,000</td></tr>
            </table>"#;

        let scanner = TableScanner::new().unwrap();
        let hits = scanner.scan(html, Some(2023), &LABELS);
        assert_eq!(
            hits,
            vec![TableHit {
                label: "Turnover".to_string(),
                value: Some(120_000.0)
            }]
        );
    }

    #[test]
    fn test_scan_without_header_takes_adjacent_figure() {
        let html = r#"<table>
            <tr><th>Total equity</th><td>£</td><td>7,500</td></tr>
        </table>"#;

        let scanner = TableScanner::new().unwrap();
        let hits = scanner.scan(html, None, &LABELS);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].value, Some(7500.0));
    }

    #[test]
    fn test_scan_unparseable_cell_reported_without_value() {
        let html = r#"<table><tr><td>Turnover</td><td>nil</td></tr></table>"#;

        let scanner = TableScanner::new().unwrap();
        let hits = scanner.scan(html, None, &LABELS);
        assert_eq!(
            hits,
            vec![TableHit {
                label: "Turnover".to_string(),
                value: None
            }]
        );
    }

    #[test]
    fn test_scan_no_tables() {
        let scanner = TableScanner::new().unwrap();
        assert!(scanner.scan("<p>Dormant company</p>", None, &LABELS).is_empty());
    }

    #[test]
    fn test_header_years() {
        let cells: Vec<String> = ["", "2023", "2022"].iter().map(|s| s.to_string()).collect();
        assert_eq!(header_years(&cells), vec![(1, 2023), (2, 2022)]);

        let figures: Vec<String> = ["Turnover", "2023", "45", "60"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(header_years(&figures).is_empty());
    }
}
