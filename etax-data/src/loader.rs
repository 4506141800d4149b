use std::io::Read;

use etax_core::models::ImportedIncome;
use etax_core::records::RecordStore;
use etax_core::storage::StorageError;
use etax_core::validators::{is_iso_date, parse_money};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

/// Errors that can occur when importing income rows.
#[derive(Debug, Error)]
pub enum IncomeImportError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<csv::Error> for IncomeImportError {
    fn from(err: csv::Error) -> Self {
        IncomeImportError::CsvParse(err.to_string())
    }
}

/// A single row from an income CSV file.
///
/// Expected columns:
/// - `description`: free text shown in the income list
/// - `amount`: money value; both `.` and `,` decimal separators are accepted
/// - `date`: optional `YYYY-MM-DD`
/// - `id`: optional stable row id; rows without one get a positional id
/// - `include`: optional flag, defaults to true
#[derive(Debug, Clone, Deserialize, PartialEq)]
struct IncomeCsvRow {
    description: String,
    amount: String,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    include: Option<bool>,
}

/// Loader for bank-statement-style income CSV files.
///
/// Parsed rows land in the per-year imported-incomes cache, separate from
/// the canonical incomes, so the user can pick which rows to include
/// before they affect any calculation.
pub struct IncomeCsvLoader;

impl IncomeCsvLoader {
    /// Parses income rows from a CSV reader.
    ///
    /// Rows whose amount does not parse as money are skipped with a
    /// warning rather than failing the whole file; structurally broken
    /// CSV is an error.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<ImportedIncome>, IncomeImportError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut rows = Vec::new();

        for (index, result) in csv_reader.deserialize().enumerate() {
            let row: IncomeCsvRow = result?;
            let Some(amount) = parse_money(&row.amount) else {
                warn!(index, amount = %row.amount, "skipping row with unparseable amount");
                continue;
            };
            let date = match row.date {
                Some(d) if !is_iso_date(&d) => {
                    warn!(index, date = %d, "dropping malformed date");
                    None
                }
                other => other.filter(|d| !d.is_empty()),
            };
            rows.push(ImportedIncome {
                id: row.id.unwrap_or_else(|| format!("row-{}", index + 1)),
                description: row.description,
                amount,
                date,
                include: row.include.unwrap_or(true),
            });
        }

        Ok(rows)
    }

    /// Merges parsed rows into the year's imported-incomes cache.
    ///
    /// Rows with an id already present in the cache replace the cached
    /// row; new ids are appended in file order. Re-running the same
    /// import therefore leaves the cache unchanged.
    ///
    /// Returns the number of rows written.
    pub async fn load(
        store: &RecordStore,
        year: i32,
        rows: &[ImportedIncome],
    ) -> Result<usize, IncomeImportError> {
        let mut cached = store.load_imported_incomes(year).await;

        for row in rows {
            if let Some(existing) = cached.iter_mut().find(|c| c.id == row.id) {
                *existing = row.clone();
            } else {
                cached.push(row.clone());
            }
        }

        store.save_imported_incomes(year, &cached).await?;
        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use etax_core::storage::MemoryStore;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const SAMPLE: &str = "\
description,amount,date,id,include
Превод от Фирма ООД,\"1500,00\",2025-03-01,bank-1,true
Хонорар,800.50,2025-04-15,bank-2,
Наем април,650,,,false
";

    #[test]
    fn parse_reads_well_formed_rows() {
        let rows = IncomeCsvLoader::parse(SAMPLE.as_bytes()).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].amount, dec!(1500.00));
        assert_eq!(rows[0].id, "bank-1");
        assert_eq!(rows[1].amount, dec!(800.50));
        assert!(rows[1].include);
        assert_eq!(rows[2].id, "row-3");
        assert_eq!(rows[2].date, None);
        assert!(!rows[2].include);
    }

    #[test]
    fn parse_skips_rows_with_bad_amounts() {
        let csv = "description,amount\nok,100\nbroken,not-money\nalso ok,200\n";
        let rows = IncomeCsvLoader::parse(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].amount, dec!(200));
    }

    #[test]
    fn parse_drops_malformed_dates() {
        let csv = "description,amount,date\nx,100,31.03.2025\n";
        let rows = IncomeCsvLoader::parse(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].date, None);
    }

    #[test]
    fn parse_rejects_structurally_broken_csv() {
        let csv = "description,amount\n\"unterminated,100\n";
        assert!(IncomeCsvLoader::parse(csv.as_bytes()).is_err());
    }

    #[tokio::test]
    async fn load_is_idempotent_by_row_id() {
        let records = RecordStore::new(Arc::new(MemoryStore::new()));
        let rows = IncomeCsvLoader::parse(SAMPLE.as_bytes()).unwrap();

        IncomeCsvLoader::load(&records, 2025, &rows).await.unwrap();
        IncomeCsvLoader::load(&records, 2025, &rows).await.unwrap();

        let cached = records.load_imported_incomes(2025).await;
        assert_eq!(cached.len(), 3);
    }

    #[tokio::test]
    async fn load_replaces_rows_with_matching_ids() {
        let records = RecordStore::new(Arc::new(MemoryStore::new()));
        let first = IncomeCsvLoader::parse(SAMPLE.as_bytes()).unwrap();
        IncomeCsvLoader::load(&records, 2025, &first).await.unwrap();

        let update = vec![ImportedIncome {
            id: "bank-1".into(),
            description: "коригиран превод".into(),
            amount: dec!(1600),
            date: None,
            include: true,
        }];
        IncomeCsvLoader::load(&records, 2025, &update).await.unwrap();

        let cached = records.load_imported_incomes(2025).await;
        assert_eq!(cached.len(), 3);
        assert_eq!(cached[0].amount, dec!(1600));
        assert_eq!(cached[0].description, "коригиран превод");
    }
}
