//! Integration tests for income CSV import using the actual database backend.

use std::sync::Arc;

use etax_core::records::RecordStore;
use etax_data::IncomeCsvLoader;
use etax_kv_sqlite::SqliteKeyValueStore;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

const TEST_CSV_2025: &str = include_str!("../test-data/incomes_2025.csv");

async fn setup_record_store() -> RecordStore {
    let store = SqliteKeyValueStore::new("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    store
        .run_migrations()
        .await
        .expect("Failed to run migrations");
    RecordStore::new(Arc::new(store))
}

#[tokio::test]
async fn import_writes_parseable_rows_and_skips_broken_ones() {
    let records = setup_record_store().await;

    let rows = IncomeCsvLoader::parse(TEST_CSV_2025.as_bytes()).expect("Failed to parse CSV");
    // 5 rows in the file, one with an unparseable amount.
    assert_eq!(rows.len(), 4);

    let written = IncomeCsvLoader::load(&records, 2025, &rows)
        .await
        .expect("Failed to import rows");
    assert_eq!(written, 4);

    let cached = records.load_imported_incomes(2025).await;
    assert_eq!(cached.len(), 4);
    assert_eq!(cached[0].id, "bank-1");
    assert_eq!(cached[0].amount, dec!(1500.00));
    assert!(!cached[3].include);
}

#[tokio::test]
async fn reimport_does_not_duplicate_rows() {
    let records = setup_record_store().await;
    let rows = IncomeCsvLoader::parse(TEST_CSV_2025.as_bytes()).expect("Failed to parse CSV");

    IncomeCsvLoader::load(&records, 2025, &rows)
        .await
        .expect("first import");
    IncomeCsvLoader::load(&records, 2025, &rows)
        .await
        .expect("second import");

    let cached = records.load_imported_incomes(2025).await;
    assert_eq!(cached.len(), 4);
}

#[tokio::test]
async fn imports_for_different_years_stay_separate() {
    let records = setup_record_store().await;
    let rows = IncomeCsvLoader::parse(TEST_CSV_2025.as_bytes()).expect("Failed to parse CSV");

    IncomeCsvLoader::load(&records, 2024, &rows)
        .await
        .expect("Failed to import rows");

    assert_eq!(records.load_imported_incomes(2024).await.len(), 4);
    assert_eq!(records.load_imported_incomes(2025).await.len(), 0);
}
