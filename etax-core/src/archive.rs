//! Declaration archive: an index-driven collection of submitted and saved
//! declarations, plus a one-way migration from the pre-index key layout.
//!
//! Canonical layout: `@declarations_index` holds a JSON array of record ids
//! and each record lives under `@declaration:<id>`. Older versions wrote
//! whole records (or arrays of them) under `archive:<id>` keys with assorted
//! field names, including Cyrillic ones. [`Archive::read_all`] surfaces both
//! worlds merged; [`Archive::migrate_legacy`] folds the old keys into the
//! canonical layout and deletes them. A legacy key is deleted only once all
//! of its content has been mapped; anything unmappable stays where it is.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::models::{DeclarationRecord, DeclarationStatus};
use crate::storage::coerce::{opt_decimal, opt_epoch_ms, opt_string, opt_year, pick, string_or_empty};
use crate::storage::keys;
use crate::storage::{KeyValueStore, StorageError};

/// Outcome of a [`Archive::migrate_legacy`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Number of records moved into the canonical layout.
    pub migrated: usize,
}

pub struct Archive {
    store: Arc<dyn KeyValueStore>,
}

/// One legacy key's content: the records that mapped, and whether every
/// blob under the key mapped (only then may the key be deleted).
struct LegacyEntry {
    key: String,
    records: Vec<DeclarationRecord>,
    fully_mapped: bool,
}

/// Rebuilds a record from a legacy blob, tolerating every field name an
/// older version ever used.
///
/// Returns `None` when no id can be recovered or the year is unusable;
/// such blobs are dropped from listings and never stored.
pub fn map_legacy_to_record(value: &Value) -> Option<DeclarationRecord> {
    let id = string_or_empty(pick(value, &["id", "_id"]));
    if id.is_empty() {
        return None;
    }
    let year = opt_year(pick(value, &["year", "година"]))?;
    let attachments = pick(value, &["attachments"])
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok());
    Some(DeclarationRecord {
        id,
        year,
        created_at: opt_epoch_ms(pick(value, &["createdAt", "dateISO"])).unwrap_or(0),
        updated_at: opt_epoch_ms(pick(value, &["updatedAt"])),
        amount: opt_decimal(pick(value, &["amount"])),
        iban: opt_string(pick(value, &["iban", "IBAN"])),
        reason: opt_string(pick(value, &["reason", "основание"])),
        status: DeclarationStatus::parse(&string_or_empty(pick(value, &["status", "type"]))),
        xml_uri: opt_string(pick(value, &["xmlUri", "xml"])),
        pdf_uri: opt_string(pick(value, &["pdfUri", "pdf"])),
        attachments,
        meta: pick(value, &["meta"]).cloned(),
    })
}

impl Archive {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Every archived record, canonical and not-yet-migrated legacy alike,
    /// deduplicated by id and ordered newest first.
    ///
    /// Never fails: unreadable entries are skipped with a warning.
    pub async fn read_all(&self) -> Vec<DeclarationRecord> {
        let mut records = self.read_canonical().await;
        for entry in self.read_legacy_entries().await {
            records.extend(entry.records);
        }

        // Canonical records come first; a later duplicate replaces its
        // predecessor only when strictly newer, so the canonical copy wins
        // an effective-timestamp tie.
        let mut deduped: Vec<DeclarationRecord> = Vec::with_capacity(records.len());
        for rec in records {
            match deduped.iter_mut().find(|r| r.id == rec.id) {
                Some(existing) if rec.effective_timestamp() > existing.effective_timestamp() => {
                    *existing = rec;
                }
                Some(_) => {}
                None => deduped.push(rec),
            }
        }
        deduped.sort_by(|a, b| b.effective_timestamp().cmp(&a.effective_timestamp()));
        deduped
    }

    /// Records reachable through the index, falling back to a full item-key
    /// scan when the index-driven read yields nothing — the index may be
    /// missing, corrupt, or full of ids whose items are gone.
    async fn read_canonical(&self) -> Vec<DeclarationRecord> {
        let index_ids = self.read_index().await;
        if !index_ids.is_empty() {
            let records = self.fetch_records(&index_ids).await;
            if !records.is_empty() {
                return records;
            }
            warn!("archive index yielded no readable records, scanning item keys");
        }
        let scanned_ids: Vec<String> = self
            .keys_with_prefix(keys::ITEM_PREFIX)
            .await
            .into_iter()
            .map(|k| k[keys::ITEM_PREFIX.len()..].to_string())
            .collect();
        self.fetch_records(&scanned_ids).await
    }

    async fn fetch_records(&self, ids: &[String]) -> Vec<DeclarationRecord> {
        if ids.is_empty() {
            return Vec::new();
        }
        let item_keys: Vec<String> = ids.iter().map(|id| keys::item_key(id)).collect();
        let pairs = match self.store.multi_get(&item_keys).await {
            Ok(pairs) => pairs,
            Err(error) => {
                warn!(%error, "archive multi-get failed");
                return Vec::new();
            }
        };
        pairs
            .into_iter()
            .filter_map(|(key, raw)| {
                let raw = raw?;
                match serde_json::from_str::<Value>(&raw) {
                    Ok(value) => DeclarationRecord::from_value(&value),
                    Err(error) => {
                        warn!(key, %error, "skipping unreadable archive record");
                        None
                    }
                }
            })
            .collect()
    }

    /// Not-yet-migrated records still sitting under `archive:` keys.
    /// A legacy key may hold a single record or an array of records.
    async fn read_legacy_entries(&self) -> Vec<LegacyEntry> {
        let legacy_keys = self.keys_with_prefix(keys::LEGACY_PREFIX).await;
        if legacy_keys.is_empty() {
            return Vec::new();
        }
        let pairs = match self.store.multi_get(&legacy_keys).await {
            Ok(pairs) => pairs,
            Err(error) => {
                warn!(%error, "legacy archive multi-get failed");
                return Vec::new();
            }
        };
        let mut entries = Vec::new();
        for (key, raw) in pairs {
            let Some(raw) = raw else { continue };
            let value: Value = match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(error) => {
                    warn!(key, %error, "skipping unreadable legacy blob");
                    continue;
                }
            };
            let blobs: Vec<&Value> = match &value {
                Value::Array(items) => items.iter().collect(),
                other => vec![other],
            };
            let total = blobs.len();
            let records: Vec<DeclarationRecord> =
                blobs.into_iter().filter_map(map_legacy_to_record).collect();
            if records.len() < total {
                warn!(key, "dropping unmappable records in legacy blob");
            }
            let fully_mapped = total > 0 && records.len() == total;
            entries.push(LegacyEntry { key, records, fully_mapped });
        }
        entries
    }

    /// Moves every mappable `archive:` blob into the canonical layout and
    /// deletes the legacy keys whose content migrated in full. Keys holding
    /// anything unmappable are left in place, so nothing is destroyed
    /// before it has a canonical copy. Safe to run repeatedly; a run with
    /// nothing left to map reports zero migrations.
    pub async fn migrate_legacy(&self) -> Result<MigrationReport, StorageError> {
        let entries = self.read_legacy_entries().await;

        let mut index = self.read_index().await;
        let mut writes: Vec<(String, String)> = Vec::new();
        let mut removable: Vec<String> = Vec::new();
        let mut migrated = 0usize;
        for entry in &entries {
            for rec in &entry.records {
                writes.push((keys::item_key(&rec.id), serde_json::to_string(rec)?));
                if !index.contains(&rec.id) {
                    index.push(rec.id.clone());
                }
                migrated += 1;
            }
            if entry.fully_mapped {
                removable.push(entry.key.clone());
            } else {
                warn!(key = %entry.key, "keeping legacy key with unmappable content");
            }
        }
        if migrated == 0 {
            return Ok(MigrationReport::default());
        }
        writes.push((keys::INDEX_KEY.to_string(), serde_json::to_string(&index)?));

        self.store.multi_set(&writes).await?;
        if !removable.is_empty() {
            self.store.multi_remove(&removable).await?;
        }
        info!(migrated, "legacy archive migration complete");
        Ok(MigrationReport { migrated })
    }

    /// Inserts or replaces a record and makes sure the index knows its id.
    pub async fn save_record(&self, rec: &DeclarationRecord) -> Result<(), StorageError> {
        let raw = serde_json::to_string(rec)?;
        self.store.set(&keys::item_key(&rec.id), &raw).await?;

        let mut index = self.read_index().await;
        if !index.contains(&rec.id) {
            index.push(rec.id.clone());
            let raw_index = serde_json::to_string(&index)?;
            self.store.set(keys::INDEX_KEY, &raw_index).await?;
        }
        Ok(())
    }

    /// Removes a record, its legacy twin and its index entry. The rest of
    /// the index keeps its order.
    pub async fn delete_by_id(&self, id: &str) -> Result<(), StorageError> {
        self.store
            .multi_remove(&[keys::item_key(id), keys::legacy_key(id)])
            .await?;

        let index = self.read_index().await;
        if index.iter().any(|entry| entry == id) {
            let remaining: Vec<&String> = index.iter().filter(|entry| *entry != id).collect();
            let raw = serde_json::to_string(&remaining)?;
            self.store.set(keys::INDEX_KEY, &raw).await?;
        }
        Ok(())
    }

    async fn read_index(&self) -> Vec<String> {
        let raw = match self.store.get(keys::INDEX_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(error) => {
                warn!(%error, "archive index read failed");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(ids) => ids,
            Err(error) => {
                warn!(%error, "archive index is not a string array, ignoring");
                Vec::new()
            }
        }
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        match self.store.keys().await {
            Ok(all) => all.into_iter().filter(|k| k.starts_with(prefix)).collect(),
            Err(error) => {
                warn!(%error, "storage key scan failed");
                Vec::new()
            }
        }
    }
}
