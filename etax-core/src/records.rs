//! Per-year record persistence: incomes, deductions, the declaration and
//! the taxpayer profile, each under its own key.
//!
//! Error handling is deliberately asymmetric. Every `load_*`/`list_*`
//! method degrades to an empty or absent result — a corrupt record or an
//! unavailable store must never take the calling screen down. Every
//! `save_*`/`mark_*`/`delete_*` method returns a [`StorageError`] so the
//! caller can tell the user the write did not happen.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::models::{Declaration, DeclarationStatus, Deduction, ImportedIncome, Income, Person};
use crate::storage::keys;
use crate::storage::{KeyValueStore, StorageError};

pub struct RecordStore {
    store: Arc<dyn KeyValueStore>,
}

impl RecordStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Reads and parses a JSON value, degrading to `None` on any failure.
    async fn get_json(&self, key: &str) -> Option<Value> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(error) => {
                warn!(key, %error, "storage read failed");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(key, %error, "stored value is not valid JSON, ignoring");
                None
            }
        }
    }

    async fn set_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)?;
        self.store.set(key, &raw).await
    }

    // ── incomes ──────────────────────────────────────────────────────────

    pub async fn load_incomes(&self, year: i32) -> Vec<Income> {
        match self.get_json(&keys::incomes_key(year)).await {
            Some(Value::Array(items)) => items.iter().map(Income::from_value).collect(),
            _ => Vec::new(),
        }
    }

    pub async fn save_incomes(
        &self,
        year: i32,
        items: &[Income],
    ) -> Result<(), StorageError> {
        let clean: Vec<Income> = items
            .iter()
            .cloned()
            .map(|mut i| {
                i.country_code = i.country_code.map(|c| c.to_ascii_uppercase());
                i
            })
            .collect();
        self.set_json(&keys::incomes_key(year), &clean).await
    }

    // ── deductions ───────────────────────────────────────────────────────

    pub async fn load_deductions(&self, year: i32) -> Vec<Deduction> {
        match self.get_json(&keys::deductions_key(year)).await {
            Some(Value::Array(items)) => items.iter().map(Deduction::from_value).collect(),
            _ => Vec::new(),
        }
    }

    pub async fn save_deductions(
        &self,
        year: i32,
        items: &[Deduction],
    ) -> Result<(), StorageError> {
        self.set_json(&keys::deductions_key(year), items).await
    }

    // ── declarations ─────────────────────────────────────────────────────

    pub async fn load_declaration(&self, year: i32) -> Option<Declaration> {
        let value = self.get_json(&keys::declaration_key(year)).await?;
        Declaration::from_value(&value)
    }

    /// Persists a declaration, stamping `submitted_at` if the record is
    /// submitted but carries no timestamp yet.
    pub async fn save_declaration(&self, decl: &Declaration) -> Result<(), StorageError> {
        let mut clean = decl.clone();
        if clean.status == DeclarationStatus::Submitted && clean.submitted_at.is_none() {
            clean.submitted_at = Some(Utc::now());
        }
        self.set_json(&keys::declaration_key(clean.year), &clean).await
    }

    /// Transitions the year's declaration to submitted.
    ///
    /// Returns `Ok(None)` when there is no declaration for the year — the
    /// caller decides how to report that. The transition is terminal.
    pub async fn mark_declaration_submitted(
        &self,
        year: i32,
    ) -> Result<Option<Declaration>, StorageError> {
        let Some(mut decl) = self.load_declaration(year).await else {
            return Ok(None);
        };
        decl.status = DeclarationStatus::Submitted;
        decl.submitted_at = Some(Utc::now());
        self.set_json(&keys::declaration_key(year), &decl).await?;
        Ok(Some(decl))
    }

    pub async fn delete_declaration(&self, year: i32) -> Result<(), StorageError> {
        self.store.remove(&keys::declaration_key(year)).await
    }

    /// All per-year declarations, newest year first; within a year a
    /// submitted record sorts before a draft.
    pub async fn list_declarations(&self) -> Vec<Declaration> {
        let all_keys = match self.store.keys().await {
            Ok(keys) => keys,
            Err(error) => {
                warn!(%error, "storage key scan failed");
                return Vec::new();
            }
        };
        let decl_keys: Vec<String> = all_keys
            .into_iter()
            .filter(|k| k.starts_with(keys::DECLARATIONS_PREFIX))
            .collect();
        if decl_keys.is_empty() {
            return Vec::new();
        }
        let pairs = match self.store.multi_get(&decl_keys).await {
            Ok(pairs) => pairs,
            Err(error) => {
                warn!(%error, "storage multi-get failed");
                return Vec::new();
            }
        };
        let mut list: Vec<Declaration> = pairs
            .into_iter()
            .filter_map(|(key, raw)| {
                let raw = raw?;
                match serde_json::from_str::<Value>(&raw) {
                    Ok(value) => Declaration::from_value(&value),
                    Err(error) => {
                        warn!(key, %error, "skipping unparseable declaration");
                        None
                    }
                }
            })
            .collect();
        list.sort_by(|a, b| {
            b.year
                .cmp(&a.year)
                .then_with(|| status_rank(a.status).cmp(&status_rank(b.status)))
        });
        list
    }

    // ── person ───────────────────────────────────────────────────────────

    pub async fn load_person(&self) -> Person {
        match self.get_json(keys::PERSON_KEY).await {
            Some(value) => Person::from_value(&value),
            None => Person::default(),
        }
    }

    pub async fn save_person(&self, person: &Person) -> Result<(), StorageError> {
        self.set_json(keys::PERSON_KEY, &person.clone().sanitized()).await
    }

    /// Loads, patches and saves the profile in one step.
    pub async fn update_person(
        &self,
        patch: impl FnOnce(&mut Person),
    ) -> Result<Person, StorageError> {
        let mut person = self.load_person().await;
        patch(&mut person);
        let person = person.sanitized();
        self.set_json(keys::PERSON_KEY, &person).await?;
        Ok(person)
    }

    // ── imported incomes (CSV cache) ─────────────────────────────────────

    pub async fn load_imported_incomes(&self, year: i32) -> Vec<ImportedIncome> {
        match self.get_json(&keys::imported_incomes_key(year)).await {
            Some(Value::Array(items)) => items.iter().map(ImportedIncome::from_value).collect(),
            _ => Vec::new(),
        }
    }

    pub async fn save_imported_incomes(
        &self,
        year: i32,
        items: &[ImportedIncome],
    ) -> Result<(), StorageError> {
        self.set_json(&keys::imported_incomes_key(year), items).await
    }
}

fn status_rank(status: DeclarationStatus) -> u8 {
    match status {
        DeclarationStatus::Submitted => 0,
        DeclarationStatus::Draft => 1,
    }
}
