use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{currency_keys, field, keys, ApplicationRecord};

/// Identifier assigned by the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted applicant: raw form fields plus the columns used for searching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: RecordId,
    pub nama_pemohon: String,
    pub no_ktp: String,
    pub tanggal_input: DateTime<Utc>,
    pub fields: ApplicationRecord,
}

impl StoredRecord {
    pub fn summary(&self) -> RecordSummary {
        RecordSummary {
            id: self.id,
            nama_pemohon: self.nama_pemohon.clone(),
            no_ktp: self.no_ktp.clone(),
            kategori: field(&self.fields, keys::CATEGORY).map(str::to_string),
            tanggal_input: self.tanggal_input,
        }
    }

    fn matches(&self, needle: &str) -> bool {
        self.nama_pemohon.to_lowercase().contains(needle)
            || self.no_ktp.to_lowercase().contains(needle)
    }
}

/// Row shown in the applicant history listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSummary {
    pub id: RecordId,
    pub nama_pemohon: String,
    pub no_ktp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kategori: Option<String>,
    pub tanggal_input: DateTime<Utc>,
}

/// Storage abstraction for applicant records.
pub trait RecordStore: Send + Sync {
    fn get(&self, id: RecordId) -> Result<StoredRecord, RepositoryError>;
    /// Creates a record when `id` is `None`, otherwise replaces the fields of an existing one.
    fn put(
        &self,
        id: Option<RecordId>,
        fields: ApplicationRecord,
    ) -> Result<RecordId, RepositoryError>;
    /// Newest first, optionally filtered by a case-insensitive name or KTP fragment.
    fn list(&self, filter: Option<&str>) -> Result<Vec<RecordSummary>, RepositoryError>;
    fn delete(&self, id: RecordId) -> Result<(), RepositoryError>;
}

/// Error enumeration for record store failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record {0} not found")]
    NotFound(RecordId),
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

/// Plain table of records shared by the in-memory and file-backed stores.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordTable {
    next_id: u64,
    records: BTreeMap<RecordId, StoredRecord>,
}

impl RecordTable {
    pub fn get(&self, id: RecordId) -> Result<StoredRecord, RepositoryError> {
        self.records
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound(id))
    }

    pub fn put_at(
        &mut self,
        id: Option<RecordId>,
        fields: ApplicationRecord,
        now: DateTime<Utc>,
    ) -> Result<RecordId, RepositoryError> {
        let nama_pemohon = field(&fields, keys::APPLICANT_NAME)
            .unwrap_or("Tanpa Nama")
            .to_string();
        let no_ktp = field(&fields, keys::APPLICANT_ID_NUMBER)
            .unwrap_or("000")
            .to_string();

        match id {
            Some(id) => {
                let existing = self
                    .records
                    .get_mut(&id)
                    .ok_or(RepositoryError::NotFound(id))?;
                existing.nama_pemohon = nama_pemohon;
                existing.no_ktp = no_ktp;
                existing.fields = fields;
                Ok(id)
            }
            None => {
                self.next_id += 1;
                let id = RecordId(self.next_id);
                self.records.insert(
                    id,
                    StoredRecord {
                        id,
                        nama_pemohon,
                        no_ktp,
                        tanggal_input: now,
                        fields,
                    },
                );
                Ok(id)
            }
        }
    }

    pub fn list(&self, filter: Option<&str>) -> Vec<RecordSummary> {
        let needle = filter
            .map(|value| value.trim().to_lowercase())
            .filter(|value| !value.is_empty());

        let mut rows: Vec<RecordSummary> = self
            .records
            .values()
            .filter(|record| needle.as_deref().map_or(true, |needle| record.matches(needle)))
            .map(StoredRecord::summary)
            .collect();
        rows.sort_by(|a, b| {
            b.tanggal_input
                .cmp(&a.tanggal_input)
                .then_with(|| b.id.cmp(&a.id))
        });
        rows
    }

    pub fn delete(&mut self, id: RecordId) -> Result<(), RepositoryError> {
        self.records
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound(id))
    }
}

/// Mutex-guarded table; used by tests and the `context` command.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    table: Mutex<RecordTable>,
}

impl InMemoryRecordStore {
    fn with_table<T>(
        &self,
        action: impl FnOnce(&mut RecordTable) -> Result<T, RepositoryError>,
    ) -> Result<T, RepositoryError> {
        let mut guard = self
            .table
            .lock()
            .map_err(|_| RepositoryError::Unavailable("record table lock poisoned".to_string()))?;
        action(&mut *guard)
    }
}

impl RecordStore for InMemoryRecordStore {
    fn get(&self, id: RecordId) -> Result<StoredRecord, RepositoryError> {
        self.with_table(|table| table.get(id))
    }

    fn put(
        &self,
        id: Option<RecordId>,
        fields: ApplicationRecord,
    ) -> Result<RecordId, RepositoryError> {
        self.with_table(|table| table.put_at(id, fields, Utc::now()))
    }

    fn list(&self, filter: Option<&str>) -> Result<Vec<RecordSummary>, RepositoryError> {
        self.with_table(|table| Ok(table.list(filter)))
    }

    fn delete(&self, id: RecordId) -> Result<(), RepositoryError> {
        self.with_table(|table| table.delete(id))
    }
}

/// Strips `.` thousands separators from Rupiah fields before they are stored.
pub fn normalize_submission(fields: &mut ApplicationRecord) {
    for key in currency_keys() {
        if let Some(value) = fields.get_mut(&key) {
            value.retain(|ch| ch != '.');
        }
    }
}
