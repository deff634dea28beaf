use chrono::Utc;
use kredit_docs::workflows::credit::{
    ApplicationRecord, RecordId, RecordStore, RecordSummary, RecordTable, RepositoryError,
    StoredRecord,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Record table persisted as a single JSON document, rewritten on every change.
pub(crate) struct FileRecordStore {
    path: PathBuf,
    table: Mutex<RecordTable>,
}

impl FileRecordStore {
    pub(crate) fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let table = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => RecordTable::default(),
            Err(err) => return Err(err),
        };

        Ok(Self {
            path,
            table: Mutex::new(table),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, RecordTable>, RepositoryError> {
        self.table
            .lock()
            .map_err(|_| RepositoryError::Unavailable("record table lock poisoned".to_string()))
    }

    /// Applies a change to a copy, writes it out, and only then swaps it in.
    fn mutate<T>(
        &self,
        change: impl FnOnce(&mut RecordTable) -> Result<T, RepositoryError>,
    ) -> Result<T, RepositoryError> {
        let mut guard = self.lock()?;
        let mut next = guard.clone();
        let outcome = change(&mut next)?;
        self.persist(&next)?;
        *guard = next;
        Ok(outcome)
    }

    fn persist(&self, table: &RecordTable) -> Result<(), RepositoryError> {
        let unavailable =
            |err: String| RepositoryError::Unavailable(format!("{}: {err}", self.path.display()));

        let bytes = serde_json::to_vec_pretty(table).map_err(|err| unavailable(err.to_string()))?;
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| unavailable(err.to_string()))?;
        }
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, bytes).map_err(|err| unavailable(err.to_string()))?;
        fs::rename(&staging, &self.path).map_err(|err| unavailable(err.to_string()))?;

        debug!(path = %self.path.display(), "record table written");
        Ok(())
    }
}

impl RecordStore for FileRecordStore {
    fn get(&self, id: RecordId) -> Result<StoredRecord, RepositoryError> {
        self.lock()?.get(id)
    }

    fn put(
        &self,
        id: Option<RecordId>,
        fields: ApplicationRecord,
    ) -> Result<RecordId, RepositoryError> {
        self.mutate(|table| table.put_at(id, fields, Utc::now()))
    }

    fn list(&self, filter: Option<&str>) -> Result<Vec<RecordSummary>, RepositoryError> {
        Ok(self.lock()?.list(filter))
    }

    fn delete(&self, id: RecordId) -> Result<(), RepositoryError> {
        self.mutate(|table| table.delete(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> ApplicationRecord {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn records_survive_reopening() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("data").join("debitur.json");

        let id = {
            let store = FileRecordStore::open(&path).expect("store opens");
            store
                .put(
                    None,
                    fields(&[("nama_pemohon", "Siti Aminah"), ("kategori", "purna_reguler")]),
                )
                .expect("insert succeeds")
        };

        let reopened = FileRecordStore::open(&path).expect("store reopens");
        let stored = reopened.get(id).expect("record persisted");
        assert_eq!(stored.nama_pemohon, "Siti Aminah");
        assert_eq!(stored.fields["kategori"], "purna_reguler");

        let next = reopened.put(None, ApplicationRecord::new()).expect("insert");
        assert_ne!(next, id, "ids keep counting after reopen");
    }

    #[test]
    fn failed_delete_leaves_file_untouched() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("debitur.json");
        let store = FileRecordStore::open(&path).expect("store opens");
        store.put(None, ApplicationRecord::new()).expect("insert");
        let before = fs::read(&path).expect("file written");

        assert!(matches!(
            store.delete(RecordId(99)),
            Err(RepositoryError::NotFound(RecordId(99)))
        ));
        assert_eq!(fs::read(&path).expect("file present"), before);
        assert_eq!(store.list(None).expect("list").len(), 1);
    }

    #[test]
    fn corrupt_file_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("debitur.json");
        fs::write(&path, b"not json").expect("write");

        let err = FileRecordStore::open(&path).err().expect("corrupt data rejected");
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
