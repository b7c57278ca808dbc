//! Persistence of answer documents.
//!
//! The engine only ever talks to a [`DocumentStore`]. Two implementations ship with the crate:
//! [`FileDocumentStore`] keeps one pretty-printed JSON file per document under a sharded
//! directory tree, and [`MemoryDocumentStore`] keeps documents in a map for tests and embedding.
//!
//! Saves are whole-document and last write wins.

use crate::config::CoreConfig;
use crate::constants::{DOCUMENT_FILENAME, DOCUMENT_TEMP_SUFFIX};
use crate::document::AnswerDocument;
use crate::page::FormType;
use crate::{FormError, FormResult};
use chrono::Utc;
use forms_uuid::DocumentId;
use std::collections::HashMap;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Load/save contract between the engine and wherever documents live.
pub trait DocumentStore: Send + Sync {
    /// Allocates an identifier and persists a new, empty document for `form`.
    fn create(&self, form: FormType) -> FormResult<AnswerDocument>;

    /// # Errors
    ///
    /// Returns [`FormError::DocumentNotFound`] if no document has that identifier.
    fn load(&self, id: &DocumentId) -> FormResult<AnswerDocument>;

    /// Persists the whole document, replacing any earlier version.
    fn save(&self, document: &AnswerDocument) -> FormResult<()>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for Arc<S> {
    fn create(&self, form: FormType) -> FormResult<AnswerDocument> {
        (**self).create(form)
    }

    fn load(&self, id: &DocumentId) -> FormResult<AnswerDocument> {
        (**self).load(id)
    }

    fn save(&self, document: &AnswerDocument) -> FormResult<()> {
        (**self).save(document)
    }
}

/// Stores each document at `<data_dir>/documents/<s1>/<s2>/<id>/document.json`.
#[derive(Clone, Debug)]
pub struct FileDocumentStore {
    cfg: Arc<CoreConfig>,
}

impl FileDocumentStore {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    fn document_dir(&self, id: &DocumentId) -> PathBuf {
        id.sharded_dir(&self.cfg.documents_dir())
    }

    fn document_path(&self, id: &DocumentId) -> PathBuf {
        self.document_dir(id).join(DOCUMENT_FILENAME)
    }

    /// Creates a fresh sharded directory, retrying on the off chance an identifier is taken.
    fn create_unique_dir(&self) -> FormResult<(DocumentId, PathBuf)> {
        let base_dir = self.cfg.documents_dir();

        for _attempt in 0..5 {
            let id = DocumentId::new();
            let candidate = id.sharded_dir(&base_dir);

            if candidate.exists() {
                continue;
            }

            if let Some(parent) = candidate.parent() {
                fs::create_dir_all(parent).map_err(FormError::DocumentDirCreation)?;
            }

            match fs::create_dir(&candidate) {
                Ok(()) => return Ok((id, candidate)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(FormError::DocumentDirCreation(e)),
            }
        }

        Err(FormError::DocumentDirCreation(io::Error::new(
            ErrorKind::AlreadyExists,
            "failed to allocate a unique document directory after 5 attempts",
        )))
    }

    /// Writes to a scratch file first so a failed write leaves the previous version intact.
    fn write_atomically(path: &Path, contents: &str) -> FormResult<()> {
        let temp = path.with_extension(DOCUMENT_TEMP_SUFFIX);
        fs::write(&temp, contents).map_err(FormError::FileWrite)?;
        fs::rename(&temp, path).map_err(|e| {
            let _ = fs::remove_file(&temp);
            FormError::FileWrite(e)
        })
    }
}

impl DocumentStore for FileDocumentStore {
    fn create(&self, form: FormType) -> FormResult<AnswerDocument> {
        let (id, dir) = self.create_unique_dir()?;
        let document = AnswerDocument::new(id, form, Utc::now());
        self.save(&document)?;

        tracing::info!(document = %id, %form, dir = %dir.display(), "answer document created");
        Ok(document)
    }

    fn load(&self, id: &DocumentId) -> FormResult<AnswerDocument> {
        let path = self.document_path(id);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(FormError::DocumentNotFound(*id))
            }
            Err(e) => return Err(FormError::FileRead(e)),
        };

        let document: AnswerDocument =
            serde_json::from_str(&contents).map_err(FormError::Deserialization)?;
        if document.id() != *id {
            return Err(FormError::InvalidInput(format!(
                "document at {} records id {}, expected {id}",
                path.display(),
                document.id()
            )));
        }
        Ok(document)
    }

    fn save(&self, document: &AnswerDocument) -> FormResult<()> {
        let dir = self.document_dir(&document.id());
        fs::create_dir_all(&dir).map_err(FormError::DocumentDirCreation)?;

        let json = serde_json::to_string_pretty(document).map_err(FormError::Serialization)?;
        Self::write_atomically(&dir.join(DOCUMENT_FILENAME), &json)?;

        tracing::info!(document = %document.id(), "answer document saved");
        Ok(())
    }
}

/// In-memory store. Documents are cloned in and out, so callers never share mutable state.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<DocumentId, AnswerDocument>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> FormResult<usize> {
        Ok(self
            .documents
            .read()
            .map_err(|_| FormError::StoreLockPoisoned)?
            .len())
    }

    pub fn is_empty(&self) -> FormResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn create(&self, form: FormType) -> FormResult<AnswerDocument> {
        let document = AnswerDocument::new(DocumentId::new(), form, Utc::now());
        self.save(&document)?;
        tracing::info!(document = %document.id(), %form, "answer document created");
        Ok(document)
    }

    fn load(&self, id: &DocumentId) -> FormResult<AnswerDocument> {
        self.documents
            .read()
            .map_err(|_| FormError::StoreLockPoisoned)?
            .get(id)
            .cloned()
            .ok_or(FormError::DocumentNotFound(*id))
    }

    fn save(&self, document: &AnswerDocument) -> FormResult<()> {
        self.documents
            .write()
            .map_err(|_| FormError::StoreLockPoisoned)?
            .insert(document.id(), document.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn file_store(temp_dir: &TempDir) -> FileDocumentStore {
        let cfg = CoreConfig::new(temp_dir.path().to_path_buf(), None).expect("config");
        FileDocumentStore::new(Arc::new(cfg))
    }

    #[test]
    fn create_writes_document_to_sharded_path() {
        let temp_dir = TempDir::new().expect("temp dir");
        let store = file_store(&temp_dir);

        let document = store.create(FormType::Application).expect("create");
        let id = document.id().to_string();

        let expected = temp_dir
            .path()
            .join("documents")
            .join(&id[0..2])
            .join(&id[2..4])
            .join(&id)
            .join(DOCUMENT_FILENAME);
        assert!(expected.is_file(), "missing {}", expected.display());
    }

    #[test]
    fn save_then_load_returns_the_same_document() {
        let temp_dir = TempDir::new().expect("temp dir");
        let store = file_store(&temp_dir);

        let mut document = store.create(FormType::Assessment).expect("create");
        document.merge("review-application", "review", json!({"reviewed": "yes"}), Utc::now());
        store.save(&document).expect("save");

        let loaded = store.load(&document.id()).expect("load");
        assert_eq!(loaded, document);

        let leftovers: Vec<_> = fs::read_dir(store.document_dir(&document.id()))
            .expect("read dir")
            .flatten()
            .filter(|e| e.path().extension().is_some_and(|x| x == DOCUMENT_TEMP_SUFFIX))
            .collect();
        assert!(leftovers.is_empty(), "temp file left behind");
    }

    #[test]
    fn load_of_unknown_document_is_not_found() {
        let temp_dir = TempDir::new().expect("temp dir");
        let store = file_store(&temp_dir);

        let id = DocumentId::new();
        let err = store.load(&id).expect_err("nothing stored");
        assert!(matches!(err, FormError::DocumentNotFound(missing) if missing == id));
    }

    #[test]
    fn corrupt_document_is_a_deserialization_error() {
        let temp_dir = TempDir::new().expect("temp dir");
        let store = file_store(&temp_dir);

        let document = store.create(FormType::Application).expect("create");
        fs::write(store.document_path(&document.id()), "{ not json").expect("corrupt");

        let err = store.load(&document.id()).expect_err("corrupt");
        assert!(matches!(err, FormError::Deserialization(_)));
    }

    #[test]
    fn memory_store_round_trips_and_reports_missing() {
        let store = MemoryDocumentStore::new();
        assert!(store.is_empty().expect("len"));

        let mut document = store.create(FormType::Application).expect("create");
        document.merge("basic-information", "risk-level", json!({"riskLevel": "low"}), Utc::now());
        store.save(&document).expect("save");

        assert_eq!(store.load(&document.id()).expect("load"), document);
        assert_eq!(store.len().expect("len"), 1);

        let err = store.load(&DocumentId::new()).expect_err("missing");
        assert!(matches!(err, FormError::DocumentNotFound(_)));
    }
}
