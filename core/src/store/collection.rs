use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;
use tokio::sync::RwLock;
use tracing::debug;

use super::document::{apply_update, matches, sort_documents};
use super::error::StoreError;
use super::{Document, IndexModel, SortKey, ID_FIELD};
use crate::object_id::ObjectId;

#[derive(Debug, Default)]
struct CollectionState {
    indexes: Vec<IndexModel>,
    documents: BTreeMap<ObjectId, Document>,
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    indexes: Vec<IndexModel>,
    documents: Vec<Document>,
}

/// A named set of documents guarded by a single lock. Every public
/// operation runs start to finish under that lock.
#[derive(Debug)]
pub struct Collection {
    name: String,
    snapshot_path: Option<PathBuf>,
    state: RwLock<CollectionState>,
}

impl Collection {
    pub(super) fn new(name: &str, snapshot_path: Option<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            snapshot_path,
            state: RwLock::new(CollectionState::default()),
        }
    }

    pub(super) fn load(name: &str, path: PathBuf) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(&path)?;
        let snapshot: Snapshot = serde_json::from_str(&raw)?;
        let mut documents = BTreeMap::new();
        for document in snapshot.documents {
            documents.insert(document_id(&document)?, document);
        }
        Ok(Self {
            name: name.to_string(),
            snapshot_path: Some(path),
            state: RwLock::new(CollectionState {
                indexes: snapshot.indexes,
                documents,
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.documents.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn indexes(&self) -> Vec<IndexModel> {
        self.state.read().await.indexes.clone()
    }

    /// Registers `index`. Returns `false` if an identical index already
    /// exists; fails if existing documents violate a new unique index.
    pub async fn create_index(&self, index: IndexModel) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        if let Some(existing) = state.indexes.iter().find(|i| i.name == index.name) {
            if *existing == index {
                return Ok(false);
            }
            return Err(StoreError::IndexConflict(index.name));
        }

        if index.unique {
            let mut seen = Vec::with_capacity(state.documents.len());
            for document in state.documents.values() {
                let key = index.key_of(document);
                if seen.contains(&key) {
                    return Err(StoreError::DuplicateKey { index: index.name });
                }
                seen.push(key);
            }
        }

        state.indexes.push(index);
        if let Err(err) = self.persist(&state).await {
            state.indexes.pop();
            return Err(err);
        }
        Ok(true)
    }

    /// Inserts `document`, assigning a fresh `_id` unless one is present.
    pub async fn insert_one(&self, mut document: Document) -> Result<ObjectId, StoreError> {
        let mut state = self.state.write().await;
        let id = match document.get(ID_FIELD) {
            Some(_) => document_id(&document)?,
            None => {
                let id = ObjectId::new();
                document.insert(ID_FIELD.to_string(), Value::String(id.to_hex()));
                id
            }
        };

        if state.documents.contains_key(&id) {
            return Err(StoreError::DuplicateKey {
                index: format!("{ID_FIELD}_"),
            });
        }
        check_unique(&state, &document, None)?;

        state.documents.insert(id, document);
        if let Err(err) = self.persist(&state).await {
            state.documents.remove(&id);
            return Err(err);
        }
        debug!(collection = %self.name, %id, "document inserted");
        Ok(id)
    }

    pub async fn find_one(&self, filter: &Document) -> Result<Option<Document>, StoreError> {
        let state = self.state.read().await;
        Ok(first_match(&state, filter)?.map(|(_, document)| document.clone()))
    }

    pub async fn find(&self, filter: &Document, sort: &[SortKey]) -> Result<Vec<Document>, StoreError> {
        let state = self.state.read().await;
        let mut found = Vec::new();
        for document in state.documents.values() {
            if matches(document, filter)? {
                found.push(document.clone());
            }
        }
        sort_documents(&mut found, sort);
        Ok(found)
    }

    /// Applies `update` to the first document matching `filter` and returns
    /// the document as it was before the update.
    pub async fn find_one_and_update(
        &self,
        filter: &Document,
        update: &Document,
    ) -> Result<Option<Document>, StoreError> {
        let mut state = self.state.write().await;
        let Some((id, original)) = first_match(&state, filter)? else {
            return Ok(None);
        };
        let original = original.clone();

        let mut updated = original.clone();
        apply_update(&mut updated, update, ID_FIELD)?;
        check_unique(&state, &updated, Some(id))?;

        state.documents.insert(id, updated);
        if let Err(err) = self.persist(&state).await {
            state.documents.insert(id, original);
            return Err(err);
        }
        debug!(collection = %self.name, %id, "document updated");
        Ok(Some(original))
    }

    pub async fn find_one_and_delete(&self, filter: &Document) -> Result<Option<Document>, StoreError> {
        let mut state = self.state.write().await;
        let Some((id, _)) = first_match(&state, filter)? else {
            return Ok(None);
        };
        let Some(removed) = state.documents.remove(&id) else {
            return Ok(None);
        };
        if let Err(err) = self.persist(&state).await {
            state.documents.insert(id, removed);
            return Err(err);
        }
        debug!(collection = %self.name, %id, "document deleted");
        Ok(Some(removed))
    }

    pub(super) async fn flush(&self) -> Result<(), StoreError> {
        let state = self.state.read().await;
        self.persist(&state).await
    }

    /// Writes `state` to the snapshot file. Callers hold the collection lock
    /// for the whole write and roll their change back if it fails, so memory
    /// never runs ahead of disk.
    async fn persist(&self, state: &CollectionState) -> Result<(), StoreError> {
        let Some(path) = self.snapshot_path.clone() else {
            return Ok(());
        };
        let snapshot = Snapshot {
            indexes: state.indexes.clone(),
            documents: state.documents.values().cloned().collect(),
        };
        let bytes = serde_json::to_vec_pretty(&snapshot)?;
        tokio::task::spawn_blocking(move || write_atomically(&path, &bytes))
            .await
            .map_err(|err| StoreError::Io(std::io::Error::other(err)))?
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|err| StoreError::Io(err.error))?;
    Ok(())
}

fn document_id(document: &Document) -> Result<ObjectId, StoreError> {
    document
        .get(ID_FIELD)
        .and_then(Value::as_str)
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| StoreError::MalformedDocument(format!("{ID_FIELD} must be a 24-char hex string")))
}

fn first_match<'a>(
    state: &'a CollectionState,
    filter: &Document,
) -> Result<Option<(ObjectId, &'a Document)>, StoreError> {
    for (id, document) in &state.documents {
        if matches(document, filter)? {
            return Ok(Some((*id, document)));
        }
    }
    Ok(None)
}

fn check_unique(
    state: &CollectionState,
    candidate: &Document,
    skip: Option<ObjectId>,
) -> Result<(), StoreError> {
    for index in state.indexes.iter().filter(|index| index.unique) {
        let key = index.key_of(candidate);
        let clash = state
            .documents
            .iter()
            .filter(|(id, _)| Some(**id) != skip)
            .any(|(_, other)| index.key_of(other) == key);
        if clash {
            return Err(StoreError::DuplicateKey {
                index: index.name.clone(),
            });
        }
    }
    Ok(())
}
