//! Embedded document store.
//!
//! # Overview
//! Documents are JSON objects keyed by a generated `_id`. Collections accept
//! MongoDB-shaped filter documents (`{field: value}` or
//! `{field: {"$gt": value}}`), `{"$set": {...}}` update documents and
//! compound unique indexes.
//!
//! # Design
//! A `Database` is opened from a location: `memory://` keeps everything in
//! process, `file://<dir>` additionally rewrites one JSON snapshot per
//! collection after every mutation and reloads them on open.

mod collection;
mod document;
mod error;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::info;

pub use collection::Collection;
pub use error::StoreError;

pub type Document = Map<String, Value>;

pub const ID_FIELD: &str = "_id";

const SNAPSHOT_EXTENSION: &str = "json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexModel {
    pub name: String,
    pub keys: Vec<String>,
    pub unique: bool,
}

impl IndexModel {
    /// A unique ascending index named after its keys, e.g. `title_1_active_at_1`.
    pub fn unique(keys: &[&str]) -> Self {
        let name = keys.iter().map(|key| format!("{key}_1")).collect::<Vec<_>>().join("_");
        Self {
            name,
            keys: keys.iter().map(|key| key.to_string()).collect(),
            unique: true,
        }
    }

    fn key_of(&self, document: &Document) -> Vec<Value> {
        self.keys
            .iter()
            .map(|key| document.get(key).cloned().unwrap_or(Value::Null))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Memory,
    Directory(PathBuf),
}

impl FromStr for StoreLocation {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "memory://" || s == "memory:" {
            return Ok(StoreLocation::Memory);
        }
        match s.strip_prefix("file://") {
            Some(path) if !path.is_empty() => Ok(StoreLocation::Directory(PathBuf::from(path))),
            _ => Err(StoreError::InvalidUri(s.to_string())),
        }
    }
}

#[derive(Debug)]
pub struct Database {
    name: String,
    dir: Option<PathBuf>,
    collections: RwLock<BTreeMap<String, Arc<Collection>>>,
}

impl Database {
    pub fn memory(name: &str) -> Self {
        Self {
            name: name.to_string(),
            dir: None,
            collections: RwLock::new(BTreeMap::new()),
        }
    }

    /// Opens the database `name` at `location`, loading any collection
    /// snapshots already on disk.
    pub fn open(location: &StoreLocation, name: &str) -> Result<Self, StoreError> {
        let dir = match location {
            StoreLocation::Memory => return Ok(Self::memory(name)),
            StoreLocation::Directory(root) => root.join(name),
        };
        std::fs::create_dir_all(&dir)?;

        let mut collections = BTreeMap::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(SNAPSHOT_EXTENSION) {
                continue;
            }
            let Some(collection_name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let collection_name = collection_name.to_string();
            let collection = Collection::load(&collection_name, path)?;
            collections.insert(collection_name, Arc::new(collection));
        }

        info!(
            database = name,
            dir = %dir.display(),
            collections = collections.len(),
            "database opened"
        );
        Ok(Self {
            name: name.to_string(),
            dir: Some(dir),
            collections: RwLock::new(collections),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn list_collection_names(&self) -> Vec<String> {
        self.collections.read().await.keys().cloned().collect()
    }

    pub async fn collection(&self, name: &str) -> Option<Arc<Collection>> {
        self.collections.read().await.get(name).cloned()
    }

    pub async fn create_collection(&self, name: &str) -> Result<Arc<Collection>, StoreError> {
        let mut collections = self.collections.write().await;
        if collections.contains_key(name) {
            return Err(StoreError::CollectionExists(name.to_string()));
        }
        let snapshot_path = self
            .dir
            .as_ref()
            .map(|dir| dir.join(format!("{name}.{SNAPSHOT_EXTENSION}")));
        let collection = Arc::new(Collection::new(name, snapshot_path));
        collection.flush().await?;
        collections.insert(name.to_string(), collection.clone());
        Ok(collection)
    }
}
