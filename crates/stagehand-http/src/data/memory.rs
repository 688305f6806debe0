use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::store::{DataError, DataResult, DataStore};

type Collections = HashMap<String, BTreeMap<String, Value>>;

/// Owner of the named in-memory databases of one host
///
/// Stores with the same name share data only within the same root. Every
/// host registers its own root, so two hosts never see each other's data.
#[derive(Debug, Default)]
pub struct InMemoryDatabaseRoot {
    databases: RwLock<HashMap<String, Arc<InMemoryDataStore>>>,
}

impl InMemoryDatabaseRoot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the store called `name`, creating it on first use
    pub fn database(&self, name: &str) -> DataResult<Arc<InMemoryDataStore>> {
        {
            let databases = self
                .databases
                .read()
                .map_err(|_| DataError::Lock(name.to_string()))?;
            if let Some(store) = databases.get(name) {
                return Ok(store.clone());
            }
        }

        let mut databases = self
            .databases
            .write()
            .map_err(|_| DataError::Lock(name.to_string()))?;
        let store = databases.entry(name.to_string()).or_insert_with(|| {
            debug!(database = name, "creating in-memory database");
            Arc::new(InMemoryDataStore::new(name))
        });
        Ok(store.clone())
    }

    /// Names of the databases created so far
    pub fn database_names(&self) -> Vec<String> {
        self.databases
            .read()
            .map(|databases| databases.keys().cloned().collect())
            .unwrap_or_default()
    }
}

/// Process-local, non-persistent [`DataStore`]
#[derive(Debug)]
pub struct InMemoryDataStore {
    name: String,
    collections: RwLock<Collections>,
}

impl InMemoryDataStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collections: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> DataResult<std::sync::RwLockReadGuard<'_, Collections>> {
        self.collections
            .read()
            .map_err(|_| DataError::Lock(self.name.clone()))
    }

    fn write(&self) -> DataResult<std::sync::RwLockWriteGuard<'_, Collections>> {
        self.collections
            .write()
            .map_err(|_| DataError::Lock(self.name.clone()))
    }
}

#[async_trait]
impl DataStore for InMemoryDataStore {
    fn provider_name(&self) -> &'static str {
        "in-memory"
    }

    async fn insert(&self, collection: &str, id: &str, document: Value) -> DataResult<()> {
        let mut collections = self.write()?;
        let documents = collections.entry(collection.to_string()).or_default();
        if documents.contains_key(id) {
            return Err(DataError::Conflict {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        documents.insert(id.to_string(), document);
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> DataResult<Option<Value>> {
        let collections = self.read()?;
        Ok(collections
            .get(collection)
            .and_then(|documents| documents.get(id))
            .cloned())
    }

    async fn list(&self, collection: &str) -> DataResult<Vec<Value>> {
        let collections = self.read()?;
        Ok(collections
            .get(collection)
            .map(|documents| documents.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn remove(&self, collection: &str, id: &str) -> DataResult<bool> {
        let mut collections = self.write()?;
        Ok(collections
            .get_mut(collection)
            .map(|documents| documents.remove(id).is_some())
            .unwrap_or(false))
    }

    async fn ping(&self) -> DataResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_get_list_remove() {
        let store = InMemoryDataStore::new("unit");
        store.insert("items", "b", json!({ "name": "bolt" })).await.unwrap();
        store.insert("items", "a", json!({ "name": "anchor" })).await.unwrap();

        assert_eq!(store.get("items", "a").await.unwrap(), Some(json!({ "name": "anchor" })));
        assert_eq!(store.get("items", "z").await.unwrap(), None);

        let names: Vec<_> = store
            .list("items")
            .await
            .unwrap()
            .into_iter()
            .map(|doc| doc["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["anchor", "bolt"]);

        assert!(store.remove("items", "a").await.unwrap());
        assert!(!store.remove("items", "a").await.unwrap());
        assert!(store.list("orders").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_insert_conflicts() {
        let store = InMemoryDataStore::new("unit");
        store.insert("items", "a", json!({})).await.unwrap();

        let error = store.insert("items", "a", json!({})).await.unwrap_err();
        assert!(matches!(error, DataError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_root_shares_named_databases() {
        let root = InMemoryDatabaseRoot::new();
        let first = root.database("InMemoryDbForTesting").unwrap();
        let second = root.database("InMemoryDbForTesting").unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        first.insert("items", "a", json!({})).await.unwrap();
        assert!(second.get("items", "a").await.unwrap().is_some());

        let other_root = InMemoryDatabaseRoot::new();
        let isolated = other_root.database("InMemoryDbForTesting").unwrap();
        assert!(isolated.get("items", "a").await.unwrap().is_none());
        assert_eq!(root.database_names(), vec!["InMemoryDbForTesting".to_string()]);
    }
}
