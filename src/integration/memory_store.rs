use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{Collection, DataStore, record_id};
use crate::helper_model::RentalError;

/// In-process stand-in for the REST store, used when no store URL is
/// configured.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<Collection, Vec<Value>>>,
}

// json-server compares query values against the field's text form
fn field_matches(record: &Value, field: &str, wanted: &str) -> bool {
    match record.get(field) {
        Some(Value::String(s)) => s == wanted,
        Some(Value::Null) | None => false,
        Some(other) => other.to_string() == wanted,
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a json-server style `db.json` (`{"cars": [...], "users": [...], "bookings": [...]}`).
    pub async fn from_seed_file(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read seed file {}", path.display()))?;
        let doc: Value = serde_json::from_str(&raw)
            .with_context(|| format!("Seed file {} is not valid JSON", path.display()))?;
        let mut records = HashMap::new();
        for collection in [Collection::Cars, Collection::Users, Collection::Bookings] {
            let list = match doc.get(collection.path()) {
                Some(Value::Array(list)) => list.clone(),
                Some(_) => anyhow::bail!("seed field '{}' must be an array", collection.path()),
                None => Vec::new(),
            };
            log::info!("seeded {} {} record(s)", list.len(), collection.path());
            records.insert(collection, list);
        }
        Ok(MemoryStore {
            records: RwLock::new(records),
        })
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn list(
        &self,
        collection: Collection,
        filters: &[(&str, String)],
    ) -> Result<Vec<Value>, RentalError> {
        let records = self.records.read().await;
        Ok(records
            .get(&collection)
            .map(|list| {
                list.iter()
                    .filter(|record| {
                        filters
                            .iter()
                            .all(|(field, wanted)| field_matches(record, field, wanted))
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, RentalError> {
        let records = self.records.read().await;
        Ok(records.get(&collection).and_then(|list| {
            list.iter()
                .find(|record| record_id(record).as_deref() == Some(id))
                .cloned()
        }))
    }

    async fn create(&self, collection: Collection, record: Value) -> Result<Value, RentalError> {
        if !record.is_object() {
            return Err(RentalError::Validation(String::from("Record must be a JSON object")));
        }
        let Some(id) = record_id(&record) else {
            return Err(RentalError::Validation(String::from("Record is missing an id")));
        };
        let mut records = self.records.write().await;
        let list = records.entry(collection).or_default();
        if list.iter().any(|existing| record_id(existing).as_deref() == Some(id.as_str())) {
            return Err(RentalError::Conflict(format!(
                "{} {} already exists",
                collection.record_name(),
                id
            )));
        }
        list.push(record.clone());
        Ok(record)
    }

    async fn patch(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<Value, RentalError> {
        let Value::Object(fields) = patch else {
            return Err(RentalError::Validation(String::from("Patch must be a JSON object")));
        };
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&collection)
            .and_then(|list| list.iter_mut().find(|record| record_id(record).as_deref() == Some(id)))
            .ok_or_else(|| RentalError::NotFound(collection.record_name().to_string()))?;
        if let Value::Object(target) = &mut *record {
            for (key, value) in fields {
                // The id is immutable
                if key != "id" {
                    target.insert(key, value);
                }
            }
        }
        Ok(record.clone())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), RentalError> {
        let mut records = self.records.write().await;
        let list = records.entry(collection).or_default();
        let before = list.len();
        list.retain(|record| record_id(record).as_deref() != Some(id));
        if list.len() == before {
            return Err(RentalError::NotFound(collection.record_name().to_string()));
        }
        Ok(())
    }
}
