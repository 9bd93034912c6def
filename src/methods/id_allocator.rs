use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::helper_model::RentalError;
use crate::integration::{Collection, DataStore, record_id};

/// Next identifier for a collection: highest numeric id plus one, or "1"
/// when no id parses.
pub fn next_id<'a, I>(ids: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    ids.into_iter()
        .filter_map(|raw| raw.trim().parse::<i64>().ok())
        .max()
        .map_or(1, |max| max + 1)
        .to_string()
}

/// Hands out ids per collection under a lock, so two requests in this
/// process never receive the same one.
#[derive(Default)]
pub struct IdSequencer {
    next: Mutex<HashMap<Collection, i64>>,
}

impl IdSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn allocate(
        &self,
        store: &dyn DataStore,
        collection: Collection,
    ) -> Result<String, RentalError> {
        let mut next = self.next.lock().await;
        let candidate = match next.get(&collection) {
            Some(id) => *id,
            None => {
                // First allocation seeds from what the store already holds
                let records = store.list(collection, &[]).await?;
                let ids: Vec<String> = records.iter().filter_map(record_id).collect();
                let seeded = next_id(ids.iter().map(String::as_str));
                seeded.parse::<i64>().unwrap_or(1)
            }
        };
        next.insert(collection, candidate + 1);
        log::debug!("allocated {} id {}", collection.path(), candidate);
        Ok(candidate.to_string())
    }
}
