use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::helper_model::RentalError;
use crate::integration::{Collection, DataStore};

pub async fn list_records<T: DeserializeOwned>(
    store: &dyn DataStore,
    collection: Collection,
    filters: &[(&str, String)],
) -> Result<Vec<T>, RentalError> {
    store
        .list(collection, filters)
        .await?
        .into_iter()
        .map(|value| serde_json::from_value::<T>(value).map_err(RentalError::from))
        .collect()
}

pub async fn get_record<T: DeserializeOwned>(
    store: &dyn DataStore,
    collection: Collection,
    id: &str,
) -> Result<T, RentalError> {
    let value = store
        .get(collection, id)
        .await?
        .ok_or_else(|| RentalError::NotFound(collection.record_name().to_string()))?;
    Ok(serde_json::from_value(value)?)
}

pub async fn create_record<T: Serialize + DeserializeOwned>(
    store: &dyn DataStore,
    collection: Collection,
    record: &T,
) -> Result<T, RentalError> {
    let created = store.create(collection, serde_json::to_value(record)?).await?;
    Ok(serde_json::from_value(created)?)
}

pub async fn patch_record<T: DeserializeOwned, P: Serialize>(
    store: &dyn DataStore,
    collection: Collection,
    id: &str,
    patch: &P,
) -> Result<T, RentalError> {
    let patched = store
        .patch(collection, id, serde_json::to_value(patch)?)
        .await?;
    Ok(serde_json::from_value(patched)?)
}
