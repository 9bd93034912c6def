use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;

use super::{Collection, DataStore};
use crate::helper_model::RentalError;

/// Client for a json-server style REST API: one endpoint per collection,
/// field equality filters as query parameters.
pub struct RestStore {
    client: Client,
    base_url: String,
}

impl RestStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(RestStore {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn collection_url(&self, collection: Collection) -> String {
        format!("{}/{}", self.base_url, collection.path())
    }

    fn record_url(&self, collection: Collection, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, collection.path(), id)
    }
}

async fn expect_success(resp: Response, what: &str) -> Result<Response, RentalError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    log::warn!("data store rejected {}: {} {}", what, status, body);
    Err(RentalError::Transport(format!("{} returned {}", what, status)))
}

#[async_trait]
impl DataStore for RestStore {
    async fn list(
        &self,
        collection: Collection,
        filters: &[(&str, String)],
    ) -> Result<Vec<Value>, RentalError> {
        let resp = self
            .client
            .get(self.collection_url(collection))
            .query(filters)
            .send()
            .await?;
        let resp = expect_success(resp, collection.path()).await?;
        Ok(resp.json::<Vec<Value>>().await?)
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, RentalError> {
        let resp = self.client.get(self.record_url(collection, id)).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = expect_success(resp, collection.path()).await?;
        Ok(Some(resp.json::<Value>().await?))
    }

    async fn create(&self, collection: Collection, record: Value) -> Result<Value, RentalError> {
        let resp = self
            .client
            .post(self.collection_url(collection))
            .json(&record)
            .send()
            .await?;
        let resp = expect_success(resp, collection.path()).await?;
        Ok(resp.json::<Value>().await?)
    }

    async fn patch(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<Value, RentalError> {
        let resp = self
            .client
            .patch(self.record_url(collection, id))
            .json(&patch)
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(RentalError::NotFound(collection.record_name().to_string()));
        }
        let resp = expect_success(resp, collection.path()).await?;
        Ok(resp.json::<Value>().await?)
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), RentalError> {
        let resp = self
            .client
            .delete(self.record_url(collection, id))
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(RentalError::NotFound(collection.record_name().to_string()));
        }
        expect_success(resp, collection.path()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_drop_trailing_slash() {
        let store = RestStore::new("http://localhost:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(store.collection_url(Collection::Cars), "http://localhost:5000/cars");
        assert_eq!(
            store.record_url(Collection::Bookings, "12"),
            "http://localhost:5000/bookings/12"
        );
    }

    #[tokio::test]
    async fn unreachable_store_is_a_transport_error() {
        // Port 9 (discard) is not expected to serve HTTP
        let store = RestStore::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let err = store.list(Collection::Cars, &[]).await.unwrap_err();
        assert!(matches!(err, RentalError::Transport(_)));
    }
}
