pub mod memory_store;
pub mod rest_store;

use async_trait::async_trait;
use serde_json::Value;

use crate::helper_model::RentalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Cars,
    Users,
    Bookings,
}

impl Collection {
    pub fn path(&self) -> &'static str {
        match self {
            Collection::Cars => "cars",
            Collection::Users => "users",
            Collection::Bookings => "bookings",
        }
    }

    pub fn record_name(&self) -> &'static str {
        match self {
            Collection::Cars => "Car",
            Collection::Users => "User",
            Collection::Bookings => "Booking",
        }
    }
}

/// A record's id as text. Numeric ids count too.
pub fn record_id(record: &Value) -> Option<String> {
    match record.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) if id.is_i64() || id.is_u64() => Some(id.to_string()),
        _ => None,
    }
}

/// The external document store every record lives in. Records travel as
/// JSON objects carrying a string `id`.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Records whose fields equal every `(field, value)` pair.
    async fn list(
        &self,
        collection: Collection,
        filters: &[(&str, String)],
    ) -> Result<Vec<Value>, RentalError>;

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, RentalError>;

    async fn create(&self, collection: Collection, record: Value) -> Result<Value, RentalError>;

    /// Shallow merge of `patch` into the stored record.
    async fn patch(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<Value, RentalError>;

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), RentalError>;
}
