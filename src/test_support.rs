use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use crate::config::Config;
use crate::helper_model::LoginRequest;
use crate::integration::memory_store::MemoryStore;
use crate::integration::{Collection, DataStore};
use crate::methods::user;
use crate::model::PublishUser;
use crate::state::AppState;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const RENTER_EMAIL: &str = "renter@example.com";
pub const PASSWORD: &str = "hunter22";

pub fn test_config() -> Config {
    Config {
        bcrypt_cost: 4,
        ..Config::default()
    }
}

pub async fn seed(store: &dyn DataStore) {
    let hashed = bcrypt::hash(PASSWORD, 4).unwrap();
    let now = Utc::now();
    store
        .create(
            Collection::Users,
            json!({"id": "1", "name": "Avery Admin", "email": ADMIN_EMAIL, "phone": "5550000001",
                   "password": hashed, "role": "admin", "loyaltyPoints": 0, "createdAt": now}),
        )
        .await
        .unwrap();
    store
        .create(
            Collection::Users,
            json!({"id": "2", "name": "Sam", "email": RENTER_EMAIL, "phone": "5550000002",
                   "password": hashed, "role": "user", "loyaltyPoints": 40, "createdAt": now}),
        )
        .await
        .unwrap();
    for car in [
        json!({"id": "1", "make": "Toyota", "model": "Corolla", "year": 2022, "category": "Sedans",
               "pricePerDay": 50, "available": true, "transmission": "Automatic", "seats": 5,
               "image": "corolla.jpg"}),
        json!({"id": "2", "make": "Ford", "model": "Mustang", "year": 2023, "category": "Sports Cars",
               "pricePerDay": 120.5, "available": true, "transmission": "Manual", "seats": 4,
               "image": "mustang.jpg"}),
        json!({"id": "5", "make": "Tesla", "model": "Model Y", "year": 2024, "category": "Electric/Hybrids",
               "pricePerDay": 95, "available": false, "transmission": "Automatic", "seats": 5,
               "image": "model-y.jpg"}),
    ] {
        store.create(Collection::Cars, car).await.unwrap();
    }
}

pub async fn seeded_state() -> AppState {
    let store = MemoryStore::new();
    seed(&store).await;
    AppState::new(test_config(), Arc::new(store))
}

async fn login_as(state: &AppState, email: &str) -> (PublishUser, String) {
    let (user, token) = user::login(
        state,
        LoginRequest {
            email: email.to_string(),
            password: PASSWORD.to_string(),
        },
    )
    .await
    .unwrap();
    (user, token.token)
}

pub async fn login_renter(state: &AppState) -> (PublishUser, String) {
    login_as(state, RENTER_EMAIL).await
}

pub async fn login_admin(state: &AppState) -> (PublishUser, String) {
    login_as(state, ADMIN_EMAIL).await
}
