use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde_derive::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::helper_model::RentalError;
use crate::model::PublishUser;

/// What the client sends back in the `auth` header: `<hex token>$<user id>`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PublishAccessToken {
    pub token: String,
    pub exp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct Session {
    user: PublishUser,
    exp: DateTime<Utc>,
}

/// Logged-in users, keyed by the blake3 digest of their token. The raw
/// token only ever exists on the client.
pub struct SessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<[u8; 32], Session>>,
}

fn digest(raw_token: &[u8]) -> [u8; 32] {
    *blake3::hash(raw_token).as_bytes()
}

fn split_auth(auth: &str) -> Result<(Vec<u8>, &str), RentalError> {
    let token_and_id = auth.split('$').collect::<Vec<&str>>();
    if token_and_id.len() != 2 || token_and_id[1].is_empty() {
        return Err(RentalError::Unauthorized);
    }
    let binary_token = hex::decode(token_and_id[0]).map_err(|_| RentalError::TokenFormat)?;
    Ok((binary_token, token_and_id[1]))
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        SessionStore {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn issue(&self, user: PublishUser) -> PublishAccessToken {
        let mut sessions = self.sessions.write().await;
        let (raw_token, key) = loop {
            let candidate: [u8; 32] = rand::random();
            let key = digest(&candidate);
            if !sessions.contains_key(&key) {
                break (candidate, key);
            }
        };
        let exp = Utc::now() + self.ttl;
        let token = format!("{}${}", hex::encode(raw_token), user.id);
        log::info!("session opened for user {}", user.id);
        sessions.insert(key, Session { user, exp });
        PublishAccessToken { token, exp }
    }

    /// Resolve an `auth` header to its user. A successful check pushes the
    /// expiry forward by one TTL.
    pub async fn verify(&self, auth: &str) -> Result<PublishUser, RentalError> {
        let (binary_token, user_id) = split_auth(auth)?;
        let key = digest(&binary_token);
        let mut sessions = self.sessions.write().await;
        let now = Utc::now();
        let Some(session) = sessions.get_mut(&key) else {
            return Err(RentalError::Unauthorized);
        };
        if session.exp < now {
            sessions.remove(&key);
            return Err(RentalError::Unauthorized);
        }
        if session.user.id != user_id {
            return Err(RentalError::Unauthorized);
        }
        session.exp = now + self.ttl;
        Ok(session.user.clone())
    }

    /// Replace the cached profile in every session of this user.
    pub async fn refresh(&self, user: &PublishUser) {
        let mut sessions = self.sessions.write().await;
        for session in sessions.values_mut().filter(|s| s.user.id == user.id) {
            session.user = user.clone();
        }
    }

    pub async fn revoke(&self, auth: &str) -> Result<(), RentalError> {
        let (binary_token, user_id) = split_auth(auth)?;
        let key = digest(&binary_token);
        let mut sessions = self.sessions.write().await;
        let owned = sessions
            .get(&key)
            .is_some_and(|session| session.user.id == user_id);
        if !owned {
            return Err(RentalError::Unauthorized);
        }
        sessions.remove(&key);
        log::info!("session closed for user {}", user_id);
        Ok(())
    }

    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.exp >= now);
        before - sessions.len()
    }
}
