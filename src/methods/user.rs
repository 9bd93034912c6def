use bcrypt::{hash, verify};
use chrono::Utc;
use regex::Regex;
use tokio::task;

use crate::helper_model::{LoginRequest, RegisterRequest, RentalError};
use crate::integration::{Collection, DataStore};
use crate::methods::store_fn;
use crate::methods::tokens::PublishAccessToken;
use crate::model::{PublishUser, Role, User, UserPatch};
use crate::state::AppState;

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    lazy_static::lazy_static! {
        static ref EMAIL_REGEX: Regex = Regex::new(
            r"(?i)^[a-z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-z0-9-](?:[a-z0-9-]{0,61}[a-z0-9])?(?:\.[a-z0-9-](?:[a-z0-9-]{0,61}[a-z0-9])?)+$"
        ).expect("Invalid regex");
    }
    // RFC 5321 length limit
    if email.len() > 254 {
        return false;
    }
    EMAIL_REGEX.is_match(email)
}

pub fn validate_registration(data: &RegisterRequest) -> Result<(), RentalError> {
    if data.password != data.confirm_password {
        return Err(RentalError::Validation(String::from("Passwords do not match")));
    }
    if data.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(RentalError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if data.name.trim().is_empty() || data.phone.trim().is_empty() {
        return Err(RentalError::Validation(String::from("Name and phone number are required")));
    }
    if !is_valid_email(&normalize_email(&data.email)) {
        return Err(RentalError::Validation(String::from("Please check your email format")));
    }
    Ok(())
}

/// Modular crypt prefix of every bcrypt variant (`$2a$`, `$2b$`, `$2x$`, `$2y$`).
pub fn is_bcrypt_hash(stored: &str) -> bool {
    lazy_static::lazy_static! {
        static ref BCRYPT_REGEX: Regex = Regex::new(r"^\$2[abxy]?\$\d{2}\$").expect("Invalid regex");
    }
    BCRYPT_REGEX.is_match(stored)
}

pub async fn get_user_by_id(store: &dyn DataStore, user_id: &str) -> Result<User, RentalError> {
    store_fn::get_record::<User>(store, Collection::Users, user_id).await
}

pub async fn find_user_by_email(
    store: &dyn DataStore,
    email: &str,
) -> Result<Option<User>, RentalError> {
    let mut found = store_fn::list_records::<User>(
        store,
        Collection::Users,
        &[("email", normalize_email(email))],
    )
    .await?;
    Ok(if found.is_empty() { None } else { Some(found.remove(0)) })
}

pub async fn register(
    state: &AppState,
    data: RegisterRequest,
) -> Result<(PublishUser, PublishAccessToken), RentalError> {
    validate_registration(&data)?;
    let store = state.store.as_ref();
    let email = normalize_email(&data.email);
    if find_user_by_email(store, &email).await?.is_some() {
        return Err(RentalError::Conflict(String::from("Email already in use")));
    }

    let cost = state.config.bcrypt_cost;
    let password = data.password;
    let hashed = task::spawn_blocking(move || hash(password, cost))
        .await?
        .map_err(|e| RentalError::Internal(format!("password hashing failed: {}", e)))?;

    // Another registration may have claimed the email while hashing
    let _accounts = state.accounts.lock().await;
    if find_user_by_email(store, &email).await?.is_some() {
        return Err(RentalError::Conflict(String::from("Email already in use")));
    }
    let id = state.ids.allocate(store, Collection::Users).await?;
    let to_be_inserted = User {
        id,
        name: data.name.trim().to_string(),
        email,
        phone: data.phone.trim().to_string(),
        password: hashed,
        role: Role::User,
        loyalty_points: 0,
        created_at: Utc::now(),
    };
    let user = store_fn::create_record(store, Collection::Users, &to_be_inserted).await?;
    log::info!("registered user {}", user.id);
    let pub_user: PublishUser = user.into();
    let token = state.sessions.issue(pub_user.clone()).await;
    Ok((pub_user, token))
}

pub async fn login(
    state: &AppState,
    data: LoginRequest,
) -> Result<(PublishUser, PublishAccessToken), RentalError> {
    let Some(user) = find_user_by_email(state.store.as_ref(), &data.email).await? else {
        return Err(RentalError::InvalidCredentials);
    };
    if !is_bcrypt_hash(&user.password) {
        log::warn!(
            "user {} has a stored password that is not a bcrypt hash; seed files must hold bcrypt hashes",
            user.id
        );
        return Err(RentalError::InvalidCredentials);
    }
    let stored_hash = user.password.clone();
    let password = data.password;
    let matches = task::spawn_blocking(move || verify(password, &stored_hash).unwrap_or(false)).await?;
    if !matches {
        log::info!("failed login for user {}", user.id);
        return Err(RentalError::InvalidCredentials);
    }
    let pub_user: PublishUser = user.into();
    let token = state.sessions.issue(pub_user.clone()).await;
    Ok((pub_user, token))
}

/// Re-read the session user from the store and refresh the cached snapshot.
pub async fn retrieve(state: &AppState, session_user: &PublishUser) -> Result<PublishUser, RentalError> {
    let user: PublishUser = get_user_by_id(state.store.as_ref(), &session_user.id).await?.into();
    state.sessions.refresh(&user).await;
    Ok(user)
}

pub async fn update_profile(
    state: &AppState,
    session_user: &PublishUser,
    mut patch: UserPatch,
) -> Result<PublishUser, RentalError> {
    let store = state.store.as_ref();
    if let Some(name) = &patch.name {
        if name.trim().is_empty() {
            return Err(RentalError::Validation(String::from("Name cannot be empty")));
        }
    }
    if let Some(phone) = &patch.phone {
        if phone.trim().is_empty() {
            return Err(RentalError::Validation(String::from("Phone number cannot be empty")));
        }
    }
    let _accounts = state.accounts.lock().await;
    if let Some(email) = patch.email.take() {
        let email = normalize_email(&email);
        if !is_valid_email(&email) {
            return Err(RentalError::Validation(String::from("Please check your email format")));
        }
        if let Some(existing) = find_user_by_email(store, &email).await? {
            if existing.id != session_user.id {
                return Err(RentalError::Conflict(String::from("Email already in use")));
            }
        }
        patch.email = Some(email);
    }
    let user: User =
        store_fn::patch_record(store, Collection::Users, &session_user.id, &patch).await?;
    let pub_user: PublishUser = user.into();
    state.sessions.refresh(&pub_user).await;
    Ok(pub_user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    fn registration(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: String::from("Jordan Lee"),
            email: email.to_string(),
            phone: String::from("5550001111"),
            password: String::from("secret1"),
            confirm_password: String::from("secret1"),
        }
    }

    #[test]
    fn registration_validation() {
        let mut data = registration("jordan@example.com");
        assert!(validate_registration(&data).is_ok());

        data.confirm_password = String::from("secret2");
        assert!(matches!(validate_registration(&data), Err(RentalError::Validation(m)) if m == "Passwords do not match"));

        data.password = String::from("abc");
        data.confirm_password = String::from("abc");
        assert!(matches!(validate_registration(&data), Err(RentalError::Validation(_))));

        let bad_email = registration("not-an-email");
        assert!(validate_registration(&bad_email).is_err());
    }

    #[test]
    fn email_format() {
        assert!(is_valid_email("a.b+c@mail.example.org"));
        assert!(!is_valid_email("missing-at.example.org"));
        assert!(!is_valid_email("two@@example.org"));
    }

    #[tokio::test]
    async fn register_assigns_next_id_and_logs_in() {
        let state = test_support::seeded_state().await;
        let (user, token) = register(&state, registration("New.Person@Example.com")).await.unwrap();
        // Seed holds users 1 and 2
        assert_eq!(user.id, "3");
        assert_eq!(user.email, "new.person@example.com");
        assert_eq!(user.loyalty_points, 0);
        assert_eq!(user.role, Role::User);
        assert_eq!(state.sessions.verify(&token.token).await.unwrap().id, "3");

        let stored = get_user_by_id(state.store.as_ref(), "3").await.unwrap();
        assert_ne!(stored.password, "secret1");
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let state = test_support::seeded_state().await;
        let err = register(&state, registration(test_support::RENTER_EMAIL))
            .await
            .unwrap_err();
        assert!(matches!(err, RentalError::Conflict(m) if m == "Email already in use"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_registrations_claim_an_email_once() {
        let state = test_support::seeded_state().await;
        let (a, b) = tokio::join!(
            register(&state, registration("twin@example.com")),
            register(&state, registration("Twin@Example.com")),
        );
        assert!(a.is_ok() != b.is_ok());
        let loser = if a.is_ok() { b } else { a };
        assert!(matches!(loser, Err(RentalError::Conflict(_))));
        let stored = store_fn::list_records::<User>(
            state.store.as_ref(),
            Collection::Users,
            &[("email", String::from("twin@example.com"))],
        )
        .await
        .unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[test]
    fn bcrypt_hash_detection() {
        let hashed = hash("secret1", 4).unwrap();
        assert!(is_bcrypt_hash(&hashed));
        assert!(is_bcrypt_hash("$2y$10$abcdefghijklmnopqrstuv"));
        assert!(!is_bcrypt_hash("secret1"));
        assert!(!is_bcrypt_hash(""));
    }

    #[tokio::test]
    async fn plaintext_stored_password_never_logs_in() {
        let state = test_support::seeded_state().await;
        state
            .store
            .create(
                Collection::Users,
                serde_json::json!({"id": "9", "name": "Legacy", "email": "legacy@example.com",
                    "phone": "5550009999", "password": "plain-pass", "createdAt": Utc::now()}),
            )
            .await
            .unwrap();
        let attempt = login(
            &state,
            LoginRequest {
                email: String::from("legacy@example.com"),
                password: String::from("plain-pass"),
            },
        )
        .await;
        assert!(matches!(attempt, Err(RentalError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn login_checks_password() {
        let state = test_support::seeded_state().await;
        let ok = login(
            &state,
            LoginRequest {
                email: String::from(test_support::RENTER_EMAIL),
                password: String::from(test_support::PASSWORD),
            },
        )
        .await
        .unwrap();
        assert_eq!(ok.0.id, "2");

        let wrong = login(
            &state,
            LoginRequest {
                email: String::from(test_support::RENTER_EMAIL),
                password: String::from("nope-nope"),
            },
        )
        .await;
        assert!(matches!(wrong, Err(RentalError::InvalidCredentials)));

        let unknown = login(
            &state,
            LoginRequest {
                email: String::from("ghost@example.com"),
                password: String::from(test_support::PASSWORD),
            },
        )
        .await;
        assert!(matches!(unknown, Err(RentalError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn profile_update_refreshes_session() {
        let state = test_support::seeded_state().await;
        let (renter, token) = test_support::login_renter(&state).await;
        let updated = update_profile(
            &state,
            &renter,
            UserPatch {
                name: Some(String::from("Sam Renter")),
                ..UserPatch::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Sam Renter");
        assert_eq!(state.sessions.verify(&token).await.unwrap().name, "Sam Renter");

        let taken = update_profile(
            &state,
            &renter,
            UserPatch {
                email: Some(String::from(test_support::ADMIN_EMAIL)),
                ..UserPatch::default()
            },
        )
        .await;
        assert!(matches!(taken, Err(RentalError::Conflict(_))));
    }
}
