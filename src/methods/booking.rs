//! Booking placement and status changes.
//!
//! A placement writes two records: the booking, then the user's new
//! loyalty balance. The two writes are not atomic on the store side, so the
//! balance update is retried and, if it still fails, the booking is deleted
//! again before the error is reported.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::helper_model::{BookingRequest, PlacedBooking, RentalError};
use crate::integration::Collection;
use crate::methods::rental_rate::{self, BookingQuote};
use crate::methods::{store_fn, user};
use crate::model::{Booking, BookingStatus, Car, PublishUser};
use crate::state::AppState;

/// Pause before the n-th retry of the loyalty update is n times this.
const RETRY_BACKOFF: std::time::Duration = std::time::Duration::from_millis(100);

/// A finished placement remembered under its idempotency key.
#[derive(Debug, Clone)]
pub struct Replay {
    pub request: BookingRequest,
    pub placed: PlacedBooking,
    pub at: DateTime<Utc>,
}

/// Price a prospective booking for the given balance without writing anything.
pub async fn quote(
    state: &AppState,
    request: &BookingRequest,
    loyalty_points: i64,
) -> Result<BookingQuote, RentalError> {
    let car: Car =
        store_fn::get_record(state.store.as_ref(), Collection::Cars, &request.car_id).await?;
    Ok(rental_rate::compute_booking(
        car.price_per_day,
        request.start_date,
        request.end_date,
        loyalty_points,
        request.use_points,
    ))
}

pub async fn place_booking(
    state: &AppState,
    session_user: &PublishUser,
    request: BookingRequest,
    idempotency_key: Option<String>,
) -> Result<PlacedBooking, RentalError> {
    // Held for the whole placement: one booking at a time
    let mut placements = state.placements.lock().await;
    let replay_key = idempotency_key.map(|key| (session_user.id.clone(), key));
    if let Some(previous) = replay_key.as_ref().and_then(|key| placements.get(key)) {
        if Utc::now() - previous.at < state.config.idempotency_ttl {
            if previous.request != request {
                return Err(RentalError::Conflict(String::from(
                    "This idempotency key was already used for a different booking",
                )));
            }
            log::info!("replaying booking {} for user {}", previous.placed.booking.id, session_user.id);
            return Ok(previous.placed.clone());
        }
    }

    let store = state.store.as_ref();
    let car: Car = store_fn::get_record(store, Collection::Cars, &request.car_id).await?;
    if !car.available {
        return Err(RentalError::Validation(String::from("This car is not available for booking")));
    }
    // The balance comes from the store, never from the client's snapshot
    let renter = user::get_user_by_id(store, &session_user.id).await?;

    if request.start_date < Utc::now().date_naive() {
        return Err(RentalError::Validation(String::from("Pick-up date cannot be in the past")));
    }
    let quote = rental_rate::compute_booking(
        car.price_per_day,
        request.start_date,
        request.end_date,
        renter.loyalty_points,
        request.use_points,
    );
    if let Some(err) = &quote.error {
        return Err(RentalError::Validation(err.clone()));
    }
    let loyalty = rental_rate::loyalty_update(renter.loyalty_points, &quote);

    let id = state.ids.allocate(store, Collection::Bookings).await?;
    let new_booking = Booking {
        id,
        user_id: renter.id.clone(),
        car_id: car.id.clone(),
        car_make: car.make.clone(),
        car_model: car.model.clone(),
        car_image: car.image.clone(),
        start_date: request.start_date,
        end_date: request.end_date,
        total_price: quote.total,
        status: BookingStatus::Upcoming,
        booked_at: Utc::now(),
    };
    let booking = store_fn::create_record(store, Collection::Bookings, &new_booking).await?;

    let points_patch = json!({ "loyaltyPoints": loyalty.new_balance });
    let mut attempts = 0;
    let updated_user = loop {
        match store.patch(Collection::Users, &renter.id, points_patch.clone()).await {
            Ok(value) => break value,
            // Only transport failures can succeed on a later attempt
            Err(err @ RentalError::Transport(_)) if attempts < state.config.store_write_retries => {
                attempts += 1;
                log::warn!(
                    "loyalty update for booking {} failed (attempt {}): {}",
                    booking.id,
                    attempts,
                    err
                );
                tokio::time::sleep(RETRY_BACKOFF * attempts).await;
            }
            Err(err) => {
                log::warn!("rolling back booking {}: {}", booking.id, err);
                if let Err(rollback_err) = store.delete(Collection::Bookings, &booking.id).await {
                    log::error!(
                        "booking {} recorded without loyalty update, rollback failed: {}",
                        booking.id,
                        rollback_err
                    );
                }
                return Err(err);
            }
        }
    };

    match serde_json::from_value::<crate::model::User>(updated_user) {
        Ok(updated) => state.sessions.refresh(&updated.into()).await,
        Err(err) => log::warn!("could not refresh session for user {}: {}", renter.id, err),
    }
    log::info!(
        "booking {} placed by user {}: total {} ({} points spent, {} earned)",
        booking.id,
        renter.id,
        booking.total_price,
        loyalty.points_spent,
        loyalty.points_earned
    );

    let placed = PlacedBooking {
        booking,
        quote,
        loyalty,
    };
    if let Some(key) = replay_key {
        placements.insert(
            key,
            Replay {
                request,
                placed: placed.clone(),
                at: Utc::now(),
            },
        );
    }
    Ok(placed)
}

/// Forget replays older than the idempotency window. Returns how many were dropped.
pub async fn purge_replays(state: &AppState) -> usize {
    let cutoff = Utc::now() - state.config.idempotency_ttl;
    let mut placements = state.placements.lock().await;
    let before = placements.len();
    placements.retain(|_, replay| replay.at > cutoff);
    before - placements.len()
}

pub async fn user_bookings(state: &AppState, user_id: &str) -> Result<Vec<Booking>, RentalError> {
    store_fn::list_records(
        state.store.as_ref(),
        Collection::Bookings,
        &[("userId", user_id.to_string())],
    )
    .await
}

async fn change_status(
    state: &AppState,
    booking: &Booking,
    next: BookingStatus,
) -> Result<Booking, RentalError> {
    if !booking.status.can_transition_to(next) {
        return Err(RentalError::Conflict(format!(
            "Booking {} is {:?} and cannot become {:?}",
            booking.id, booking.status, next
        )));
    }
    let updated: Booking = store_fn::patch_record(
        state.store.as_ref(),
        Collection::Bookings,
        &booking.id,
        &json!({ "status": next }),
    )
    .await?;
    log::info!("booking {} is now {:?}", updated.id, updated.status);
    Ok(updated)
}

/// The owner cancels one of their upcoming bookings. Spent points stay spent.
pub async fn cancel_booking(
    state: &AppState,
    session_user: &PublishUser,
    booking_id: &str,
) -> Result<Booking, RentalError> {
    let booking: Booking =
        store_fn::get_record(state.store.as_ref(), Collection::Bookings, booking_id).await?;
    if booking.user_id != session_user.id {
        return Err(RentalError::Forbidden(String::from(
            "You do not have permission to access this booking.",
        )));
    }
    change_status(state, &booking, BookingStatus::Cancelled).await
}

pub async fn set_booking_status(
    state: &AppState,
    booking_id: &str,
    next: BookingStatus,
) -> Result<Booking, RentalError> {
    let booking: Booking =
        store_fn::get_record(state.store.as_ref(), Collection::Bookings, booking_id).await?;
    change_status(state, &booking, next).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use chrono::{Duration, NaiveDate};
    use serde_json::Value;

    use super::*;
    use crate::integration::DataStore;
    use crate::integration::memory_store::MemoryStore;
    use crate::test_support;

    fn request(car_id: &str, days_from_now: i64, days: i64, use_points: bool) -> BookingRequest {
        let start = Utc::now().date_naive() + Duration::days(days_from_now);
        BookingRequest {
            car_id: car_id.to_string(),
            start_date: start,
            end_date: start + Duration::days(days),
            use_points,
        }
    }

    #[tokio::test]
    async fn placement_redeems_and_earns_points() {
        let state = test_support::seeded_state().await;
        let (renter, token) = test_support::login_renter(&state).await;

        let placed = place_booking(&state, &renter, request("1", 1, 3, true), None)
            .await
            .unwrap();
        assert_eq!(placed.booking.id, "1");
        assert_eq!(placed.quote.base_price, 150.0);
        assert_eq!(placed.quote.discount, 4.0);
        assert_eq!(placed.booking.total_price, 146.0);
        assert_eq!(placed.booking.car_make, "Toyota");
        assert_eq!(placed.booking.status, BookingStatus::Upcoming);
        assert_eq!(placed.loyalty.new_balance, 14);

        let stored = user::get_user_by_id(state.store.as_ref(), "2").await.unwrap();
        assert_eq!(stored.loyalty_points, 14);
        let session = state.sessions.verify(&token).await.unwrap();
        assert_eq!(session.loyalty_points, 14);
    }

    #[tokio::test]
    async fn stale_session_points_are_not_trusted() {
        let state = test_support::seeded_state().await;
        let (mut renter, _) = test_support::login_renter(&state).await;
        renter.loyalty_points = 100_000;
        let placed = place_booking(&state, &renter, request("1", 1, 3, true), None)
            .await
            .unwrap();
        // Store balance is 40
        assert_eq!(placed.quote.discount, 4.0);
    }

    #[tokio::test]
    async fn persisted_booking_reads_back_unchanged() {
        let state = test_support::seeded_state().await;
        let (renter, _) = test_support::login_renter(&state).await;
        let placed = place_booking(&state, &renter, request("2", 2, 2, false), None)
            .await
            .unwrap();
        let reread: Booking =
            store_fn::get_record(state.store.as_ref(), Collection::Bookings, &placed.booking.id)
                .await
                .unwrap();
        assert_eq!(reread, placed.booking);
        assert_eq!(reread.total_price, 241.0);
    }

    #[tokio::test]
    async fn invalid_requests_write_nothing() {
        let state = test_support::seeded_state().await;
        let (renter, _) = test_support::login_renter(&state).await;

        let reversed = place_booking(&state, &renter, request("1", 3, -2, false), None).await;
        assert!(matches!(reversed, Err(RentalError::Validation(m)) if m == rental_rate::INVALID_RANGE_MSG));

        let past = place_booking(&state, &renter, request("1", -3, 2, false), None).await;
        assert!(matches!(past, Err(RentalError::Validation(_))));

        let unavailable = place_booking(&state, &renter, request("5", 1, 2, false), None).await;
        assert!(matches!(unavailable, Err(RentalError::Validation(_))));

        let missing = place_booking(&state, &renter, request("77", 1, 2, false), None).await;
        assert!(matches!(missing, Err(RentalError::NotFound(_))));

        assert!(user_bookings(&state, "2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn repeated_idempotency_key_replays() {
        let state = test_support::seeded_state().await;
        let (renter, _) = test_support::login_renter(&state).await;
        let key = Some(String::from("click-1"));
        let first = place_booking(&state, &renter, request("1", 1, 1, false), key.clone())
            .await
            .unwrap();
        let second = place_booking(&state, &renter, request("1", 1, 1, false), key)
            .await
            .unwrap();
        assert_eq!(first.booking.id, second.booking.id);
        assert_eq!(user_bookings(&state, "2").await.unwrap().len(), 1);

        let third = place_booking(&state, &renter, request("1", 1, 1, false), None)
            .await
            .unwrap();
        assert_eq!(third.booking.id, "2");
    }

    #[tokio::test]
    async fn reused_key_with_other_booking_is_a_conflict() {
        let state = test_support::seeded_state().await;
        let (renter, _) = test_support::login_renter(&state).await;
        let key = Some(String::from("click-2"));
        place_booking(&state, &renter, request("1", 1, 1, false), key.clone())
            .await
            .unwrap();
        let other_car = place_booking(&state, &renter, request("2", 1, 1, false), key.clone()).await;
        assert!(matches!(other_car, Err(RentalError::Conflict(_))));
        let other_dates = place_booking(&state, &renter, request("1", 4, 2, false), key).await;
        assert!(matches!(other_dates, Err(RentalError::Conflict(_))));
        assert_eq!(user_bookings(&state, "2").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn replays_expire_after_their_window() {
        let state = test_support::seeded_state().await;
        let (renter, _) = test_support::login_renter(&state).await;
        place_booking(&state, &renter, request("1", 1, 1, false), Some(String::from("kept")))
            .await
            .unwrap();
        assert_eq!(purge_replays(&state).await, 0);
        assert_eq!(state.placements.lock().await.len(), 1);

        let mut config = test_support::test_config();
        config.idempotency_ttl = Duration::zero();
        let state = AppState::new(config, state.store.clone());
        let (renter, _) = test_support::login_renter(&state).await;
        let key = Some(String::from("stale"));
        let first = place_booking(&state, &renter, request("2", 1, 1, false), key.clone())
            .await
            .unwrap();
        // An expired key places a fresh booking
        let second = place_booking(&state, &renter, request("2", 1, 1, false), key)
            .await
            .unwrap();
        assert_ne!(first.booking.id, second.booking.id);
        assert_eq!(purge_replays(&state).await, 1);
        assert!(state.placements.lock().await.is_empty());
    }

    /// Wraps a memory store and fails every user patch.
    struct FailingPatches {
        inner: MemoryStore,
        patch_calls: AtomicU32,
        fail_with: fn() -> RentalError,
    }

    fn failing_state(fail_with: fn() -> RentalError) -> (Arc<FailingPatches>, AppState) {
        let store = Arc::new(FailingPatches {
            inner: MemoryStore::new(),
            patch_calls: AtomicU32::new(0),
            fail_with,
        });
        let state = AppState::new(test_support::test_config(), store.clone());
        (store, state)
    }

    #[async_trait]
    impl DataStore for FailingPatches {
        async fn list(
            &self,
            collection: Collection,
            filters: &[(&str, String)],
        ) -> Result<Vec<Value>, RentalError> {
            self.inner.list(collection, filters).await
        }
        async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, RentalError> {
            self.inner.get(collection, id).await
        }
        async fn create(&self, collection: Collection, record: Value) -> Result<Value, RentalError> {
            self.inner.create(collection, record).await
        }
        async fn patch(
            &self,
            collection: Collection,
            id: &str,
            patch: Value,
        ) -> Result<Value, RentalError> {
            if collection == Collection::Users {
                self.patch_calls.fetch_add(1, Ordering::SeqCst);
                return Err((self.fail_with)());
            }
            self.inner.patch(collection, id, patch).await
        }
        async fn delete(&self, collection: Collection, id: &str) -> Result<(), RentalError> {
            self.inner.delete(collection, id).await
        }
    }

    #[tokio::test]
    async fn failed_points_update_rolls_back_booking() {
        let (store, state) =
            failing_state(|| RentalError::Transport(String::from("users returned 503")));
        test_support::seed(&store.inner).await;
        let (renter, _) = test_support::login_renter(&state).await;

        let err = place_booking(&state, &renter, request("1", 1, 3, true), None)
            .await
            .unwrap_err();
        assert!(matches!(err, RentalError::Transport(_)));
        // One try plus two retries
        assert_eq!(store.patch_calls.load(Ordering::SeqCst), 3);
        assert!(user_bookings(&state, "2").await.unwrap().is_empty());
        let renter_after = user::get_user_by_id(state.store.as_ref(), "2").await.unwrap();
        assert_eq!(renter_after.loyalty_points, 40);
    }

    #[tokio::test]
    async fn permanent_points_failure_is_not_retried() {
        let (store, state) = failing_state(|| RentalError::NotFound(String::from("User")));
        test_support::seed(&store.inner).await;
        let (renter, _) = test_support::login_renter(&state).await;

        let err = place_booking(&state, &renter, request("1", 1, 3, false), None)
            .await
            .unwrap_err();
        assert!(matches!(err, RentalError::NotFound(_)));
        assert_eq!(store.patch_calls.load(Ordering::SeqCst), 1);
        assert!(user_bookings(&state, "2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancel_and_status_rules() {
        let state = test_support::seeded_state().await;
        let (renter, _) = test_support::login_renter(&state).await;
        let (admin, _) = test_support::login_admin(&state).await;
        let first = place_booking(&state, &renter, request("1", 1, 2, false), None)
            .await
            .unwrap()
            .booking;
        let second = place_booking(&state, &renter, request("2", 5, 1, false), None)
            .await
            .unwrap()
            .booking;

        let not_owner = cancel_booking(&state, &admin, &first.id).await;
        assert!(matches!(not_owner, Err(RentalError::Forbidden(_))));

        let cancelled = cancel_booking(&state, &renter, &first.id).await.unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        assert_eq!(cancelled.start_date, first.start_date);

        let again = cancel_booking(&state, &renter, &first.id).await;
        assert!(matches!(again, Err(RentalError::Conflict(_))));

        let completed = set_booking_status(&state, &second.id, BookingStatus::Completed)
            .await
            .unwrap();
        assert_eq!(completed.status, BookingStatus::Completed);
        let reopen = set_booking_status(&state, &second.id, BookingStatus::Upcoming).await;
        assert!(matches!(reopen, Err(RentalError::Conflict(_))));
    }

    #[tokio::test]
    async fn quote_uses_given_balance() {
        let state = test_support::seeded_state().await;
        let req = BookingRequest {
            car_id: String::from("1"),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
            use_points: true,
        };
        let priced = quote(&state, &req, 40).await.unwrap();
        assert_eq!(priced.base_price, 150.0);
        assert_eq!(priced.total, 146.0);
    }
}
