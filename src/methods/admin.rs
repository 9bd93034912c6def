use crate::helper_model::{Overview, RentalError};
use crate::integration::Collection;
use crate::methods::store_fn;
use crate::model::{Car, CarPatch, NewCar, PublishUser, User};
use crate::state::AppState;

/// Resolve the `auth` header and require the admin role.
pub async fn admin_session(state: &AppState, auth: &str) -> Result<PublishUser, RentalError> {
    let user = state.sessions.verify(auth).await?;
    if !user.is_admin() {
        return Err(RentalError::Forbidden(String::from("You are not an admin.")));
    }
    Ok(user)
}

pub async fn overview(state: &AppState) -> Result<Overview, RentalError> {
    let store = state.store.as_ref();
    let (cars, bookings, users) = tokio::try_join!(
        store.list(Collection::Cars, &[]),
        store.list(Collection::Bookings, &[]),
        store.list(Collection::Users, &[]),
    )?;
    Ok(Overview {
        cars: cars.len(),
        bookings: bookings.len(),
        users: users.len(),
    })
}

pub async fn list_users(state: &AppState) -> Result<Vec<PublishUser>, RentalError> {
    let users: Vec<User> =
        store_fn::list_records(state.store.as_ref(), Collection::Users, &[]).await?;
    Ok(users.into_iter().map(PublishUser::from).collect())
}

fn check_car_fields(
    make: Option<&str>,
    model: Option<&str>,
    price_per_day: Option<f64>,
    seats: Option<u32>,
) -> Result<(), RentalError> {
    if make.is_some_and(|m| m.trim().is_empty()) || model.is_some_and(|m| m.trim().is_empty()) {
        return Err(RentalError::Validation(String::from("Make and model are required")));
    }
    if price_per_day.is_some_and(|p| !p.is_finite() || p <= 0.0) {
        return Err(RentalError::Validation(String::from("Price per day must be positive")));
    }
    if seats == Some(0) {
        return Err(RentalError::Validation(String::from("A car needs at least one seat")));
    }
    Ok(())
}

pub async fn create_car(state: &AppState, new_car: NewCar) -> Result<Car, RentalError> {
    check_car_fields(
        Some(new_car.make.as_str()),
        Some(new_car.model.as_str()),
        Some(new_car.price_per_day),
        Some(new_car.seats),
    )?;
    let store = state.store.as_ref();
    let id = state.ids.allocate(store, Collection::Cars).await?;
    let car = store_fn::create_record(store, Collection::Cars, &new_car.into_car(id)).await?;
    log::info!("car {} added: {} {}", car.id, car.make, car.model);
    Ok(car)
}

pub async fn update_car(state: &AppState, car_id: &str, patch: CarPatch) -> Result<Car, RentalError> {
    check_car_fields(
        patch.make.as_deref(),
        patch.model.as_deref(),
        patch.price_per_day,
        patch.seats,
    )?;
    store_fn::patch_record(state.store.as_ref(), Collection::Cars, car_id, &patch).await
}

/// Bookings of a removed car keep their copied make, model and image.
pub async fn delete_car(state: &AppState, car_id: &str) -> Result<(), RentalError> {
    state.store.delete(Collection::Cars, car_id).await?;
    log::info!("car {} deleted", car_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::booking;
    use crate::helper_model::BookingRequest;
    use crate::model::{CarCategory, Transmission};
    use crate::test_support;
    use chrono::{Duration, Utc};

    fn new_car(price: f64) -> NewCar {
        NewCar {
            make: String::from("Kia"),
            model: String::from("Carnival"),
            year: 2024,
            category: CarCategory::Vans,
            price_per_day: price,
            available: true,
            transmission: Transmission::Automatic,
            seats: 8,
            image: String::new(),
        }
    }

    #[tokio::test]
    async fn only_admins_pass() {
        let state = test_support::seeded_state().await;
        let (_, renter_token) = test_support::login_renter(&state).await;
        let (_, admin_token) = test_support::login_admin(&state).await;
        assert!(matches!(
            admin_session(&state, &renter_token).await,
            Err(RentalError::Forbidden(_))
        ));
        assert_eq!(admin_session(&state, &admin_token).await.unwrap().id, "1");
    }

    #[tokio::test]
    async fn new_car_gets_next_id() {
        let state = test_support::seeded_state().await;
        // Seeded car ids are 1, 2, 5
        let car = create_car(&state, new_car(70.0)).await.unwrap();
        assert_eq!(car.id, "6");
        assert_eq!(overview(&state).await.unwrap().cars, 4);

        let rejected = create_car(&state, new_car(0.0)).await;
        assert!(matches!(rejected, Err(RentalError::Validation(_))));
    }

    #[tokio::test]
    async fn update_and_delete_car() {
        let state = test_support::seeded_state().await;
        let updated = update_car(
            &state,
            "1",
            CarPatch {
                price_per_day: Some(55.0),
                available: Some(false),
                ..CarPatch::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.price_per_day, 55.0);
        assert!(!updated.available);
        assert_eq!(updated.make, "Toyota");

        assert!(matches!(
            update_car(&state, "1", CarPatch { make: Some(String::from(" ")), ..CarPatch::default() }).await,
            Err(RentalError::Validation(_))
        ));
        assert!(matches!(delete_car(&state, "99").await, Err(RentalError::NotFound(_))));
    }

    #[tokio::test]
    async fn bookings_survive_car_deletion() {
        let state = test_support::seeded_state().await;
        let (renter, _) = test_support::login_renter(&state).await;
        let start = Utc::now().date_naive() + Duration::days(1);
        booking::place_booking(
            &state,
            &renter,
            BookingRequest {
                car_id: String::from("2"),
                start_date: start,
                end_date: start + Duration::days(1),
                use_points: false,
            },
            None,
        )
        .await
        .unwrap();
        delete_car(&state, "2").await.unwrap();

        let history = booking::user_bookings(&state, &renter.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].car_make, "Ford");
        assert_eq!(history[0].car_model, "Mustang");

        let users = list_users(&state).await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(overview(&state).await.unwrap().bookings, 1);
    }
}
