mod booking_status;
mod bookings;
mod cars;
mod delete_car;
mod new_car;
mod overview;
mod update_car;
mod users;

use warp::Filter;

use crate::state::AppState;

pub fn api_v1_admin(
    state: AppState,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path("admin")
        .and(
            overview::main(state.clone())
                .or(cars::main(state.clone()))
                .or(bookings::main(state.clone()))
                .or(users::main(state.clone()))
                .or(new_car::main(state.clone()))
                .or(update_car::main(state.clone()))
                .or(delete_car::main(state.clone()))
                .or(booking_status::main(state)),
        )
        .and(warp::path::end())
}
