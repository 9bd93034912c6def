mod admin;
mod booking;
mod car;
mod user;


use warp::Filter;

use crate::state::AppState;

pub fn api_v1(
    state: AppState,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path("v1")
        .and(
            user::api_v1_user(state.clone())
                .or(car::api_v1_car(state.clone()))
                .or(booking::api_v1_booking(state.clone()))
                .or(admin::api_v1_admin(state)),
        )
        .and(warp::path::end())
}
