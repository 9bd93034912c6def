use crate::api::with_state;
use crate::helper_model::BookingRequest;
use crate::methods;
use crate::state::AppState;
use warp::http::{Method, StatusCode};
use warp::{Filter, Reply};

pub fn main(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    warp::path("new")
        .and(warp::path::end())
        .and(warp::method())
        .and(warp::body::json())
        .and(warp::header::<String>("auth"))
        .and(warp::header::optional::<String>("idempotency-key"))
        .and(with_state(state))
        .and_then(
            |method: Method,
             body: BookingRequest,
             auth: String,
             idempotency_key: Option<String>,
             state: AppState| async move {
                if method != Method::POST {
                    return methods::standard_replies::method_not_allowed_response();
                }
                let session_user = match state.sessions.verify(&auth).await {
                    Ok(user) => user,
                    Err(err) => return methods::standard_replies::from_error(err),
                };
                match methods::booking::place_booking(&state, &session_user, body, idempotency_key).await {
                    Ok(placed) => methods::standard_replies::response_with_obj(placed, StatusCode::CREATED),
                    Err(err) => methods::standard_replies::from_error(err),
                }
            },
        )
}
