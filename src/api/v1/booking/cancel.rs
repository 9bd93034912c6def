use crate::api::with_state;
use crate::methods;
use crate::state::AppState;
use warp::http::{Method, StatusCode};
use warp::{Filter, Reply};

pub fn main(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    warp::path!("cancel" / String)
        .and(warp::path::end())
        .and(warp::method())
        .and(warp::header::<String>("auth"))
        .and(with_state(state))
        .and_then(|booking_id: String, method: Method, auth: String, state: AppState| async move {
            if method != Method::POST {
                return methods::standard_replies::method_not_allowed_response();
            }
            let session_user = match state.sessions.verify(&auth).await {
                Ok(user) => user,
                Err(err) => return methods::standard_replies::from_error(err),
            };
            match methods::booking::cancel_booking(&state, &session_user, &booking_id).await {
                Ok(booking) => methods::standard_replies::response_with_obj(booking, StatusCode::OK),
                Err(err) => methods::standard_replies::from_error(err),
            }
        })
}
