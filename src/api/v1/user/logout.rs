use crate::api::with_state;
use crate::methods;
use crate::state::AppState;
use warp::http::{Method, StatusCode};
use warp::{Filter, Reply};

pub fn main(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    warp::path("logout")
        .and(warp::path::end())
        .and(warp::method())
        .and(warp::header::<String>("auth"))
        .and(with_state(state))
        .and_then(|method: Method, auth: String, state: AppState| async move {
            if method != Method::POST {
                return methods::standard_replies::method_not_allowed_response();
            }
            match state.sessions.revoke(&auth).await {
                Ok(()) => Ok(StatusCode::NO_CONTENT.into_response()),
                Err(err) => methods::standard_replies::from_error(err),
            }
        })
}
