use crate::api::with_state;
use crate::methods;
use crate::model::UserPatch;
use crate::state::AppState;
use warp::http::{Method, StatusCode};
use warp::{Filter, Reply};

pub fn main(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    warp::path("update")
        .and(warp::path::end())
        .and(warp::method())
        .and(warp::body::json())
        .and(warp::header::<String>("auth"))
        .and(with_state(state))
        .and_then(|method: Method, patch: UserPatch, auth: String, state: AppState| async move {
            if method != Method::PATCH {
                return methods::standard_replies::method_not_allowed_response();
            }
            let session_user = match state.sessions.verify(&auth).await {
                Ok(user) => user,
                Err(err) => return methods::standard_replies::from_error(err),
            };
            match methods::user::update_profile(&state, &session_user, patch).await {
                Ok(user) => methods::standard_replies::response_with_obj(user, StatusCode::OK),
                Err(err) => methods::standard_replies::from_error(err),
            }
        })
}
