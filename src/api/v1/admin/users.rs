use crate::api::with_state;
use crate::methods;
use crate::state::AppState;
use warp::http::{Method, StatusCode};
use warp::{Filter, Reply};

pub fn main(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    warp::path("users")
        .and(warp::path::end())
        .and(warp::method())
        .and(warp::header::<String>("auth"))
        .and(with_state(state))
        .and_then(|method: Method, auth: String, state: AppState| async move {
            if method != Method::GET {
                return methods::standard_replies::method_not_allowed_response();
            }
            if let Err(err) = methods::admin::admin_session(&state, &auth).await {
                return methods::standard_replies::from_error(err);
            }
            match methods::admin::list_users(&state).await {
                Ok(users) => methods::standard_replies::response_with_obj(users, StatusCode::OK),
                Err(err) => methods::standard_replies::from_error(err),
            }
        })
}
