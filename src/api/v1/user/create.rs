use crate::api::with_state;
use crate::helper_model::RegisterRequest;
use crate::methods;
use crate::state::AppState;
use warp::http::Method;
use warp::{Filter, Reply};

pub fn main(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    warp::path("create")
        .and(warp::path::end())
        .and(warp::method())
        .and(warp::body::json())
        .and(with_state(state))
        .and_then(|method: Method, body: RegisterRequest, state: AppState| async move {
            if method != Method::POST {
                return methods::standard_replies::method_not_allowed_response();
            }
            match methods::user::register(&state, body).await {
                Ok((user, token)) => methods::standard_replies::auth_user_reply(&user, &token, true),
                Err(err) => methods::standard_replies::from_error(err),
            }
        })
}
