use crate::api::with_state;
use crate::helper_model::LoginRequest;
use crate::methods;
use crate::state::AppState;
use warp::http::Method;
use warp::{Filter, Reply};

pub fn main(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    warp::path("login")
        .and(warp::path::end())
        .and(warp::method())
        .and(warp::body::json())
        .and(with_state(state))
        .and_then(|method: Method, login_data: LoginRequest, state: AppState| async move {
            if method != Method::POST {
                return methods::standard_replies::method_not_allowed_response();
            }
            match methods::user::login(&state, login_data).await {
                Ok((user, token)) => methods::standard_replies::auth_user_reply(&user, &token, false),
                Err(err) => methods::standard_replies::from_error(err),
            }
        })
}
