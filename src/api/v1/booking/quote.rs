use crate::api::with_state;
use crate::helper_model::BookingRequest;
use crate::methods;
use crate::state::AppState;
use warp::http::{Method, StatusCode};
use warp::{Filter, Reply};

pub fn main(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    warp::path("quote")
        .and(warp::path::end())
        .and(warp::method())
        .and(warp::body::json())
        .and(warp::header::optional::<String>("auth"))
        .and(with_state(state))
        .and_then(
            |method: Method, body: BookingRequest, auth: Option<String>, state: AppState| async move {
                if method != Method::POST {
                    return methods::standard_replies::method_not_allowed_response();
                }
                // Anonymous visitors get a quote without points
                let loyalty_points = match auth {
                    None => 0,
                    Some(auth) => match state.sessions.verify(&auth).await {
                        Ok(user) => user.loyalty_points,
                        Err(err) => return methods::standard_replies::from_error(err),
                    },
                };
                match methods::booking::quote(&state, &body, loyalty_points).await {
                    Ok(quote) => methods::standard_replies::response_with_obj(quote, StatusCode::OK),
                    Err(err) => methods::standard_replies::from_error(err),
                }
            },
        )
}
