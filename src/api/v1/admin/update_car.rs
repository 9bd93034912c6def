use crate::api::with_state;
use crate::methods;
use crate::model::CarPatch;
use crate::state::AppState;
use warp::http::{Method, StatusCode};
use warp::{Filter, Reply};

pub fn main(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    warp::path!("car" / "update" / String)
        .and(warp::path::end())
        .and(warp::method())
        .and(warp::body::json())
        .and(warp::header::<String>("auth"))
        .and(with_state(state))
        .and_then(
            |car_id: String, method: Method, patch: CarPatch, auth: String, state: AppState| async move {
                if method != Method::PATCH {
                    return methods::standard_replies::method_not_allowed_response();
                }
                if let Err(err) = methods::admin::admin_session(&state, &auth).await {
                    return methods::standard_replies::from_error(err);
                }
                match methods::admin::update_car(&state, &car_id, patch).await {
                    Ok(car) => methods::standard_replies::response_with_obj(car, StatusCode::OK),
                    Err(err) => methods::standard_replies::from_error(err),
                }
            },
        )
}
