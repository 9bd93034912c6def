use crate::api::with_state;
use crate::integration::Collection;
use crate::methods;
use crate::model::Car;
use crate::state::AppState;
use warp::http::{Method, StatusCode};
use warp::{Filter, Reply};

pub fn main(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    warp::path("cars")
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
            let cars =
                methods::store_fn::list_records::<Car>(state.store.as_ref(), Collection::Cars, &[])
                    .await;
            match cars {
                Ok(cars) => methods::standard_replies::response_with_obj(cars, StatusCode::OK),
                Err(err) => methods::standard_replies::from_error(err),
            }
        })
}
