use crate::api::with_state;
use crate::integration::Collection;
use crate::methods;
use crate::model::Car;
use crate::state::AppState;
use warp::http::{Method, StatusCode};
use warp::{Filter, Reply};

pub fn main(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    warp::path!("get" / String)
        .and(warp::path::end())
        .and(warp::method())
        .and(with_state(state))
        .and_then(|car_id: String, method: Method, state: AppState| async move {
            if method != Method::GET {
                return methods::standard_replies::method_not_allowed_response();
            }
            let car =
                methods::store_fn::get_record::<Car>(state.store.as_ref(), Collection::Cars, &car_id)
                    .await;
            match car {
                Ok(car) => methods::standard_replies::response_with_obj(car, StatusCode::OK),
                Err(err) => methods::standard_replies::from_error(err),
            }
        })
}
