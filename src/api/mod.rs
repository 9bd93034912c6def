mod v1;

use std::convert::Infallible;

use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::helper_model::ErrorResponse;
use crate::state::AppState;

pub fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

pub fn api(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    warp::path("api")
        .and(v1::api_v1(state))
        .and(warp::path::end())
        .recover(handle_rejection)
}

async fn handle_rejection(err: Rejection) -> Result<warp::reply::Response, Infallible> {
    let (status, title, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not Found", String::from("No such endpoint"))
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, "Bad Request", e.to_string())
    } else if let Some(e) = err.find::<warp::reject::MissingHeader>() {
        if e.name() == "auth" {
            (StatusCode::UNAUTHORIZED, "Unauthorized", String::from("Please log in first"))
        } else {
            (StatusCode::BAD_REQUEST, "Bad Request", e.to_string())
        }
    } else if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        (StatusCode::BAD_REQUEST, "Bad Request", e.to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "Method Not Allowed",
            String::from("This endpoint does not support that HTTP method."),
        )
    } else {
        log::error!("unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            String::from("Please try again later."),
        )
    };
    let msg = ErrorResponse {
        title: String::from(title),
        message,
    };
    Ok(warp::reply::with_status(warp::reply::json(&msg), status).into_response())
}
