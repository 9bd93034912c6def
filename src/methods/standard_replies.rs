use crate::helper_model::{self, RentalError};
use crate::methods::tokens::PublishAccessToken;
use crate::model;
use warp::http::StatusCode;
use warp::{Rejection, Reply};

fn error_reply(title: &str, message: String, status: StatusCode) -> warp::reply::Response {
    let msg = helper_model::ErrorResponse {
        title: String::from(title),
        message,
    };
    warp::reply::with_status(warp::reply::json(&msg), status).into_response()
}

pub fn bad_request(err_msg: &str) -> Result<warp::reply::Response, Rejection> {
    Ok(error_reply("Bad Request", err_msg.to_string(), StatusCode::BAD_REQUEST))
}

pub fn internal_server_error_response(msg: String) -> Result<warp::reply::Response, Rejection> {
    log::error!("internal server error: {}", msg);
    Ok(error_reply(
        "Internal Server Error",
        String::from("Please try again later."),
        StatusCode::INTERNAL_SERVER_ERROR,
    ))
}

pub fn method_not_allowed_response() -> Result<warp::reply::Response, Rejection> {
    Ok(error_reply(
        "Method Not Allowed",
        String::from("This endpoint does not support that HTTP method."),
        StatusCode::METHOD_NOT_ALLOWED,
    ))
}

pub fn not_found(what: &str) -> Result<warp::reply::Response, Rejection> {
    Ok(error_reply(
        "Not Found",
        format!("{} not found", what),
        StatusCode::NOT_FOUND,
    ))
}

/// Map a domain error onto its HTTP reply.
pub fn from_error(err: RentalError) -> Result<warp::reply::Response, Rejection> {
    match err {
        RentalError::Validation(msg) => bad_request(&msg),
        RentalError::Conflict(msg) => Ok(error_reply("Conflict", msg, StatusCode::CONFLICT)),
        RentalError::InvalidCredentials => Ok(error_reply(
            "Unauthorized",
            String::from("Invalid credentials"),
            StatusCode::UNAUTHORIZED,
        )),
        RentalError::TokenFormat => bad_request("Token not in hex format"),
        RentalError::Unauthorized => Ok(error_reply(
            "Unauthorized",
            String::from("Token not valid"),
            StatusCode::UNAUTHORIZED,
        )),
        RentalError::Forbidden(msg) => {
            Ok(error_reply("Permission Denied", msg, StatusCode::FORBIDDEN))
        }
        RentalError::NotFound(what) => not_found(&what),
        RentalError::Transport(msg) => {
            log::error!("data store failure: {}", msg);
            Ok(error_reply(
                "Service Unavailable",
                String::from("Failed to reach the data store. Please try again."),
                StatusCode::BAD_GATEWAY,
            ))
        }
        RentalError::Internal(msg) => internal_server_error_response(msg),
    }
}

pub fn response_with_obj<T>(obj: T, status_code: StatusCode) -> Result<warp::reply::Response, Rejection>
where
    T: serde::Serialize,
{
    Ok(warp::reply::with_status(warp::reply::json(&obj), status_code).into_response())
}

pub fn auth_user_reply(
    user: &model::PublishUser,
    token_data: &PublishAccessToken,
    is_created: bool,
) -> Result<warp::reply::Response, Rejection> {
    let body = serde_json::json!({
        "user": user,
        "accessToken": token_data,
    });
    let reply = warp::reply::json(&body);
    let reply = warp::reply::with_header(reply, "token", token_data.token.clone());
    let status_code = if is_created { StatusCode::CREATED } else { StatusCode::OK };
    Ok(warp::reply::with_status(reply, status_code).into_response())
}
