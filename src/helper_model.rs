use crate::model;
use crate::methods::rental_rate::{BookingQuote, LoyaltyUpdate};
use chrono::NaiveDate;
use serde_derive::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ErrorResponse {
    pub title: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RentalError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Token not in hex format")]
    TokenFormat,
    #[error("Token not valid")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("data store: {0}")]
    Transport(String),
    #[error("{0}")]
    Internal(String),
}

impl From<reqwest::Error> for RentalError {
    fn from(err: reqwest::Error) -> Self {
        RentalError::Transport(err.to_string())
    }
}

impl From<tokio::task::JoinError> for RentalError {
    fn from(err: tokio::task::JoinError) -> Self {
        RentalError::Internal(format!("blocking task failed: {}", err))
    }
}

impl From<serde_json::Error> for RentalError {
    fn from(err: serde_json::Error) -> Self {
        RentalError::Transport(format!("malformed record: {}", err))
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub car_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub use_points: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct StatusChangeRequest {
    pub status: model::BookingStatus,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PlacedBooking {
    pub booking: model::Booking,
    pub quote: BookingQuote,
    pub loyalty: LoyaltyUpdate,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Overview {
    pub cars: usize,
    pub bookings: usize,
    pub users: usize,
}
