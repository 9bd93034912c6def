use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserializer;
use serde_derive::{Deserialize, Serialize};

// Field names follow the data store's JSON documents (camelCase).

/// Ids written by this service are strings; older store documents carry
/// plain numbers.
pub fn id_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Whole(i64),
    }
    Ok(match <RawId as serde::Deserialize>::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Whole(n) => n.to_string(),
    })
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarCategory {
    Compact,
    Sedans,
    SUVs,
    Luxury,
    #[serde(rename = "Sports Cars")]
    SportsCars,
    Vans,
    Trucks,
    Convertibles,
    #[serde(rename = "Electric/Hybrids")]
    ElectricHybrids,
    Motorcycles,
}

impl CarCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            CarCategory::Compact => "Compact",
            CarCategory::Sedans => "Sedans",
            CarCategory::SUVs => "SUVs",
            CarCategory::Luxury => "Luxury",
            CarCategory::SportsCars => "Sports Cars",
            CarCategory::Vans => "Vans",
            CarCategory::Trucks => "Trucks",
            CarCategory::Convertibles => "Convertibles",
            CarCategory::ElectricHybrids => "Electric/Hybrids",
            CarCategory::Motorcycles => "Motorcycles",
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transmission {
    Automatic,
    Manual,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Upcoming,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Upcoming is the only non-terminal status.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Upcoming, BookingStatus::Completed)
                | (BookingStatus::Upcoming, BookingStatus::Cancelled)
        )
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    #[serde(deserialize_with = "id_text")]
    pub id: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub category: CarCategory,
    pub price_per_day: f64,
    pub available: bool,
    pub transmission: Transmission,
    pub seats: u32,
    #[serde(default)]
    pub image: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewCar {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub category: CarCategory,
    pub price_per_day: f64,
    pub available: bool,
    pub transmission: Transmission,
    pub seats: u32,
    #[serde(default)]
    pub image: String,
}

impl NewCar {
    pub fn into_car(self, id: String) -> Car {
        Car {
            id,
            make: self.make,
            model: self.model,
            year: self.year,
            category: self.category,
            price_per_day: self.price_per_day,
            available: self.available,
            transmission: self.transmission,
            seats: self.seats,
            image: self.image,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CarPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CarCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_day: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmission: Option<Transmission>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seats: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(deserialize_with = "id_text")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub password: String, // Hashed!
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub loyalty_points: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublishUser {
    #[serde(deserialize_with = "id_text")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    pub loyalty_points: i64,
    pub created_at: DateTime<Utc>,
}

impl PublishUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<User> for PublishUser {
    fn from(user: User) -> Self {
        PublishUser {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            role: user.role,
            loyalty_points: user.loyalty_points,
            created_at: user.created_at,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(deserialize_with = "id_text")]
    pub id: String,
    #[serde(deserialize_with = "id_text")]
    pub user_id: String,
    #[serde(deserialize_with = "id_text")]
    pub car_id: String,
    // Copied from the car at booking time
    pub car_make: String,
    pub car_model: String,
    pub car_image: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: f64,
    pub status: BookingStatus,
    pub booked_at: DateTime<Utc>,
}
