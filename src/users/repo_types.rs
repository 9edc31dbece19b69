use serde::Serialize;
use sqlx::FromRow;
use time::{Date, OffsetDateTime};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Registered account as stored in `users`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String, // argon2 PHC string for signup-created accounts
    pub province: String,
    pub city: String,
    pub district: String,
    pub sub_district: String,
    pub address: String,
    #[serde(serialize_with = "iso_date::option::serialize")]
    pub date_of_birth: Option<Date>,
    pub bank_account: Option<String>,
    pub points: i32,
    pub role: String,
    #[serde(serialize_with = "time::serde::rfc3339::serialize")]
    pub created_at: OffsetDateTime,
    #[serde(serialize_with = "time::serde::rfc3339::serialize")]
    pub updated_at: OffsetDateTime,
}

/// Fields accepted when a user row is inserted.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub province: String,
    pub city: String,
    pub district: String,
    pub sub_district: String,
    pub address: String,
    pub date_of_birth: Option<Date>,
    pub bank_account: Option<String>,
    /// `None` leaves the column default ("user").
    pub role: Option<String>,
}

/// One collection event recorded for a user. Append-only.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserHistory {
    pub id: i64,
    pub user_id: i64,
    pub address: String,
    #[serde(serialize_with = "time::serde::rfc3339::serialize")]
    pub time: OffsetDateTime,
    pub day: String,
}
