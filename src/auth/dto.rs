use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use time::{macros::format_description, Date};

use crate::error::ApiError;
use crate::users::repo_types::NewUser;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Request body for signup. Profile fields are optional; the rest are required.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub district: String,
    #[serde(default, alias = "sub_district")]
    pub sub_district: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, alias = "date_of_birth")]
    pub date_of_birth: Option<String>, // YYYY-MM-DD
    #[serde(alias = "bank_account")]
    pub bank_account: String,
}

impl SignupRequest {
    /// Checks field contents and returns the parsed date of birth, if given.
    pub fn validate(&self) -> Result<Option<Date>, ApiError> {
        if !is_valid_email(self.email.trim())
            || self.password.is_empty()
            || self.bank_account.trim().is_empty()
        {
            return Err(ApiError::invalid_format());
        }
        self.date_of_birth
            .as_deref()
            .map(|raw| Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")))
            .transpose()
            .map_err(|_| ApiError::invalid_format())
    }

    pub fn into_new_user(self, date_of_birth: Option<Date>, password_hash: String) -> NewUser {
        NewUser {
            name: self.name,
            email: self.email.trim().to_string(),
            password: password_hash,
            province: self.province,
            city: self.city,
            district: self.district,
            sub_district: self.sub_district,
            address: self.address,
            date_of_birth,
            bank_account: Some(self.bank_account.trim().to_string()),
            role: None,
        }
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(ApiError::invalid_format());
        }
        Ok(())
    }
}
