use serde::Deserialize;

use crate::auth::is_valid_email;
use crate::error::ApiError;
use crate::users::repo_types::NewUser;

/// Admin-side account creation. All fields are required and non-empty.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String, // e.g. admin, user, banksampah
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let blank = [&self.name, &self.password, &self.role]
            .iter()
            .any(|v| v.trim().is_empty());
        if blank || !is_valid_email(self.email.trim()) {
            return Err(ApiError::invalid_format());
        }
        Ok(())
    }

    /// The password is stored exactly as submitted here, unlike signup which
    /// hashes it. Login rejects such accounts since the stored value is not a hash.
    pub fn into_new_user(self) -> NewUser {
        NewUser {
            name: self.name,
            email: self.email.trim().to_string(),
            password: self.password,
            role: Some(self.role),
            ..Default::default()
        }
    }
}

/// Profile update. Absent fields become empty strings: the update replaces,
/// it does not merge.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub district: String,
    #[serde(default, alias = "subDistrict")]
    pub sub_district: String,
    #[serde(default)]
    pub address: String,
}
