use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::users::repo::{UserType, UserWithEntryCount};

/// Credentials for the admin console session login.
#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password_plaintext: String,
}

/// Body for setting a user's password from the console.
#[derive(Debug, Deserialize)]
pub struct AdminPasswordRequest {
    pub new_password_plaintext: String,
}

/// One row of the console's user listing.
#[derive(Debug, Serialize)]
pub struct AdminUserRow {
    pub id: i64,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub registered_on: OffsetDateTime,
    pub email_confirmed: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub email_confirmed_on: Option<OffsetDateTime>,
    pub user_type: UserType,
    pub entry_count: i64,
}

impl From<UserWithEntryCount> for AdminUserRow {
    fn from(row: UserWithEntryCount) -> Self {
        Self {
            id: row.user.id,
            email: row.user.email,
            registered_on: row.user.registered_on,
            email_confirmed: row.user.email_confirmed,
            email_confirmed_on: row.user.email_confirmed_on,
            user_type: row.user.user_type,
            entry_count: row.entry_count,
        }
    }
}
