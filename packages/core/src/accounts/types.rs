use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A verified account.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub fullname: String,
    pub email: String,
    pub password_hash: String,
    pub global_pin: u32,
    pub verified: bool,
    /// Medicine ids in the order they were linked.
    pub medicines: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub fullname: String,
    pub email: String,
    pub password_hash: String,
    pub global_pin: u32,
}

/// A signup waiting for OTP confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingUser {
    pub id: i64,
    pub fullname: String,
    pub email: String,
    pub password_hash: String,
    pub otp: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPendingUser {
    pub fullname: String,
    pub email: String,
    pub password_hash: String,
    pub otp: u32,
    pub created_at: DateTime<Utc>,
}

/// Account details safe to return to clients: no password hash, no OTP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub fullname: String,
    pub email: String,
    pub global_pin: u32,
    pub verified: bool,
    pub medicines: Vec<i64>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            fullname: user.fullname,
            email: user.email,
            global_pin: user.global_pin,
            verified: user.verified,
            medicines: user.medicines,
        }
    }
}
