use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Stored password material, never serialized.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: String,
    pub password_hash: String,
    pub password_salt: String,
}
