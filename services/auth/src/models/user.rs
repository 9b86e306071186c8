//! User model and related functionality

use chrono::{DateTime, Utc};
use serde::Serialize;

/// User entity
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub nickname: String,
    pub created_at: DateTime<Utc>,
}

/// New user creation payload, carrying an already-hashed password
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: String,
    pub password_hash: String,
    pub nickname: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_user_never_exposes_the_hash() {
        let user = User {
            id: "alice".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            nickname: "Alice".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["nickname"], "Alice");
    }
}
