//! User domain model.
//!
//! The engine only needs enough of a user to address roster reports and
//! attribute actions; approvers and reviewers elsewhere are plain ids with
//! explicit lookups, never navigated relationships.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::faker::name::en::Name;
    use fake::Fake;

    #[test]
    fn test_user_serialization_roundtrip() {
        let user = User {
            id: Uuid::new_v4(),
            email: SafeEmail().fake(),
            full_name: Name().fake(),
            is_active: true,
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&user).unwrap();
        let back: User = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, user.id);
        assert_eq!(back.email, user.email);
        assert!(back.is_active);
    }
}
