use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered account.
///
/// `own_task_ids` and `shared_task_ids` are a denormalized index of the tasks
/// related to this user. Access decisions never read them; the task's own
/// `owner` and `shared_to` fields are authoritative.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub hashed_password: String,
    pub own_task_ids: Vec<Uuid>,
    pub shared_task_ids: Vec<Uuid>,
}

/// Fields needed to persist a new user. The store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub hashed_password: String,
}

/// Credentials posted to `/signup`.
#[derive(Debug, Deserialize)]
pub struct UserInput {
    pub username: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashed_password_is_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            username: "alice".into(),
            hashed_password: "$2b$04$secret".into(),
            own_task_ids: vec![],
            shared_task_ids: vec![],
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("hashed_password").is_none());
        assert_eq!(json["username"], "alice");
        assert!(json["own_task_ids"].as_array().unwrap().is_empty());
    }
}
