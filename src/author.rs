//! Authors of articles: users and the organizations they publish under

use crate::record::{Record, impl_record};
use crate::storage::Value;
use crate::storage::schema::{ORGANIZATIONS, USERS};

/// A dev.to user, keyed by username
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    values: Vec<Value>,
}

impl_record!(User, USERS);

impl User {
    pub fn username(&self) -> Option<&str> {
        self.text("username")
    }

    pub fn name(&self) -> Option<&str> {
        self.text("name")
    }

    pub fn github_user_name(&self) -> Option<&str> {
        self.text("github_user_name")
    }
}

/// An organization, keyed by its username (which doubles as its slug)
#[derive(Debug, Clone, PartialEq)]
pub struct Organization {
    values: Vec<Value>,
}

impl_record!(Organization, ORGANIZATIONS);

impl Organization {
    pub fn username(&self) -> Option<&str> {
        self.text("username")
    }

    pub fn name(&self) -> Option<&str> {
        self.text("name")
    }

    pub fn slug(&self) -> Option<&str> {
        self.text("slug")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_from_json_ignores_unknown_keys() {
        let user = User::from_json(&json!({
            "name": "Ben Halpern",
            "username": "ben",
            "twitter_username": "bendhalpern",
            "github_user_name": "benhalpern",
            "user_id": 1,
            "profile_image": "https://example.com/ben.png",
        }));

        assert_eq!(user.username(), Some("ben"));
        assert_eq!(user.name(), Some("Ben Halpern"));
        assert_eq!(user.github_user_name(), Some("benhalpern"));
        assert_eq!(user.to_row().len(), 7);
        // Declared but absent
        assert_eq!(user.get("website_url"), Some(&Value::Null));
        assert_eq!(user.get("user_id"), None);
    }

    #[test]
    fn test_unique_value_is_username() {
        let org = Organization::from_json(&json!({
            "name": "The DEV Team",
            "username": "devteam",
            "slug": "devteam",
        }));
        assert_eq!(org.unique_value(), Some(&Value::from("devteam")));
        assert_eq!(org.slug(), Some("devteam"));
    }

    #[test]
    fn test_to_row_follows_declaration_order() {
        let org = Organization::from_json(&json!({
            "profile_image_90": "90.png",
            "slug": "acme",
            "username": "acme",
            "name": "Acme",
            "profile_image": "full.png",
        }));
        assert_eq!(
            org.to_row(),
            &[
                Value::from("acme"),
                Value::from("Acme"),
                Value::from("acme"),
                Value::from("full.png"),
                Value::from("90.png"),
            ]
        );
    }

    #[test]
    fn test_non_object_input_gives_all_nulls() {
        let user = User::from_json(&json!("ben"));
        assert!(user.to_row().iter().all(Value::is_null));
    }
}
