use crate::auth::models::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Profile fields a user may change; anything else in the body is ignored
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 100, message = "Title must not exceed 100 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 2048, message = "Profile image must not exceed 2048 characters"))]
    pub profile_image: Option<String>,
    #[validate(length(max = 2048, message = "LinkedIn must not exceed 2048 characters"))]
    pub linkedin: Option<String>,
    pub is_investor: Option<bool>,
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.title.is_none()
            && self.profile_image.is_none()
            && self.linkedin.is_none()
            && self.is_investor.is_none()
    }
}

/// Public view of a user; never carries credential material
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub is_email_verified: bool,
    pub title: Option<String>,
    pub profile_image: Option<String>,
    pub linkedin: Option<String>,
    pub is_investor: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            is_email_verified: user.is_email_verified,
            title: user.title,
            profile_image: user.profile_image,
            linkedin: user.linkedin,
            is_investor: user.is_investor,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::tests::test_user;
    use serde_json::json;

    #[test]
    fn test_update_request_ignores_unknown_fields() {
        let request: UpdateUserRequest = serde_json::from_value(json!({
            "email": "evil@example.com",
            "passwordHash": "x",
            "isArchived": true,
            "isInvestor": true
        }))
        .unwrap();

        assert_eq!(request.is_investor, Some(true));
        assert!(request.name.is_none());
        assert!(!request.is_empty());
    }

    #[test]
    fn test_empty_update() {
        assert!(UpdateUserRequest::default().is_empty());
        let request: UpdateUserRequest = serde_json::from_value(json!({ "email": "a@b.com" })).unwrap();
        assert!(request.is_empty());
    }

    #[test]
    fn test_update_validation() {
        let request = UpdateUserRequest {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(request.validate().is_err());

        let request = UpdateUserRequest {
            name: Some("Ada".into()),
            profile_image: Some("https://example.com/a.png".into()),
            ..Default::default()
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_response_omits_password_hash() {
        let mut user = test_user("user-1");
        user.password_hash = "$argon2id$secret".into();

        let value = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert_eq!(value["id"], json!("user-1"));
        assert!(value.get("passwordHash").is_none());
        assert!(value.get("password_hash").is_none());
        assert!(!value.to_string().contains("secret"));
    }
}
