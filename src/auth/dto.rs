use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{rbac::Role, repo::User};

/// Request body for user registration. The `password` field carries the
/// plaintext at this boundary; it is hashed before anything is persisted.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Form body for login. Following the OAuth2 password-grant shape, the
/// `username` form field carries the user's email.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub username: String,
    pub role: Role,
}

/// Public part of the user returned to clients. Never carries the hash.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyTokenRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyTokenResponse {
    pub valid: bool,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Returned by forgot-password whether or not the email exists, so the
/// response never reveals which addresses are registered.
pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If your email is registered, you will receive a password reset link.";

pub const RESET_SUCCESS_MESSAGE: &str = "Password has been reset successfully";

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn public_user_serialization_hides_nothing_it_should_show() {
        let user = User {
            id: Uuid::new_v4(),
            username: "bob".into(),
            email: "bob@example.com".into(),
            hashed_password: "hash".into(),
            role: Role::Manager,
            reset_token: None,
            reset_token_expires: None,
            created_at: OffsetDateTime::now_utc(),
        };
        let public = PublicUser::from(user);
        let json = serde_json::to_string(&public).unwrap();
        assert!(json.contains("bob@example.com"));
        assert!(json.contains("\"manager\""));
        assert!(!json.contains("hash"));
    }

    #[test]
    fn login_response_shape() {
        let response = LoginResponse {
            access_token: "jwt".into(),
            token_type: "bearer",
            username: "bob".into(),
            role: Role::Technician,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"token_type\":\"bearer\""));
        assert!(json.contains("\"role\":\"technician\""));
    }

    #[test]
    fn register_request_role_defaults_to_none() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"username":"a","email":"a@b.c","password":"longer1A!"}"#,
        )
        .unwrap();
        assert!(req.role.is_none());
    }
}
