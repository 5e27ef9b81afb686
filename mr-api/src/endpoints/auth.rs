//! Authentication endpoints.

use serde::{Deserialize, Serialize};
use tracing::info;

use mr_core::error::MrResult;

use crate::client::ApiClient;
use crate::response::ActionResponse;

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct Registration<'a> {
    username: &'a str,
    password: &'a str,
    email: &'a str,
}

/// Token returned by `/api/auth/login`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub username: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// The logged-in account, from `/api/auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: String,
    #[serde(default)]
    pub email: String,
}

impl ApiClient {
    /// Log in and keep the returned token for later requests.
    pub async fn login(&self, username: &str, password: &str) -> MrResult<LoginResponse> {
        let resp: LoginResponse = self
            .post_json("/api/auth/login", &Credentials { username, password })
            .await?;
        self.set_token(Some(resp.access_token.clone())).await;
        info!("logged in as {}", resp.username);
        Ok(resp)
    }

    /// Create an account. Does not log in.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> MrResult<ActionResponse> {
        self.post_json(
            "/api/auth/register",
            &Registration {
                username,
                password,
                email,
            },
        )
        .await
    }

    /// Get the account the current token belongs to.
    pub async fn me(&self) -> MrResult<UserInfo> {
        self.get_json("/api/auth/me").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_deserialize() {
        let json = r#"{"access_token":"eyJ.x.y","token_type":"bearer","username":"alice"}"#;
        let resp: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.access_token, "eyJ.x.y");
        assert_eq!(resp.username, "alice");

        let no_type: LoginResponse =
            serde_json::from_str(r#"{"access_token":"t","username":"bob"}"#).unwrap();
        assert_eq!(no_type.token_type, "bearer");
    }

    #[test]
    fn test_user_info_without_email() {
        let info: UserInfo = serde_json::from_str(r#"{"username":"alice"}"#).unwrap();
        assert_eq!(info.email, "");
    }

    #[test]
    fn test_registration_body() {
        let body = serde_json::to_value(Registration {
            username: "alice",
            password: "pw",
            email: "a@example.com",
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"username":"alice","password":"pw","email":"a@example.com"})
        );
    }
}
