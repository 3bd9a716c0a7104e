//! Account endpoints: authentication and account recovery notifications.

use crate::client::{ApiClient, ApiError, HttpMethod, decode};
use crate::models::TokenResponse;
use lockvault_core::constants::SERVICE_RESULT_OK;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
struct AuthRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct ForgotRequest<'a> {
    email: &'a str,
}

/// `true` when the body is an object whose `ServiceResult` equals 1.
fn service_result_ok(value: &Value) -> bool {
    value
        .as_object()
        .and_then(|obj| obj.get("ServiceResult"))
        .and_then(Value::as_i64)
        == Some(SERVICE_RESULT_OK)
}

impl ApiClient {
    /// Exchange a username and password for an account token
    ///
    /// # Errors
    ///
    /// Propagates transport errors unchanged; a response without `Token`
    /// returns `ApiError::MalformedResponse`.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<String, ApiError> {
        info!(username, "Authenticating account");

        let body = AuthRequest { username, password };
        let response = self
            .call(
                HttpMethod::Post,
                "v4/account/authenticate/",
                &[("apikey", self.client_id())],
                Some(&body),
            )
            .await?;

        let token: TokenResponse = decode(response, "authentication response")?;
        Ok(token.token)
    }

    /// Ask the service to send a password reset email
    ///
    /// Fire-and-forget: a non-200 answer is reported as `Ok(false)` rather
    /// than an error. Requests that never got an answer still fail.
    pub async fn forgot_password(&self, email: &str) -> Result<bool, ApiError> {
        self.account_notification("v4/account/resetpassword", email)
            .await
    }

    /// Ask the service to send a username reminder email
    ///
    /// Same semantics as [`ApiClient::forgot_password`].
    pub async fn forgot_username(&self, email: &str) -> Result<bool, ApiError> {
        self.account_notification("v4/account/retrieveusername", email)
            .await
    }

    /// Email verification lookup (`GET v4/account/emailverification/{id}`)
    ///
    /// The endpoint rejects every id observed so far, so no request is made.
    pub async fn email_verification_details(&self, id: &str) -> Result<Value, ApiError> {
        Err(ApiError::unimplemented(format!(
            "email verification details for '{id}'"
        )))
    }

    async fn account_notification(&self, path: &str, email: &str) -> Result<bool, ApiError> {
        let body = ForgotRequest { email };
        match self
            .call(
                HttpMethod::Post,
                path,
                &[("apikey", self.client_id())],
                Some(&body),
            )
            .await
        {
            Ok(response) => Ok(service_result_ok(&response)),
            Err(e @ ApiError::Status { .. }) => {
                warn!("Notification request to '{}' rejected: {}", path, e);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!({"ServiceResult": 1}), true)]
    #[case(json!({"ServiceResult": 0}), false)]
    #[case(json!({"ServiceResult": "1"}), false)]
    #[case(json!({}), false)]
    #[case(json!([1]), false)]
    #[case(json!(1), false)]
    fn test_service_result_ok(#[case] body: Value, #[case] expected: bool) {
        assert_eq!(service_result_ok(&body), expected);
    }

    #[test]
    fn test_auth_request_body() {
        let body = AuthRequest {
            username: "alice",
            password: "hunter2",
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"username": "alice", "password": "hunter2"})
        );
    }
}
