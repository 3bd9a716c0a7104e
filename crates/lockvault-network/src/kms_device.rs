//! KMS device endpoints: temporary service codes and the master code.

use crate::client::{ApiClient, ApiError, HttpMethod, decode};
use crate::models::{MasterCodeResponse, ServiceCodeResponse};
use lockvault_core::AccessTime;
use serde_json::Value;
use tracing::trace;

impl ApiClient {
    /// Request a temporary code for a lock
    ///
    /// With `Some(access_time)` the service returns the code valid for that
    /// epoch. With `None` it returns the code currently active.
    ///
    /// # Errors
    ///
    /// Propagates transport errors; a response without `ServiceCode`
    /// returns `ApiError::MalformedResponse`.
    pub async fn generate_temporary_code(
        &self,
        username: &str,
        token: &str,
        kms_id: &str,
        access_time: Option<AccessTime>,
    ) -> Result<String, ApiError> {
        let path = format!("v4/kmsdevice/{kms_id}/servicecode/");
        let wire_time = access_time.map(|t| t.wire_format());

        let mut query = vec![("username", username), ("apikey", token)];
        if let Some(wire_time) = wire_time.as_deref() {
            query.push(("accessTime", wire_time));
        }
        trace!(kms_id, access_time = ?wire_time, "Requesting service code");

        let response = self
            .call(HttpMethod::Get, &path, &query, None::<&()>)
            .await?;

        let code: ServiceCodeResponse = decode(response, "service code response")?;
        Ok(code.service_code)
    }

    /// Fetch the lock's master (backup) code
    ///
    /// Only the owner may call this. Codes are directional sequences.
    pub async fn master_backup_code(
        &self,
        username: &str,
        token: &str,
        kms_id: &str,
    ) -> Result<String, ApiError> {
        let path = format!("v4/kmsdevice/{kms_id}/mastercode");
        let response = self
            .call(
                HttpMethod::Get,
                &path,
                &[("username", username), ("apikey", token)],
                None::<&()>,
            )
            .await?;

        let code: MasterCodeResponse = decode(response, "master code response")?;
        Ok(code.master_code)
    }

    /// `PUT v4/kmsdevice/{id}` trait update
    ///
    /// The trait payload format is not worked out; no request is made.
    pub async fn update_traits(
        &self,
        _username: &str,
        _token: &str,
        kms_id: &str,
    ) -> Result<Value, ApiError> {
        Err(ApiError::unimplemented(format!(
            "device trait update for '{kms_id}'"
        )))
    }
}
