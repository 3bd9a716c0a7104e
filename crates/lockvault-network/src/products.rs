//! Device discovery and product endpoints.
//!
//! Two listings describe the locks on an account:
//!
//! - `v4/kmsdevicekey/` returns bare `{DeviceId, KMSDeviceId}` pairs
//! - `v4/product?complex=true` returns full product objects with location,
//!   primary code and model metadata
//!
//! Both are normalised into [`LockRecord`] in server order.

use crate::client::{ApiClient, ApiError, HttpMethod, decode};
use crate::models::{KmsDeviceKey, Product};
use lockvault_core::LockRecord;
use serde_json::Value;
use tracing::{debug, info};

impl ApiClient {
    /// List the locks associated with the account via the device-key listing
    ///
    /// An empty list is valid. Order matches the server response.
    ///
    /// # Errors
    ///
    /// Propagates transport errors; an entry missing `DeviceId` or
    /// `KMSDeviceId` returns `ApiError::MalformedResponse`.
    pub async fn list_locks(&self, username: &str, token: &str) -> Result<Vec<LockRecord>, ApiError> {
        info!(username, "Listing lock device keys");

        let response = self
            .call(
                HttpMethod::Get,
                "v4/kmsdevicekey/",
                &[("username", username), ("apikey", token)],
                None::<&()>,
            )
            .await?;

        let keys: Vec<KmsDeviceKey> = decode(response, "device key list")?;
        debug!(count = keys.len(), "Decoded device keys");

        Ok(keys.into_iter().map(LockRecord::from).collect())
    }

    /// List the products registered with the account, as lock records
    ///
    /// Uses the rich product listing, so the returned records carry name,
    /// location, primary code and model metadata when the service provides them.
    pub async fn list_products(
        &self,
        username: &str,
        token: &str,
    ) -> Result<Vec<LockRecord>, ApiError> {
        info!(username, "Listing products");

        let response = self
            .call(
                HttpMethod::Get,
                "v4/product?complex=true",
                &[("username", username), ("apikey", token)],
                None::<&()>,
            )
            .await?;

        let products: Vec<Product> = decode(response, "product list")?;
        debug!(count = products.len(), "Decoded products");

        Ok(products.into_iter().map(LockRecord::from).collect())
    }

    /// Fetch a single product registered with the account
    pub async fn get_product(
        &self,
        username: &str,
        token: &str,
        product_id: &str,
    ) -> Result<Product, ApiError> {
        let path = format!("v4/product/{product_id}");
        let response = self
            .call(
                HttpMethod::Get,
                &path,
                &[("username", username), ("apikey", token)],
                None::<&()>,
            )
            .await?;

        decode(response, "product")
    }

    /// `GET v4/kmsdevice/{id}/getavailablefirmwareversions`
    ///
    /// Upstream rejects every request observed so far; no request is made.
    pub async fn available_firmware_versions(
        &self,
        _username: &str,
        _token: &str,
        kms_id: &str,
    ) -> Result<Value, ApiError> {
        Err(ApiError::unimplemented(format!(
            "available firmware versions for '{kms_id}'"
        )))
    }

    /// `GET v4/kmsdevice/{id}/firmwareupdate`
    ///
    /// Requires ownership and answers 400 "No firmware available" for every
    /// lock tried; no request is made.
    pub async fn firmware_update(
        &self,
        _username: &str,
        _token: &str,
        kms_id: &str,
    ) -> Result<Value, ApiError> {
        Err(ApiError::unimplemented(format!(
            "firmware update for '{kms_id}'"
        )))
    }

    /// `GET v4/kmsdevice/{id}/getspecifiedfirmwareupgrade`
    ///
    /// Unverified; no request is made.
    pub async fn specified_firmware_upgrade(
        &self,
        _username: &str,
        _token: &str,
        kms_id: &str,
        current_version: u64,
        requested_version: u64,
    ) -> Result<Value, ApiError> {
        Err(ApiError::unimplemented(format!(
            "firmware upgrade {current_version} -> {requested_version} for '{kms_id}'"
        )))
    }
}
