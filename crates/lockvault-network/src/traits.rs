//! Seams between the API client and the layers that drive it.
//!
//! The session store and the code generation engine only need a handful of
//! calls. Expressing them as traits lets tests substitute in-memory mocks
//! for [`ApiClient`] without a network.
//!
//! All traits use native `async fn` methods (Edition 2024), so they are not
//! object-safe; consumers take generic parameters instead of trait objects.

#![allow(async_fn_in_trait)]

use crate::client::{ApiClient, ApiError};
use lockvault_core::{AccessTime, LockRecord};

/// Account calls needed to repair a session: token exchange and lock discovery.
pub trait AccountService {
    /// Exchange a username and password for a token.
    async fn authenticate(&self, username: &str, password: &str) -> Result<String, ApiError>;

    /// List locks via the device-key listing.
    async fn list_locks(&self, username: &str, token: &str) -> Result<Vec<LockRecord>, ApiError>;

    /// List locks via the rich product listing.
    async fn list_products(&self, username: &str, token: &str)
    -> Result<Vec<LockRecord>, ApiError>;
}

/// Source of temporary codes for a lock.
pub trait ServiceCodeSource {
    /// Code valid at `access_time`, or the currently active code for `None`.
    async fn service_code(
        &self,
        username: &str,
        token: &str,
        kms_id: &str,
        access_time: Option<AccessTime>,
    ) -> Result<String, ApiError>;
}

impl AccountService for ApiClient {
    async fn authenticate(&self, username: &str, password: &str) -> Result<String, ApiError> {
        ApiClient::authenticate(self, username, password).await
    }

    async fn list_locks(&self, username: &str, token: &str) -> Result<Vec<LockRecord>, ApiError> {
        ApiClient::list_locks(self, username, token).await
    }

    async fn list_products(
        &self,
        username: &str,
        token: &str,
    ) -> Result<Vec<LockRecord>, ApiError> {
        ApiClient::list_products(self, username, token).await
    }
}

impl ServiceCodeSource for ApiClient {
    async fn service_code(
        &self,
        username: &str,
        token: &str,
        kms_id: &str,
        access_time: Option<AccessTime>,
    ) -> Result<String, ApiError> {
        self.generate_temporary_code(username, token, kms_id, access_time)
            .await
    }
}
