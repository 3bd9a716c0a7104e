//! In-memory code source for testing and development.
//!
//! [`MockCodeSource`] answers service-code requests without a network and
//! records every access time it was asked for, so callers can check the
//! exact request sequence an engine run produced.

use lockvault_core::AccessTime;
use lockvault_network::{ApiError, HttpMethod, ServiceCodeSource};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

/// Scripted [`ServiceCodeSource`].
///
/// Requests are answered in this order:
///
/// 1. Access times registered with [`fail_with`](Self::fail_with) fail once
///    with the given error
/// 2. Access times registered with [`fail_at`](Self::fail_at) fail with a
///    500 status error
/// 3. Access times registered with [`code_at`](Self::code_at) get that code
/// 4. Anything else gets a six-digit code counting up from `000001` per call
///
/// # Examples
///
/// ```
/// use lockvault_codegen::mock::MockCodeSource;
/// use lockvault_core::AccessTime;
/// use lockvault_network::ServiceCodeSource;
///
/// # futures::executor::block_on(async {
/// let t = AccessTime::parse("2024-01-02 04:00:00").unwrap();
/// let source = MockCodeSource::new().fail_at(t);
///
/// assert!(source.service_code("alice", "T1", "K1", Some(t)).await.is_err());
/// assert_eq!(source.service_code("alice", "T1", "K1", None).await.unwrap(), "000002");
/// assert_eq!(source.requests(), vec![Some(t), None]);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct MockCodeSource {
    codes: HashMap<AccessTime, String>,
    failures: HashSet<AccessTime>,
    scripted_errors: Mutex<HashMap<AccessTime, ApiError>>,
    requests: Mutex<Vec<Option<AccessTime>>>,
}

impl MockCodeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests for `access_time` with `code`.
    #[must_use]
    pub fn code_at(mut self, access_time: AccessTime, code: impl Into<String>) -> Self {
        self.codes.insert(access_time, code.into());
        self
    }

    /// Fail requests for `access_time`.
    #[must_use]
    pub fn fail_at(mut self, access_time: AccessTime) -> Self {
        self.failures.insert(access_time);
        self
    }

    /// Fail the first request for `access_time` with `error`.
    ///
    /// Later requests for the same time fall through to the other rules.
    #[must_use]
    pub fn fail_with(mut self, access_time: AccessTime, error: ApiError) -> Self {
        self.scripted_errors
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(access_time, error);
        self
    }

    /// Access times requested so far, in call order (`None` for the current code).
    pub fn requests(&self) -> Vec<Option<AccessTime>> {
        self.recorded().clone()
    }

    /// Number of requests answered so far.
    pub fn call_count(&self) -> usize {
        self.recorded().len()
    }

    fn recorded(&self) -> MutexGuard<'_, Vec<Option<AccessTime>>> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ServiceCodeSource for MockCodeSource {
    async fn service_code(
        &self,
        _username: &str,
        _token: &str,
        kms_id: &str,
        access_time: Option<AccessTime>,
    ) -> Result<String, ApiError> {
        let call = {
            let mut requests = self.recorded();
            requests.push(access_time);
            requests.len()
        };

        if let Some(t) = access_time {
            let scripted = self
                .scripted_errors
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .remove(&t);
            if let Some(error) = scripted {
                return Err(error);
            }
            if self.failures.contains(&t) {
                return Err(ApiError::Status {
                    method: HttpMethod::Get,
                    url: format!("mock://kmsdevice/{kms_id}/servicecode/?accessTime={t}"),
                    status: 500,
                    body: "Internal Server Error".to_string(),
                });
            }
            if let Some(code) = self.codes.get(&t) {
                return Ok(code.clone());
            }
        }

        Ok(format!("{call:06}"))
    }
}
