//! Lazy temporary-code sequence.
//!
//! [`TemporaryCodes`] walks a [`CodeSchedule`] one epoch at a time. Each
//! step asks the code source for the code valid at the cursor, then moves
//! the cursor forward by one epoch whether the request succeeded or not. A
//! failed epoch is logged and recorded, and the walk carries on with the
//! next one.
//!
//! # Examples
//!
//! ```
//! use lockvault_codegen::{CodeSchedule, generate_codes, mock::MockCodeSource};
//! use lockvault_core::AccessTime;
//!
//! # futures::executor::block_on(async {
//! let start = AccessTime::parse("2024-01-02 00:00:00").unwrap();
//! let source = MockCodeSource::new().code_at(start, "AAA111");
//! let schedule = CodeSchedule::new(start).with_epoch_count(2);
//!
//! let mut codes = generate_codes(&source, "alice", "T1", "K1", &schedule).unwrap();
//! let first = codes.next().await.unwrap();
//! assert_eq!(first.to_string(), "AAA111 2024-01-02_00");
//! # });
//! ```

use crate::schedule::CodeSchedule;
use chrono::TimeDelta;
use futures::Stream;
use lockvault_core::{AccessTime, CodeResult};
use lockvault_network::{ApiError, ServiceCodeSource};
use tracing::{debug, error};

/// An epoch whose code could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpochFailure {
    /// 0-based position in the schedule
    pub index: u32,
    pub access_time: AccessTime,
    /// Display text of the error returned by the code source
    pub message: String,
}

/// Lazy, single-pass sequence of temporary codes for one lock.
///
/// Created by [`generate_codes`]. Each call to [`next`](Self::next) issues
/// requests until one succeeds or the schedule is exhausted, so a yielded
/// item may come after several failed epochs.
#[derive(Debug)]
pub struct TemporaryCodes<'a, S> {
    source: &'a S,
    username: String,
    token: String,
    kms_id: String,
    cursor: AccessTime,
    epoch_duration: TimeDelta,
    epoch_count: u32,
    index: u32,
    calls_made: u32,
    failures: Vec<EpochFailure>,
}

/// Start generating codes for `kms_id` over `schedule`.
///
/// Nothing is requested until the sequence is polled.
///
/// # Errors
/// Returns the schedule's validation error if it cannot be walked to the end.
pub fn generate_codes<'a, S: ServiceCodeSource>(
    source: &'a S,
    username: impl Into<String>,
    token: impl Into<String>,
    kms_id: impl Into<String>,
    schedule: &CodeSchedule,
) -> lockvault_core::Result<TemporaryCodes<'a, S>> {
    schedule.validate()?;

    Ok(TemporaryCodes {
        source,
        username: username.into(),
        token: token.into(),
        kms_id: kms_id.into(),
        cursor: schedule.start(),
        epoch_duration: schedule.epoch_duration(),
        epoch_count: schedule.epoch_count(),
        index: 0,
        calls_made: 0,
        failures: Vec::new(),
    })
}

/// Fetch the code active right now, without an access time.
pub async fn current_code<S: ServiceCodeSource>(
    source: &S,
    username: &str,
    token: &str,
    kms_id: &str,
) -> Result<String, ApiError> {
    source.service_code(username, token, kms_id, None).await
}

impl<'a, S: ServiceCodeSource> TemporaryCodes<'a, S> {
    /// Next successful code, or `None` once every epoch has been requested.
    pub async fn next(&mut self) -> Option<CodeResult> {
        while self.index < self.epoch_count {
            let index = self.index;
            let access_time = self.cursor;

            let outcome = self
                .source
                .service_code(&self.username, &self.token, &self.kms_id, Some(access_time))
                .await;
            self.calls_made += 1;
            self.advance();

            match outcome {
                Ok(code) => {
                    debug!(epoch = index, access_time = %access_time, "Generated temporary code");
                    return Some(CodeResult::new(access_time, code));
                }
                Err(e) => {
                    error!(
                        epoch = index,
                        access_time = %access_time,
                        "Error whilst generating temporary code {}: {}",
                        index,
                        e
                    );
                    self.failures.push(EpochFailure {
                        index,
                        access_time,
                        message: e.to_string(),
                    });
                }
            }
        }

        None
    }

    fn advance(&mut self) {
        self.index += 1;
        match self.cursor.checked_add(self.epoch_duration) {
            Ok(next) => self.cursor = next,
            Err(e) => {
                // Only reachable for schedules that skipped validation
                error!("Stopping code generation: {}", e);
                self.index = self.epoch_count;
            }
        }
    }

    /// Epochs that failed so far, in order.
    pub fn failures(&self) -> &[EpochFailure] {
        &self.failures
    }

    /// Requests issued so far.
    pub fn calls_made(&self) -> u32 {
        self.calls_made
    }

    /// Access time the next request will use.
    pub fn cursor(&self) -> AccessTime {
        self.cursor
    }

    pub fn remaining(&self) -> u32 {
        self.epoch_count - self.index
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.epoch_count
    }

    /// Adapt into a [`Stream`] of codes.
    ///
    /// The stream owns the sequence, so failures are only visible through
    /// the log once it is consumed this way.
    pub fn into_stream(self) -> impl Stream<Item = CodeResult> + 'a {
        futures::stream::unfold(self, |mut codes| async move {
            codes.next().await.map(|result| (result, codes))
        })
    }
}
