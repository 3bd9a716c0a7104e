//! Epoch schedule for a generation run.
//!
//! A schedule is a start time, a number of epochs and an epoch length. The
//! service hands out one temporary code per epoch, so a run asks for the
//! code valid at the start of each epoch in turn.
//!
//! # Examples
//!
//! ```
//! use chrono::TimeDelta;
//! use lockvault_codegen::CodeSchedule;
//! use lockvault_core::AccessTime;
//!
//! let start = AccessTime::parse("2024-01-02 00:00:00").unwrap();
//! let schedule = CodeSchedule::new(start).with_epoch_count(3);
//!
//! let times: Vec<String> = schedule
//!     .access_times()
//!     .map(|t| t.wire_format())
//!     .collect();
//! assert_eq!(
//!     times,
//!     ["2024-01-02 00:00:00", "2024-01-02 04:00:00", "2024-01-02 08:00:00"]
//! );
//! assert_eq!(schedule.epoch_duration(), TimeDelta::hours(4));
//! ```

use chrono::{NaiveDateTime, TimeDelta};
use lockvault_core::constants::{DEFAULT_EPOCH_COUNT, EPOCH_HOURS};
use lockvault_core::{AccessTime, Error, Result};

/// Start, length and count of the epochs to request codes for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeSchedule {
    start: AccessTime,
    epoch_count: u32,
    epoch_duration: TimeDelta,
}

impl CodeSchedule {
    /// Schedule of the default length (21,900 four-hour epochs) from `start`.
    #[must_use]
    pub fn new(start: AccessTime) -> Self {
        Self {
            start,
            epoch_count: DEFAULT_EPOCH_COUNT,
            epoch_duration: TimeDelta::hours(EPOCH_HOURS),
        }
    }

    /// Default schedule starting at local midnight after `now`.
    ///
    /// # Errors
    /// Returns `Error::AccessTimeOverflow` if tomorrow is not representable.
    pub fn starting_tomorrow(now: NaiveDateTime) -> Result<Self> {
        Ok(Self::new(AccessTime::next_midnight(now)?))
    }

    #[must_use]
    pub fn with_start(mut self, start: AccessTime) -> Self {
        self.start = start;
        self
    }

    #[must_use]
    pub fn with_epoch_count(mut self, epoch_count: u32) -> Self {
        self.epoch_count = epoch_count;
        self
    }

    #[must_use]
    pub fn with_epoch_duration(mut self, epoch_duration: TimeDelta) -> Self {
        self.epoch_duration = epoch_duration;
        self
    }

    pub fn start(&self) -> AccessTime {
        self.start
    }

    pub fn epoch_count(&self) -> u32 {
        self.epoch_count
    }

    pub fn epoch_duration(&self) -> TimeDelta {
        self.epoch_duration
    }

    /// Check the schedule can be walked to the end.
    ///
    /// The epoch length must be a positive whole number of hours, and the
    /// cursor position after the last epoch must be a representable time.
    ///
    /// # Errors
    /// - `Error::InvalidSchedule` for a zero, negative or fractional epoch length
    /// - `Error::AccessTimeOverflow` if the run would pass the end of the calendar
    pub fn validate(&self) -> Result<()> {
        if self.epoch_duration <= TimeDelta::zero() {
            return Err(Error::InvalidSchedule(format!(
                "epoch duration must be positive, got {}",
                self.epoch_duration
            )));
        }

        if self.epoch_duration != TimeDelta::hours(self.epoch_duration.num_hours()) {
            return Err(Error::InvalidSchedule(format!(
                "epoch duration must be whole hours, got {}",
                self.epoch_duration
            )));
        }

        let total = self
            .offset(self.epoch_count)
            .ok_or_else(|| Error::AccessTimeOverflow {
                from: self.start.wire_format(),
                hours: self
                    .epoch_duration
                    .num_hours()
                    .saturating_mul(i64::from(self.epoch_count)),
            })?;
        self.start.checked_add(total)?;

        Ok(())
    }

    /// Time from the start to the beginning of epoch `epochs`.
    fn offset(&self, epochs: u32) -> Option<TimeDelta> {
        let millis = self
            .epoch_duration
            .num_milliseconds()
            .checked_mul(i64::from(epochs))?;
        TimeDelta::try_milliseconds(millis)
    }

    /// Access time of the epoch at `index`, if it is part of the schedule.
    #[must_use]
    pub fn access_time(&self, index: u32) -> Option<AccessTime> {
        if index >= self.epoch_count {
            return None;
        }
        self.start.checked_add(self.offset(index)?).ok()
    }

    /// Every access time in the schedule, in order.
    ///
    /// Stops early if a time would not be representable; call
    /// [`validate`](Self::validate) first to rule that out.
    pub fn access_times(&self) -> impl Iterator<Item = AccessTime> + '_ {
        (0..self.epoch_count).map_while(|index| self.access_time(index))
    }
}
