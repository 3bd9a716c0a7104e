use crate::{
    Result,
    constants::{ACCESS_TIME_FORMAT, ACCESS_TIME_FORMAT_ISO, CODE_STAMP_FORMAT},
    error::Error,
    ids::{id_string, opt_id_string},
};
use chrono::{NaiveDateTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Point in time for which a temporary code is requested.
///
/// Access times are naive local wall-clock values truncated to the whole
/// hour. No offset is attached: the service interprets the string in the
/// lock's own local time, so the client never converts between zones.
/// Advancing by a duration moves wall-clock time, which keeps every epoch
/// on the same hour-of-day grid across DST changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccessTime(NaiveDateTime);

impl AccessTime {
    /// Create an access time, dropping minutes, seconds and sub-seconds.
    #[must_use]
    pub fn new(dt: NaiveDateTime) -> Self {
        AccessTime(dt.date().and_hms_opt(dt.hour(), 0, 0).unwrap_or(dt))
    }

    /// Local midnight of the calendar day following `now`.
    ///
    /// This is the default start of a generation run.
    ///
    /// # Errors
    /// Returns `Error::AccessTimeOverflow` if `now` is the last representable day.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use lockvault_core::AccessTime;
    ///
    /// let now = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(17, 42, 9).unwrap();
    /// let start = AccessTime::next_midnight(now).unwrap();
    /// assert_eq!(start.wire_format(), "2024-01-02 00:00:00");
    /// ```
    pub fn next_midnight(now: NaiveDateTime) -> Result<Self> {
        now.date()
            .succ_opt()
            .and_then(|tomorrow| tomorrow.and_hms_opt(0, 0, 0))
            .map(AccessTime)
            .ok_or_else(|| Error::AccessTimeOverflow {
                from: now.to_string(),
                hours: 24,
            })
    }

    /// Parse `YYYY-MM-DD HH:MM:SS` (or the `T`-separated ISO form).
    ///
    /// # Errors
    /// Returns `Error::InvalidAccessTime` if the text matches neither format.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let dt = NaiveDateTime::parse_from_str(s, ACCESS_TIME_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(s, ACCESS_TIME_FORMAT_ISO))
            .map_err(|e| Error::InvalidAccessTime {
                message: format!("'{s}': {e}"),
            })?;
        Ok(AccessTime::new(dt))
    }

    /// Add a duration, failing instead of wrapping at the end of the calendar.
    ///
    /// # Errors
    /// Returns `Error::AccessTimeOverflow` if the result is not representable.
    pub fn checked_add(self, duration: TimeDelta) -> Result<Self> {
        self.0
            .checked_add_signed(duration)
            .map(AccessTime)
            .ok_or_else(|| Error::AccessTimeOverflow {
                from: self.wire_format(),
                hours: duration.num_hours(),
            })
    }

    /// Format as the `accessTime` query value.
    #[must_use]
    pub fn wire_format(&self) -> String {
        self.0.format(ACCESS_TIME_FORMAT).to_string()
    }

    /// Compact `YYYY-MM-DD_HH` stamp used when printing codes.
    #[must_use]
    pub fn stamp(&self) -> String {
        self.0.format(CODE_STAMP_FORMAT).to_string()
    }

    /// Get the inner naive date-time.
    #[must_use]
    pub fn inner(&self) -> &NaiveDateTime {
        &self.0
    }
}

impl fmt::Display for AccessTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.wire_format())
    }
}

impl std::str::FromStr for AccessTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        AccessTime::parse(s)
    }
}

/// A lock registered to the account.
///
/// `kms_id` is the stable key used to request codes; `device_id` and `name`
/// are only shown to the user. The optional fields are filled when the lock
/// was discovered through the product listing.
///
/// Field names on disk follow the persisted config schema (`KMS_id`,
/// `model_SKU`). Ids written as JSON numbers are read as text, and keys the
/// client does not know are kept in `extra` and written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockRecord {
    #[serde(deserialize_with = "id_string")]
    pub device_id: String,

    #[serde(rename = "KMS_id", deserialize_with = "id_string")]
    pub kms_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(
        default,
        deserialize_with = "opt_id_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub product_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    #[serde(
        default,
        deserialize_with = "opt_id_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub primary_code: Option<String>,

    #[serde(
        default,
        deserialize_with = "opt_id_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub model_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,

    #[serde(
        default,
        deserialize_with = "opt_id_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub model_number: Option<String>,

    #[serde(
        rename = "model_SKU",
        default,
        deserialize_with = "opt_id_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub model_sku: Option<String>,

    /// Unrecognised keys, preserved on save
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl LockRecord {
    /// Create a bare record from a device-key listing entry.
    pub fn new(device_id: impl Into<String>, kms_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            kms_id: kms_id.into(),
            name: None,
            product_id: None,
            latitude: None,
            longitude: None,
            primary_code: None,
            model_id: None,
            model_name: None,
            model_number: None,
            model_sku: None,
            extra: BTreeMap::new(),
        }
    }

    /// Human-readable label for menus: `device_id`, plus the product name when known.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => format!("{} ({})", self.device_id, name),
            _ => self.device_id.clone(),
        }
    }
}

/// A temporary code issued for one access time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeResult {
    pub access_time: AccessTime,
    pub code: String,
}

impl CodeResult {
    pub fn new(access_time: AccessTime, code: impl Into<String>) -> Self {
        Self {
            access_time,
            code: code.into(),
        }
    }
}

impl fmt::Display for CodeResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.code, self.access_time.stamp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_access_time_truncates_to_hour() {
        let t = AccessTime::new(at(2024, 1, 2, 7, 59, 59));
        assert_eq!(t.wire_format(), "2024-01-02 07:00:00");
    }

    #[rstest]
    #[case(at(2024, 1, 1, 0, 0, 0), "2024-01-02 00:00:00")]
    #[case(at(2024, 1, 1, 23, 59, 59), "2024-01-02 00:00:00")]
    #[case(at(2024, 2, 28, 12, 0, 0), "2024-02-29 00:00:00")]
    #[case(at(2023, 12, 31, 8, 30, 0), "2024-01-01 00:00:00")]
    fn test_next_midnight(#[case] now: NaiveDateTime, #[case] expected: &str) {
        assert_eq!(AccessTime::next_midnight(now).unwrap().wire_format(), expected);
    }

    #[rstest]
    #[case("2024-01-02 04:00:00", "2024-01-02 04:00:00")]
    #[case("2024-01-02T08:00:00", "2024-01-02 08:00:00")]
    #[case(" 2024-01-02 09:15:00 ", "2024-01-02 09:00:00")]
    fn test_access_time_parse(#[case] input: &str, #[case] expected: &str) {
        let t: AccessTime = input.parse().unwrap();
        assert_eq!(t.wire_format(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("02/01/2024 04:00:00")]
    #[case("2024-13-01 00:00:00")]
    fn test_access_time_parse_invalid(#[case] input: &str) {
        assert!(matches!(
            AccessTime::parse(input),
            Err(Error::InvalidAccessTime { .. })
        ));
    }

    #[test]
    fn test_checked_add_crosses_midnight() {
        let t = AccessTime::new(at(2024, 1, 2, 20, 0, 0));
        let next = t.checked_add(TimeDelta::hours(4)).unwrap();
        assert_eq!(next.wire_format(), "2024-01-03 00:00:00");
        assert!(next > t);
    }

    #[test]
    fn test_checked_add_overflow() {
        let t = AccessTime::new(NaiveDateTime::MAX);
        assert!(matches!(
            t.checked_add(TimeDelta::hours(4)),
            Err(Error::AccessTimeOverflow { hours: 4, .. })
        ));
    }

    #[test]
    fn test_stamp_format() {
        let t = AccessTime::new(at(2024, 1, 2, 8, 0, 0));
        assert_eq!(t.stamp(), "2024-01-02_08");
    }

    #[test]
    fn test_code_result_display() {
        let result = CodeResult::new(AccessTime::new(at(2024, 1, 2, 0, 0, 0)), "AAA111");
        assert_eq!(result.to_string(), "AAA111 2024-01-02_00");
    }

    #[test]
    fn test_lock_record_serde_names() {
        let lock = LockRecord::new("ABC123", "kms-1");
        let json = serde_json::to_value(&lock).unwrap();
        assert_eq!(json, serde_json::json!({"device_id": "ABC123", "KMS_id": "kms-1"}));

        let parsed: LockRecord = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, lock);
    }

    #[test]
    fn test_lock_record_model_sku_rename() {
        let mut lock = LockRecord::new("ABC123", "kms-1");
        lock.model_sku = Some("4400D".to_string());
        let json = serde_json::to_value(&lock).unwrap();
        assert_eq!(json["model_SKU"], "4400D");
    }

    #[test]
    fn test_lock_record_numeric_ids() {
        let lock: LockRecord = serde_json::from_value(serde_json::json!({
            "device_id": 1234,
            "KMS_id": 5678,
            "primary_code": 1020,
            "model_SKU": "4400D"
        }))
        .unwrap();

        assert_eq!(lock.device_id, "1234");
        assert_eq!(lock.kms_id, "5678");
        assert_eq!(lock.primary_code.as_deref(), Some("1020"));
        assert_eq!(lock.model_sku.as_deref(), Some("4400D"));
        assert!(lock.extra.is_empty());
    }

    #[test]
    fn test_lock_record_keeps_unknown_keys() {
        let json = serde_json::json!({"device_id": "D", "KMS_id": "K", "note": "shed"});
        let lock: LockRecord = serde_json::from_value(json.clone()).unwrap();

        assert_eq!(lock.extra.get("note"), Some(&Value::from("shed")));
        assert_eq!(serde_json::to_value(&lock).unwrap(), json);
    }

    #[rstest]
    #[case(None, "ABC123")]
    #[case(Some(""), "ABC123")]
    #[case(Some("Shed"), "ABC123 (Shed)")]
    fn test_lock_record_label(#[case] name: Option<&str>, #[case] expected: &str) {
        let mut lock = LockRecord::new("ABC123", "kms-1");
        lock.name = name.map(str::to_string);
        assert_eq!(lock.label(), expected);
    }
}
