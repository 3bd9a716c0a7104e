//! Persisted session config.
//!
//! The config is a single JSON object:
//!
//! ```text
//! {
//!   "API_key": "…",
//!   "locks": [ { "KMS_id": "…", "device_id": "…" } ],
//!   "password": "…",
//!   "username": "…"
//! }
//! ```
//!
//! Keys are written sorted with two-space indentation so the file diffs
//! cleanly and stays hand-editable. Keys the client does not know about are
//! kept and written back unchanged.

use crate::error::StorageResult;
use lockvault_core::LockRecord;
use lockvault_core::constants::CONFIG_INDENT;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;
use tracing::{info, warn};

/// Key used by an older schema for the lock list. Never read.
const LEGACY_PRODUCTS_KEY: &str = "products";

/// `null` decodes to the field's default instead of failing.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Session state persisted between runs.
///
/// `Default` is the all-empty skeleton used when no file exists, so every
/// field is always present downstream.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Account token obtained from authentication
    #[serde(rename = "API_key", default, deserialize_with = "null_as_default")]
    pub token: String,

    /// Locks discovered on the account, in server order
    #[serde(default, deserialize_with = "null_as_default")]
    pub locks: Vec<LockRecord>,

    /// Only needed until a token has been obtained
    #[serde(default, deserialize_with = "null_as_default")]
    pub password: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,

    /// Unrecognised keys, preserved on save
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SessionConfig {
    /// Whether a token is cached.
    #[must_use]
    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }

    /// Find a lock by its KMS id.
    #[must_use]
    pub fn lock(&self, kms_id: &str) -> Option<&LockRecord> {
        self.locks.iter().find(|lock| lock.kms_id == kms_id)
    }

    /// Load a config file.
    ///
    /// A missing file yields the empty skeleton. A file that exists but does
    /// not parse is an error, and the caller should not overwrite it.
    pub fn load(path: &Path) -> StorageResult<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("Config file '{}' not found", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let config: SessionConfig = serde_json::from_str(&text)?;
        info!("Loaded config '{}'", path.display());

        if config.extra.contains_key(LEGACY_PRODUCTS_KEY) {
            warn!(
                "Config '{}' has a '{}' key from an older schema; it is kept but ignored, locks are read from 'locks'",
                path.display(),
                LEGACY_PRODUCTS_KEY
            );
        }

        Ok(config)
    }

    /// Serialise to the on-disk text: sorted keys, two-space indent, trailing newline.
    pub fn to_pretty_json(&self) -> StorageResult<String> {
        // Going through Value sorts every object's keys, nested locks included
        let value = serde_json::to_value(self)?;

        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(CONFIG_INDENT);
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value.serialize(&mut ser)?;
        buf.push(b'\n');

        let text = String::from_utf8(buf).map_err(|e| io::Error::new(ErrorKind::InvalidData, e))?;
        Ok(text)
    }

    /// Write the config file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, self.to_pretty_json()?)?;
        info!("Saved config '{}'", path.display());
        Ok(())
    }
}
