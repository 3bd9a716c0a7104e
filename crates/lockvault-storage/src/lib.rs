//! Session storage for the lock vault client.
//!
//! This crate owns the only on-disk state: a JSON config holding the
//! account username, password, cached token and discovered locks.
//!
//! # Architecture
//!
//! - [`SessionConfig`] - the persisted document (sorted keys, hand-editable)
//! - [`SessionStore`] - file location plus the load-and-repair cycle that
//!   fills a missing token or lock list through an
//!   [`AccountService`](lockvault_network::AccountService)
//!
//! # Persistence Guarantee
//!
//! `load_and_repair` writes the config back after every repair attempt,
//! including failed ones. A token obtained before a later step fails is
//! therefore kept for the next run.
//!
//! # Examples
//!
//! ```
//! use lockvault_storage::SessionConfig;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("config.json");
//!
//! let config = SessionConfig {
//!     username: "alice".to_string(),
//!     ..Default::default()
//! };
//! config.save(&path).unwrap();
//!
//! assert_eq!(SessionConfig::load(&path).unwrap(), config);
//! ```

pub mod config;
pub mod error;
pub mod session;

pub use config::SessionConfig;
pub use error::{StorageError, StorageResult};
pub use session::{DiscoverySource, SessionStore};
