//! Network layer for the lock vault client
//!
//! This crate wraps the vendor REST API: an HTTP transport with the
//! service's success rules, and typed calls for the endpoints the client
//! uses.
//!
//! # Components
//!
//! - **ApiClient**: transport plus endpoint methods
//! - **account**: authentication and recovery notifications
//! - **products**: lock discovery (device keys and product listing)
//! - **kms_device**: temporary service codes and the master code
//! - **traits**: [`AccountService`] and [`ServiceCodeSource`] seams used by
//!   the session store and the code generator
//!
//! # Example
//!
//! ```no_run
//! use lockvault_network::{ApiClient, ApiClientConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(ApiClientConfig::default())?;
//! let token = client.authenticate("alice", "hunter2").await?;
//! for lock in client.list_locks("alice", &token).await? {
//!     println!("{} -> {}", lock.device_id, lock.kms_id);
//! }
//! # Ok(())
//! # }
//! ```

mod account;
mod client;
mod kms_device;
pub mod models;
mod products;
pub mod traits;

pub use client::{ApiClient, ApiClientConfig, ApiError, HttpMethod};
pub use traits::{AccountService, ServiceCodeSource};
