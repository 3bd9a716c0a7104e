//! Session store: load the config, fill gaps from the API, persist.

use crate::config::SessionConfig;
use crate::error::{StorageError, StorageResult};
use lockvault_core::constants::DEFAULT_CONFIG_PATH;
use lockvault_network::AccountService;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Which listing populates an empty lock list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiscoverySource {
    /// `v4/kmsdevicekey/`: device id and KMS id only
    #[default]
    DeviceKeys,

    /// `v4/product?complex=true`: adds name, location and model metadata
    Products,
}

/// Owner of the session config file
///
/// # Example
///
/// ```no_run
/// use lockvault_network::{ApiClient, ApiClientConfig};
/// use lockvault_storage::{DiscoverySource, SessionStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::new(ApiClientConfig::default())?;
/// let store = SessionStore::new("config.json").discovery(DiscoverySource::Products);
///
/// let session = store.load_and_repair(&client).await?;
/// println!("{} locks for {}", session.locks.len(), session.username);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
    discovery: DiscoverySource,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_PATH)
    }
}

impl SessionStore {
    /// Create a store for the given config path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            discovery: DiscoverySource::default(),
        }
    }

    /// Set the listing used to discover locks
    pub fn discovery(mut self, discovery: DiscoverySource) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config file (skeleton when absent)
    pub fn load(&self) -> StorageResult<SessionConfig> {
        SessionConfig::load(&self.path)
    }

    /// Write the config file
    pub fn save(&self, config: &SessionConfig) -> StorageResult<()> {
        config.save(&self.path)
    }

    /// Load the config, fill in what is missing, and persist it
    ///
    /// Repair steps, in order:
    ///
    /// 1. Empty `username` fails with a configuration error
    /// 2. Empty token: authenticate with the password, failing with a
    ///    configuration error if there is no password either
    /// 3. Empty lock list: discover locks
    ///
    /// The config is saved after the repair attempt whether it succeeded or
    /// not, so a token obtained before a discovery failure is not lost. When
    /// repair fails its error is returned and a save failure is only logged.
    ///
    /// # Errors
    ///
    /// - `StorageError::Json` / `StorageError::Io` if the existing file
    ///   cannot be read; nothing is written in that case
    /// - `StorageError::Configuration` for missing username or credentials
    /// - `StorageError::Api` if authentication or discovery fails
    pub async fn load_and_repair<A: AccountService>(
        &self,
        account: &A,
    ) -> StorageResult<SessionConfig> {
        let mut config = self.load()?;

        let repaired = self.repair(&mut config, account).await;
        let saved = self.save(&config);

        match (repaired, saved) {
            (Ok(()), Ok(())) => Ok(config),
            (Ok(()), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(save_error)) => {
                error!(
                    "Failed to save config '{}' after repair error: {}",
                    self.path.display(),
                    save_error
                );
                Err(e)
            }
        }
    }

    async fn repair<A: AccountService>(
        &self,
        config: &mut SessionConfig,
        account: &A,
    ) -> StorageResult<()> {
        if config.username.is_empty() {
            return Err(StorageError::configuration("missing username"));
        }

        if config.token.is_empty() {
            if config.password.is_empty() {
                return Err(StorageError::configuration("missing credentials"));
            }
            info!("No API key, getting from API...");
            config.token = account
                .authenticate(&config.username, &config.password)
                .await?;
        }

        if config.locks.is_empty() {
            info!(source = ?self.discovery, "No known locks, getting from API...");
            config.locks = match self.discovery {
                DiscoverySource::DeviceKeys => {
                    account.list_locks(&config.username, &config.token).await?
                }
                DiscoverySource::Products => {
                    account
                        .list_products(&config.username, &config.token)
                        .await?
                }
            };
            info!(count = config.locks.len(), "Discovered locks");
        }

        Ok(())
    }
}
