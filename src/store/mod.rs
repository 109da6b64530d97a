mod crypto;
mod json;
mod models;

pub use crypto::{CryptoError, Encrypter};
pub use json::JsonStore;
pub use models::{
    Allocation, Location, NewAllocation, NewLocation, NewNode, NewUser, Node, Scheme, User,
    DEFAULT_DAEMON_BASE, DEFAULT_UPLOAD_SIZE, WILDCARD_IP,
};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store data is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Duplicate {table} record: {key}")]
    Duplicate { table: &'static str, key: String },

    #[error("{table} references missing parent id {id}")]
    MissingParent { table: &'static str, id: u64 },

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// Lookup, existence check and insert over the panel tables.
///
/// Inserts enforce the unique keys (user email, location short code, node
/// name, allocation node/ip/port) and the parent references (node to
/// location, allocation to node). Nothing here updates an existing row.
pub trait Store {
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    fn insert_user(&mut self, user: NewUser) -> Result<User, StoreError>;

    fn find_location_by_short(&self, short: &str) -> Result<Option<Location>, StoreError>;
    fn insert_location(&mut self, location: NewLocation) -> Result<Location, StoreError>;

    fn find_node_by_name(&self, name: &str) -> Result<Option<Node>, StoreError>;
    fn insert_node(&mut self, node: NewNode) -> Result<Node, StoreError>;

    fn allocation_exists(&self, node_id: u64, ip: &str, port: u16) -> Result<bool, StoreError>;
    fn insert_allocation(&mut self, allocation: NewAllocation) -> Result<Allocation, StoreError>;
    fn allocations_for_node(&self, node_id: u64) -> Result<Vec<Allocation>, StoreError>;
}

/// Where the store lives and how its secrets are sealed
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub app_key: String,
}

/// Open the on-disk store. This is the only way the binaries get a handle.
pub fn open_store(config: &StoreConfig) -> Result<JsonStore, StoreError> {
    let encrypter = Encrypter::from_app_key(&config.app_key)?;
    JsonStore::open(&config.path, encrypter)
}

pub fn default_store_path() -> PathBuf {
    directories::UserDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
        .join("PanelBootstrap")
        .join("store.json")
}
