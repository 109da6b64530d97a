// Panel records - the rows the seeder writes and the renderer reads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bind address used for every allocation the seeder creates
pub const WILDCARD_IP: &str = "0.0.0.0";

/// Volume root handed to the node daemon
pub const DEFAULT_DAEMON_BASE: &str = "/var/lib/pterodactyl/volumes";

/// Upload limit in MB for new nodes
pub const DEFAULT_UPLOAD_SIZE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub uuid: Uuid,
    pub email: String,
    pub username: String,
    /// Argon2id PHC string, never the cleartext password
    pub password: String,
    pub name_first: String,
    pub name_last: String,
    pub root_admin: bool,
    pub language: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub uuid: Uuid,
    pub email: String,
    pub username: String,
    pub password: String,
    pub name_first: String,
    pub name_last: String,
    pub root_admin: bool,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: u64,
    pub short: String,
    pub long: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewLocation {
    pub short: String,
    pub long: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl std::str::FromStr for Scheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            other => Err(format!("expected http or https, got '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: u64,
    pub uuid: Uuid,
    pub name: String,
    pub description: String,
    pub location_id: u64,
    pub public: bool,
    pub fqdn: String,
    pub scheme: Scheme,
    pub behind_proxy: bool,
    pub maintenance_mode: bool,
    pub memory: u64,
    pub memory_overallocate: i32,
    pub disk: u64,
    pub disk_overallocate: i32,
    pub upload_size: u32,
    pub daemon_listen: u16,
    pub daemon_sftp: u16,
    pub daemon_base: String,
    pub daemon_token_id: String,
    /// Plaintext when handed out by a store. Stores keep it encrypted at rest.
    pub daemon_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNode {
    pub uuid: Uuid,
    pub name: String,
    pub description: String,
    pub location_id: u64,
    pub public: bool,
    pub fqdn: String,
    pub scheme: Scheme,
    pub behind_proxy: bool,
    pub maintenance_mode: bool,
    pub memory: u64,
    pub memory_overallocate: i32,
    pub disk: u64,
    pub disk_overallocate: i32,
    pub upload_size: u32,
    pub daemon_listen: u16,
    pub daemon_sftp: u16,
    pub daemon_base: String,
    pub daemon_token_id: String,
    pub daemon_token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub id: u64,
    pub node_id: u64,
    pub ip: String,
    pub port: u16,
    pub ip_alias: Option<String>,
    pub server_id: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAllocation {
    pub node_id: u64,
    pub ip: String,
    pub port: u16,
    pub ip_alias: Option<String>,
    pub server_id: Option<u64>,
}
