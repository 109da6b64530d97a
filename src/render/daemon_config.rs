// Node daemon configuration document

use crate::store::{Node, WILDCARD_IP};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaemonConfig {
    pub debug: bool,
    pub uuid: Uuid,
    pub token_id: String,
    pub token: String,
    pub api: ApiConfig,
    pub system: SystemConfig,
    pub allowed_mounts: Vec<String>,
    pub remote: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub ssl: SslConfig,
    /// MB
    pub upload_limit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SslConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    pub data: String,
    pub sftp: SftpConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SftpConfig {
    pub bind_port: u16,
}

impl DaemonConfig {
    /// Map a node row onto the daemon's config. `node.daemon_token` must
    /// already be plaintext.
    pub fn for_node(node: &Node, remote: &str) -> Self {
        Self {
            debug: false,
            uuid: node.uuid,
            token_id: node.daemon_token_id.clone(),
            token: node.daemon_token.clone(),
            api: ApiConfig {
                host: WILDCARD_IP.to_string(),
                port: node.daemon_listen,
                ssl: SslConfig { enabled: false },
                upload_limit: node.upload_size,
            },
            system: SystemConfig {
                data: node.daemon_base.clone(),
                sftp: SftpConfig {
                    bind_port: node.daemon_sftp,
                },
            },
            allowed_mounts: Vec::new(),
            remote: remote.to_string(),
        }
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
