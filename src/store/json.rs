// JSON file store - every table lives in one document, rewritten on each insert

use super::crypto::Encrypter;
use super::models::{
    Allocation, Location, NewAllocation, NewLocation, NewNode, NewUser, Node, User,
};
use super::{Store, StoreError};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Tables {
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    locations: Vec<Location>,
    /// `daemon_token` holds the sealed value here
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    allocations: Vec<Allocation>,
}

pub struct JsonStore {
    path: Option<PathBuf>,
    encrypter: Encrypter,
    tables: Tables,
}

impl JsonStore {
    /// Load the store at `path`, starting empty if the file doesn't exist yet
    pub fn open(path: &Path, encrypter: Encrypter) -> Result<Self, StoreError> {
        let tables = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            if content.trim().is_empty() {
                Tables::default()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            tracing::debug!("Store file doesn't exist yet: {:?}", path);
            Tables::default()
        };

        tracing::debug!(
            "Opened store {:?}: {} users, {} locations, {} nodes, {} allocations",
            path,
            tables.users.len(),
            tables.locations.len(),
            tables.nodes.len(),
            tables.allocations.len()
        );

        Ok(Self {
            path: Some(path.to_path_buf()),
            encrypter,
            tables,
        })
    }

    /// A store that never touches disk
    pub fn in_memory(encrypter: Encrypter) -> Self {
        Self {
            path: None,
            encrypter,
            tables: Tables::default(),
        }
    }

    fn save(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let content = serde_json::to_string_pretty(&self.tables)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Write then rename so a crash never leaves a half-written store
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Run an insert against the tables and persist, undoing it if the write fails
    fn commit<T>(
        &mut self,
        insert: impl FnOnce(&mut Tables) -> T,
        undo: impl FnOnce(&mut Tables),
    ) -> Result<T, StoreError> {
        let row = insert(&mut self.tables);
        if let Err(e) = self.save() {
            undo(&mut self.tables);
            return Err(e);
        }
        Ok(row)
    }

    fn open_node(&self, sealed: &Node) -> Result<Node, StoreError> {
        let mut node = sealed.clone();
        node.daemon_token = self.encrypter.decrypt(&sealed.daemon_token)?;
        Ok(node)
    }
}

fn next_id<T>(rows: &[T], id: impl Fn(&T) -> u64) -> u64 {
    rows.iter().map(id).max().unwrap_or(0) + 1
}

impl Store for JsonStore {
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.tables.users.iter().find(|u| u.email == email).cloned())
    }

    fn insert_user(&mut self, user: NewUser) -> Result<User, StoreError> {
        if self.tables.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate {
                table: "users",
                key: user.email,
            });
        }

        let now = Utc::now();
        let row = User {
            id: next_id(&self.tables.users, |u| u.id),
            uuid: user.uuid,
            email: user.email,
            username: user.username,
            password: user.password,
            name_first: user.name_first,
            name_last: user.name_last,
            root_admin: user.root_admin,
            language: user.language,
            created_at: now,
            updated_at: now,
        };

        self.commit(
            |t| {
                t.users.push(row.clone());
                row
            },
            |t| {
                t.users.pop();
            },
        )
    }

    fn find_location_by_short(&self, short: &str) -> Result<Option<Location>, StoreError> {
        Ok(self.tables.locations.iter().find(|l| l.short == short).cloned())
    }

    fn insert_location(&mut self, location: NewLocation) -> Result<Location, StoreError> {
        if self.tables.locations.iter().any(|l| l.short == location.short) {
            return Err(StoreError::Duplicate {
                table: "locations",
                key: location.short,
            });
        }

        let now = Utc::now();
        let row = Location {
            id: next_id(&self.tables.locations, |l| l.id),
            short: location.short,
            long: location.long,
            created_at: now,
            updated_at: now,
        };

        self.commit(
            |t| {
                t.locations.push(row.clone());
                row
            },
            |t| {
                t.locations.pop();
            },
        )
    }

    fn find_node_by_name(&self, name: &str) -> Result<Option<Node>, StoreError> {
        self.tables
            .nodes
            .iter()
            .find(|n| n.name == name)
            .map(|n| self.open_node(n))
            .transpose()
    }

    fn insert_node(&mut self, node: NewNode) -> Result<Node, StoreError> {
        if self.tables.nodes.iter().any(|n| n.name == node.name) {
            return Err(StoreError::Duplicate {
                table: "nodes",
                key: node.name,
            });
        }
        if !self.tables.locations.iter().any(|l| l.id == node.location_id) {
            return Err(StoreError::MissingParent {
                table: "nodes",
                id: node.location_id,
            });
        }

        let now = Utc::now();
        let row = Node {
            id: next_id(&self.tables.nodes, |n| n.id),
            uuid: node.uuid,
            name: node.name,
            description: node.description,
            location_id: node.location_id,
            public: node.public,
            fqdn: node.fqdn,
            scheme: node.scheme,
            behind_proxy: node.behind_proxy,
            maintenance_mode: node.maintenance_mode,
            memory: node.memory,
            memory_overallocate: node.memory_overallocate,
            disk: node.disk,
            disk_overallocate: node.disk_overallocate,
            upload_size: node.upload_size,
            daemon_listen: node.daemon_listen,
            daemon_sftp: node.daemon_sftp,
            daemon_base: node.daemon_base,
            daemon_token_id: node.daemon_token_id,
            daemon_token: node.daemon_token,
            created_at: now,
            updated_at: now,
        };

        let mut sealed = row.clone();
        sealed.daemon_token = self.encrypter.encrypt(&row.daemon_token)?;

        self.commit(
            |t| {
                t.nodes.push(sealed);
                row
            },
            |t| {
                t.nodes.pop();
            },
        )
    }

    fn allocation_exists(&self, node_id: u64, ip: &str, port: u16) -> Result<bool, StoreError> {
        Ok(self
            .tables
            .allocations
            .iter()
            .any(|a| a.node_id == node_id && a.ip == ip && a.port == port))
    }

    fn insert_allocation(&mut self, allocation: NewAllocation) -> Result<Allocation, StoreError> {
        if !self.tables.nodes.iter().any(|n| n.id == allocation.node_id) {
            return Err(StoreError::MissingParent {
                table: "allocations",
                id: allocation.node_id,
            });
        }
        if self.allocation_exists(allocation.node_id, &allocation.ip, allocation.port)? {
            return Err(StoreError::Duplicate {
                table: "allocations",
                key: format!("{}:{}:{}", allocation.node_id, allocation.ip, allocation.port),
            });
        }

        let now = Utc::now();
        let row = Allocation {
            id: next_id(&self.tables.allocations, |a| a.id),
            node_id: allocation.node_id,
            ip: allocation.ip,
            port: allocation.port,
            ip_alias: allocation.ip_alias,
            server_id: allocation.server_id,
            created_at: now,
            updated_at: now,
        };

        self.commit(
            |t| {
                t.allocations.push(row.clone());
                row
            },
            |t| {
                t.allocations.pop();
            },
        )
    }

    fn allocations_for_node(&self, node_id: u64) -> Result<Vec<Allocation>, StoreError> {
        let mut rows: Vec<Allocation> = self
            .tables
            .allocations
            .iter()
            .filter(|a| a.node_id == node_id)
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.port);
        Ok(rows)
    }
}
