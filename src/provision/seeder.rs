// Seeder - brings the store up to the desired admin/location/node/allocation state
//
// Phases run in dependency order and each one is gated on its unique key, so
// a second run against the same store writes nothing. A failed write aborts
// the run without undoing earlier phases; running again picks up from there.

use super::credentials::{daemon_credentials, hash_password};
use crate::config::BootstrapConfig;
use crate::error::Result;
use crate::store::{
    Allocation, Location, NewAllocation, NewLocation, NewNode, NewUser, Node, Store, User,
    DEFAULT_DAEMON_BASE, DEFAULT_UPLOAD_SIZE, WILDCARD_IP,
};
use std::io::Write;
use uuid::Uuid;

const DEFAULT_LANGUAGE: &str = "en";

/// Whether a phase wrote its record or found it already there
#[derive(Debug, Clone, PartialEq)]
pub enum Provisioned<T> {
    Created(T),
    Existing(T),
}

impl<T> Provisioned<T> {
    pub fn record(&self) -> &T {
        match self {
            Provisioned::Created(r) | Provisioned::Existing(r) => r,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, Provisioned::Created(_))
    }
}

#[derive(Debug, Clone)]
pub struct SeedReport {
    pub user: Provisioned<User>,
    pub location: Provisioned<Location>,
    pub node: Provisioned<Node>,
    pub allocations_created: Vec<Allocation>,
    /// Ports that already had an allocation on this node
    pub allocations_existing: Vec<u16>,
    /// Every allocation on the node once the run finished, by port
    pub node_allocations: Vec<Allocation>,
}

pub struct Seeder<'a, S: Store> {
    store: &'a mut S,
    config: &'a BootstrapConfig,
}

impl<'a, S: Store> Seeder<'a, S> {
    pub fn new(store: &'a mut S, config: &'a BootstrapConfig) -> Self {
        Self { store, config }
    }

    /// Run every phase, writing one progress line per phase to `out`
    pub fn run(&mut self, out: &mut impl Write) -> Result<SeedReport> {
        writeln!(out, "🚀 Starting auto-seeder...")?;

        let user = self.ensure_admin()?;
        match &user {
            Provisioned::Created(u) => writeln!(out, "✅ Admin user created: {}", u.email)?,
            Provisioned::Existing(_) => writeln!(out, "ℹ️ Admin user already exists.")?,
        }

        let location = self.ensure_location()?;
        match &location {
            Provisioned::Created(l) => writeln!(out, "✅ Location created: {}", l.long)?,
            Provisioned::Existing(_) => writeln!(out, "ℹ️ Location already exists.")?,
        }

        let node = self.ensure_node(location.record())?;
        match &node {
            Provisioned::Created(n) => {
                writeln!(out, "✅ Node created: {} (ID: {})", n.name, n.id)?
            }
            Provisioned::Existing(_) => writeln!(out, "ℹ️ Node already exists.")?,
        }

        let (allocations_created, allocations_existing) =
            self.ensure_allocations(node.record())?;
        if allocations_created.is_empty() {
            writeln!(out, "ℹ️ Allocations already exist.")?;
        } else {
            writeln!(out, "✅ Created {} allocations.", allocations_created.len())?;
        }

        let node_allocations = self.store.allocations_for_node(node.record().id)?;
        tracing::info!(
            "Node {} now has {} allocations",
            node.record().name,
            node_allocations.len()
        );

        writeln!(out, "✨ Auto-seeder completed successfully!")?;

        Ok(SeedReport {
            user,
            location,
            node,
            allocations_created,
            allocations_existing,
            node_allocations,
        })
    }

    fn ensure_admin(&mut self) -> Result<Provisioned<User>> {
        let admin = &self.config.admin;
        if let Some(user) = self.store.find_user_by_email(&admin.email)? {
            tracing::debug!("Admin user {} exists with id {}", user.email, user.id);
            return Ok(Provisioned::Existing(user));
        }

        let user = self.store.insert_user(NewUser {
            uuid: Uuid::new_v4(),
            email: admin.email.clone(),
            username: admin.username.clone(),
            password: hash_password(&admin.password)?,
            name_first: admin.first_name.clone(),
            name_last: admin.last_name.clone(),
            root_admin: true,
            language: DEFAULT_LANGUAGE.to_string(),
        })?;
        tracing::info!("Created admin user {} (id {})", user.email, user.id);
        Ok(Provisioned::Created(user))
    }

    fn ensure_location(&mut self) -> Result<Provisioned<Location>> {
        let wanted = &self.config.location;
        if let Some(location) = self.store.find_location_by_short(&wanted.short)? {
            tracing::debug!("Location {} exists with id {}", location.short, location.id);
            return Ok(Provisioned::Existing(location));
        }

        let location = self.store.insert_location(NewLocation {
            short: wanted.short.clone(),
            long: wanted.long.clone(),
        })?;
        tracing::info!("Created location {} (id {})", location.short, location.id);
        Ok(Provisioned::Created(location))
    }

    fn ensure_node(&mut self, location: &Location) -> Result<Provisioned<Node>> {
        let wanted = &self.config.node;
        if let Some(node) = self.store.find_node_by_name(&wanted.name)? {
            if node.location_id != location.id {
                tracing::warn!(
                    "Node {} belongs to location {}, not {}; leaving it as is",
                    node.name,
                    node.location_id,
                    location.id
                );
            }
            return Ok(Provisioned::Existing(node));
        }

        let (daemon_token_id, daemon_token) = daemon_credentials();
        let node = self.store.insert_node(NewNode {
            uuid: Uuid::new_v4(),
            name: wanted.name.clone(),
            description: wanted.description.clone(),
            location_id: location.id,
            public: true,
            fqdn: wanted.fqdn.clone(),
            scheme: wanted.scheme,
            behind_proxy: true,
            maintenance_mode: false,
            memory: wanted.memory,
            memory_overallocate: 0,
            disk: wanted.disk,
            disk_overallocate: 0,
            upload_size: DEFAULT_UPLOAD_SIZE,
            daemon_listen: wanted.daemon_listen,
            daemon_sftp: wanted.daemon_sftp,
            daemon_base: DEFAULT_DAEMON_BASE.to_string(),
            daemon_token_id,
            daemon_token,
        })?;
        tracing::info!(
            "Created node {} at {}://{} (id {})",
            node.name,
            node.scheme.as_str(),
            node.fqdn,
            node.id
        );
        Ok(Provisioned::Created(node))
    }

    fn ensure_allocations(&mut self, node: &Node) -> Result<(Vec<Allocation>, Vec<u16>)> {
        let mut created = Vec::new();
        let mut existing = Vec::new();

        for &port in &self.config.allocation_ports {
            if self.store.allocation_exists(node.id, WILDCARD_IP, port)? {
                existing.push(port);
                continue;
            }

            let allocation = self.store.insert_allocation(NewAllocation {
                node_id: node.id,
                ip: WILDCARD_IP.to_string(),
                port,
                ip_alias: None,
                server_id: None,
            })?;
            tracing::debug!("Created allocation {}:{} on node {}", allocation.ip, port, node.id);
            created.push(allocation);
        }

        Ok((created, existing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AdminConfig, LocationConfig, NodeConfig};
    use crate::error::Error;
    use crate::store::{Encrypter, JsonStore, Scheme, StoreError};

    fn config(ports: &str) -> BootstrapConfig {
        BootstrapConfig {
            admin: AdminConfig {
                email: "admin@example.com".to_string(),
                username: "admin".to_string(),
                password: "hunter22".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Admin".to_string(),
            },
            location: LocationConfig {
                short: "local".to_string(),
                long: "Codespace".to_string(),
            },
            node: NodeConfig {
                name: "node-1".to_string(),
                description: "Auto-configured node".to_string(),
                fqdn: "node.example.com".to_string(),
                scheme: Scheme::Https,
                memory: 4096,
                disk: 10240,
                daemon_listen: 8080,
                daemon_sftp: 2022,
            },
            allocation_ports: crate::config::parse_ports(ports).unwrap(),
        }
    }

    fn store() -> JsonStore {
        JsonStore::in_memory(Encrypter::new(&[9u8; 32]).unwrap())
    }

    fn seed(store: &mut impl Store, config: &BootstrapConfig) -> Result<(SeedReport, String)> {
        let mut out = Vec::new();
        let report = Seeder::new(store, config).run(&mut out)?;
        Ok((report, String::from_utf8(out).unwrap()))
    }

    /// Records the order of writes and can fail a chosen one
    struct RecordingStore {
        inner: JsonStore,
        writes: Vec<&'static str>,
        fail_on: Option<&'static str>,
    }

    impl RecordingStore {
        fn new(fail_on: Option<&'static str>) -> Self {
            Self {
                inner: store(),
                writes: Vec::new(),
                fail_on,
            }
        }

        fn write(&mut self, table: &'static str) -> std::result::Result<(), StoreError> {
            if self.fail_on == Some(table) {
                return Err(StoreError::Io(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "connection lost",
                )));
            }
            self.writes.push(table);
            Ok(())
        }
    }

    impl Store for RecordingStore {
        fn find_user_by_email(&self, email: &str) -> std::result::Result<Option<User>, StoreError> {
            self.inner.find_user_by_email(email)
        }

        fn insert_user(&mut self, user: NewUser) -> std::result::Result<User, StoreError> {
            self.write("users")?;
            self.inner.insert_user(user)
        }

        fn find_location_by_short(
            &self,
            short: &str,
        ) -> std::result::Result<Option<Location>, StoreError> {
            self.inner.find_location_by_short(short)
        }

        fn insert_location(
            &mut self,
            location: NewLocation,
        ) -> std::result::Result<Location, StoreError> {
            self.write("locations")?;
            self.inner.insert_location(location)
        }

        fn find_node_by_name(&self, name: &str) -> std::result::Result<Option<Node>, StoreError> {
            self.inner.find_node_by_name(name)
        }

        fn insert_node(&mut self, node: NewNode) -> std::result::Result<Node, StoreError> {
            self.write("nodes")?;
            self.inner.insert_node(node)
        }

        fn allocation_exists(
            &self,
            node_id: u64,
            ip: &str,
            port: u16,
        ) -> std::result::Result<bool, StoreError> {
            self.inner.allocation_exists(node_id, ip, port)
        }

        fn insert_allocation(
            &mut self,
            allocation: NewAllocation,
        ) -> std::result::Result<Allocation, StoreError> {
            self.write("allocations")?;
            self.inner.insert_allocation(allocation)
        }

        fn allocations_for_node(
            &self,
            node_id: u64,
        ) -> std::result::Result<Vec<Allocation>, StoreError> {
            self.inner.allocations_for_node(node_id)
        }
    }

    #[test]
    fn test_first_run_creates_everything() {
        let mut store = store();
        let config = config("25565, 25566,,25567");
        let (report, out) = seed(&mut store, &config).unwrap();

        assert!(report.user.was_created());
        assert!(report.location.was_created());
        assert!(report.node.was_created());

        let ports: Vec<u16> = report.allocations_created.iter().map(|a| a.port).collect();
        assert_eq!(ports, vec![25565, 25566, 25567]);
        assert!(report
            .allocations_created
            .iter()
            .all(|a| a.ip == WILDCARD_IP && a.ip_alias.is_none() && a.server_id.is_none()));

        let user = report.user.record();
        assert!(user.root_admin);
        assert_eq!(user.language, "en");
        assert_ne!(user.password, "hunter22");

        let node = report.node.record();
        assert_eq!(node.location_id, report.location.record().id);
        assert_eq!(node.daemon_token_id.len(), 16);
        assert_eq!(node.daemon_token.len(), 64);
        assert_eq!(node.upload_size, DEFAULT_UPLOAD_SIZE);
        assert_eq!(node.daemon_base, DEFAULT_DAEMON_BASE);

        assert!(out.contains("Admin user created: admin@example.com"));
        assert!(out.contains("Created 3 allocations."));
        assert!(out.trim_end().ends_with("completed successfully!"));
    }

    #[test]
    fn test_second_run_writes_nothing() {
        let mut store = RecordingStore::new(None);
        let config = config("25565,25566,25567");
        seed(&mut store, &config).unwrap();
        let writes_after_first = store.writes.len();

        let (report, out) = seed(&mut store, &config).unwrap();

        assert_eq!(store.writes.len(), writes_after_first);
        assert!(!report.user.was_created());
        assert!(!report.location.was_created());
        assert!(!report.node.was_created());
        assert!(report.allocations_created.is_empty());
        assert_eq!(report.allocations_existing, vec![25565, 25566, 25567]);
        assert_eq!(report.node_allocations.len(), 3);
        assert!(out.contains("Admin user already exists."));
        assert!(out.contains("Allocations already exist."));

        let node_id = report.node.record().id;
        assert_eq!(store.allocations_for_node(node_id).unwrap().len(), 3);
    }

    #[test]
    fn test_rerun_keeps_node_credentials() {
        let mut store = store();
        let config = config("25565");
        let (first, _) = seed(&mut store, &config).unwrap();
        let (second, _) = seed(&mut store, &config).unwrap();

        let before = first.node.record();
        let after = second.node.record();
        assert_eq!(before.daemon_token_id, after.daemon_token_id);
        assert_eq!(before.daemon_token, after.daemon_token);
        assert_eq!(before.uuid, after.uuid);
    }

    #[test]
    fn test_existing_user_not_updated() {
        let mut store = store();
        seed(&mut store, &config("")).unwrap();

        let mut changed = config("");
        changed.admin.password = "different".to_string();
        changed.admin.first_name = "Grace".to_string();
        let (report, _) = seed(&mut store, &changed).unwrap();

        assert_eq!(report.user.record().name_first, "Ada");
    }

    #[test]
    fn test_new_ports_added_on_rerun() {
        let mut store = store();
        seed(&mut store, &config("25565")).unwrap();
        let (report, out) = seed(&mut store, &config("25566,25565")).unwrap();

        let ports: Vec<u16> = report.allocations_created.iter().map(|a| a.port).collect();
        assert_eq!(ports, vec![25566]);
        let all: Vec<u16> = report.node_allocations.iter().map(|a| a.port).collect();
        assert_eq!(all, vec![25565, 25566]);
        assert_eq!(report.allocations_existing, vec![25565]);
        assert!(out.contains("Created 1 allocations."));
    }

    #[test]
    fn test_writes_follow_dependency_order() {
        let mut store = RecordingStore::new(None);
        seed(&mut store, &config("25565,25566")).unwrap();
        assert_eq!(
            store.writes,
            vec!["users", "locations", "nodes", "allocations", "allocations"]
        );
    }

    #[test]
    fn test_failed_node_write_aborts_allocations() {
        let mut store = RecordingStore::new(Some("nodes"));
        let config = config("25565");
        let mut out = Vec::new();
        let err = Seeder::new(&mut store, &config).run(&mut out).unwrap_err();

        assert!(matches!(err, Error::Store(StoreError::Io(_))));
        assert_eq!(store.writes, vec!["users", "locations"]);

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Location created"));
        assert!(!out.contains("allocations"));
    }

    #[test]
    fn test_rerun_converges_after_partial_failure() {
        let mut store = RecordingStore::new(Some("allocations"));
        let config = config("25565,25566");
        assert!(seed(&mut store, &config).is_err());

        store.fail_on = None;
        let (report, _) = seed(&mut store, &config).unwrap();

        assert!(!report.user.was_created());
        assert!(!report.node.was_created());
        assert_eq!(report.allocations_created.len(), 2);
    }
}
