// Environment-driven settings for each command
//
// Every reader takes a lookup closure so callers can feed values from the
// process environment, a .env file, or a test map.

use crate::store::Scheme;
use thiserror::Error;

pub const DEFAULT_LOCATION_SHORT: &str = "local";
pub const DEFAULT_NODE_DESCRIPTION: &str = "Auto-configured node";
pub const DEFAULT_PANEL_REMOTE: &str = "http://panel:80";
pub const DEFAULT_KEEP_ALIVE_PORT: u16 = 3000;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value '{value}' for {var}: {reason}")]
    Invalid {
        var: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone)]
pub struct LocationConfig {
    pub short: String,
    pub long: String,
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub name: String,
    pub description: String,
    pub fqdn: String,
    pub scheme: Scheme,
    pub memory: u64,
    pub disk: u64,
    pub daemon_listen: u16,
    pub daemon_sftp: u16,
}

/// Desired state for the seeder
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub admin: AdminConfig,
    pub location: LocationConfig,
    pub node: NodeConfig,
    pub allocation_ports: Vec<u16>,
}

impl BootstrapConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let admin = AdminConfig {
            email: vars.required("ADMIN_EMAIL")?,
            username: vars.required("ADMIN_USERNAME")?,
            password: vars.raw_required("ADMIN_PASSWORD")?,
            first_name: vars.required("ADMIN_FIRST_NAME")?,
            last_name: vars.required("ADMIN_LAST_NAME")?,
        };

        let location = LocationConfig {
            short: vars
                .optional("LOCATION_SHORT")
                .unwrap_or_else(|| DEFAULT_LOCATION_SHORT.to_string()),
            long: vars.required("NODE_LOCATION")?,
        };

        let scheme_raw = vars.required("NODE_SCHEME")?;
        let scheme = scheme_raw
            .parse::<Scheme>()
            .map_err(|reason| invalid("NODE_SCHEME", &scheme_raw, reason))?;

        let node = NodeConfig {
            name: vars.required("NODE_NAME")?,
            description: vars
                .optional("NODE_DESCRIPTION")
                .unwrap_or_else(|| DEFAULT_NODE_DESCRIPTION.to_string()),
            fqdn: vars.required("NODE_FQDN")?,
            scheme,
            memory: vars.number("NODE_MEMORY")?,
            disk: vars.number("NODE_DISK")?,
            daemon_listen: vars.port("NODE_DAEMON_LISTEN")?,
            daemon_sftp: vars.port("NODE_DAEMON_SFTP")?,
        };

        let allocation_ports = match vars.optional("ALLOCATION_PORTS") {
            Some(raw) => {
                parse_ports(&raw).map_err(|reason| invalid("ALLOCATION_PORTS", &raw, reason))?
            }
            None => Vec::new(),
        };

        Ok(Self {
            admin,
            location,
            node,
            allocation_ports,
        })
    }
}

/// Settings for rendering a node's daemon config
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub node_name: String,
    pub remote: String,
}

impl RenderConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);
        Ok(Self {
            node_name: vars.required("NODE_NAME")?,
            remote: vars
                .optional("PANEL_REMOTE")
                .unwrap_or_else(|| DEFAULT_PANEL_REMOTE.to_string()),
        })
    }
}

#[derive(Debug, Clone)]
pub struct KeepAliveConfig {
    pub port: u16,
}

impl KeepAliveConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);
        let port = match vars.optional("PORT") {
            Some(_) => vars.port("PORT")?,
            None => DEFAULT_KEEP_ALIVE_PORT,
        };
        Ok(Self { port })
    }
}

/// Split a comma-separated port list, trimming entries and skipping empty ones
pub fn parse_ports(raw: &str) -> Result<Vec<u16>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            parse_port(entry).map_err(|reason| format!("entry '{}': {}", entry, reason))
        })
        .collect()
}

fn parse_port(raw: &str) -> Result<u16, String> {
    raw.parse::<u16>()
        .ok()
        .filter(|port| *port != 0)
        .ok_or_else(|| "port must be between 1 and 65535".to_string())
}

fn invalid(var: &str, value: &str, reason: String) -> ConfigError {
    ConfigError::Invalid {
        var: var.to_string(),
        value: value.to_string(),
        reason,
    }
}

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, var: &str) -> Option<String> {
        (self.0)(var)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, var: &str) -> Result<String, ConfigError> {
        self.optional(var)
            .ok_or_else(|| ConfigError::Missing(var.to_string()))
    }

    /// Like `required` but keeps surrounding whitespace, for secrets
    fn raw_required(&self, var: &str) -> Result<String, ConfigError> {
        (self.0)(var)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ConfigError::Missing(var.to_string()))
    }

    fn number(&self, var: &str) -> Result<u64, ConfigError> {
        let raw = self.required(var)?;
        raw.parse::<u64>()
            .map_err(|e| invalid(var, &raw, e.to_string()))
    }

    fn port(&self, var: &str) -> Result<u16, ConfigError> {
        let raw = self.required(var)?;
        parse_port(&raw).map_err(|reason| invalid(var, &raw, reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn seed_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("ADMIN_EMAIL", "admin@example.com"),
            ("ADMIN_USERNAME", "admin"),
            ("ADMIN_PASSWORD", "hunter22"),
            ("ADMIN_FIRST_NAME", "Ada"),
            ("ADMIN_LAST_NAME", "Admin"),
            ("NODE_LOCATION", "Codespace"),
            ("NODE_NAME", "node-1"),
            ("NODE_FQDN", "node.example.com"),
            ("NODE_SCHEME", "https"),
            ("NODE_MEMORY", "4096"),
            ("NODE_DISK", "10240"),
            ("NODE_DAEMON_LISTEN", "8080"),
            ("NODE_DAEMON_SFTP", "2022"),
            ("ALLOCATION_PORTS", "25565, 25566,,25567"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<BootstrapConfig, ConfigError> {
        BootstrapConfig::from_lookup(|var| env.get(var).map(|v| v.to_string()))
    }

    #[test]
    fn test_parse_ports_trims_and_skips_empty() {
        assert_eq!(parse_ports("25565, 25566,,25567").unwrap(), vec![25565, 25566, 25567]);
        assert_eq!(parse_ports("").unwrap(), Vec::<u16>::new());
        assert_eq!(parse_ports(" , ,").unwrap(), Vec::<u16>::new());
    }

    #[test]
    fn test_parse_ports_rejects_garbage() {
        assert!(parse_ports("25565,abc").is_err());
        assert!(parse_ports("70000").is_err());
        assert!(parse_ports("0").is_err());
    }

    #[test]
    fn test_bootstrap_config_from_lookup() {
        let config = load(&seed_env()).unwrap();
        assert_eq!(config.admin.email, "admin@example.com");
        assert_eq!(config.location.short, DEFAULT_LOCATION_SHORT);
        assert_eq!(config.location.long, "Codespace");
        assert_eq!(config.node.scheme, Scheme::Https);
        assert_eq!(config.node.description, DEFAULT_NODE_DESCRIPTION);
        assert_eq!(config.node.daemon_listen, 8080);
        assert_eq!(config.node.daemon_sftp, 2022);
        assert_eq!(config.allocation_ports, vec![25565, 25566, 25567]);
    }

    #[test]
    fn test_missing_variable_named() {
        let mut env = seed_env();
        env.remove("ADMIN_PASSWORD");
        assert_eq!(
            load(&env).unwrap_err(),
            ConfigError::Missing("ADMIN_PASSWORD".to_string())
        );
    }

    #[test]
    fn test_blank_variable_counts_as_missing() {
        let mut env = seed_env();
        env.insert("NODE_NAME", "   ");
        assert_eq!(load(&env).unwrap_err(), ConfigError::Missing("NODE_NAME".to_string()));
    }

    #[test]
    fn test_admin_password_kept_verbatim() {
        let mut env = seed_env();
        env.insert("ADMIN_PASSWORD", "  s3cret pass  ");
        assert_eq!(load(&env).unwrap().admin.password, "  s3cret pass  ");

        env.insert("ADMIN_PASSWORD", "");
        assert_eq!(
            load(&env).unwrap_err(),
            ConfigError::Missing("ADMIN_PASSWORD".to_string())
        );
    }

    #[test]
    fn test_non_numeric_memory_fails_fast() {
        let mut env = seed_env();
        env.insert("NODE_MEMORY", "lots");
        assert!(matches!(
            load(&env).unwrap_err(),
            ConfigError::Invalid { var, .. } if var == "NODE_MEMORY"
        ));
    }

    #[test]
    fn test_bad_daemon_port_fails_fast() {
        let mut env = seed_env();
        env.insert("NODE_DAEMON_SFTP", "99999");
        assert!(matches!(
            load(&env).unwrap_err(),
            ConfigError::Invalid { var, .. } if var == "NODE_DAEMON_SFTP"
        ));
    }

    #[test]
    fn test_unknown_scheme_rejected() {
        let mut env = seed_env();
        env.insert("NODE_SCHEME", "gopher");
        assert!(load(&env).is_err());
    }

    #[test]
    fn test_allocation_ports_optional() {
        let mut env = seed_env();
        env.remove("ALLOCATION_PORTS");
        assert!(load(&env).unwrap().allocation_ports.is_empty());
    }

    #[test]
    fn test_render_config_defaults_remote() {
        let config = RenderConfig::from_lookup(|var| match var {
            "NODE_NAME" => Some("node-1".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.node_name, "node-1");
        assert_eq!(config.remote, DEFAULT_PANEL_REMOTE);
    }

    #[test]
    fn test_keep_alive_port() {
        assert_eq!(KeepAliveConfig::from_lookup(|_| None).unwrap().port, DEFAULT_KEEP_ALIVE_PORT);
        let config = KeepAliveConfig::from_lookup(|_| Some("8081".to_string())).unwrap();
        assert_eq!(config.port, 8081);
        assert!(KeepAliveConfig::from_lookup(|_| Some("http".to_string())).is_err());
    }
}
