mod daemon_config;

pub use daemon_config::{ApiConfig, DaemonConfig, SftpConfig, SslConfig, SystemConfig};

use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::store::Store;

/// Look up the configured node and render its daemon config as YAML.
///
/// Returns [`Error::NodeNotFound`] when no node has that name; nothing is
/// rendered in that case.
pub fn render_node_config<S: Store>(store: &S, config: &RenderConfig) -> Result<String> {
    let node = store
        .find_node_by_name(&config.node_name)?
        .ok_or_else(|| Error::NodeNotFound(config.node_name.clone()))?;

    tracing::debug!("Rendering daemon config for node {} (id {})", node.name, node.id);

    Ok(DaemonConfig::for_node(&node, &config.remote).to_yaml()?)
}
