// Node config command - print the daemon YAML for NODE_NAME

use super::StoreArgs;
use crate::config::RenderConfig;
use crate::error::Result;
use crate::render::render_node_config;
use crate::store::{open_store, Store};
use std::io::Write;

pub fn run(store_args: &StoreArgs, out: &mut impl Write) -> Result<()> {
    let config = RenderConfig::from_env()?;
    let store = open_store(&store_args.resolve()?)?;
    write_node_config(&store, &config, out)
}

/// Render fully before writing so a failed lookup leaves `out` untouched
pub fn write_node_config<S: Store>(
    store: &S,
    config: &RenderConfig,
    out: &mut impl Write,
) -> Result<()> {
    let yaml = render_node_config(store, config)?;
    out.write_all(yaml.as_bytes())?;
    out.flush()?;
    Ok(())
}
