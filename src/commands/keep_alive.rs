// Keep-alive command - long-running liveness endpoint

use crate::config::KeepAliveConfig;
use crate::error::Result;
use crate::keepalive;

pub fn run() -> Result<()> {
    let config = KeepAliveConfig::from_env()?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(keepalive::serve(config.port))?;
    Ok(())
}
