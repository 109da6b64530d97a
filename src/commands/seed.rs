// Seed command - provision the admin, location, node and allocations

use super::StoreArgs;
use crate::config::BootstrapConfig;
use crate::error::Result;
use crate::provision::{SeedReport, Seeder};
use crate::store::open_store;
use std::io::Write;

pub fn run(store_args: &StoreArgs, out: &mut impl Write) -> Result<SeedReport> {
    // Validate everything before the store is touched
    let config = BootstrapConfig::from_env()?;
    let store_config = store_args.resolve()?;

    tracing::info!("Seeding store at {:?}", store_config.path);
    let mut store = open_store(&store_config)?;

    let report = Seeder::new(&mut store, &config).run(out)?;
    tracing::info!(
        "Seed finished: {} allocations created, {} already present",
        report.allocations_created.len(),
        report.allocations_existing.len()
    );
    Ok(report)
}
