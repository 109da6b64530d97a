// Panel Bootstrap - provisioning helpers for a game panel deployment
//
// `seed` converges the store onto the admin/location/node/allocation state
// described by the environment, `node-config` renders the node daemon's YAML,
// and `keep-alive` serves liveness probes.

pub mod commands;
pub mod config;
pub mod error;
pub mod keepalive;
pub mod provision;
pub mod render;
pub mod store;

pub use error::{Error, Result};
