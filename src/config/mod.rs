//! Configuration system.
//!
//! Merges configuration from tiers, field by field:
//! 1. **Defaults** - built into the binary
//! 2. **Project** - `./agent-dashboard/config.yaml`
//! 3. **User** - `~/.agent-dashboard/config.yaml`
//! 4. **Environment** - variables below
//!
//! Command-line flags are applied on top by the binary.
//!
//! ## Environment Variables
//! - `AGENT_DASHBOARD_CONFIG_PATH` - Explicit config file (replaces the file tiers)
//! - `AGENT_DASHBOARD_DATA_DIR` - Data directory
//! - `AGENT_DASHBOARD_PORT` - Dashboard port

mod loader;
mod types;

pub use loader::{
    CONFIG_PATH_ENV, ConfigLoader, ConfigPaths, ConfigTier, DATA_DIR_ENV, PORT_ENV, deep_merge,
};
pub use types::*;
