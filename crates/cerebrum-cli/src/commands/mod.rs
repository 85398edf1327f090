//! Command implementations for cerebrum-cli

pub mod agent;
pub mod evergreen;
pub mod health;

pub use agent::{ScaffoldArgs, run_agent_list, run_agent_scaffold};
pub use evergreen::run_evergreen;
pub use health::run_health;
