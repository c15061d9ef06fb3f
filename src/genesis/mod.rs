// Genesis - Engine configuration
pub mod config;

pub use config::{CasperConfig, InactivityDecay};
