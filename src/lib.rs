pub mod config;
pub mod desktop;
pub mod error;
pub mod harvest;
pub mod targeting;

pub use config::{HarvestConfig, Preset};
pub use error::{HarvestError, HarvestResult};
pub use harvest::{CycleController, RunSummary, StopReason};
pub use targeting::TargetingEngine;
