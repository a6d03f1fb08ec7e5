// Harvest module - the automation loop.
// A fixed key/click sequence runs against the game window, the targeting
// engine finds the item to click, and the controller paces iterations and
// stops after too many consecutive failures.

pub mod controller;
pub mod pacing;
pub mod schedule;
pub mod sequence;
pub mod types;


// Re-export the main types for easy access
pub use controller::CycleController;
pub use pacing::{Sleeper, TokioSleeper};
pub use schedule::{DelayPolicy, FailureStreak};
pub use sequence::{Action, ActionSequencer, Phase, Step, plan};
pub use types::{ControllerState, IterationOutcome, RunSummary, StopReason};
