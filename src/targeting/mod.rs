/// Targeting module: find the item template inside a window capture
///
/// This module provides:
/// - Template loading with alpha normalization
/// - Zero-mean normalized cross-correlation over RGB
/// - Left-half capture regions and screen coordinate translation
pub mod engine;
pub mod matcher;
pub mod region;
pub mod template;
pub mod types;

pub use engine::TargetingEngine;
pub use matcher::{ScoreMap, locate, score_map};
pub use region::{Bounds, CaptureRegion, TargetPoint};
pub use template::Template;
pub use types::MatchResult;
