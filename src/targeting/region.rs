//! Screen geometry for targeted capture

use serde::Serialize;
use std::fmt;

/// Outer rectangle of a window in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} at ({},{})", self.width, self.height, self.x, self.y)
    }
}

/// The part of a window that gets captured and searched.
///
/// Only the left half of the window is used: the right half carries unrelated
/// UI that produced false matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CaptureRegion {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl CaptureRegion {
    pub fn left_half(window: &Bounds) -> Self {
        Self {
            x: window.x,
            y: window.y,
            width: window.width / 2,
            height: window.height,
        }
    }

    pub fn origin(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check if a region-local point falls inside this region
    pub fn contains_local(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    /// Translate a region-local point into absolute screen coordinates
    pub fn to_screen(&self, x: u32, y: u32) -> TargetPoint {
        TargetPoint {
            x: self.x + x as i32,
            y: self.y + y as i32,
        }
    }
}

impl fmt::Display for CaptureRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} at ({},{})", self.width, self.height, self.x, self.y)
    }
}

/// Absolute screen coordinate to click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TargetPoint {
    pub x: i32,
    pub y: i32,
}

impl fmt::Display for TargetPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
