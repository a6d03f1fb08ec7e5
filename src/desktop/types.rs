// Core desktop types and traits
use crate::error::HarvestResult;
use crate::targeting::{Bounds, CaptureRegion};
use image::RgbImage;
use regex::Regex;
use serde::Serialize;
use std::fmt;

/// A top-level window picked by title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowHandle {
    /// Platform window id (the HWND on Windows)
    pub id: u32,
    pub title: String,
    pub bounds: Bounds,
}

/// Keys the harvest sequence uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KeyCode {
    Char(char),
    Tab,
    Control,
    Alt,
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCode::Char(c) => write!(f, "'{}'", c.to_ascii_uppercase()),
            KeyCode::Tab => write!(f, "'Tab'"),
            KeyCode::Control => write!(f, "'Ctrl'"),
            KeyCode::Alt => write!(f, "'Alt'"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Press {
    Down,
    Up,
}

impl fmt::Display for Press {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Press::Down => write!(f, "down"),
            Press::Up => write!(f, "up"),
        }
    }
}

/// Finds the target window and reports where it currently is.
pub trait WindowLocator {
    /// First window whose title matches `pattern`, if any.
    fn find_window(&mut self, pattern: &Regex) -> HarvestResult<Option<WindowHandle>>;

    /// Current outer bounds; these change after a minimized window is restored.
    fn window_bounds(&mut self, window: &WindowHandle) -> HarvestResult<Bounds>;
}

pub trait WindowActivator {
    fn activate(&mut self, window: &WindowHandle) -> HarvestResult<()>;
}

/// Fire-and-forget synthetic input.
pub trait InputSynthesizer {
    fn key(&mut self, key: KeyCode, press: Press) -> HarvestResult<()>;
    fn move_pointer(&mut self, x: i32, y: i32) -> HarvestResult<()>;
    fn left_button(&mut self, press: Press) -> HarvestResult<()>;
}

pub trait ScreenCapturer {
    /// RGB pixels of `region`, clipped to the monitor that holds its origin.
    fn capture(&mut self, region: &CaptureRegion) -> HarvestResult<RgbImage>;
}

/// Everything the harvest loop needs from the desktop.
pub trait Desktop: WindowLocator + WindowActivator + InputSynthesizer + ScreenCapturer {}

impl<T> Desktop for T where T: WindowLocator + WindowActivator + InputSynthesizer + ScreenCapturer {}
