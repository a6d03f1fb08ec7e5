// In-memory desktop used by the tests: a fixed "screen" image, an optional window
// and a log of every call made against it.
use super::types::{InputSynthesizer, KeyCode, Press, ScreenCapturer, WindowActivator, WindowHandle, WindowLocator};
use crate::error::{HarvestError, HarvestResult};
use crate::targeting::{Bounds, CaptureRegion};
use image::RgbImage;
use regex::Regex;
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DesktopEvent {
    Activate(u32),
    Key(KeyCode, Press),
    MoveTo(i32, i32),
    Left(Press),
    Capture(CaptureRegion),
}

pub(crate) struct FakeDesktop {
    pub window: Option<WindowHandle>,
    /// Per-call override of window presence, consumed front to back
    pub presence: VecDeque<bool>,
    pub screen: RgbImage,
    pub enumeration_fails: bool,
    pub activation_fails: bool,
    pub failing_keys: Vec<KeyCode>,
    pub pointer_fails: bool,
    pub find_calls: usize,
    pub events: Vec<DesktopEvent>,
}

impl FakeDesktop {
    pub fn new(screen: RgbImage) -> Self {
        Self {
            window: None,
            presence: VecDeque::new(),
            screen,
            enumeration_fails: false,
            activation_fails: false,
            failing_keys: Vec::new(),
            pointer_fails: false,
            find_calls: 0,
            events: Vec::new(),
        }
    }

    pub fn with_window(mut self, title: &str, bounds: Bounds) -> Self {
        self.window = Some(WindowHandle {
            id: 42,
            title: title.to_string(),
            bounds,
        });
        self
    }

    pub fn keys(&self) -> Vec<(KeyCode, Press)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                DesktopEvent::Key(k, p) => Some((*k, *p)),
                _ => None,
            })
            .collect()
    }

    pub fn taps(&self) -> Vec<KeyCode> {
        self.keys()
            .into_iter()
            .filter(|(_, p)| *p == Press::Down)
            .map(|(k, _)| k)
            .collect()
    }

    pub fn clicks(&self) -> Vec<(i32, i32)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                DesktopEvent::MoveTo(x, y) => Some((*x, *y)),
                _ => None,
            })
            .collect()
    }
}

impl WindowLocator for FakeDesktop {
    fn find_window(&mut self, pattern: &Regex) -> HarvestResult<Option<WindowHandle>> {
        self.find_calls += 1;
        if self.enumeration_fails {
            return Err(HarvestError::WindowEnumeration {
                reason: "desktop locked".to_string(),
            });
        }
        let present = self.presence.pop_front().unwrap_or(true);
        Ok(self
            .window
            .clone()
            .filter(|w| present && pattern.is_match(&w.title)))
    }

    fn window_bounds(&mut self, window: &WindowHandle) -> HarvestResult<Bounds> {
        Ok(window.bounds)
    }
}

impl WindowActivator for FakeDesktop {
    fn activate(&mut self, window: &WindowHandle) -> HarvestResult<()> {
        self.events.push(DesktopEvent::Activate(window.id));
        if self.activation_fails {
            return Err(HarvestError::Activation {
                title: window.title.clone(),
                reason: "foreground lock".to_string(),
            });
        }
        Ok(())
    }
}

impl InputSynthesizer for FakeDesktop {
    fn key(&mut self, key: KeyCode, press: Press) -> HarvestResult<()> {
        self.events.push(DesktopEvent::Key(key, press));
        if self.failing_keys.contains(&key) {
            return Err(HarvestError::input(format!("{key} {press}"), "blocked"));
        }
        Ok(())
    }

    fn move_pointer(&mut self, x: i32, y: i32) -> HarvestResult<()> {
        self.events.push(DesktopEvent::MoveTo(x, y));
        if self.pointer_fails {
            return Err(HarvestError::input("pointer move", "blocked"));
        }
        Ok(())
    }

    fn left_button(&mut self, press: Press) -> HarvestResult<()> {
        self.events.push(DesktopEvent::Left(press));
        Ok(())
    }
}

impl ScreenCapturer for FakeDesktop {
    fn capture(&mut self, region: &CaptureRegion) -> HarvestResult<RgbImage> {
        self.events.push(DesktopEvent::Capture(*region));
        if region.is_empty() || region.x < 0 || region.y < 0 {
            return Err(HarvestError::Geometry {
                x: region.x,
                y: region.y,
                width: region.width,
                height: region.height,
            });
        }
        let (x, y) = (region.x as u32, region.y as u32);
        let width = region.width.min(self.screen.width().saturating_sub(x));
        let height = region.height.min(self.screen.height().saturating_sub(y));
        if width == 0 || height == 0 {
            return Err(HarvestError::capture("region is off screen"));
        }
        Ok(image::imageops::crop_imm(&self.screen, x, y, width, height).to_image())
    }
}
