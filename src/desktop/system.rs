//! Real desktop backend: xcap for windows and pixels, enigo for input

use super::types::{InputSynthesizer, KeyCode, Press, ScreenCapturer, WindowActivator, WindowHandle, WindowLocator};
use crate::error::{HarvestError, HarvestResult};
use crate::targeting::{Bounds, CaptureRegion};
use enigo::{Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};
use image::{DynamicImage, RgbImage};
use regex::Regex;
use xcap::{Monitor, Window};

pub struct SystemDesktop {
    enigo: Enigo,
}

impl SystemDesktop {
    pub fn new() -> HarvestResult<Self> {
        let enigo = Enigo::new(&Settings::default()).map_err(|e| HarvestError::BackendInit {
            reason: e.to_string(),
        })?;
        Ok(Self { enigo })
    }

    fn handle_for(window: &Window) -> HarvestResult<WindowHandle> {
        let enumeration = |e: xcap::XCapError| HarvestError::WindowEnumeration {
            reason: e.to_string(),
        };
        Ok(WindowHandle {
            id: window.id().map_err(enumeration)?,
            title: window.title().map_err(enumeration)?,
            bounds: Bounds::new(
                window.x().map_err(enumeration)?,
                window.y().map_err(enumeration)?,
                window.width().map_err(enumeration)?,
                window.height().map_err(enumeration)?,
            ),
        })
    }
}

impl WindowLocator for SystemDesktop {
    fn find_window(&mut self, pattern: &Regex) -> HarvestResult<Option<WindowHandle>> {
        let windows = Window::all().map_err(|e| HarvestError::WindowEnumeration {
            reason: e.to_string(),
        })?;

        for window in windows {
            // Windows that vanish mid-enumeration have no title; skip them.
            let Ok(title) = window.title() else {
                continue;
            };
            if pattern.is_match(&title) {
                return Self::handle_for(&window).map(Some);
            }
        }
        Ok(None)
    }

    fn window_bounds(&mut self, window: &WindowHandle) -> HarvestResult<Bounds> {
        let windows = Window::all().map_err(|e| HarvestError::WindowEnumeration {
            reason: e.to_string(),
        })?;

        for candidate in windows {
            if candidate.id().ok() == Some(window.id) {
                return Self::handle_for(&candidate).map(|h| h.bounds);
            }
        }
        Err(HarvestError::WindowEnumeration {
            reason: format!("window '{}' is gone", window.title),
        })
    }
}

impl WindowActivator for SystemDesktop {
    fn activate(&mut self, window: &WindowHandle) -> HarvestResult<()> {
        focus_native(window.id).map_err(|reason| HarvestError::Activation {
            title: window.title.clone(),
            reason,
        })
    }
}

#[cfg(target_os = "windows")]
fn focus_native(id: u32) -> Result<(), String> {
    use windows_sys::Win32::Foundation::{GetLastError, HWND};
    use windows_sys::Win32::UI::Input::KeyboardAndMouse::SetActiveWindow;
    use windows_sys::Win32::UI::WindowsAndMessaging::{SW_RESTORE, SetForegroundWindow, ShowWindow};

    // xcap returns HWND pointer as window id.
    let hwnd = id as usize as HWND;
    unsafe {
        ShowWindow(hwnd, SW_RESTORE);
        if SetForegroundWindow(hwnd) == 0 {
            return Err(format!("SetForegroundWindow refused (error code: {})", GetLastError()));
        }
        SetActiveWindow(hwnd);
    }
    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn focus_native(_id: u32) -> Result<(), String> {
    Err("bringing a window to the foreground is only supported on Windows".to_string())
}

fn enigo_key(key: KeyCode) -> Key {
    match key {
        KeyCode::Char(c) => Key::Unicode(c.to_ascii_lowercase()),
        KeyCode::Tab => Key::Tab,
        KeyCode::Control => Key::Control,
        KeyCode::Alt => Key::Alt,
    }
}

fn enigo_direction(press: Press) -> Direction {
    match press {
        Press::Down => Direction::Press,
        Press::Up => Direction::Release,
    }
}

impl InputSynthesizer for SystemDesktop {
    fn key(&mut self, key: KeyCode, press: Press) -> HarvestResult<()> {
        self.enigo
            .key(enigo_key(key), enigo_direction(press))
            .map_err(|e| HarvestError::input(format!("{key} {press}"), e))
    }

    fn move_pointer(&mut self, x: i32, y: i32) -> HarvestResult<()> {
        self.enigo
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(|e| HarvestError::input(format!("pointer move to ({x}, {y})"), e))
    }

    fn left_button(&mut self, press: Press) -> HarvestResult<()> {
        self.enigo
            .button(Button::Left, enigo_direction(press))
            .map_err(|e| HarvestError::input(format!("left button {press}"), e))
    }
}

impl ScreenCapturer for SystemDesktop {
    fn capture(&mut self, region: &CaptureRegion) -> HarvestResult<RgbImage> {
        let geometry = || HarvestError::Geometry {
            x: region.x,
            y: region.y,
            width: region.width,
            height: region.height,
        };
        if region.is_empty() {
            return Err(geometry());
        }

        let monitor = Monitor::from_point(region.x, region.y).map_err(|_| geometry())?;
        let monitor_x = monitor.x().map_err(HarvestError::capture)?;
        let monitor_y = monitor.y().map_err(HarvestError::capture)?;
        let shot = monitor.capture_image().map_err(HarvestError::capture)?;

        let local_x = region.x - monitor_x;
        let local_y = region.y - monitor_y;
        if local_x < 0 || local_y < 0 {
            return Err(geometry());
        }
        let (local_x, local_y) = (local_x as u32, local_y as u32);

        let width = region.width.min(shot.width().saturating_sub(local_x));
        let height = region.height.min(shot.height().saturating_sub(local_y));
        if width == 0 || height == 0 {
            return Err(geometry());
        }

        let cropped = image::imageops::crop_imm(&shot, local_x, local_y, width, height).to_image();
        log::debug!("📸 Captured {width}x{height} from monitor at ({monitor_x},{monitor_y})");
        Ok(DynamicImage::ImageRgba8(cropped).to_rgb8())
    }
}
