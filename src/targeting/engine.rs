//! Targeting engine: template ownership and capture-to-screen translation

use super::matcher::locate;
use super::region::{CaptureRegion, TargetPoint};
use super::template::Template;
use super::types::MatchResult;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};

/// Owns the (optional) template and the match threshold.
///
/// A missing template is a normal state: every lookup then reports "not found".
#[derive(Debug, Clone)]
pub struct TargetingEngine {
    template: Option<Template>,
    threshold: f32,
    dump_dir: Option<PathBuf>,
}

impl TargetingEngine {
    pub fn new(template: Option<Template>, threshold: f32) -> Self {
        Self {
            template,
            threshold,
            dump_dir: None,
        }
    }

    /// Read the template once. Failure is logged here and never again.
    pub fn load(path: impl AsRef<Path>, threshold: f32) -> Self {
        let path = path.as_ref();
        let template = match Template::load(path) {
            Ok(template) => {
                log::info!(
                    "🖼️ Loaded template '{}' ({}x{}) from {}",
                    template.name(),
                    template.width(),
                    template.height(),
                    path.display()
                );
                Some(template)
            }
            Err(e) => {
                log::warn!("⚠️ {e}; item detection disabled for this run");
                None
            }
        };
        Self::new(template, threshold)
    }

    /// Write every capture (with the match outlined) into `dir`
    pub fn with_dump_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.dump_dir = dir;
        self
    }

    pub fn has_template(&self) -> bool {
        self.template.is_some()
    }

    /// Region-local match in `capture`, if any
    pub fn locate(&self, capture: &RgbImage) -> Option<MatchResult> {
        let template = self.template.as_ref()?;
        locate(capture, template, self.threshold)
    }

    /// Screen coordinate to click for a capture of `region`
    pub fn target(
        &self,
        region: &CaptureRegion,
        capture: &RgbImage,
        iteration: u64,
    ) -> Option<TargetPoint> {
        let Some(template) = self.template.as_ref() else {
            log::info!("👀 Template image not loaded; skipping detection.");
            return None;
        };

        let found = locate(capture, template, self.threshold);
        self.dump_capture(capture, template, found.as_ref(), iteration);

        let found = found?;
        if !region.contains_local(found.x, found.y) {
            log::warn!("⚠️ Match {} falls outside capture region {region}", found.describe());
            return None;
        }

        let point = region.to_screen(found.x, found.y);
        log::debug!("🎯 '{}' matched at {} -> screen {point}", template.name(), found.describe());
        Some(point)
    }

    fn dump_capture(
        &self,
        capture: &RgbImage,
        template: &Template,
        found: Option<&MatchResult>,
        iteration: u64,
    ) {
        let Some(dir) = &self.dump_dir else {
            return;
        };

        let mut annotated = capture.clone();
        if let Some(found) = found {
            let (left, top) = found.top_left(template.width(), template.height());
            draw_hollow_rect_mut(
                &mut annotated,
                Rect::at(left as i32, top as i32).of_size(template.width(), template.height()),
                Rgb([255, 0, 0]),
            );
        }

        let path = dir.join(format!("capture-{iteration}.png"));
        let saved = std::fs::create_dir_all(dir)
            .map_err(image::ImageError::IoError)
            .and_then(|_| annotated.save(&path));
        match saved {
            Ok(()) => log::debug!("💾 Capture saved to {}", path.display()),
            Err(e) => log::warn!("⚠️ Could not write capture dump {}: {e}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::targeting::region::Bounds;
    use image::DynamicImage;

    fn checker(size: u32) -> Template {
        let pixels = RgbImage::from_fn(size, size, |x, y| {
            if (x + y) % 3 == 0 {
                Rgb([250, 240, 10])
            } else {
                Rgb([10, (x * 9) as u8, (y * 11) as u8])
            }
        });
        Template::from_image("ble", DynamicImage::ImageRgb8(pixels))
    }

    fn capture_with(template: &Template, at: (u32, u32)) -> RgbImage {
        let mut capture = RgbImage::from_fn(200, 150, |x, y| Rgb([(x % 7 * 30) as u8, (y % 5 * 40) as u8, 90]));
        image::imageops::replace(&mut capture, template.pixels(), at.0 as i64, at.1 as i64);
        capture
    }

    #[test]
    fn test_missing_template_never_targets() {
        let dir = tempfile::tempdir().unwrap();
        let engine = TargetingEngine::load(dir.path().join("items/ble.png"), 0.75);
        assert!(!engine.has_template());

        let template = checker(20);
        let capture = capture_with(&template, (40, 12));
        let region = CaptureRegion::left_half(&Bounds::new(0, 0, 400, 150));

        assert!(engine.locate(&capture).is_none());
        assert!(engine.target(&region, &capture, 0).is_none());
    }

    #[test]
    fn test_target_translates_to_screen() {
        let template = checker(20);
        let engine = TargetingEngine::new(Some(template.clone()), 0.75);
        let capture = capture_with(&template, (40, 12));
        let region = CaptureRegion::left_half(&Bounds::new(300, 200, 400, 150));

        let local = engine.locate(&capture).unwrap();
        assert_eq!((local.x, local.y), (50, 22));
        assert_eq!(engine.target(&region, &capture, 0), Some(TargetPoint { x: 350, y: 222 }));
    }

    #[test]
    fn test_dump_writes_annotated_capture() {
        let dir = tempfile::tempdir().unwrap();
        let dump = dir.path().join("dumps");
        let template = checker(20);
        let engine = TargetingEngine::new(Some(template.clone()), 0.75).with_dump_dir(Some(dump.clone()));
        let capture = capture_with(&template, (40, 12));
        let region = CaptureRegion::left_half(&Bounds::new(0, 0, 400, 150));

        engine.target(&region, &capture, 3);

        let saved = image::open(dump.join("capture-3.png")).unwrap().to_rgb8();
        assert_eq!(saved.dimensions(), (200, 150));
        assert_eq!(saved.get_pixel(40, 12).0, [255, 0, 0]);
    }
}
