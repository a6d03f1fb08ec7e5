//! Reference image loading

use crate::error::{HarvestError, HarvestResult};
use image::{DynamicImage, RgbImage};
use std::path::{Path, PathBuf};

/// Reference image of the item to click.
///
/// Pixels are always 3-channel RGB; any alpha channel is dropped on load so
/// that it compares against screen captures directly.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    pixels: RgbImage,
}

impl Template {
    pub fn load(path: impl AsRef<Path>) -> HarvestResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(HarvestError::TemplateMissing {
                path: path.to_path_buf(),
            });
        }

        let image = image::open(path).map_err(|source| HarvestError::TemplateLoad {
            path: PathBuf::from(path),
            source,
        })?;

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(Self::from_image(name, image))
    }

    pub fn from_image(name: impl Into<String>, image: DynamicImage) -> Self {
        Self {
            name: name.into(),
            pixels: image.to_rgb8(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Get the center coordinates for this template at a match location
    pub fn center_at(&self, match_x: u32, match_y: u32) -> (u32, u32) {
        (match_x + self.width() / 2, match_y + self.height() / 2)
    }
}
