/// Template matching implementation
///
/// Zero-mean normalized cross-correlation over the three color channels,
/// scored at every alignment of the template inside the capture.
use super::template::Template;
use super::types::MatchResult;
use image::{ImageBuffer, Luma, Rgb, RgbImage};
use imageproc::definitions::Image;
use imageproc::integral_image::{integral_image, integral_squared_image, sum_image_pixels};
use imageproc::template_matching::find_extremes;

/// Per-offset correlation scores, one pixel per alignment of the template
pub type ScoreMap = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Energies at or below this are treated as a flat patch that cannot correlate.
/// The smallest non-flat energy (one channel of one pixel off by one) is above 0.5.
const FLAT_ENERGY: f64 = 1e-3;

/// Find the best alignment of `template` inside `capture`.
///
/// Returns the template center at the best offset when its score reaches
/// `threshold`, `None` otherwise. A template larger than the capture has no
/// valid alignment and is reported as not found.
pub fn locate(capture: &RgbImage, template: &Template, threshold: f32) -> Option<MatchResult> {
    let scores = score_map(capture, template)?;
    let extremes = find_extremes(&scores);
    let confidence = extremes.max_value;

    log::debug!(
        "🔍 Best score {:.3} at {:?} for '{}' ({}x{} alignments)",
        confidence,
        extremes.max_value_location,
        template.name(),
        scores.width(),
        scores.height()
    );

    if confidence < threshold {
        return None;
    }

    let (best_x, best_y) = extremes.max_value_location;
    let (x, y) = template.center_at(best_x, best_y);
    Some(MatchResult { x, y, confidence })
}

/// Score every alignment of the template inside the capture.
///
/// Returns `None` when there is no alignment at all (empty inputs or a
/// template bigger than the capture).
pub fn score_map(capture: &RgbImage, template: &Template) -> Option<ScoreMap> {
    let (image_width, image_height) = capture.dimensions();
    let (template_width, template_height) = (template.width(), template.height());

    if template_width == 0 || template_height == 0 {
        return None;
    }
    if template_width > image_width || template_height > image_height {
        log::debug!(
            "⚠️ Template {}x{} larger than capture {}x{}",
            template_width,
            template_height,
            image_width,
            image_height
        );
        return None;
    }

    let prepared = PreparedTemplate::new(template.pixels());
    let windows = WindowStats::new(capture, template_width, template_height);
    let map_width = image_width - template_width + 1;
    let map_height = image_height - template_height + 1;

    Some(ScoreMap::from_fn(map_width, map_height, |x, y| {
        Luma([prepared.correlation_at(capture, &windows, x, y)])
    }))
}

/// Template samples with the per-channel mean already removed, in the
/// same interleaved RGB row layout as the capture buffer
struct PreparedTemplate {
    row_len: usize,
    centered: Vec<f32>,
    energy: f64,
}

impl PreparedTemplate {
    fn new(pixels: &RgbImage) -> Self {
        let count = (pixels.width() * pixels.height()) as f64;

        let mut mean = [0.0f64; 3];
        for pixel in pixels.pixels() {
            for (c, value) in pixel.0.iter().enumerate() {
                mean[c] += *value as f64;
            }
        }
        for m in mean.iter_mut() {
            *m /= count;
        }

        let centered: Vec<f32> = pixels
            .as_raw()
            .iter()
            .enumerate()
            .map(|(i, v)| (*v as f64 - mean[i % 3]) as f32)
            .collect();
        let energy = centered.iter().map(|v| (*v as f64) * (*v as f64)).sum();

        Self {
            row_len: pixels.width() as usize * 3,
            centered,
            energy,
        }
    }

    /// Normalized correlation between the template and the window at (x, y)
    fn correlation_at(&self, image: &RgbImage, windows: &WindowStats, x: u32, y: u32) -> f32 {
        if self.energy <= FLAT_ENERGY {
            return 0.0;
        }
        let window_energy = windows.energy_at(x, y);
        if window_energy <= FLAT_ENERGY {
            return 0.0;
        }

        // The template is zero-mean, so the window mean drops out of the cross term.
        let raw = image.as_raw();
        let stride = image.width() as usize * 3;
        let mut cross = 0.0f64;
        for (dy, template_row) in self.centered.chunks_exact(self.row_len).enumerate() {
            let start = (y as usize + dy) * stride + x as usize * 3;
            let window_row = &raw[start..start + self.row_len];
            let row: f32 = template_row
                .iter()
                .zip(window_row)
                .map(|(t, v)| t * *v as f32)
                .sum();
            cross += row as f64;
        }

        let correlation = cross / (self.energy * window_energy).sqrt();
        correlation.clamp(-1.0, 1.0) as f32
    }
}

/// Per-window sums and sums of squares, read from integral images
struct WindowStats {
    sums: Image<Rgb<u64>>,
    squares: Image<Rgb<u64>>,
    width: u32,
    height: u32,
    count: f64,
}

impl WindowStats {
    fn new(capture: &RgbImage, width: u32, height: u32) -> Self {
        Self {
            sums: integral_image::<_, u64>(capture),
            squares: integral_squared_image::<_, u64>(capture),
            width,
            height,
            count: (width * height) as f64,
        }
    }

    /// Energy of the window at (x, y) around its own per-channel mean
    fn energy_at(&self, x: u32, y: u32) -> f64 {
        let (right, bottom) = (x + self.width - 1, y + self.height - 1);
        let sum = sum_image_pixels(&self.sums, x, y, right, bottom);
        let squares = sum_image_pixels(&self.squares, x, y, right, bottom);

        let total_squares: f64 = squares.iter().map(|s| *s as f64).sum();
        let mean_part: f64 = sum.iter().map(|s| (*s as f64) * (*s as f64)).sum::<f64>() / self.count;
        total_squares - mean_part
    }
}
