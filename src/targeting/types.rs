/// Template matching data types
use serde::Serialize;

/// Best alignment of the template inside a capture
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MatchResult {
    /// X of the template center, region-local
    pub x: u32,
    /// Y of the template center, region-local
    pub y: u32,
    /// Correlation score (-1.0..=1.0, 1.0 is a pixel-perfect match)
    pub confidence: f32,
}

impl MatchResult {
    /// Top-left corner of the matched template, region-local
    pub fn top_left(&self, template_width: u32, template_height: u32) -> (u32, u32) {
        (
            self.x.saturating_sub(template_width / 2),
            self.y.saturating_sub(template_height / 2),
        )
    }

    /// Format match as string with correlation percentage
    pub fn describe(&self) -> String {
        let correlation_pct = (self.confidence * 100.0).round() as i32;
        format!("({},{}) - {}%", self.x, self.y, correlation_pct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_left_undoes_center_offset() {
        let m = MatchResult {
            x: 50,
            y: 22,
            confidence: 1.0,
        };
        assert_eq!(m.top_left(20, 20), (40, 12));
        assert_eq!(m.top_left(21, 5), (40, 20));
    }

    #[test]
    fn test_describe() {
        let m = MatchResult {
            x: 7,
            y: 9,
            confidence: 0.876,
        };
        assert_eq!(m.describe(), "(7,9) - 88%");
    }
}
