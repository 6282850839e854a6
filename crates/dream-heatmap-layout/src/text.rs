use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub font_size: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self { font_size: 10.0 }
    }
}

pub trait TextMeasurer {
    /// Rendered width of a single line of `text`, in pixels.
    fn measure_width(&self, text: &str, style: &TextStyle) -> f64;
}

/// Width from the display column count: each column is `char_width_factor * font_size` wide.
/// Wide (CJK) characters count as two columns.
#[derive(Debug, Clone, Default)]
pub struct DeterministicTextMeasurer {
    pub char_width_factor: f64,
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure_width(&self, text: &str, style: &TextStyle) -> f64 {
        let char_width_factor = if self.char_width_factor == 0.0 {
            0.65
        } else {
            self.char_width_factor
        };
        UnicodeWidthStr::width(text) as f64 * style.font_size.max(1.0) * char_width_factor
    }
}
