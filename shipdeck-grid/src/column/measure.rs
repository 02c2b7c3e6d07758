//! Text measurement for double-click auto-fit.

use serde::Deserialize;
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

/// Which font a text is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    Header,
    Cell,
}

/// Measures rendered text, in pixels.
pub trait TextMeasure {
    fn text_width(&self, text: &str, role: TextRole) -> u32;
}

/// Measures by terminal cell count times a fixed glyph width.
///
/// Wide (CJK) characters count as two cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonospaceMeasure {
    pub header_glyph: u32,
    pub cell_glyph: u32,
}

impl Default for MonospaceMeasure {
    fn default() -> Self {
        Self {
            header_glyph: 8,
            cell_glyph: 7,
        }
    }
}

impl TextMeasure for MonospaceMeasure {
    fn text_width(&self, text: &str, role: TextRole) -> u32 {
        let glyph = match role {
            TextRole::Header => self.header_glyph,
            TextRole::Cell => self.cell_glyph,
        };
        let cells = u32::try_from(text.width()).unwrap_or(u32::MAX);
        cells.saturating_mul(glyph)
    }
}

/// Auto-fit bounds and padding, in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoFitConfig {
    pub min_width: u32,
    pub max_width: u32,
    pub header_padding: u32,
    pub cell_padding: u32,
    /// Rows measured from the top of the current row order.
    pub sample_rows: usize,
}

impl Default for AutoFitConfig {
    fn default() -> Self {
        Self {
            min_width: 120,
            max_width: 600,
            header_padding: 40,
            cell_padding: 24,
            sample_rows: 100,
        }
    }
}

/// Width that fits the header and the sampled cells, clamped to the bounds.
pub fn fit_width<I>(
    header: &str,
    cells: I,
    measure: &dyn TextMeasure,
    config: &AutoFitConfig,
) -> u32
where
    I: IntoIterator<Item = String>,
{
    let header_width = measure
        .text_width(header, TextRole::Header)
        .saturating_add(config.header_padding);
    let widest = cells
        .into_iter()
        .take(config.sample_rows)
        .map(|text| {
            measure
                .text_width(&text, TextRole::Cell)
                .saturating_add(config.cell_padding)
        })
        .fold(header_width, u32::max);
    widest.clamp(config.min_width, config.max_width.max(config.min_width))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_width_samples_first_rows() {
        let config = AutoFitConfig::default();
        let measure = MonospaceMeasure::default();

        let mut cells: Vec<String> = (0..100).map(|_| "X".repeat(20)).collect();
        cells.push("X".repeat(60));
        assert_eq!(fit_width("POL", cells, &measure, &config), 20 * 7 + 24);
    }

    #[test]
    fn test_header_can_be_widest() {
        let config = AutoFitConfig::default();
        let measure = MonospaceMeasure::default();
        let header = "Fecha de ingreso a stacking";
        let width = fit_width(header, vec!["1".to_string()], &measure, &config);
        assert_eq!(width, 27 * 8 + 40);
    }

    #[test]
    fn test_wide_characters_count_double() {
        let measure = MonospaceMeasure::default();
        assert_eq!(measure.text_width("港口", TextRole::Cell), 4 * 7);
    }
}
