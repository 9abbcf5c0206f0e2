//! Colours shared by every chart.

use plotters::style::RGBColor;

/// First bar series (sales).
pub const SERIES_A: RGBColor = RGBColor(31, 119, 180);
/// Second bar series (profit), drawn over the first.
pub const SERIES_B: RGBColor = RGBColor(214, 39, 40);

pub const BACKGROUND: RGBColor = RGBColor(255, 255, 255);
pub const TEXT: RGBColor = RGBColor(33, 33, 33);

/// Ten-colour categorical palette for pie slices.
const SLICES: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

/// `count` slice colours, cycling through the palette.
///
/// When the palette wraps, the last slice would touch the first one with
/// the same colour, so it takes the next colour instead.
pub fn slice_colors(count: usize) -> Vec<RGBColor> {
    let mut colors: Vec<RGBColor> = (0..count).map(|i| SLICES[i % SLICES.len()]).collect();
    if count > 1 && (count - 1) % SLICES.len() == 0 {
        colors[count - 1] = SLICES[1];
    }
    colors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_colors_count() {
        assert!(slice_colors(0).is_empty());
        assert_eq!(slice_colors(3).len(), 3);
        assert_eq!(slice_colors(17).len(), 17);
    }

    #[test]
    fn test_slice_colors_cycle() {
        let colors = slice_colors(12);
        assert_eq!(colors[10], colors[0]);
        assert_eq!(colors[11], colors[1]);
    }

    #[test]
    fn test_wrapped_last_slice_differs_from_first() {
        let colors = slice_colors(11);
        assert_ne!(colors[10], colors[0]);
    }
}
