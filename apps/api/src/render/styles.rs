//! Brand palette, typography table and table styles.
//!
//! Everything here is a pure value: renderers look styles up by kind instead of mutating a
//! shared registry.

use printpdf::{Color, Rgb};

/// An sRGB color with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrandColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl BrandColor {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn to_pdf(self) -> Color {
        Color::Rgb(Rgb::new(self.r, self.g, self.b, None))
    }
}

pub mod palette {
    use super::BrandColor;

    pub const BRAND_BLUE: BrandColor = BrandColor::new(0.0, 0.4, 0.8); // #0066CC
    pub const LIGHT_BLUE: BrandColor = BrandColor::new(0.9, 0.95, 1.0); // #E6F3FF
    pub const ACCENT: BrandColor = BrandColor::new(0.1, 0.6, 0.9); // #1A99E6
    pub const SUCCESS_GREEN: BrandColor = BrandColor::new(0.2, 0.7, 0.3); // #33B34D
    pub const WARNING_ORANGE: BrandColor = BrandColor::new(1.0, 0.6, 0.2); // #FF9933
    pub const DARK_GRAY: BrandColor = BrandColor::new(0.2, 0.2, 0.2); // #333333
    pub const LIGHT_GRAY: BrandColor = BrandColor::new(0.6, 0.6, 0.6); // #999999
    pub const VERY_LIGHT_GRAY: BrandColor = BrandColor::new(0.95, 0.95, 0.95); // #F2F2F2
    pub const WHITE: BrandColor = BrandColor::new(1.0, 1.0, 1.0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleKind {
    Title,
    SlideTitle,
    Subtitle,
    Bullet,
    Body,
    PositiveMetric,
    WarningMetric,
    TableHeader,
    TableCell,
    Header,
    Footer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Font size, color and spacing for one style. Lengths are in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font_size: f32,
    pub color: BrandColor,
    pub bold: bool,
    pub space_before: f32,
    pub space_after: f32,
    pub left_indent: f32,
    pub align: Align,
}

impl TextStyle {
    const fn plain(font_size: f32, color: BrandColor, bold: bool) -> Self {
        Self {
            font_size,
            color,
            bold,
            space_before: 0.0,
            space_after: 0.0,
            left_indent: 0.0,
            align: Align::Left,
        }
    }

    pub fn leading(&self) -> f32 {
        self.font_size * 1.2
    }
}

/// The typography table used by every deck.
pub fn text_style(kind: StyleKind) -> TextStyle {
    use palette::*;

    match kind {
        StyleKind::Title => TextStyle {
            space_after: 25.0,
            ..TextStyle::plain(28.0, BRAND_BLUE, true)
        },
        StyleKind::SlideTitle => TextStyle {
            space_before: 15.0,
            space_after: 20.0,
            ..TextStyle::plain(20.0, BRAND_BLUE, true)
        },
        StyleKind::Subtitle => TextStyle {
            space_before: 12.0,
            space_after: 10.0,
            ..TextStyle::plain(14.0, ACCENT, true)
        },
        StyleKind::Bullet => TextStyle {
            space_before: 3.0,
            space_after: 6.0,
            left_indent: 20.0,
            ..TextStyle::plain(12.0, DARK_GRAY, false)
        },
        StyleKind::Body => TextStyle {
            space_after: 4.0,
            ..TextStyle::plain(11.0, DARK_GRAY, false)
        },
        StyleKind::PositiveMetric => TextStyle {
            align: Align::Center,
            ..TextStyle::plain(11.0, SUCCESS_GREEN, true)
        },
        StyleKind::WarningMetric => TextStyle {
            align: Align::Center,
            ..TextStyle::plain(11.0, WARNING_ORANGE, true)
        },
        StyleKind::TableHeader => TextStyle {
            align: Align::Center,
            ..TextStyle::plain(11.0, WHITE, true)
        },
        StyleKind::TableCell => TextStyle {
            align: Align::Center,
            ..TextStyle::plain(10.0, DARK_GRAY, false)
        },
        StyleKind::Header => TextStyle::plain(16.0, WHITE, true),
        StyleKind::Footer => TextStyle {
            align: Align::Center,
            ..TextStyle::plain(9.0, LIGHT_GRAY, false)
        },
    }
}

/// Background, grid and padding rules for a table. Lengths are in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableStyle {
    pub header_background: BrandColor,
    pub row_backgrounds: [BrandColor; 2],
    /// Overrides the first column's background on body rows.
    pub label_column_background: Option<BrandColor>,
    pub grid_color: BrandColor,
    pub grid_width: f32,
    pub padding_x: f32,
    pub padding_y: f32,
}

pub fn data_table_style() -> TableStyle {
    TableStyle {
        header_background: palette::BRAND_BLUE,
        row_backgrounds: [palette::WHITE, palette::VERY_LIGHT_GRAY],
        label_column_background: None,
        grid_color: palette::LIGHT_GRAY,
        grid_width: 1.0,
        padding_x: 8.0,
        padding_y: 6.0,
    }
}

pub fn summary_table_style() -> TableStyle {
    TableStyle {
        row_backgrounds: [palette::WHITE, palette::WHITE],
        label_column_background: Some(palette::VERY_LIGHT_GRAY),
        padding_x: 12.0,
        padding_y: 8.0,
        ..data_table_style()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [StyleKind; 11] = [
        StyleKind::Title,
        StyleKind::SlideTitle,
        StyleKind::Subtitle,
        StyleKind::Bullet,
        StyleKind::Body,
        StyleKind::PositiveMetric,
        StyleKind::WarningMetric,
        StyleKind::TableHeader,
        StyleKind::TableCell,
        StyleKind::Header,
        StyleKind::Footer,
    ];

    #[test]
    fn test_every_style_is_distinct() {
        for (i, a) in ALL_KINDS.iter().enumerate() {
            for b in &ALL_KINDS[i + 1..] {
                let (sa, sb) = (text_style(*a), text_style(*b));
                let same = sa.font_size == sb.font_size && sa.color == sb.color && sa.bold == sb.bold;
                assert!(!same, "{a:?} and {b:?} share size/color/weight");
            }
        }
    }

    #[test]
    fn test_metric_polarity_colors() {
        assert_eq!(text_style(StyleKind::PositiveMetric).color, palette::SUCCESS_GREEN);
        assert_eq!(text_style(StyleKind::WarningMetric).color, palette::WARNING_ORANGE);
    }

    #[test]
    fn test_summary_style_shades_label_column() {
        let style = summary_table_style();
        assert_eq!(style.label_column_background, Some(palette::VERY_LIGHT_GRAY));
        assert_eq!(style.grid_color, palette::LIGHT_GRAY);
    }
}
