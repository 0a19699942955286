//! Chart descriptions: which kind of chart, and which columns feed it.

use plotters::style::RGBColor;

/// Pixels per inch used when a size is given as a figure size.
pub const DPI: f64 = 100.0;

/// Color palette for categories and hue series
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(52, 152, 219),  // Blue
    RGBColor(231, 76, 60),   // Red
    RGBColor(46, 204, 113),  // Green
    RGBColor(155, 89, 182),  // Purple
    RGBColor(243, 156, 18),  // Orange
    RGBColor(26, 188, 156),  // Teal
    RGBColor(233, 30, 99),   // Pink
    RGBColor(0, 188, 212),   // Cyan
    RGBColor(121, 85, 72),   // Brown
    RGBColor(96, 125, 139),  // Blue Grey
];

/// Pick a palette color, cycling.
pub fn palette(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

/// Shape drawn per category in a categorical facet chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetStyle {
    Box,
    Violin,
}

/// Closed set of chart kinds; each has exactly one rendering handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Every column is a cell column, rows top to bottom.
    Heatmap,
    /// Bars per category, grouped by hue.
    Bar,
    /// Slices sized by `x`, named by `labels`.
    Pie,
    /// One line per hue over numeric `x` and `y`.
    Line,
    /// One box or violin per `x` category, optionally one panel per `row` value.
    CategoricalFacet(FacetStyle),
}

/// Which column feeds which visual channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartMapping {
    pub x: Option<String>,
    pub y: Option<String>,
    pub hue: Option<String>,
    pub labels: Option<String>,
    pub row: Option<String>,
}

impl ChartMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn x(mut self, column: impl Into<String>) -> Self {
        self.x = Some(column.into());
        self
    }

    pub fn y(mut self, column: impl Into<String>) -> Self {
        self.y = Some(column.into());
        self
    }

    pub fn hue(mut self, column: impl Into<String>) -> Self {
        self.hue = Some(column.into());
        self
    }

    pub fn labels(mut self, column: impl Into<String>) -> Self {
        self.labels = Some(column.into());
        self
    }

    pub fn row(mut self, column: impl Into<String>) -> Self {
        self.row = Some(column.into());
        self
    }
}

/// Everything needed to render one chart artifact from a table.
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub mapping: ChartMapping,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Width and height in pixels.
    pub size: (u32, u32),
}

impl ChartSpec {
    pub fn new(kind: ChartKind, mapping: ChartMapping) -> Self {
        Self {
            kind,
            mapping,
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            size: (640, 480),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn axis_labels(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    /// Size given in inches, converted at [`DPI`].
    pub fn figsize(mut self, width: f64, height: f64) -> Self {
        self.size = ((width * DPI).round() as u32, (height * DPI).round() as u32);
        self
    }
}
