//! Static Chart Renderer
//! Draws a table to an SVG file with plotters, one handler per chart kind.
//!
//! Categorical axes center category `i` on the value `i`, so its band is
//! `[i - 0.5, i + 0.5)` and the axis key points land on band centers.

use super::spec::{palette, ChartKind, ChartSpec, FacetStyle};
use crate::data::{DataProcessor, ProcessorError, ShapeError};
use crate::stats::{StatsCalculator, DENSITY_POINTS};
use plotters::coord::{CoordTranslate, Shift};
use plotters::drawing::DrawingAreaErrorKind;
use plotters::element::Pie;
use plotters::prelude::*;
use polars::prelude::*;
use std::ops::Range;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

const FONT: &str = "sans-serif";
const HEAT_LOW: RGBColor = RGBColor(40, 26, 64);
const HEAT_HIGH: RGBColor = RGBColor(250, 235, 200);

/// Fraction of a category band covered by its bars or box.
const BAND_FILL: f64 = 0.8;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("{kind:?} chart needs a {channel} column")]
    MissingChannel {
        kind: ChartKind,
        channel: &'static str,
    },
    #[error("Drawing failed: {0}")]
    Draw(String),
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error(transparent)]
    Processor(#[from] ProcessorError),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for RenderError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Draw(err.to_string())
    }
}

/// One bar of a (possibly grouped) bar chart, in category-axis units.
struct Bar {
    start: f64,
    end: f64,
    value: f64,
    hue: usize,
}

/// Renders [`ChartSpec`]s to SVG files.
pub struct ChartRenderer;

impl ChartRenderer {
    /// Render `df` as described by `spec` into `path`, overwriting it.
    pub fn render(df: &DataFrame, spec: &ChartSpec, path: &Path) -> Result<(), RenderError> {
        let root = SVGBackend::new(path, spec.size).into_drawing_area();
        root.fill(&WHITE)?;

        match spec.kind {
            ChartKind::Heatmap => Self::draw_heatmap(&root, df, spec)?,
            ChartKind::Bar => Self::draw_bar(&root, df, spec)?,
            ChartKind::Pie => Self::draw_pie(&root, df, spec)?,
            ChartKind::Line => Self::draw_line(&root, df, spec)?,
            ChartKind::CategoricalFacet(style) => Self::draw_facets(&root, df, spec, style)?,
        }

        root.present()?;
        debug!("Rendered {:?} chart to {}", spec.kind, path.display());
        Ok(())
    }

    fn channel<'m>(
        spec: &'m ChartSpec,
        column: &'m Option<String>,
        channel: &'static str,
    ) -> Result<&'m str, RenderError> {
        column.as_deref().ok_or(RenderError::MissingChannel {
            kind: spec.kind,
            channel,
        })
    }

    fn draw_heatmap(root: &Area, df: &DataFrame, spec: &ChartSpec) -> Result<(), RenderError> {
        let columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let cells = columns
            .iter()
            .map(|c| DataProcessor::numeric_values(df, c))
            .collect::<Result<Vec<_>, _>>()?;

        let rows = df.height();
        let height = rows.max(1) as f64;
        let bands = Self::band_axis(columns.len());

        let mut chart = ChartBuilder::on(root)
            .caption(&spec.title, (FONT, 24))
            .margin(20)
            .x_label_area_size(110)
            .y_label_area_size(60)
            .build_cartesian_2d(bands.clone(), 0f64..height)?;

        let column_label = |v: &f64| Self::category_label(&columns, *v);
        let row_label = |v: &f64| format!("{:.0}", height - v);
        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(columns.len() + 1)
            .x_desc(&spec.x_label)
            .y_desc(&spec.y_label)
            .x_label_formatter(&column_label)
            .y_label_formatter(&row_label)
            .x_label_style((FONT, 12).into_font().transform(FontTransform::Rotate90))
            .draw()?;

        chart.draw_series(std::iter::once(Rectangle::new(
            [(bands.start, 0.0), (bands.end, height)],
            HEAT_LOW.filled(),
        )))?;

        // Row 0 at the top.
        chart.draw_series(cells.iter().enumerate().flat_map(|(c, values)| {
            values
                .iter()
                .enumerate()
                .filter(|(_, v)| **v > 0.0)
                .map(move |(r, _)| {
                    let y = (rows - r - 1) as f64;
                    Rectangle::new(
                        [(c as f64 - 0.5, y), (c as f64 + 0.5, y + 1.0)],
                        HEAT_HIGH.filled(),
                    )
                })
        }))?;

        Ok(())
    }

    fn draw_bar(root: &Area, df: &DataFrame, spec: &ChartSpec) -> Result<(), RenderError> {
        let x = Self::channel(spec, &spec.mapping.x, "x")?;
        let y = Self::channel(spec, &spec.mapping.y, "y")?;
        DataProcessor::require_columns(df, &[x, y])?;

        // Text on the y channel makes the bars horizontal.
        let horizontal = df.column(y)?.dtype() == &DataType::String;
        let (category_column, value_column) = if horizontal { (y, x) } else { (x, y) };

        let category_values = DataProcessor::string_values(df, category_column)?;
        let values = DataProcessor::numeric_values(df, value_column)?;
        let hue_values = match &spec.mapping.hue {
            Some(hue) => DataProcessor::string_values(df, hue)?,
            None => vec![String::new(); df.height()],
        };

        let categories = DataProcessor::unique_in_order(&category_values);
        let hues = DataProcessor::unique_in_order(&hue_values);
        let bar_width = BAND_FILL / hues.len().max(1) as f64;

        let bars: Vec<Bar> = category_values
            .iter()
            .zip(&hue_values)
            .zip(&values)
            .filter(|(_, v)| v.is_finite())
            .filter_map(|((category, hue), value)| {
                let c = categories.iter().position(|name| name == category)?;
                let h = hues.iter().position(|name| name == hue)?;
                let start = c as f64 - BAND_FILL / 2.0 + h as f64 * bar_width;
                Some(Bar {
                    start,
                    end: start + bar_width,
                    value: *value,
                    hue: h,
                })
            })
            .collect();

        let max_value = bars.iter().map(|b| b.value).fold(0.0, f64::max).max(1.0) * 1.05;
        let bands = Self::band_axis(categories.len());
        let label_count = categories.len() + 1;
        let category_label = |v: &f64| Self::category_label(&categories, *v);
        let legend = spec.mapping.hue.as_ref().map(|_| hues.as_slice());

        if horizontal {
            let mut chart = ChartBuilder::on(root)
                .caption(&spec.title, (FONT, 24))
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(140)
                .build_cartesian_2d(0f64..max_value, bands)?;

            chart
                .configure_mesh()
                .disable_y_mesh()
                .y_labels(label_count)
                .x_desc(&spec.x_label)
                .y_desc(&spec.y_label)
                .y_label_formatter(&category_label)
                .draw()?;

            chart.draw_series(bars.iter().map(|b| {
                Rectangle::new([(0.0, b.start), (b.value, b.end)], palette(b.hue).filled())
            }))?;

            if let Some(hues) = legend {
                Self::draw_legend(&mut chart, hues)?;
            }
        } else {
            let mut chart = ChartBuilder::on(root)
                .caption(&spec.title, (FONT, 24))
                .margin(20)
                .x_label_area_size(60)
                .y_label_area_size(70)
                .build_cartesian_2d(bands, 0f64..max_value)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(label_count)
                .x_desc(&spec.x_label)
                .y_desc(&spec.y_label)
                .x_label_formatter(&category_label)
                .x_label_style((FONT, 12).into_font().transform(FontTransform::Rotate90))
                .draw()?;

            chart.draw_series(bars.iter().map(|b| {
                Rectangle::new([(b.start, 0.0), (b.end, b.value)], palette(b.hue).filled())
            }))?;

            if let Some(hues) = legend {
                Self::draw_legend(&mut chart, hues)?;
            }
        }

        Ok(())
    }

    fn draw_pie(root: &Area, df: &DataFrame, spec: &ChartSpec) -> Result<(), RenderError> {
        let x = Self::channel(spec, &spec.mapping.x, "x")?;
        let labels_column = Self::channel(spec, &spec.mapping.labels, "labels")?;
        DataProcessor::require_columns(df, &[x, labels_column])?;

        let sizes: Vec<f64> = DataProcessor::numeric_values(df, x)?
            .into_iter()
            .map(|v| if v.is_finite() { v.max(0.0) } else { 0.0 })
            .collect();
        let labels = DataProcessor::string_values(df, labels_column)?;

        let area = root.titled(&spec.title, (FONT, 24))?;
        if sizes.iter().sum::<f64>() <= 0.0 {
            warn!("Pie chart {:?} has nothing to draw", spec.title);
            return Ok(());
        }

        let (width, height) = area.dim_in_pixel();
        let center = ((width / 2) as i32, (height / 2) as i32);
        let radius = width.min(height) as f64 * 0.35;
        let colors: Vec<RGBColor> = (0..sizes.len()).map(palette).collect();

        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.label_style((FONT, 16).into_font().color(&BLACK));
        pie.percentages((FONT, 14).into_font().color(&WHITE));
        area.draw(&pie)?;

        Ok(())
    }

    fn draw_line(root: &Area, df: &DataFrame, spec: &ChartSpec) -> Result<(), RenderError> {
        let x = Self::channel(spec, &spec.mapping.x, "x")?;
        let y = Self::channel(spec, &spec.mapping.y, "y")?;
        DataProcessor::require_columns(df, &[x, y])?;

        let xs = DataProcessor::numeric_values(df, x)?;
        let ys = DataProcessor::numeric_values(df, y)?;
        let hue_values = match &spec.mapping.hue {
            Some(hue) => DataProcessor::string_values(df, hue)?,
            None => vec![y.to_string(); df.height()],
        };
        let hues = DataProcessor::unique_in_order(&hue_values);

        let (x_min, x_max) = Self::value_range(&xs, 0.0);
        let (_, y_max) = Self::value_range(&ys, 0.05);

        let mut chart = ChartBuilder::on(root)
            .caption(&spec.title, (FONT, 24))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(x_min..x_max, 0f64..y_max.max(1.0))?;

        let whole = |v: &f64| format!("{:.0}", v);
        chart
            .configure_mesh()
            .x_desc(&spec.x_label)
            .y_desc(&spec.y_label)
            .x_label_formatter(&whole)
            .draw()?;

        for (i, hue) in hues.iter().enumerate() {
            let mut points: Vec<(f64, f64)> = xs
                .iter()
                .zip(&ys)
                .zip(&hue_values)
                .filter(|((px, py), h)| *h == hue && px.is_finite() && py.is_finite())
                .map(|((px, py), _)| (*px, *py))
                .collect();
            points.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

            let color = palette(i);
            chart
                .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))?
                .label(hue.as_str())
                .legend(move |(lx, ly)| {
                    PathElement::new(vec![(lx, ly), (lx + 20, ly)], color.stroke_width(2))
                });
            chart.draw_series(
                points
                    .into_iter()
                    .map(|p| Circle::new(p, 3, color.filled())),
            )?;
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        Ok(())
    }

    fn draw_facets(
        root: &Area,
        df: &DataFrame,
        spec: &ChartSpec,
        style: FacetStyle,
    ) -> Result<(), RenderError> {
        let x = Self::channel(spec, &spec.mapping.x, "x")?;
        let y = Self::channel(spec, &spec.mapping.y, "y")?;
        DataProcessor::require_columns(df, &[x, y])?;

        // Panels share the category order and the value axis.
        let categories = DataProcessor::unique_in_order(&DataProcessor::string_values(df, x)?);
        let value_range = Self::value_range(&DataProcessor::numeric_values(df, y)?, 0.1);

        let mut panels: Vec<(String, DataFrame)> = Vec::new();
        if let Some(row) = &spec.mapping.row {
            let row_values = DataProcessor::string_values(df, row)?;
            for name in DataProcessor::unique_in_order(&row_values) {
                let mask: Vec<bool> = row_values.iter().map(|v| *v == name).collect();
                let panel = df.filter(&BooleanChunked::from_slice("panel".into(), &mask))?;
                panels.push((format!("{} = {}", row, name), panel));
            }
        }
        if panels.is_empty() {
            panels.push((String::new(), df.clone()));
        }

        let area = root.titled(&spec.title, (FONT, 24))?;
        let areas = area.split_evenly((panels.len(), 1));

        for (panel_area, (name, panel)) in areas.iter().zip(&panels) {
            Self::draw_distribution(
                panel_area,
                panel,
                (x, y),
                &categories,
                value_range,
                (name.as_str(), spec),
                style,
            )?;
        }

        Ok(())
    }

    fn draw_distribution(
        area: &Area,
        df: &DataFrame,
        (x, y): (&str, &str),
        categories: &[String],
        (y_min, y_max): (f64, f64),
        (caption, spec): (&str, &ChartSpec),
        style: FacetStyle,
    ) -> Result<(), RenderError> {
        let xs = DataProcessor::string_values(df, x)?;
        let ys = DataProcessor::numeric_values(df, y)?;

        let mut chart = ChartBuilder::on(area)
            .caption(caption, (FONT, 16))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(Self::band_axis(categories.len()), y_min..y_max)?;

        let category_label = |v: &f64| Self::category_label(categories, *v);
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(categories.len() + 1)
            .x_desc(&spec.x_label)
            .y_desc(&spec.y_label)
            .x_label_formatter(&category_label)
            .draw()?;

        for (i, category) in categories.iter().enumerate() {
            let values: Vec<f64> = xs
                .iter()
                .zip(&ys)
                .filter(|(c, _)| *c == category)
                .map(|(_, v)| *v)
                .collect();
            let center = i as f64;
            let color = palette(i);

            match style {
                FacetStyle::Box => Self::draw_box(&mut chart, center, &values, color)?,
                FacetStyle::Violin => Self::draw_violin(&mut chart, center, &values, color)?,
            }
        }

        Ok(())
    }

    fn draw_box<'a, DB, CT>(
        chart: &mut ChartContext<'a, DB, CT>,
        center: f64,
        values: &[f64],
        color: RGBColor,
    ) -> Result<(), RenderError>
    where
        DB: DrawingBackend + 'a,
        CT: CoordTranslate<From = (f64, f64)>,
    {
        let stats = StatsCalculator::compute_descriptive_stats(values);
        if stats.count == 0 {
            return Ok(());
        }
        let sorted = StatsCalculator::sorted_finite(values);
        let (low, high) = stats.whiskers(&sorted);
        let half = BAND_FILL / 2.0 * 0.75;
        let cap = half / 2.0;

        chart.draw_series([
            Rectangle::new(
                [(center - half, stats.q1), (center + half, stats.q3)],
                color.mix(0.4).filled(),
            ),
            Rectangle::new(
                [(center - half, stats.q1), (center + half, stats.q3)],
                color.stroke_width(1),
            ),
        ])?;

        chart.draw_series([
            PathElement::new(
                vec![(center - half, stats.median), (center + half, stats.median)],
                BLACK.stroke_width(2),
            ),
            PathElement::new(vec![(center, low), (center, stats.q1)], color.stroke_width(1)),
            PathElement::new(vec![(center, stats.q3), (center, high)], color.stroke_width(1)),
            PathElement::new(
                vec![(center - cap, low), (center + cap, low)],
                color.stroke_width(1),
            ),
            PathElement::new(
                vec![(center - cap, high), (center + cap, high)],
                color.stroke_width(1),
            ),
        ])?;

        chart.draw_series(
            sorted
                .iter()
                .filter(|v| **v < low || **v > high)
                .map(|v| Circle::new((center, *v), 3, color.stroke_width(1))),
        )?;

        Ok(())
    }

    fn draw_violin<'a, DB, CT>(
        chart: &mut ChartContext<'a, DB, CT>,
        center: f64,
        values: &[f64],
        color: RGBColor,
    ) -> Result<(), RenderError>
    where
        DB: DrawingBackend + 'a,
        CT: CoordTranslate<From = (f64, f64)>,
    {
        let stats = StatsCalculator::compute_descriptive_stats(values);
        if stats.count == 0 {
            return Ok(());
        }
        let half = BAND_FILL / 2.0;
        let density = StatsCalculator::kernel_density(values, DENSITY_POINTS);

        if density.is_empty() {
            // No spread: a single value drawn as a flat line.
            chart.draw_series(std::iter::once(PathElement::new(
                vec![(center - half, stats.median), (center + half, stats.median)],
                color.stroke_width(2),
            )))?;
            return Ok(());
        }

        let peak = density.iter().map(|(_, d)| *d).fold(f64::MIN_POSITIVE, f64::max);
        let outline: Vec<(f64, f64)> = density
            .iter()
            .map(|(v, d)| (center + half * d / peak, *v))
            .chain(
                density
                    .iter()
                    .rev()
                    .map(|(v, d)| (center - half * d / peak, *v)),
            )
            .collect();

        chart.draw_series(std::iter::once(Polygon::new(
            outline,
            color.mix(0.5).filled(),
        )))?;

        chart.draw_series([
            PathElement::new(vec![(center, stats.q1), (center, stats.q3)], BLACK.stroke_width(3)),
            PathElement::new(vec![(center, stats.min), (center, stats.max)], BLACK.stroke_width(1)),
        ])?;
        chart.draw_series(std::iter::once(Circle::new(
            (center, stats.median),
            3,
            WHITE.filled(),
        )))?;

        Ok(())
    }

    fn draw_legend<'a, DB, CT>(
        chart: &mut ChartContext<'a, DB, CT>,
        names: &[String],
    ) -> Result<(), RenderError>
    where
        DB: DrawingBackend + 'a,
        CT: CoordTranslate<From = (f64, f64)>,
    {
        for (i, name) in names.iter().enumerate() {
            let color = palette(i);
            chart
                .draw_series(std::iter::empty::<Rectangle<(f64, f64)>>())?
                .label(name.as_str())
                .legend(move |(lx, ly)| {
                    Rectangle::new([(lx, ly - 5), (lx + 10, ly + 5)], color.filled())
                });
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        Ok(())
    }

    /// Axis range holding `bands` categories centered on `0..bands`.
    fn band_axis(bands: usize) -> Range<f64> {
        -0.5..bands.max(1) as f64 - 0.5
    }

    /// Name of the category centered on `value`; empty between centers.
    fn category_label(categories: &[String], value: f64) -> String {
        let index = value.round();
        if index < 0.0 || (value - index).abs() > 1e-6 {
            return String::new();
        }
        categories
            .get(index as usize)
            .cloned()
            .unwrap_or_default()
    }

    /// Finite min and max, padded by `pad` of the span; `(0, 1)` when empty.
    fn value_range(values: &[f64], pad: f64) -> (f64, f64) {
        let (min, max) = values
            .iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(*v), hi.max(*v))
            });

        if min > max {
            return (0.0, 1.0);
        }
        if min == max {
            return (min - 1.0, max + 1.0);
        }
        let span = (max - min) * pad;
        (min - span, max + span)
    }
}
