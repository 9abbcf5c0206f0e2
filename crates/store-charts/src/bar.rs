//! Two-series bar chart: one bar per category, the second series drawn over
//! the first on a shared zero baseline.

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::Histogram;
use store_core::error::{EdaError, Result};
use store_core::formatting::format_number;
use store_core::models::Field;
use store_data::aggregator::Aggregate;

use crate::palette;
use crate::render_error;

/// Category labels are turned sideways above this many bars.
pub const ROTATE_LABELS_ABOVE: usize = 5;

/// One named numeric series.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// A validated bar chart description.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    labels: Vec<String>,
    series: [Series; 2],
    title: String,
    x_label: String,
    y_label: String,
    size: (u32, u32),
}

impl BarChart {
    /// Fails with [`EdaError::DimensionMismatch`] unless both series have
    /// one value per label, and with [`EdaError::EmptyChart`] without labels.
    pub fn new(labels: Vec<String>, first: Series, second: Series) -> Result<Self> {
        for series in [&first, &second] {
            if series.values.len() != labels.len() {
                return Err(EdaError::DimensionMismatch {
                    expected: labels.len(),
                    found: series.values.len(),
                    series: series.name.clone(),
                });
            }
        }
        if labels.is_empty() {
            return Err(EdaError::EmptyChart("bar chart has no categories".to_string()));
        }
        if let Some((label, value)) = first
            .values
            .iter()
            .chain(&second.values)
            .zip(labels.iter().cycle())
            .find(|(v, _)| !v.is_finite())
            .map(|(v, l)| (l.clone(), *v))
        {
            return Err(EdaError::InvalidValue { label, value });
        }

        Ok(Self {
            labels,
            series: [first, second],
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            size: (800, 600),
        })
    }

    /// Sales and Profit of `aggregate`, one bar per group.
    pub fn sales_and_profit(aggregate: &Aggregate) -> Result<Self> {
        Self::new(
            aggregate.labels(),
            Series::new("Sales", aggregate.series(Field::Sales)?),
            Series::new("Profit", aggregate.series(Field::Profit)?),
        )
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_x_label(mut self, label: impl Into<String>) -> Self {
        self.x_label = label.into();
        self
    }

    pub fn with_y_label(mut self, label: impl Into<String>) -> Self {
        self.y_label = label.into();
        self
    }

    /// Figure size in pixels.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn series(&self) -> &[Series; 2] {
        &self.series
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn rotate_labels(&self) -> bool {
        self.labels.len() > ROTATE_LABELS_ABOVE
    }

    /// Value axis range: always includes zero, padded by 5 %.
    fn value_range(&self) -> (f64, f64) {
        let values = self.series.iter().flat_map(|s| s.values.iter().copied());
        let (lo, hi) = values.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
        let span = hi - lo;
        if span == 0.0 {
            return (0.0, 1.0);
        }
        let pad = span * 0.05;
        let lo = if lo < 0.0 { lo - pad } else { 0.0 };
        (lo, hi + pad)
    }
}

/// Draw `chart` onto an existing drawing area.
pub fn draw_bar<DB: DrawingBackend>(chart: &BarChart, root: &DrawingArea<DB, Shift>) -> Result<()> {
    root.fill(&palette::BACKGROUND).map_err(render_error)?;

    let n = chart.labels.len();
    let rotate = chart.rotate_labels();
    let (y_min, y_max) = chart.value_range();

    let longest = chart.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u32;
    let x_label_area = if rotate { 30 + longest * 7 } else { 40 };
    let label_font = if rotate {
        ("sans-serif", 12).into_font().transform(FontTransform::Rotate90)
    } else {
        ("sans-serif", 12).into_font()
    };

    let mut ctx = ChartBuilder::on(root)
        .caption(&chart.title, ("sans-serif", 24))
        .margin(12)
        .x_label_area_size(x_label_area)
        .y_label_area_size(90)
        .build_cartesian_2d((0..n).into_segmented(), y_min..y_max)
        .map_err(render_error)?;

    let labels = &chart.labels;
    let category = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
        _ => String::new(),
    };

    ctx.configure_mesh()
        .x_labels(n)
        .x_label_formatter(&category)
        .x_label_style(label_font)
        .y_label_formatter(&|v: &f64| format_number(*v, 0))
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .axis_desc_style(("sans-serif", 15))
        .draw()
        .map_err(render_error)?;

    // The overlay is drawn narrower so the series underneath stays visible.
    let colors = [palette::SERIES_A, palette::SERIES_B];
    let margins = [2, 8];
    for ((series, color), margin) in chart.series.iter().zip(colors).zip(margins) {
        ctx.draw_series(
            Histogram::vertical(&ctx)
                .style(color.filled())
                .margin(margin)
                .data(series.values.iter().enumerate().map(|(i, v)| (i, *v))),
        )
        .map_err(render_error)?
        .label(series.name.as_str())
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    ctx.configure_series_labels()
        .background_style(palette::BACKGROUND.mix(0.8))
        .border_style(palette::TEXT)
        .draw()
        .map_err(render_error)?;

    root.present().map_err(render_error)?;
    Ok(())
}

/// Render `chart` to an SVG file.
pub fn write_bar_svg(chart: &BarChart, path: &Path) -> Result<()> {
    let root = SVGBackend::new(path, chart.size).into_drawing_area();
    draw_bar(chart, &root)
}

/// Render `chart` to an SVG document in memory.
pub fn bar_svg_string(chart: &BarChart) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, chart.size).into_drawing_area();
        draw_bar(chart, &root)?;
    }
    Ok(svg)
}
