//! Pie chart with per-slice percentage annotations.

use std::path::Path;

use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use store_core::error::{EdaError, Result};
use store_core::models::Field;
use store_data::aggregator::Aggregate;

use crate::palette;
use crate::render_error;

/// Pixels per unit of radius scale, as a fraction of the shorter side.
const RADIUS_UNIT: f64 = 1.0 / 5.0;

/// A validated pie chart description.
#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    values: Vec<f64>,
    labels: Vec<String>,
    radius_scale: f64,
    title: String,
    size: (u32, u32),
}

impl PieChart {
    /// Fails with [`EdaError::DimensionMismatch`] on a length mismatch and
    /// with [`EdaError::InvalidValue`] for negative or non-finite slices,
    /// slices summing to zero, or a non-positive radius scale.
    pub fn new(values: Vec<f64>, labels: Vec<String>, radius_scale: f64) -> Result<Self> {
        if values.len() != labels.len() {
            return Err(EdaError::DimensionMismatch {
                expected: labels.len(),
                found: values.len(),
                series: "slices".to_string(),
            });
        }
        if labels.is_empty() {
            return Err(EdaError::EmptyChart("pie chart has no slices".to_string()));
        }
        if let Some((label, &value)) = labels
            .iter()
            .zip(&values)
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(EdaError::InvalidValue {
                label: label.clone(),
                value,
            });
        }
        let total: f64 = values.iter().sum();
        if total == 0.0 {
            return Err(EdaError::InvalidValue {
                label: "total".to_string(),
                value: total,
            });
        }
        if !radius_scale.is_finite() || radius_scale <= 0.0 {
            return Err(EdaError::InvalidValue {
                label: "radius".to_string(),
                value: radius_scale,
            });
        }

        Ok(Self {
            values,
            labels,
            radius_scale,
            title: String::new(),
            size: (600, 600),
        })
    }

    /// One slice per group of `aggregate`, sized by `measure`.
    pub fn from_aggregate(aggregate: &Aggregate, measure: Field, radius_scale: f64) -> Result<Self> {
        Self::new(aggregate.series(measure)?, aggregate.labels(), radius_scale)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Figure size in pixels.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn radius_scale(&self) -> f64 {
        self.radius_scale
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Share of each slice in percent.
    pub fn percentages(&self) -> Vec<f64> {
        let total: f64 = self.values.iter().sum();
        self.values.iter().map(|v| v / total * 100.0).collect()
    }

    fn radius_px(&self, width: u32, height: u32) -> f64 {
        self.radius_scale * RADIUS_UNIT * f64::from(width.min(height))
    }
}

/// Draw `chart` onto an existing drawing area.
pub fn draw_pie<DB: DrawingBackend>(chart: &PieChart, root: &DrawingArea<DB, Shift>) -> Result<()> {
    root.fill(&palette::BACKGROUND).map_err(render_error)?;
    let area = root
        .titled(&chart.title, ("sans-serif", 24))
        .map_err(render_error)?;

    let (width, height) = area.dim_in_pixel();
    let center = ((width / 2) as i32, (height / 2) as i32);
    let radius = chart.radius_px(width, height);
    let colors = palette::slice_colors(chart.values.len());

    let mut pie = Pie::new(&center, &radius, &chart.values, &colors, &chart.labels);
    pie.label_style(("sans-serif", 14).into_font().color(&palette::TEXT));
    pie.percentages(("sans-serif", 12).into_font().color(&palette::BACKGROUND));
    area.draw(&pie).map_err(render_error)?;

    root.present().map_err(render_error)?;
    Ok(())
}

/// Render `chart` to an SVG file.
pub fn write_pie_svg(chart: &PieChart, path: &Path) -> Result<()> {
    let root = SVGBackend::new(path, chart.size).into_drawing_area();
    draw_pie(chart, &root)
}

/// Render `chart` to an SVG document in memory.
pub fn pie_svg_string(chart: &PieChart) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, chart.size).into_drawing_area();
        draw_pie(chart, &root)?;
    }
    Ok(svg)
}
