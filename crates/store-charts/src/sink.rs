//! Destinations for rendered charts.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use store_core::error::{EdaError, Result};
use tracing::info;

use crate::bar::{write_bar_svg, BarChart};
use crate::pie::{write_pie_svg, PieChart};

/// Something that consumes validated charts.
pub trait ChartSink {
    /// Render a bar chart; returns where it went.
    fn bar(&mut self, chart: &BarChart) -> Result<PathBuf>;
    /// Render a pie chart; returns where it went.
    fn pie(&mut self, chart: &PieChart) -> Result<PathBuf>;
}

/// Writes numbered SVG files (`01-sales-and-profit.svg`, ...) into a directory.
#[derive(Debug)]
pub struct SvgRenderer {
    dir: PathBuf,
    written: usize,
}

impl SvgRenderer {
    /// Write into `dir`, which must already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(EdaError::Config(format!(
                "output directory {} does not exist",
                dir.display()
            )));
        }
        Ok(Self { dir, written: 0 })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of charts written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    fn next_path(&self, title: &str, fallback: &str) -> PathBuf {
        let slug = slugify(title);
        let stem = if slug.is_empty() { fallback } else { slug.as_str() };
        self.dir.join(format!("{:02}-{}.svg", self.written + 1, stem))
    }
}

impl ChartSink for SvgRenderer {
    fn bar(&mut self, chart: &BarChart) -> Result<PathBuf> {
        let path = self.next_path(chart.title(), "bar-chart");
        write_bar_svg(chart, &path)?;
        self.written += 1;
        info!("Wrote {}", path.display());
        Ok(path)
    }

    fn pie(&mut self, chart: &PieChart) -> Result<PathBuf> {
        let path = self.next_path(chart.title(), "pie-chart");
        write_pie_svg(chart, &path)?;
        self.written += 1;
        info!("Wrote {}", path.display());
        Ok(path)
    }
}

/// Lower-case, hyphen-separated file stem for a chart title.
pub fn slugify(title: &str) -> String {
    static NON_ALNUM: OnceLock<Regex> = OnceLock::new();
    let re = NON_ALNUM.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("regex is valid"));
    re.replace_all(&title.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}
