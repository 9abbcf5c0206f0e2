//! The five-section Superstore report.
//!
//! [`ReportDriver`] walks the selected [`Section`]s in narrative order. Each
//! section prints group-by tables and commentary to the writer and passes
//! bar and pie charts to the configured [`ChartSink`]. Load and aggregation
//! failures abort the report; a chart that cannot be drawn is skipped with
//! a warning unless the driver is strict.

use std::io::Write;
use std::path::PathBuf;

use store_charts::bar::BarChart;
use store_charts::pie::PieChart;
use store_charts::sink::ChartSink;
use store_charts::table::render_table;
use store_core::error::Result;
use store_core::formatting::{format_currency, format_number, format_share, join_names};
use store_core::models::{Dataset, Field};
use store_core::settings::Section;
use store_data::aggregator::{Aggregate, Aggregator};
use store_data::analysis::{Analysis, DatasetOverview};
use store_data::insights::commentary;
use store_data::reader::DropReason;
use tracing::{debug, info, warn};

/// Y-axis caption shared by every bar chart.
const VALUE_AXIS: &str = "Sales/Profit";

/// Columns the report groups by; they must survive column dropping.
pub const REQUIRED_FIELDS: [Field; 8] = [
    Field::Region,
    Field::State,
    Field::City,
    Field::Category,
    Field::SubCategory,
    Field::Segment,
    Field::ShipMode,
    Field::Discount,
];

// ── Summary ───────────────────────────────────────────────────────────────────

/// A chart that was not drawn, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedChart {
    pub title: String,
    pub reason: String,
}

/// What a report run produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportSummary {
    /// Locations reported by the sink, in drawing order.
    pub charts_written: Vec<PathBuf>,
    pub charts_skipped: Vec<SkippedChart>,
    /// Sections that ran to completion.
    pub sections: Vec<Section>,
}

enum Chart {
    Bar(BarChart),
    Pie(PieChart),
}

// ── ReportDriver ──────────────────────────────────────────────────────────────

/// Sequences the report sections over one loaded dataset.
///
/// Without a sink only tables and commentary are produced.
pub struct ReportDriver<'a, W: Write> {
    out: W,
    sink: Option<&'a mut dyn ChartSink>,
    strict: bool,
    summary: ReportSummary,
}

impl<'a, W: Write> ReportDriver<'a, W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            sink: None,
            strict: false,
            summary: ReportSummary::default(),
        }
    }

    /// Send charts to `sink`.
    pub fn with_sink(mut self, sink: &'a mut dyn ChartSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// When set, the first chart error aborts the report.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Print the overview, then run `sections` in the given order.
    pub fn run(mut self, analysis: &Analysis, sections: &[Section]) -> Result<ReportSummary> {
        self.write_overview(&analysis.overview)?;

        for &section in sections {
            info!("Running section: {}", section.title());
            writeln!(self.out)?;
            writeln!(self.out, "== {} ==", section.title())?;
            let dataset = &analysis.dataset;
            match section {
                Section::Geography => self.geography(dataset)?,
                Section::Category => self.category(dataset)?,
                Section::Segment => self.segment(dataset)?,
                Section::Shipping => self.shipping(dataset)?,
                Section::Discount => self.discount(dataset)?,
            }
            self.summary.sections.push(section);
        }

        self.out.flush()?;
        info!(
            "Report finished: {} charts written, {} skipped",
            self.summary.charts_written.len(),
            self.summary.charts_skipped.len()
        );
        Ok(self.summary)
    }

    // ── Overview ──────────────────────────────────────────────────────────

    fn write_overview(&mut self, overview: &DatasetOverview) -> Result<()> {
        let out = &mut self.out;
        writeln!(
            out,
            "Superstore sales report ({})",
            overview.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(out, "Source: {}", overview.source)?;
        writeln!(
            out,
            "Records: {} (loaded in {:.2}s)",
            format_number(overview.records as f64, 0),
            overview.load_time_seconds
        )?;

        let columns: Vec<&str> = overview.columns.iter().map(|f| f.header()).collect();
        writeln!(out, "Columns: {}", columns.join(", "))?;

        if !overview.dropped.is_empty() {
            let dropped: Vec<String> = overview
                .dropped
                .iter()
                .map(|d| match &d.reason {
                    DropReason::Constant(value) => format!("{} (always \"{}\")", d.field, value),
                    DropReason::Requested => format!("{} (requested)", d.field),
                })
                .collect();
            writeln!(out, "Dropped: {}", dropped.join(", "))?;
        }

        for (country, count) in &overview.country_counts {
            writeln!(
                out,
                "Records from {}: {}",
                country,
                format_number(*count as f64, 0)
            )?;
        }

        let totals = overview.totals;
        writeln!(out, "Net sales: {}", format_currency(totals.sales))?;
        writeln!(out, "Net profit: {}", format_currency(totals.profit))?;
        match totals.profit_ratio() {
            Some(_) => writeln!(
                out,
                "Operating profit ratio: {}",
                format_share(totals.profit, totals.sales)
            )?,
            None => writeln!(out, "Operating profit ratio: n/a")?,
        }
        Ok(())
    }

    // ── Sections ──────────────────────────────────────────────────────────

    fn geography(&mut self, dataset: &Dataset) -> Result<()> {
        let regions = Aggregator::sales_and_profit(dataset, &[Field::Region])?;
        self.table(&regions)?;
        self.bar(&regions, "Sales and Profit Across Different Regions", "Region", (700, 500))?;
        self.pie(&regions, Field::Sales, 1.5, "Sales Distribution Across Regions")?;
        self.pie(&regions, Field::Profit, 1.5, "Profit Distribution Across Regions")?;
        self.commentary(&regions)?;

        let states = Aggregator::sales_and_profit(dataset, &[Field::State])?;
        self.table(&states)?;
        self.bar(&states, "Sales and Profit Across Different States", "States", (1600, 800))?;
        self.commentary(&states)?;

        let losses = states.loss_making(Field::Profit)?;
        if losses.is_empty() {
            writeln!(self.out, "No state operates at a loss.")?;
            return Ok(());
        }
        writeln!(self.out, "Loss-making states: {}", join_names(&losses))?;

        // Cities are keyed by state too, so same-named cities stay apart.
        let subset = dataset.filtered(|r| losses.contains(&r.state));
        debug!("{} records in loss-making states", subset.len());
        let cities = Aggregator::sales_and_profit(&subset, &[Field::State, Field::City])?;
        for (state, by_city) in cities.partition()? {
            self.subheading(&state)?;
            self.bar(
                &by_city,
                &format!("Sales and Profit Across {state}"),
                &state,
                (1400, 600),
            )?;
            self.pie(
                &by_city,
                Field::Sales,
                1.5,
                &format!("Sales Distribution Across {state}"),
            )?;
            self.commentary(&by_city)?;
        }
        Ok(())
    }

    fn category(&mut self, dataset: &Dataset) -> Result<()> {
        let products = Aggregator::sales_and_profit(dataset, &[Field::Category, Field::SubCategory])?;
        self.table(&products)?;

        let categories = products.roll_up()?;
        self.table(&categories)?;
        self.commentary(&categories)?;

        for (category, subs) in products.partition()? {
            self.subheading(&category)?;
            self.bar(
                &subs,
                &format!("Sales and Profit Across {category} Category"),
                &category,
                (600, 400),
            )?;
            self.pie(
                &subs,
                Field::Sales,
                1.5,
                &format!("Sales Distribution Across {category}"),
            )?;
            self.commentary(&subs)?;
        }
        Ok(())
    }

    fn segment(&mut self, dataset: &Dataset) -> Result<()> {
        let segments = Aggregator::sales_and_profit(dataset, &[Field::Segment])?;
        self.table(&segments)?;
        self.bar(&segments, "Sales and Profit Across Segments", "Segments", (600, 600))?;
        self.pie(&segments, Field::Sales, 1.5, "Sales Distribution Across Segments")?;
        self.pie(&segments, Field::Profit, 1.5, "Profit Distribution Across Segments")?;
        self.commentary(&segments)?;

        let mix = Aggregator::sales_and_profit(dataset, &[Field::Segment, Field::SubCategory])?;
        self.table(&mix)?;
        for (segment, subs) in mix.partition()? {
            self.subheading(&segment)?;
            self.bar(&subs, &segment, "Sub-Categories", (1200, 800))?;
            self.pie(
                &subs,
                Field::Sales,
                2.0,
                &format!("Sales Distribution Across {segment} Segment"),
            )?;
            self.commentary(&subs)?;
        }
        Ok(())
    }

    fn shipping(&mut self, dataset: &Dataset) -> Result<()> {
        let modes = Aggregator::sales_and_profit(dataset, &[Field::ShipMode])?;
        self.table(&modes)?;
        self.bar(&modes, "Sales And Profit Across Shipping Modes", "Mode", (500, 500))?;
        self.pie(&modes, Field::Sales, 1.5, "Sales Across Various Shipping Modes")?;
        self.pie(&modes, Field::Profit, 1.5, "Profit Across Various Shipping Modes")?;
        self.commentary(&modes)?;

        let mix = Aggregator::sales_and_profit(dataset, &[Field::ShipMode, Field::SubCategory])?;
        self.table(&mix)?;
        for (mode, subs) in mix.partition()? {
            self.subheading(&mode)?;
            self.bar(&subs, &mode, "Sub-Categories", (1200, 800))?;
            self.pie(
                &subs,
                Field::Sales,
                2.0,
                &format!("Sales Distribution Across {mode}"),
            )?;
            self.commentary(&subs)?;
        }
        Ok(())
    }

    fn discount(&mut self, dataset: &Dataset) -> Result<()> {
        let discounts = Aggregator::sales_and_profit(dataset, &[Field::Discount])?;
        self.table(&discounts)?;
        self.bar(&discounts, "Sales And Profit For Various Discounts", "Discounts", (800, 800))?;
        self.pie(&discounts, Field::Sales, 2.0, "Sales Distribution Across Discounts")?;
        self.commentary(&discounts)?;

        let by_category = Aggregator::sales_and_profit(dataset, &[Field::Category, Field::Discount])?;
        self.table(&by_category)?;
        for (category, levels) in by_category.partition()? {
            self.subheading(&category)?;
            self.bar(
                &levels,
                &format!("Sales And Profit For {category}"),
                "Discounts",
                (800, 800),
            )?;
            self.commentary(&levels)?;
        }
        Ok(())
    }

    // ── Output helpers ────────────────────────────────────────────────────

    fn subheading(&mut self, name: &str) -> Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "-- {name} --")?;
        Ok(())
    }

    fn table(&mut self, aggregate: &Aggregate) -> Result<()> {
        writeln!(self.out)?;
        write!(self.out, "{}", render_table(aggregate))?;
        Ok(())
    }

    fn commentary(&mut self, aggregate: &Aggregate) -> Result<()> {
        for line in commentary(aggregate)? {
            writeln!(self.out, "  * {line}")?;
        }
        Ok(())
    }

    fn bar(
        &mut self,
        aggregate: &Aggregate,
        title: &str,
        x_label: &str,
        (width, height): (u32, u32),
    ) -> Result<()> {
        if self.sink.is_none() {
            return Ok(());
        }
        let chart = BarChart::sales_and_profit(aggregate).map(|c| {
            c.with_title(title)
                .with_x_label(x_label)
                .with_y_label(VALUE_AXIS)
                .with_size(width, height)
        });
        self.emit(title, chart.map(Chart::Bar))
    }

    fn pie(&mut self, aggregate: &Aggregate, measure: Field, radius: f64, title: &str) -> Result<()> {
        if self.sink.is_none() {
            return Ok(());
        }
        let side = if radius > 1.5 { 800 } else { 600 };
        let chart = PieChart::from_aggregate(aggregate, measure, radius)
            .map(|c| c.with_title(title).with_size(side, side));
        self.emit(title, chart.map(Chart::Pie))
    }

    /// Hand a chart to the sink, turning chart errors into skips.
    fn emit(&mut self, title: &str, chart: Result<Chart>) -> Result<()> {
        let Some(sink) = self.sink.as_mut() else {
            return Ok(());
        };
        let outcome = chart.and_then(|chart| match chart {
            Chart::Bar(bar) => sink.bar(&bar),
            Chart::Pie(pie) => sink.pie(&pie),
        });

        match outcome {
            Ok(path) => {
                self.summary.charts_written.push(path);
                Ok(())
            }
            Err(err) if err.is_chart_error() && !self.strict => {
                warn!("Skipping chart '{}': {}", title, err);
                self.summary.charts_skipped.push(SkippedChart {
                    title: title.to_string(),
                    reason: err.to_string(),
                });
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}
