mod bootstrap;

use std::io::{self, BufWriter};

use anyhow::Result;
use store_charts::sink::SvgRenderer;
use store_core::settings::Settings;
use store_data::analysis::load_and_summarize;
use store_data::reader::{LoadOptions, Source};
use store_report::driver::{ReportDriver, REQUIRED_FIELDS};

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;

    tracing::info!("Superstore EDA v{} starting", env!("CARGO_PKG_VERSION"));

    let source = Source::parse(&settings.source);
    let options = LoadOptions {
        drop_constant: !settings.keep_constant,
        drop: settings.drop_fields()?,
        required: REQUIRED_FIELDS.to_vec(),
    };
    let sections = settings.selected_sections();
    tracing::info!("Source: {}, sections: {:?}", source, sections);

    let analysis = load_and_summarize(&source, &options)?;

    let mut renderer = if settings.tables_only {
        None
    } else {
        bootstrap::ensure_output_dir(&settings.output_dir)?;
        Some(SvgRenderer::new(&settings.output_dir)?)
    };

    let stdout = io::stdout();
    let mut driver = ReportDriver::new(BufWriter::new(stdout.lock())).strict(settings.strict);
    if let Some(renderer) = renderer.as_mut() {
        driver = driver.with_sink(renderer);
    }
    let summary = driver.run(&analysis, &sections)?;

    for skipped in &summary.charts_skipped {
        tracing::warn!("Not drawn: {} ({})", skipped.title, skipped.reason);
    }
    if !settings.tables_only {
        tracing::info!(
            "{} charts written to {}",
            summary.charts_written.len(),
            settings.output_dir.display()
        );
    }

    Ok(())
}
