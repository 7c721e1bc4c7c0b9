//! Output formatting for comparison results

mod json;
mod terminal;

use anyhow::Result;
use termcolor::{ColorChoice, StandardStream, WriteColor};

use crate::config::{OutputFormat, SkippedEntry};
use crate::runner::{BatchSummary, JobReport, Reporter};

pub use json::JsonOutput;
pub use terminal::TerminalOutput;

/// Trait for output formatters
pub trait OutputFormatter {
    /// Render one finished job
    fn render_job(&self, report: &JobReport<'_>, writer: &mut dyn WriteColor) -> Result<()>;

    /// Render a job list entry that was not run
    fn render_skipped(&self, entry: &SkippedEntry, writer: &mut dyn WriteColor) -> Result<()>;

    /// Render the end-of-batch summary
    fn render_summary(&self, summary: &BatchSummary, writer: &mut dyn WriteColor) -> Result<()>;
}

/// Factory for creating output formatters
pub struct OutputFactory;

impl OutputFactory {
    /// Create an output formatter based on format type
    pub fn create(format: OutputFormat) -> Box<dyn OutputFormatter> {
        match format {
            OutputFormat::Text => Box::new(TerminalOutput::new()),
            OutputFormat::Json => Box::new(JsonOutput::new()),
        }
    }
}

/// A [`Reporter`] that renders everything through a formatter
pub struct FormatterReporter<W> {
    formatter: Box<dyn OutputFormatter>,
    writer: W,
}

impl<W: WriteColor> FormatterReporter<W> {
    pub fn new(formatter: Box<dyn OutputFormatter>, writer: W) -> Self {
        Self { formatter, writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: WriteColor> Reporter for FormatterReporter<W> {
    fn job_finished(&mut self, report: &JobReport<'_>) -> Result<()> {
        self.formatter.render_job(report, &mut self.writer)?;
        self.writer.flush()?;
        Ok(())
    }

    fn job_skipped(&mut self, entry: &SkippedEntry) -> Result<()> {
        self.formatter.render_skipped(entry, &mut self.writer)
    }

    fn batch_finished(&mut self, summary: &BatchSummary) -> Result<()> {
        self.formatter.render_summary(summary, &mut self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Reporter writing to stdout
pub fn stdout_reporter(format: OutputFormat, color: ColorChoice) -> FormatterReporter<StandardStream> {
    // Colour codes would corrupt JSON lines
    let color = match format {
        OutputFormat::Json => ColorChoice::Never,
        OutputFormat::Text => color,
    };
    FormatterReporter::new(OutputFactory::create(format), StandardStream::stdout(color))
}
