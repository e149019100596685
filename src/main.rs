//! Payroll Efficiency - command line entry point
//!
//! Prints the analysis report to stdout, then writes the summary export and
//! the static charts to the output directory. Logs go to stderr.

use anyhow::Context;
use clap::Parser;
use payroll_efficiency::charts::StaticChartRenderer;
use payroll_efficiency::config::Config;
use payroll_efficiency::export::SummaryExporter;
use payroll_efficiency::report::ReportPrinter;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "payroll_efficiency", about = "Team payroll vs. performance analysis")]
struct Cli {
    /// Delimited input file with one row per team
    #[arg(default_value = "mlb_payroll.csv")]
    input: PathBuf,

    /// Optional TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for charts and exports
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Rows per leaderboard in the console report
    #[arg(long)]
    top_n: Option<usize>,

    /// Skip PNG chart rendering
    #[arg(long)]
    no_charts: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("payroll_efficiency=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path).context("failed to load configuration")?,
        None => Config::default(),
    };
    if let Some(dir) = cli.output_dir {
        config.output.dir = dir;
    }
    if let Some(top_n) = cli.top_n {
        config.report.top_n = top_n;
    }
    config.validate().context("invalid configuration")?;

    let table = payroll_efficiency::load_table(&cli.input, &config)
        .with_context(|| format!("failed to analyze {}", cli.input.display()))?;
    info!(
        teams = table.len(),
        excluded = table.excluded_count(),
        "table finalized"
    );

    let printer = ReportPrinter::new(&config.report.season_label, config.report.top_n);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    printer.write_report(&table, &mut out)?;
    out.flush()?;

    let out_dir = &config.output.dir;
    let exports =
        SummaryExporter::export_all(&table, out_dir).context("failed to export summary")?;

    let mut artifacts: Vec<(PathBuf, &str)> = Vec::new();
    if !cli.no_charts {
        let renderer = StaticChartRenderer::new(config.charts.clone(), &config.report.season_label);
        let charts = renderer
            .render_all(&table, out_dir)
            .context("failed to render charts")?;
        artifacts.extend(
            charts
                .into_iter()
                .map(|(kind, path)| (path, kind.description())),
        );
    }
    artifacts.extend(
        exports
            .into_iter()
            .zip(["Clean summary data", "Aggregate statistics"]),
    );

    printer.write_artifacts(&mut out, &artifacts)?;
    Ok(())
}
