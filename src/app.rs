use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde_json::json;

use crate::analysis::{AnalysisReport, SectorAnalyzer};
use crate::chart;
use crate::config::{AnalysisConfig, SourceKind};
use crate::logging;
use crate::model::{Period, SectorUniverse};
use crate::report::{self, OutputFormat};
use crate::source::{PriceSource, SyntheticSource, YahooClient};

#[derive(Debug, Args, Clone, Default)]
pub struct CommonArgs {
    /// TOML file with sectors and defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Lookback period (1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max)
    #[arg(short, long)]
    pub period: Option<Period>,

    /// How many sectors to list at the top and bottom
    #[arg(short, long)]
    pub top: Option<usize>,

    /// Use seeded synthetic prices instead of downloading
    #[arg(long)]
    pub offline: bool,

    /// Seed for synthetic prices
    #[arg(long)]
    pub seed: Option<u64>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Skip the terminal bar charts
    #[arg(long)]
    pub no_chart: bool,

    /// Chart width in characters
    #[arg(long)]
    pub width: Option<u32>,

    /// Chart height in characters
    #[arg(long)]
    pub height: Option<u32>,

    /// Suppress log events on stderr
    #[arg(short, long)]
    pub quiet: bool,
}

impl CommonArgs {
    /// Config file (if any) with command-line overrides applied.
    pub fn resolve(&self) -> Result<AnalysisConfig> {
        let mut config = AnalysisConfig::load(self.config.as_deref())?;
        if let Some(period) = self.period {
            config.period = period;
        }
        if let Some(top) = self.top {
            config.top = top;
        }
        if self.offline {
            config.source = SourceKind::Synthetic;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.no_chart || self.format == OutputFormat::Json {
            config.chart.enabled = false;
        }
        if let Some(width) = self.width {
            config.chart.width = width;
        }
        if let Some(height) = self.height {
            config.chart.height = height;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Args, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args, Clone)]
pub struct SectorArgs {
    /// Sector name, case-insensitive
    pub name: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args, Clone, Default)]
pub struct ListArgs {
    /// TOML file with sectors and defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub fn build_source(config: &AnalysisConfig) -> Result<Box<dyn PriceSource>> {
    let source: Box<dyn PriceSource> = match config.source {
        SourceKind::Yahoo => Box::new(YahooClient::with_base_url(
            &config.base_url,
            config.request_timeout,
        )?),
        SourceKind::Synthetic => Box::new(SyntheticSource::new(config.seed)),
    };
    Ok(source)
}

pub async fn run(args: RunArgs) -> Result<()> {
    logging::set_silent(args.common.quiet);
    let config = args.common.resolve()?;
    let source = build_source(&config)?;

    logging::info(
        "run.start",
        "Starting sector scan",
        json!({
            "sectors": config.universe.len(),
            "period": config.period.as_str(),
            "source": source.name(),
        }),
    );

    let report = scan(source.as_ref(), &config.universe, config.period).await;
    println!("{}", report::render(&report, config.top, args.common.format)?);

    if config.chart.enabled {
        let mut plotted: Vec<&str> = Vec::with_capacity(2);
        for sector in [report.best_sector(), report.worst_sector()].into_iter().flatten() {
            if plotted.contains(&sector.sector.as_str()) {
                continue;
            }
            plotted.push(&sector.sector);
            chart::plot_sector(sector, config.chart);
        }
    }

    logging::info_simple("run.complete", "Sector scan finished");
    Ok(())
}

pub async fn scan(
    source: &dyn PriceSource,
    universe: &SectorUniverse,
    period: Period,
) -> AnalysisReport {
    SectorAnalyzer::new(source, period).run(universe).await
}

pub async fn sector(args: SectorArgs) -> Result<()> {
    logging::set_silent(args.common.quiet);
    let config = args.common.resolve()?;
    let sector = config.universe.find(&args.name)?.clone();
    let source = build_source(&config)?;

    let mut analyzer = SectorAnalyzer::new(source.as_ref(), config.period);
    let sector_report = analyzer.analyze_sector(&sector).await;

    match args.common.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&sector_report)?),
        OutputFormat::Text => {
            match sector_report.average_pct {
                Some(average) => println!(
                    "{} average performance over {}: {:.2}%",
                    sector_report.sector, config.period, average
                ),
                None => println!("No performance data available for {}", sector_report.sector),
            }
            print!("{}", report::render_drilldown(&sector_report));
        }
    }

    if config.chart.enabled {
        chart::plot_sector(&sector_report, config.chart);
    }
    Ok(())
}

pub fn list_sectors(args: ListArgs) -> Result<()> {
    let config = AnalysisConfig::load(args.config.as_deref())?;
    for sector in config.universe.sectors() {
        println!("{:<20} {}", sector.name, sector.tickers.join(" "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_apply_on_top_of_defaults() {
        let args = CommonArgs {
            period: Some(Period::OneYear),
            top: Some(5),
            offline: true,
            seed: Some(9),
            width: Some(60),
            ..CommonArgs::default()
        };
        let config = args.resolve().expect("resolve config");
        assert_eq!(config.period, Period::OneYear);
        assert_eq!(config.top, 5);
        assert_eq!(config.source, SourceKind::Synthetic);
        assert_eq!(config.seed, 9);
        assert_eq!(config.chart.width, 60);
        assert!(config.chart.enabled);
    }

    #[test]
    fn json_output_disables_charts() {
        let args = CommonArgs {
            format: OutputFormat::Json,
            ..CommonArgs::default()
        };
        assert!(!args.resolve().expect("resolve config").chart.enabled);
    }

    #[test]
    fn zero_top_is_invalid() {
        let args = CommonArgs {
            top: Some(0),
            ..CommonArgs::default()
        };
        assert!(args.resolve().is_err());
    }
}
