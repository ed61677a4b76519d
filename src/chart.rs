use textplots::{Chart, Plot, Shape};

use crate::analysis::SectorReport;
use crate::config::ChartSettings;

/// Print a bar chart of the sector's ticker changes followed by a legend
/// mapping bar index to ticker.
pub fn plot_sector(sector: &SectorReport, settings: ChartSettings) {
    let caption = caption(sector);
    if sector.tickers.is_empty() {
        println!("{caption}");
        return;
    }

    let bars = bar_points(sector);
    let (y_min, y_max) = value_range(sector);

    println!("\n{caption}");

    let plot_width = settings.width.max(40);
    let plot_height = settings.height.max(10);

    Chart::new_with_y_range(
        plot_width,
        plot_height,
        0.0,
        bars.len() as f32,
        y_min,
        y_max,
    )
    .lineplot(&Shape::Bars(&bars))
    .display();

    for line in legend_lines(sector) {
        println!("{line}");
    }
    println!();
}

/// Title printed above the chart, or the reason no chart is drawn.
pub fn caption(sector: &SectorReport) -> String {
    if sector.tickers.is_empty() {
        return format!("No data to plot for {}", sector.sector);
    }
    format!(
        "{} Sector Performance (%), {} tickers",
        sector.sector,
        sector.tickers.len()
    )
}

/// One bar per ticker, centred on its slot.
fn bar_points(sector: &SectorReport) -> Vec<(f32, f32)> {
    sector
        .tickers
        .iter()
        .enumerate()
        .map(|(idx, perf)| (idx as f32 + 0.5, perf.change_pct as f32))
        .collect()
}

/// Y range that always includes the zero line.
fn value_range(sector: &SectorReport) -> (f32, f32) {
    let values = sector.tickers.iter().map(|p| p.change_pct as f32);
    let min = values.clone().fold(0.0_f32, f32::min);
    let max = values.fold(0.0_f32, f32::max);
    if (max - min).abs() < f32::EPSILON {
        (min - 1.0, max + 1.0)
    } else {
        (min, max)
    }
}

pub fn legend_lines(sector: &SectorReport) -> Vec<String> {
    sector
        .tickers
        .iter()
        .enumerate()
        .map(|(idx, perf)| format!("{:>3}  {:<10} {:>+8.2}%", idx + 1, perf.ticker, perf.change_pct))
        .collect()
}
