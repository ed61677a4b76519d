use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::analysis::{AnalysisReport, SectorReport};
use crate::performance::SectorPerformance;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn render(report: &AnalysisReport, top: usize, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report, top)),
        OutputFormat::Json => {
            serde_json::to_string_pretty(report).context("failed to serialise report")
        }
    }
}

/// Sector averages, best/worst, top and bottom lists, then the drill-downs.
pub fn render_text(report: &AnalysisReport, top: usize) -> String {
    let mut lines = vec![format!(
        "Sector performance over {} ({} prices)",
        report.period, report.source
    )];
    lines.extend(report.sectors.iter().map(|sector| match sector.average_pct {
        Some(average) => format!("{} average performance: {:.2}%", sector.sector, average),
        None => format!("No performance data available for {}", sector.sector),
    }));

    let ranking = &report.ranking;
    let (Some(best), Some(worst)) = (ranking.best(), ranking.worst()) else {
        lines.push(String::new());
        lines.push("No sector performance data available".to_string());
        return join_lines(lines);
    };

    lines.push(String::new());
    lines.push(format!(
        "Best Performing Sector: {} with an average performance of {:.2}%",
        best.sector, best.average_pct
    ));
    lines.push(format!(
        "Worst Performing Sector: {} with an average performance of {:.2}%",
        worst.sector, worst.average_pct
    ));

    ranked_lines(&mut lines, &format!("Top {top} Sectors"), ranking.top(top));
    ranked_lines(&mut lines, &format!("Bottom {top} Sectors"), ranking.bottom(top));

    let drilldowns = [
        ("best", report.best_sector()),
        ("worst", report.worst_sector()),
    ];
    for (label, sector) in drilldowns {
        let Some(sector) = sector else { continue };
        lines.push(String::new());
        lines.push(format!(
            "Drilling down into {label} performing sector: {}",
            sector.sector
        ));
        lines.extend(drilldown_lines(sector));
    }

    join_lines(lines)
}

fn ranked_lines(lines: &mut Vec<String>, title: &str, entries: &[SectorPerformance]) {
    lines.push(String::new());
    lines.push(format!("{title}:"));
    lines.extend(
        entries
            .iter()
            .map(|entry| format!("{}: {:.2}%", entry.sector, entry.average_pct)),
    );
}

/// Per-ticker table for one sector.
pub fn render_drilldown(sector: &SectorReport) -> String {
    join_lines(drilldown_lines(sector))
}

fn drilldown_lines(sector: &SectorReport) -> Vec<String> {
    let mut lines = vec![
        format!("{} stock performance:", sector.sector),
        format!(
            "{:<10} | {:>9} | {:>12} | {:>12} | {:>10} | {:>10}",
            "ticker", "change", "first close", "last close", "from", "to"
        ),
    ];
    lines.extend(sector.tickers.iter().map(|perf| {
        format!(
            "{:<10} | {:>8.2}% | {:>12.2} | {:>12.2} | {:>10} | {:>10}",
            perf.ticker,
            perf.change_pct,
            perf.first_close,
            perf.last_close,
            perf.first_date.to_string(),
            perf.last_date.to_string()
        )
    }));
    if !sector.missing.is_empty() {
        lines.push(format!("no data: {}", sector.missing.join(", ")));
    }
    lines
}

fn join_lines(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Period;
    use crate::performance::{rank_sectors, TickerPerformance};
    use chrono::NaiveDate;

    fn ticker(name: &str, change_pct: f64) -> TickerPerformance {
        TickerPerformance {
            ticker: name.to_string(),
            first_date: NaiveDate::from_ymd_opt(2024, 1, 2).expect("date"),
            last_date: NaiveDate::from_ymd_opt(2024, 6, 28).expect("date"),
            first_close: 100.0,
            last_close: 100.0 + change_pct,
            change_pct,
        }
    }

    fn sector(name: &str, tickers: Vec<TickerPerformance>) -> SectorReport {
        let average_pct = if tickers.is_empty() {
            None
        } else {
            Some(tickers.iter().map(|t| t.change_pct).sum::<f64>() / tickers.len() as f64)
        };
        SectorReport {
            sector: name.to_string(),
            tickers,
            missing: Vec::new(),
            average_pct,
        }
    }

    fn report(sectors: Vec<SectorReport>) -> AnalysisReport {
        let ranking = rank_sectors(
            sectors
                .iter()
                .filter_map(|s| {
                    s.average_pct.map(|average_pct| SectorPerformance {
                        sector: s.sector.clone(),
                        average_pct,
                    })
                })
                .collect(),
        );
        AnalysisReport {
            period: Period::SixMonths,
            source: "synthetic",
            sectors,
            ranking,
        }
    }

    #[test]
    fn text_report_lists_rankings_and_drilldowns() {
        let mut energy = sector("Energy", Vec::new());
        energy.missing = vec!["TGA.JO".into()];
        let report = report(vec![
            sector("Technology", vec![ticker("NPN.JO", 12.5), ticker("DGH.JO", 7.5)]),
            energy,
            sector("Utilities", vec![ticker("CIL.JO", -3.456)]),
        ]);

        let text = render_text(&report, 3);
        assert!(text.contains("Technology average performance: 10.00%"));
        assert!(text.contains("No performance data available for Energy"));
        assert!(text.contains(
            "Best Performing Sector: Technology with an average performance of 10.00%"
        ));
        assert!(text.contains(
            "Worst Performing Sector: Utilities with an average performance of -3.46%"
        ));
        assert!(text.contains("Top 3 Sectors:\nTechnology: 10.00%\nUtilities: -3.46%\n"));
        assert!(text.contains("Drilling down into best performing sector: Technology"));
        assert!(text.contains("Drilling down into worst performing sector: Utilities"));
        assert!(text.contains("NPN.JO"));
    }

    #[test]
    fn empty_ranking_is_reported_without_drilldown() {
        let report = report(vec![sector("Energy", Vec::new())]);
        let text = render_text(&report, 3);
        assert!(text.contains("No sector performance data available"));
        assert!(!text.contains("Best Performing Sector"));
    }

    #[test]
    fn drilldown_lists_missing_tickers() {
        let mut financials = sector("Financials", vec![ticker("ABG.JO", 4.0)]);
        financials.missing = vec!["OMU.JO".into(), "NED.JO".into()];
        let text = render_drilldown(&financials);
        assert!(text.starts_with("Financials stock performance:"));
        assert!(text.contains("no data: OMU.JO, NED.JO"));
    }

    #[test]
    fn json_report_carries_ranking() {
        let report = report(vec![sector("Technology", vec![ticker("NPN.JO", 1.0)])]);
        let json = render(&report, 3, OutputFormat::Json).expect("json report");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["period"], "6mo");
        assert_eq!(value["ranking"][0]["sector"], "Technology");
        assert_eq!(value["sectors"][0]["tickers"][0]["ticker"], "NPN.JO");
    }
}
