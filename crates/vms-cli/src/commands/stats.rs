use std::path::Path;

use serde::Serialize;
use vms_core::analytics::RegisterStats;
use vms_core::insights::{insights_or_fallback, InsightProvider, LocalInsights};
use vms_core::models::Insight;

use crate::commands::common::open_service;
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct InsightReport {
    pub summary: String,
    pub insights: Vec<Insight>,
}

pub async fn run_stats(as_json: bool, data_dir: &Path) -> Result<(), CliError> {
    let service = open_service(data_dir).await?;
    let stats = service.stats().await;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        for line in format_stats_lines(&stats) {
            println!("{line}");
        }
    }
    Ok(())
}

pub fn format_stats_lines(stats: &RegisterStats) -> Vec<String> {
    let mut lines = vec![
        format!("Footfall:     {}", stats.footfall),
        format!("In building:  {}", stats.in_building),
        format!("Revenue:      {:.2}", stats.revenue),
        format!("Stay days:    {}", stats.stay_days),
    ];

    if !stats.by_event.is_empty() {
        lines.push(String::new());
        lines.push("By event:".to_string());
        for (event, event_stats) in &stats.by_event {
            lines.push(format!(
                "  {event:<8} {:>4} visitors  {:>4} days  {:>10.2}",
                event_stats.count, event_stats.days, event_stats.revenue
            ));
        }
    }

    if !stats.by_start_date.is_empty() {
        lines.push(String::new());
        lines.push("By start date:".to_string());
        for (date, count) in &stats.by_start_date {
            lines.push(format!("  {date:<10} {count:>4}"));
        }
    }

    lines
}

pub async fn run_insights(as_json: bool, data_dir: &Path) -> Result<(), CliError> {
    let service = open_service(data_dir).await?;
    let visitors = service.list().await;
    let report = InsightReport {
        summary: LocalInsights.summary(&visitors),
        insights: insights_or_fallback(&LocalInsights, &visitors),
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", report.summary);
    for insight in &report.insights {
        println!();
        println!("[{:?}] {}", insight.kind, insight.title);
        println!("  {}", insight.description);
        if let Some(action) = &insight.action {
            println!("  -> {action}");
        }
    }
    Ok(())
}
