//! risk-runner: headless batch scorer for customer risk profiles.
//!
//! Usage:
//!   risk-runner --input data/sample_profiles.json --db scores.db
//!   risk-runner --input rows.json --config data/engine_config.json --workers 4 --json

use anyhow::{Context, Result};
use riskscore_core::{
    config::EngineConfig,
    engine::{BatchReport, BatchStatus, CancellationToken, RiskEngine},
    scoring::RiskLevel,
    store::ScoreStore,
};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let input = string_arg(&args, "--input").unwrap_or("./data/sample_profiles.json");
    let config_path = string_arg(&args, "--config");
    let db = string_arg(&args, "--db").unwrap_or(":memory:");
    let workers = parse_arg(&args, "--workers", 0usize);
    let json_out = args.iter().any(|a| a == "--json");

    let mut config = match config_path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if workers > 0 {
        config.worker_threads = workers;
    }

    if !json_out {
        println!("Customer risk scoring: risk-runner");
        println!("  input:    {input}");
        println!("  config:   {}", config_path.unwrap_or("(defaults)"));
        println!("  db:       {db}");
        println!("  workers:  {}", if workers == 0 { "auto".to_string() } else { workers.to_string() });
        println!();
    }

    let content = std::fs::read_to_string(input).with_context(|| format!("Cannot read {input}"))?;
    let records: Vec<serde_json::Value> =
        serde_json::from_str(&content).with_context(|| format!("{input} is not a JSON array"))?;

    let engine = RiskEngine::new(config)?;
    let report = engine.run_batch(&records, &CancellationToken::new())?;

    let store = ScoreStore::open(db)?;
    store.migrate()?;
    store.save_report(&report)?;
    log::info!("batch={} persisted to {db}", report.batch_id);

    if json_out {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn print_summary(report: &BatchReport) {
    let m = &report.metrics;
    println!("=== BATCH SUMMARY ===");
    println!("  batch_id:        {}", report.batch_id);
    println!("  analyzed at:     {}", report.analysis_timestamp.to_rfc3339());
    match report.status {
        BatchStatus::Complete => println!("  status:          complete"),
        BatchStatus::Cancelled { processed, total } => {
            println!("  status:          cancelled ({processed}/{total})")
        }
    }
    println!("  analyzed:        {}", m.total_customers_analyzed);
    println!("  skipped:         {}", m.skipped_records);
    println!("  avg risk score:  {:.4}", m.average_risk_score);
    println!("  high risk:       {}", m.high_risk_customers);
    println!("  detection rate:  {:.2}%", m.fraud_detection_rate);

    println!();
    println!("=== RISK DISTRIBUTION ===");
    for level in RiskLevel::ALL.iter().rev() {
        let share = m.share(*level);
        println!("  {:<9} {:>6}  ({:.1}%)", level.as_str(), share.count, share.percentage);
    }

    println!();
    println!("=== ALERTS ===");
    if report.alerts.is_empty() {
        println!("  (No high-risk customers)");
    } else {
        for a in &report.alerts {
            let indicators: Vec<&str> = a.primary_indicators.iter().map(|i| i.as_str()).collect();
            println!(
                "  {} | {} | {:.3} | {} | {} | {}",
                a.alert_id,
                a.customer_name,
                a.risk_score,
                a.investigation_priority.as_str(),
                a.recommended_action.as_str(),
                indicators.join(",")
            );
        }
    }
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
