use crate::config::RunConfig;
use crate::fetch::Fetcher;
use chrono::{Duration, Local};
use std::error::Error;

mod config;
mod data;
mod engine;
mod fetch;
mod ohlc;
mod output;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = RunConfig::default();

    output::clear_previous_runs(&config.data_dir, &config.file_prefix);

    let coins = config::read_coin_list(&config.coin_list)?;

    let end = Local::now();
    let start = end - Duration::days(config.lookback_days);

    let fetcher = Fetcher::new(&config);
    let result = engine::harvest(
        &config,
        &fetcher,
        &coins,
        start.timestamp(),
        end.timestamp(),
    )
    .await;

    let path = output::write_csv(&config.data_dir, &config.file_prefix, &result.records)?;
    println!("Saved {} rows to {}", result.records.len(), path.display());

    if !result.failed.is_empty() {
        eprintln!("No data collected for: {:?}", result.failed);
    }

    Ok(())
}
