use crate::config::RunConfig;
use crate::data::MergedRecord;
use crate::fetch::{FetchError, Fetcher};
use crate::ohlc::enrich;
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

/// Outcome of a run: every merged row collected across coins, plus the
/// identifiers that still had no data after the retry pass.
pub struct RunResult {
    pub records: Vec<MergedRecord>,
    pub failed: Vec<String>,
}

/// Fetch and aggregate every coin in list order, then give the failed
/// ones a single second pass. Individual coin failures never escalate
/// out of here; they end up in `RunResult::failed` at worst.
pub async fn harvest(
    config: &RunConfig,
    fetcher: &Fetcher,
    coins: &[String],
    from: i64,
    to: i64,
) -> RunResult {
    let mut records = Vec::new();
    let mut pending = Vec::new();

    for coin in coins {
        match fetch_one(fetcher, coin, from, to, &config.currency).await {
            Ok(rows) => {
                println!("Fetched {} rows for {}", rows.len(), coin);
                records.extend(rows);
            }
            Err(err) if err.is_retryable() => {
                eprintln!("Failed to fetch data for {}: {}", coin, err);
                pending.push(coin.clone());
            }
            Err(_) => println!("No historical data found for {}", coin),
        }
        pause(config).await;
    }

    let mut failed = Vec::new();
    if !pending.is_empty() {
        println!("Retrying failed coins: {:?}...", pending);
        for coin in pending {
            match fetch_one(fetcher, &coin, from, to, &config.currency).await {
                Ok(rows) => {
                    println!("Fetched {} rows for {}", rows.len(), coin);
                    records.extend(rows);
                }
                Err(err) if err.is_retryable() => {
                    eprintln!("Giving up on {}: {}", coin, err);
                    failed.push(coin);
                }
                Err(_) => println!("No historical data found for {}", coin),
            }
            pause(config).await;
        }
    }

    RunResult { records, failed }
}

async fn fetch_one(
    fetcher: &Fetcher,
    coin: &str,
    from: i64,
    to: i64,
    currency: &str,
) -> Result<Vec<MergedRecord>, FetchError> {
    let points = fetcher.market_range(coin, from, to, currency).await?;
    let snapshot = fetcher.coin_snapshot(coin, currency).await;
    Ok(enrich(coin, points, &snapshot))
}

// Randomized pause between coins to spread request bursts.
async fn pause(config: &RunConfig) {
    let (min_ms, max_ms) = config.pause_ms;
    if max_ms == 0 {
        return;
    }
    let wait = rand::rng().random_range(min_ms..=max_ms);
    sleep(Duration::from_millis(wait)).await;
}
