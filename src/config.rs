use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Everything a run needs, threaded explicitly instead of living in
/// module-level constants.
pub struct RunConfig {
    pub currency: String,
    pub lookback_days: i64,
    pub max_retries: u32,
    pub initial_backoff: Duration,
    /// Min/max pause between coins, in milliseconds.
    pub pause_ms: (u64, u64),
    pub data_dir: PathBuf,
    pub coin_list: PathBuf,
    pub file_prefix: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        let data_dir = PathBuf::from("data/historical");
        RunConfig {
            currency: "usd".to_string(),
            lookback_days: 364,
            max_retries: 5,
            initial_backoff: Duration::from_secs(10),
            pause_ms: (1000, 2000),
            coin_list: data_dir.join("top_10_coins.txt"),
            data_dir,
            file_prefix: "top_10_crypto_365days_data".to_string(),
        }
    }
}

/// Read coin identifiers, one per line, trimming whitespace and
/// skipping blank lines.
pub fn read_coin_list(path: &Path) -> io::Result<Vec<String>> {
    let contents = fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_run_constants() {
        let config = RunConfig::default();
        assert_eq!(config.currency, "usd");
        assert_eq!(config.lookback_days, 364);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.initial_backoff, Duration::from_secs(10));
        assert_eq!(config.pause_ms, (1000, 2000));
    }

    #[test]
    fn coin_list_is_trimmed_and_blank_lines_skipped() {
        let path = std::env::temp_dir().join(format!("geckofetch-coins-{}.txt", std::process::id()));
        fs::write(&path, "bitcoin\n  ethereum  \n\nsolana\n").unwrap();

        let coins = read_coin_list(&path).unwrap();
        assert_eq!(coins, vec!["bitcoin", "ethereum", "solana"]);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_coin_list_is_an_error() {
        let path = Path::new("does/not/exist.txt");
        assert!(read_coin_list(path).is_err());
    }
}
