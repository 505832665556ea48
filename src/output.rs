use crate::data::MergedRecord;
use chrono::Local;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

pub const COLUMNS: [&str; 11] = [
    "id",
    "timestamp",
    "price",
    "market_cap",
    "total_volume",
    "ath",
    "atl",
    "open",
    "high",
    "low",
    "close",
];

// Per-file deletion errors are reported and skipped; a missing
// directory means there is nothing to delete.
pub fn clear_previous_runs(dir: &Path, prefix: &str) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.starts_with(prefix) && name.ends_with(".csv") {
            match fs::remove_file(entry.path()) {
                Ok(()) => println!("Deleted old file: {}", name),
                Err(e) => eprintln!("Error deleting {}: {}", name, e),
            }
        }
    }
}

/// Write all records to a freshly named, timestamped CSV and return its
/// path. The header row is always written, even with no records.
pub fn write_csv(
    dir: &Path,
    prefix: &str,
    records: &[MergedRecord],
) -> Result<PathBuf, Box<dyn Error>> {
    fs::create_dir_all(dir)?;

    let filename = format!("{}_{}.csv", prefix, Local::now().format("%Y-%m-%d_%H-%M-%S"));
    let path = dir.join(filename);

    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(COLUMNS)?;
    for record in records {
        writer.write_record(&[
            record.id.clone(),
            record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            record.price.to_string(),
            record.market_cap.to_string(),
            record.total_volume.to_string(),
            record.ath.map(|v| v.to_string()).unwrap_or_default(),
            record.atl.map(|v| v.to_string()).unwrap_or_default(),
            record.open.to_string(),
            record.high.to_string(),
            record.low.to_string(),
            record.close.to_string(),
        ])?;
    }
    writer.flush()?;

    Ok(path)
}
