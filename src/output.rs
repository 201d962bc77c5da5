// CSV table writers. Each table serializes through serde so the column
// headers live on the record types, next to the fields they rename.

use crate::stats::efficiency::TeamEfficiency;
use crate::stats::players::PlayerStatRecord;
use crate::stats::playoffs::PlayoffSeriesRecord;
use crate::stats::standings::TeamStandingRecord;
use serde::Serialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error writing {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

/// Serialize rows to a CSV file, creating parent directories as needed.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), OutputError> {
    let display = path.display().to_string();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| OutputError::Io {
                path: display.clone(),
                source: e,
            })?;
        }
    }

    let mut writer = csv::Writer::from_path(path).map_err(|e| OutputError::Csv {
        path: display.clone(),
        source: e,
    })?;
    for row in rows {
        writer.serialize(row).map_err(|e| OutputError::Csv {
            path: display.clone(),
            source: e,
        })?;
    }
    writer.flush().map_err(|e| OutputError::Io {
        path: display,
        source: e,
    })?;
    Ok(())
}

pub fn write_standings(path: &Path, rows: &[TeamStandingRecord]) -> Result<(), OutputError> {
    write_csv(path, rows)?;
    info!("wrote {} standings rows to {}", rows.len(), path.display());
    Ok(())
}

pub fn write_player_stats(path: &Path, rows: &[PlayerStatRecord]) -> Result<(), OutputError> {
    write_csv(path, rows)?;
    info!("wrote {} player rows to {}", rows.len(), path.display());
    Ok(())
}

pub fn write_playoff_series(path: &Path, rows: &[PlayoffSeriesRecord]) -> Result<(), OutputError> {
    write_csv(path, rows)?;
    info!("wrote {} series rows to {}", rows.len(), path.display());
    Ok(())
}

pub fn write_efficiency(path: &Path, rows: &[TeamEfficiency]) -> Result<(), OutputError> {
    write_csv(path, rows)?;
    info!("wrote {} efficiency rows to {}", rows.len(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
