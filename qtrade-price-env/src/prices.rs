//! Loading price series.
use anyhow::{Context, Result};
use qtrade_core::error::QtradeError;
use std::path::Path;

/// Loads the prices in column `column` of a CSV file with headers.
pub fn load_prices(path: impl AsRef<Path>, column: &str) -> Result<Vec<f32>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open price file: {:?}", path))?;

    let ix = reader
        .headers()?
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| {
            QtradeError::Configuration(format!("column {} is not found in {:?}", column, path))
        })?;

    let mut prices = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let price = record
            .get(ix)
            .unwrap_or_default()
            .trim()
            .parse::<f32>()
            .with_context(|| format!("Failed to parse the price at row {} of {:?}", row, path))?;
        prices.push(price);
    }

    Ok(prices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempdir::TempDir;

    #[test]
    fn test_load_prices() -> Result<()> {
        let dir = TempDir::new("prices")?;
        let path = dir.path().join("prices.csv");
        fs::write(&path, "date,open,close\n2024-01-02,9.5,10.0\n2024-01-03,10.0,10.5\n")?;

        assert_eq!(load_prices(&path, "close")?, vec![10.0, 10.5]);
        assert_eq!(load_prices(&path, "open")?, vec![9.5, 10.0]);
        Ok(())
    }

    #[test]
    fn test_load_prices_errors() -> Result<()> {
        let dir = TempDir::new("prices")?;
        let path = dir.path().join("prices.csv");
        fs::write(&path, "date,close\n2024-01-02,ten\n")?;

        assert!(load_prices(&path, "close").is_err());
        let err = load_prices(&path, "volume").err().unwrap();
        assert!(matches!(
            err.downcast_ref::<QtradeError>(),
            Some(QtradeError::Configuration(_))
        ));
        assert!(load_prices(dir.path().join("missing.csv"), "close").is_err());
        Ok(())
    }
}
