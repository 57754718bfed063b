use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the home directory and an initial `config.json` that points at `csv_file`.
///
/// # Errors
/// - Returns an error if the config already exists, `csv_file` is missing, or any file
///   operation fails.
pub async fn init(cpi_home: &Path, csv_file: Option<&Path>) -> Result<Out<()>> {
    let config = Config::create(cpi_home, csv_file)
        .await
        .context("Unable to create the home directory and config")?;
    Ok(format!(
        "Created {} (CPI data is read from {})",
        config.config_path().display(),
        config.csv_path().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("cpi");
        let out = init(&home, None).await.unwrap();
        assert!(out.message().contains("config.json"));
        assert!(home.join("config.json").is_file());
        assert!(init(&home, None).await.is_err());
    }
}
