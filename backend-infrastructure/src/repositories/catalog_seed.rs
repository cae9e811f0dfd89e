use std::path::Path;

use anyhow::Context;
use tokio::fs;

use backend_domain::CatalogSeed;

/// JSON file listing catalog entries to upsert at startup.
pub struct CatalogSeedFile;

impl CatalogSeedFile {
    /// A missing file yields an empty seed; a malformed one is an error.
    pub async fn load(path: &str) -> anyhow::Result<Vec<CatalogSeed>> {
        if !Path::new(path).exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(path).await?;
        let items: Vec<CatalogSeed> = serde_json::from_str(&content)
            .with_context(|| format!("invalid catalog seed file {}", path))?;
        Ok(items
            .into_iter()
            .filter(|item| !item.hash_name.trim().is_empty())
            .collect())
    }
}
