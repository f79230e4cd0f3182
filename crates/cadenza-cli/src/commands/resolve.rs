use anyhow::{Context, Result};

use cadenza_library::Config;

pub async fn run_resolve(config: &Config, start: &str, path: &str) -> Result<()> {
    let service = super::loaded_service(config).await?;
    let start = (start != "/").then_some(start);
    let value = service.resolve(start, path).await?;
    let rendered = serde_json::to_string_pretty(&value).context("Failed to render value")?;
    println!("{rendered}");
    Ok(())
}
