use anyhow::{Context, Result};
use std::path::PathBuf;

use cadenza_library::Config;

pub async fn run_rebuild(config: &Config, tracklists: Option<PathBuf>) -> Result<()> {
    let tracklists = tracklists.unwrap_or_else(|| config.tracklists_dir.clone());
    tracing::info!("Rebuilding catalog from {}", tracklists.display());

    let service = super::open_service(config, &tracklists);
    let counts = service
        .rebuild()
        .await
        .with_context(|| format!("Rebuild from {} failed", tracklists.display()))?;

    println!("\n✓ Rebuild complete\n");
    println!("  Snapshot:  {}", config.snapshot_path.display());
    println!("  Genres:    {}", counts.genres);
    println!("  Artists:   {}", counts.artists);
    println!("  Albums:    {}", counts.albums);
    println!("  Tracks:    {}", counts.tracks);
    println!("  Items:     {}", counts.items);
    println!("  Indexes:   {}", counts.indexes);

    Ok(())
}
