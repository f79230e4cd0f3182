use anyhow::Result;

use cadenza_library::Config;

pub async fn show_status(config: &Config) -> Result<()> {
    println!("\n📊 Cadenza Status\n");
    println!("  Snapshot: {}", config.snapshot_path.display());

    if !config.snapshot_path.exists() {
        println!("  No snapshot yet.");
        println!("\n  Run `cadenza rebuild` to build the catalog");
        return Ok(());
    }

    let service = super::loaded_service(config).await?;
    let catalog = service.catalog().await;
    let counts = catalog.counts();

    match catalog.built_at() {
        Some(at) => println!("  Built:    {}", at.to_rfc3339()),
        None => println!("  Built:    unknown"),
    }
    println!("  State:    {}", service.state().await);
    println!();
    println!("  Genres:   {}", counts.genres);
    println!("  Artists:  {}", counts.artists);
    println!("  Albums:   {}", counts.albums);
    println!("  Tracks:   {}", counts.tracks);
    println!("  Items:    {}", counts.items);
    println!("  Indexes:  {}", counts.indexes);
    for name in catalog.index_names() {
        let len = catalog.index(name).map_or(0, <[_]>::len);
        println!("    {name}: {len} entries");
    }

    Ok(())
}
