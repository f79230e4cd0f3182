use anyhow::{Context, Result};

use cadenza_core::IndexEntry;
use cadenza_library::Config;

/// Arguments of the `browse` command.
#[derive(Debug)]
pub struct BrowseRequest {
    pub reference: String,
    pub sort: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub json: bool,
}

pub async fn run_browse(config: &Config, request: BrowseRequest) -> Result<()> {
    let service = super::loaded_service(config).await?;
    let entries = service
        .browse(
            &request.reference,
            request.sort.as_deref(),
            request.limit,
            request.offset,
        )
        .await?;

    if request.json {
        let rendered =
            serde_json::to_string_pretty(&entries).context("Failed to render listing")?;
        println!("{rendered}");
    } else {
        print_table(&entries);
    }

    Ok(())
}

fn print_table(entries: &[IndexEntry]) {
    let Some(first) = entries.first() else {
        println!("(empty)");
        return;
    };

    let columns: Vec<&str> = first.values.keys().map(String::as_str).collect();
    let widths: Vec<usize> = columns
        .iter()
        .map(|column| {
            entries
                .iter()
                .filter_map(|entry| entry.values.get(*column))
                .map(|value| value.chars().count())
                .chain(std::iter::once(column.len()))
                .max()
                .unwrap_or_default()
        })
        .collect();

    let header: Vec<String> = columns
        .iter()
        .zip(widths.iter().copied())
        .map(|(column, width)| format!("{column:<width$}"))
        .collect();
    println!("{}  id", header.join("  "));

    for entry in entries {
        let row: Vec<String> = columns
            .iter()
            .zip(widths.iter().copied())
            .map(|(column, width)| {
                let value = entry.values.get(*column).map_or("", String::as_str);
                format!("{value:<width$}")
            })
            .collect();
        println!("{}  {}", row.join("  "), entry.id);
    }
}
