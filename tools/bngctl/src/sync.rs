//! Replays tiles through the configured sync functions

use anyhow::{bail, Context, Result};
use bng_codec::GridRefCodec;
use bng_sync::{MemoryTileStore, SyncAdapter, SyncDispatcher, SyncOutcome, Tile};
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::settings::Settings;

pub async fn handle_sync(settings: &Settings, tiles_path: &Path) -> Result<()> {
    if settings.functions.is_empty() {
        bail!("no sync functions configured; see `bngctl config init`");
    }

    let content = std::fs::read_to_string(tiles_path)
        .with_context(|| format!("reading {}", tiles_path.display()))?;
    let tiles: Vec<Tile> = serde_json::from_str(&content)
        .with_context(|| format!("{} must hold a JSON array of tiles", tiles_path.display()))?;

    let mut dispatcher = SyncDispatcher::new(Arc::new(MemoryTileStore::new()));
    for spec in &settings.functions {
        let adapter =
            SyncAdapter::from_spec(spec)?.with_codec(GridRefCodec::new(settings.resolution));
        dispatcher.register(adapter)?;
    }
    info!(functions = dispatcher.adapters().len(), tiles = tiles.len(), "replaying tiles");

    let mut failures = 0;
    for tile in tiles {
        let label = format!("{}/{}", tile.resource_id, tile.nodegroup_id);
        match dispatcher.commit(tile).await {
            Ok(outcomes) => {
                let written = outcomes.iter().filter(|o| o.is_written()).count();
                println!("{} {} ({} written)", "✓".green(), label, written);
                for outcome in outcomes {
                    if let SyncOutcome::Written { tile, created } = outcome {
                        let action = if created { "created" } else { "updated" };
                        println!(
                            "    {} {}/{}",
                            action.bright_cyan(),
                            tile.resource_id,
                            tile.nodegroup_id
                        );
                    }
                }
            },
            Err(e) => {
                failures += 1;
                println!("{} {}: {}", "✗".red(), label, e);
            },
        }
    }

    println!();
    println!("{}", serde_json::to_string_pretty(&dispatcher.store().tiles().await)?);

    if failures > 0 {
        bail!("{} tile(s) failed to sync", failures);
    }
    Ok(())
}
