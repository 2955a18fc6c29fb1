//! Tile storage
//!
//! The host owns persistence; sync functions only need to look up the tile of
//! a nodegroup for a resource and write one back.

use std::collections::HashMap;
use std::future::Future;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::types::{NodegroupId, ResourceId, Tile};

/// Tile storage trait
///
/// One tile per (resource, nodegroup). Implementations may be backed by the
/// host database or kept in memory.
pub trait TileStore: Send + Sync {
    /// Find the tile of a nodegroup for a resource
    fn find_tile(
        &self,
        resource: &ResourceId,
        nodegroup: &NodegroupId,
    ) -> impl Future<Output = Result<Option<Tile>>> + Send;

    /// Insert or replace a tile
    fn save_tile(&self, tile: &Tile) -> impl Future<Output = Result<()>> + Send;
}

/// In-memory tile store for tests and the CLI
#[derive(Default)]
pub struct MemoryTileStore {
    tiles: RwLock<HashMap<(ResourceId, NodegroupId), Tile>>,
}

impl MemoryTileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored tile, ordered by resource then nodegroup
    pub async fn tiles(&self) -> Vec<Tile> {
        let tiles = self.tiles.read().await;
        let mut all: Vec<Tile> = tiles.values().cloned().collect();
        all.sort_by(|a, b| {
            (&a.resource_id, &a.nodegroup_id).cmp(&(&b.resource_id, &b.nodegroup_id))
        });
        all
    }

    pub async fn len(&self) -> usize {
        self.tiles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tiles.read().await.is_empty()
    }
}

impl TileStore for MemoryTileStore {
    fn find_tile(
        &self,
        resource: &ResourceId,
        nodegroup: &NodegroupId,
    ) -> impl Future<Output = Result<Option<Tile>>> + Send {
        let key = (resource.clone(), nodegroup.clone());
        async move {
            let tiles = self.tiles.read().await;
            Ok(tiles.get(&key).cloned())
        }
    }

    fn save_tile(&self, tile: &Tile) -> impl Future<Output = Result<()>> + Send {
        let tile = tile.clone();
        async move {
            let mut tiles = self.tiles.write().await;
            tiles.insert((tile.resource_id.clone(), tile.nodegroup_id.clone()), tile);
            Ok(())
        }
    }
}
