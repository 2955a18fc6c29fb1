//! Dispatches user saves to the configured sync adapters

use std::sync::Arc;
use tracing::{debug, warn};

use crate::adapter::{SyncAdapter, SyncOutcome};
use crate::config::FunctionSpec;
use crate::error::{Result, SyncError};
use crate::store::TileStore;
use crate::types::{ChangeOrigin, FieldChange, Tile};

/// Owns the adapters of a graph and the store they write to
///
/// Adapter writes are stored directly and never dispatched again, so a
/// bidirectional pair cannot ping-pong.
pub struct SyncDispatcher<S: TileStore> {
    store: Arc<S>,
    adapters: Vec<SyncAdapter>,
}

impl<S: TileStore> SyncDispatcher<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            adapters: Vec::new(),
        }
    }

    /// Build a dispatcher from settings-file function specs
    pub fn from_specs(store: Arc<S>, specs: &[FunctionSpec]) -> Result<Self> {
        let mut dispatcher = Self::new(store);
        for spec in specs {
            dispatcher.register(SyncAdapter::from_spec(spec)?)?;
        }
        Ok(dispatcher)
    }

    /// Add an adapter; two adapters may not write the same destination node
    pub fn register(&mut self, adapter: SyncAdapter) -> Result<()> {
        adapter.link().validate()?;

        let link = adapter.link();
        if let Some(existing) = self.adapters.iter().find(|a| {
            a.link().destination_nodegroup == link.destination_nodegroup
                && a.link().destination_node == link.destination_node
        }) {
            return Err(SyncError::config(format!(
                "node {} is already written by a {} function",
                link.destination_node,
                existing.direction()
            )));
        }

        debug!(
            direction = %adapter.direction(),
            source = %link.source_node,
            destination = %link.destination_node,
            "registered sync function"
        );
        self.adapters.push(adapter);
        Ok(())
    }

    pub fn adapters(&self) -> &[SyncAdapter] {
        &self.adapters
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Run every adapter against a change
    ///
    /// Sync-originated changes are ignored. The first failing adapter aborts
    /// the dispatch and its error is returned.
    pub async fn handle(&self, change: &FieldChange) -> Result<Vec<SyncOutcome>> {
        if let ChangeOrigin::Sync(direction) = change.origin {
            debug!(%direction, nodegroup = %change.nodegroup_id, "ignoring sync write");
            return Ok(Vec::new());
        }

        let mut outcomes = Vec::with_capacity(self.adapters.len());
        for adapter in &self.adapters {
            let outcome = adapter
                .apply(self.store.as_ref(), change)
                .await
                .inspect_err(|e| {
                    warn!(
                        direction = %adapter.direction(),
                        resource = %change.resource_id,
                        error = %e,
                        "sync function failed"
                    );
                })?;
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Save a user-edited tile, then dispatch it
    ///
    /// The user tile stays saved even when a sync function fails.
    pub async fn commit(&self, tile: Tile) -> Result<Vec<SyncOutcome>> {
        self.store.save_tile(&tile).await?;
        self.handle(&FieldChange::from_tile(&tile, ChangeOrigin::User))
            .await
    }
}
