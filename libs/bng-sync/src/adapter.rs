//! Sync adapter
//!
//! Derives one field from another whenever a user saves a triggering
//! nodegroup. A single adapter type serves both directions; the direction only
//! picks which way [`SyncAdapter::convert`] runs.

use bng_codec::{BngError, DatumTransform, FeatureCollection, GridRefCodec};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{FunctionSpec, SyncDirection, SyncLink};
use crate::error::Result;
use crate::store::TileStore;
use crate::types::{ChangeOrigin, FieldChange, Tile};

/// Why an adapter did not write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Change came from a sync write
    SyncOrigin,
    /// Changed nodegroup is not one of the link's triggers
    NotTriggered,
    /// Source field is absent or null
    MissingSource,
}

/// Result of applying an adapter to one change
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    Written { tile: Tile, created: bool },
    Skipped(SkipReason),
}

impl SyncOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, SyncOutcome::Written { .. })
    }
}

#[derive(Debug, Clone)]
pub struct SyncAdapter {
    direction: SyncDirection,
    link: SyncLink,
    codec: GridRefCodec,
    transform: DatumTransform,
}

impl SyncAdapter {
    /// Create an adapter, rejecting links that would trigger on their own writes
    pub fn new(direction: SyncDirection, link: SyncLink) -> Result<Self> {
        link.validate()?;
        Ok(Self {
            direction,
            link,
            codec: GridRefCodec::default(),
            transform: DatumTransform::NATIONAL_GRID,
        })
    }

    pub fn from_spec(spec: &FunctionSpec) -> Result<Self> {
        Self::new(spec.direction(), spec.link())
    }

    pub fn with_codec(mut self, codec: GridRefCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn direction(&self) -> SyncDirection {
        self.direction
    }

    pub fn link(&self) -> &SyncLink {
        &self.link
    }

    /// Only user saves of a triggering nodegroup fire the adapter
    pub fn triggered_by(&self, change: &FieldChange) -> bool {
        change.origin == ChangeOrigin::User && self.link.is_triggered_by(&change.nodegroup_id)
    }

    /// Convert a source field value into the destination representation
    pub fn convert(&self, value: &Value) -> Result<Value> {
        match self.direction {
            SyncDirection::BngToGeometry => {
                let reference = value.as_str().ok_or_else(|| {
                    BngError::unexpected(format!(
                        "expected a grid reference string, found {}",
                        value
                    ))
                })?;
                let projected = self.codec.decode(reference)?;
                let point = self.transform.to_geographic(projected)?;
                Ok(FeatureCollection::point(point).to_value()?)
            }
            SyncDirection::GeometryToBng => {
                let point = FeatureCollection::from_value(value)?.first_point()?;
                let projected = self.transform.to_projected(point)?;
                Ok(Value::String(self.codec.encode(projected)?))
            }
        }
    }

    /// Apply the adapter to a change, creating or updating the destination tile
    ///
    /// A conversion failure is returned before anything is written.
    pub async fn apply<S: TileStore>(
        &self,
        store: &S,
        change: &FieldChange,
    ) -> Result<SyncOutcome> {
        if change.origin != ChangeOrigin::User {
            return Ok(SyncOutcome::Skipped(SkipReason::SyncOrigin));
        }
        if !self.triggered_by(change) {
            return Ok(SyncOutcome::Skipped(SkipReason::NotTriggered));
        }

        let source = if change.nodegroup_id == self.link.source_nodegroup {
            change.data.get(&self.link.source_node).cloned()
        } else {
            store
                .find_tile(&change.resource_id, &self.link.source_nodegroup)
                .await?
                .and_then(|tile| tile.value(&self.link.source_node).cloned())
        };

        let source = match source {
            Some(value) if !value.is_null() => value,
            _ => {
                debug!(
                    direction = %self.direction,
                    resource = %change.resource_id,
                    node = %self.link.source_node,
                    "source value empty, nothing to sync"
                );
                return Ok(SyncOutcome::Skipped(SkipReason::MissingSource));
            }
        };

        let converted = self.convert(&source).inspect_err(|e| {
            warn!(
                direction = %self.direction,
                resource = %change.resource_id,
                error = %e,
                "sync conversion failed"
            );
        })?;

        let existing = store
            .find_tile(&change.resource_id, &self.link.destination_nodegroup)
            .await?;
        let created = existing.is_none();
        let mut tile = existing.unwrap_or_else(|| {
            Tile::new(
                change.resource_id.clone(),
                self.link.destination_nodegroup.clone(),
            )
        });
        tile.data.insert(self.link.destination_node.clone(), converted);
        store.save_tile(&tile).await?;

        info!(
            direction = %self.direction,
            resource = %tile.resource_id,
            tile = %tile.tile_id,
            created,
            "synced destination tile"
        );
        Ok(SyncOutcome::Written { tile, created })
    }
}
