//! BNG <-> GeoJSON field synchronisation
//!
//! When a user saves a BNG reference the matching GeoJSON point is derived,
//! and vice versa. Both directions run through one [`SyncAdapter`]; the
//! [`SyncDispatcher`] routes host save notifications to the adapters and
//! persists their output through a [`TileStore`].

pub mod adapter;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod store;
pub mod types;

pub use adapter::{SkipReason, SyncAdapter, SyncOutcome};
pub use config::{
    BngToGeoJsonConfig, FunctionSpec, GeoJsonToBngConfig, HostFunction, SyncDirection, SyncLink,
};
pub use dispatcher::SyncDispatcher;
pub use error::{Result, SyncError};
pub use store::{MemoryTileStore, TileStore};
pub use types::{ChangeOrigin, FieldChange, NodeId, NodegroupId, ResourceId, Tile};
