//! Host record model: resources, nodegroups, nodes and their tiles
//!
//! Identifiers are opaque tokens compared by equality only. The host uses
//! UUID strings but nothing here relies on that.

use crate::config::SyncDirection;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

id_type!(
    /// A single field
    NodeId
);
id_type!(
    /// A group of fields saved together as one tile
    NodegroupId
);
id_type!(
    /// A resource instance (one record)
    ResourceId
);

/// Field values of one nodegroup for one resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    #[serde(default = "Uuid::new_v4")]
    pub tile_id: Uuid,
    pub resource_id: ResourceId,
    pub nodegroup_id: NodegroupId,
    #[serde(default)]
    pub data: BTreeMap<NodeId, Value>,
}

impl Tile {
    /// Empty tile with a fresh id
    pub fn new(resource_id: ResourceId, nodegroup_id: NodegroupId) -> Self {
        Self {
            tile_id: Uuid::new_v4(),
            resource_id,
            nodegroup_id,
            data: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, node: NodeId, value: Value) -> Self {
        self.data.insert(node, value);
        self
    }

    pub fn value(&self, node: &NodeId) -> Option<&Value> {
        self.data.get(node)
    }
}

/// Who performed a write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOrigin {
    User,
    Sync(SyncDirection),
}

/// Notification that a nodegroup of a resource was saved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub resource_id: ResourceId,
    pub nodegroup_id: NodegroupId,
    #[serde(default)]
    pub data: BTreeMap<NodeId, Value>,
    pub origin: ChangeOrigin,
}

impl FieldChange {
    pub fn from_tile(tile: &Tile, origin: ChangeOrigin) -> Self {
        Self {
            resource_id: tile.resource_id.clone(),
            nodegroup_id: tile.nodegroup_id.clone(),
            data: tile.data.clone(),
            origin,
        }
    }
}
