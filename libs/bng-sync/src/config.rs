//! Sync function configuration
//!
//! The host stores each function's settings as JSON with its own key names.
//! Both shapes convert into a direction-neutral [`SyncLink`].

use crate::error::{Result, SyncError};
use crate::types::{NodeId, NodegroupId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which representation is derived from which
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncDirection {
    /// Grid reference string -> GeoJSON point
    BngToGeometry,
    /// GeoJSON point -> grid reference string
    GeometryToBng,
}

impl fmt::Display for SyncDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncDirection::BngToGeometry => write!(f, "bng_to_geometry"),
            SyncDirection::GeometryToBng => write!(f, "geometry_to_bng"),
        }
    }
}

/// Source field, destination field and the nodegroups whose saves trigger a sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncLink {
    pub source_node: NodeId,
    pub source_nodegroup: NodegroupId,
    pub destination_node: NodeId,
    pub destination_nodegroup: NodegroupId,
    pub triggering_nodegroups: Vec<NodegroupId>,
}

impl SyncLink {
    /// Reject links that can never fire or that would trigger on their own output
    pub fn validate(&self) -> Result<()> {
        if self.triggering_nodegroups.is_empty() {
            return Err(SyncError::config(format!(
                "link {} -> {} has no triggering nodegroups",
                self.source_node, self.destination_node
            )));
        }

        if self.triggering_nodegroups.contains(&self.destination_nodegroup) {
            return Err(SyncError::config(format!(
                "destination nodegroup {} is also a triggering nodegroup",
                self.destination_nodegroup
            )));
        }

        if self.source_node == self.destination_node {
            return Err(SyncError::config(format!(
                "source and destination are the same node {}",
                self.source_node
            )));
        }

        Ok(())
    }

    pub fn is_triggered_by(&self, nodegroup: &NodegroupId) -> bool {
        self.triggering_nodegroups.contains(nodegroup)
    }
}

/// Host settings of the BNG -> GeoJSON function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BngToGeoJsonConfig {
    pub bng_node: NodeId,
    pub bng_nodegroup: NodegroupId,
    pub geojson_node: NodeId,
    pub geojson_nodegroup: NodegroupId,
    pub triggering_nodegroups: Vec<NodegroupId>,
}

impl From<BngToGeoJsonConfig> for SyncLink {
    fn from(config: BngToGeoJsonConfig) -> Self {
        SyncLink {
            source_node: config.bng_node,
            source_nodegroup: config.bng_nodegroup,
            destination_node: config.geojson_node,
            destination_nodegroup: config.geojson_nodegroup,
            triggering_nodegroups: config.triggering_nodegroups,
        }
    }
}

/// Host settings of the GeoJSON -> BNG function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoJsonToBngConfig {
    pub geojson_input_node: NodeId,
    pub geojson_input_nodegroup: NodegroupId,
    pub bng_output_node: NodeId,
    pub bng_output_nodegroup: NodegroupId,
    pub triggering_nodegroups: Vec<NodegroupId>,
}

impl From<GeoJsonToBngConfig> for SyncLink {
    fn from(config: GeoJsonToBngConfig) -> Self {
        SyncLink {
            source_node: config.geojson_input_node,
            source_nodegroup: config.geojson_input_nodegroup,
            destination_node: config.bng_output_node,
            destination_nodegroup: config.bng_output_nodegroup,
            triggering_nodegroups: config.triggering_nodegroups,
        }
    }
}

/// Function record as exported by the host: settings plus bookkeeping ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostFunction<C> {
    pub config: C,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// One configured sync function, as written in settings files
///
/// ```toml
/// [[functions]]
/// direction = "bng_to_geometry"
///
/// [functions.config]
/// bng_node = "..."
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "direction", content = "config", rename_all = "snake_case")]
pub enum FunctionSpec {
    BngToGeometry(BngToGeoJsonConfig),
    GeometryToBng(GeoJsonToBngConfig),
}

impl FunctionSpec {
    pub fn direction(&self) -> SyncDirection {
        match self {
            FunctionSpec::BngToGeometry(_) => SyncDirection::BngToGeometry,
            FunctionSpec::GeometryToBng(_) => SyncDirection::GeometryToBng,
        }
    }

    pub fn link(&self) -> SyncLink {
        match self {
            FunctionSpec::BngToGeometry(config) => config.clone().into(),
            FunctionSpec::GeometryToBng(config) => config.clone().into(),
        }
    }
}

impl From<BngToGeoJsonConfig> for FunctionSpec {
    fn from(config: BngToGeoJsonConfig) -> Self {
        FunctionSpec::BngToGeometry(config)
    }
}

impl From<GeoJsonToBngConfig> for FunctionSpec {
    fn from(config: GeoJsonToBngConfig) -> Self {
        FunctionSpec::GeometryToBng(config)
    }
}
