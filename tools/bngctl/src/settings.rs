//! bngctl settings

use anyhow::{Context, Result};
use bng_codec::Resolution;
use bng_sync::{BngToGeoJsonConfig, FunctionSpec, GeoJsonToBngConfig};
use common::LogConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SERVICE_NAME: &str = "bngctl";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Precision of references read and written
    pub resolution: Resolution,
    pub log: LogConfig,
    /// Sync functions used by `bngctl sync`
    pub functions: Vec<FunctionSpec>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            log: LogConfig {
                level: "warn".to_string(),
                ..LogConfig::default()
            },
            functions: Vec::new(),
        }
    }
}

impl Settings {
    /// Load from an explicit file, or from `config/` and `BNGCTL_*` variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => common::load_config_from_file(path)
                .with_context(|| format!("loading settings from {}", path.display())),
            None => common::load_config(SERVICE_NAME).context("loading settings"),
        }
    }

    /// Defaults plus a bidirectional function pair to edit
    pub fn example() -> Self {
        Self {
            functions: vec![
                BngToGeoJsonConfig {
                    bng_node: "bng-node".into(),
                    bng_nodegroup: "bng-nodegroup".into(),
                    geojson_node: "geojson-node".into(),
                    geojson_nodegroup: "geojson-nodegroup".into(),
                    triggering_nodegroups: vec!["bng-nodegroup".into()],
                }
                .into(),
                GeoJsonToBngConfig {
                    geojson_input_node: "geojson-node".into(),
                    geojson_input_nodegroup: "geojson-nodegroup".into(),
                    bng_output_node: "bng-node".into(),
                    bng_output_nodegroup: "bng-nodegroup".into(),
                    triggering_nodegroups: vec!["geojson-nodegroup".into()],
                }
                .into(),
            ],
            ..Self::default()
        }
    }
}
