//! Layered configuration loading

use crate::{Error, Result};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable selecting the environment-specific config files
pub const ENV_VAR: &str = "BNG_ENV";

/// Load configuration from multiple sources
///
/// Priority (highest to lowest):
/// 1. Environment variables prefixed `{SERVICE}_` (`__` separates nested keys)
/// 2. Service file (`config/{service}.toml`)
/// 3. Local overrides (`config/local.*`)
/// 4. Environment-specific file (`config/{BNG_ENV}.*`)
/// 5. Default file (`config/default.*`)
/// 6. `T::default()`
pub fn load_config<T>(service_name: &str) -> Result<T>
where
    T: Serialize + for<'de> Deserialize<'de> + Default,
{
    load_config_from_dir(Path::new("config"), service_name)
}

/// [`load_config`] with an explicit config directory
pub fn load_config_from_dir<T>(dir: &Path, service_name: &str) -> Result<T>
where
    T: Serialize + for<'de> Deserialize<'de> + Default,
{
    let env = std::env::var(ENV_VAR).unwrap_or_else(|_| "development".to_string());

    let mut figment = Figment::from(Serialized::defaults(T::default()));
    for stem in ["default", env.as_str(), "local", service_name] {
        figment = figment
            .merge(Toml::file(dir.join(format!("{}.toml", stem))))
            .merge(Yaml::file(dir.join(format!("{}.yaml", stem))))
            .merge(Json::file(dir.join(format!("{}.json", stem))));
    }
    let prefix = format!("{}_", service_name.to_uppercase());
    figment = figment.merge(Env::prefixed(&prefix).split("__"));

    figment
        .extract()
        .map_err(|e| Error::Config(format!("Failed to load configuration: {}", e)))
}

/// Load configuration from a specific file, picked by extension
pub fn load_config_from_file<T, P>(path: P) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::Config(format!(
            "Config file not found: {}",
            path.display()
        )));
    }

    let figment = match extension(path)? {
        "toml" => Figment::new().merge(Toml::file(path)),
        "yaml" | "yml" => Figment::new().merge(Yaml::file(path)),
        "json" => Figment::new().merge(Json::file(path)),
        other => {
            return Err(Error::Config(format!(
                "Unsupported config file format: {}",
                other
            )))
        }
    };

    figment
        .extract()
        .map_err(|e| Error::Config(format!("Failed to load configuration from file: {}", e)))
}

/// Save configuration to a file, format picked by extension
pub fn save_config_to_file<T, P>(config: &T, path: P) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let content = match extension(path)? {
        "toml" => toml::to_string_pretty(config)?,
        "yaml" | "yml" => serde_yaml::to_string(config)?,
        "json" => serde_json::to_string_pretty(config)?,
        other => {
            return Err(Error::Config(format!(
                "Unsupported config file format: {}",
                other
            )))
        }
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

fn extension(path: &Path) -> Result<&str> {
    path.extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::Config("Config file must have an extension".to_string()))
}
