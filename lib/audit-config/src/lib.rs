pub mod audit;
pub mod engines;
mod env_overrides;
pub mod log;
pub mod primitives;
pub mod subgraphs;

use config::{Config, File, FileFormat, FileSourceFile};
use envconfig::Envconfig;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::path::{Path, PathBuf};

use crate::{
    audit::{AuditSettings, Fed2ReadinessConfig, OperationsConfig},
    engines::EnginesConfig,
    env_overrides::{EnvVarOverrides, EnvVarOverridesError},
    log::LoggingConfig,
    primitives::file_path::with_start_path,
    subgraphs::SubgraphConfig,
};

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    #[serde(skip)]
    root_directory: PathBuf,

    /// The logger configuration.
    #[serde(default)]
    pub log: LoggingConfig,

    /// The subgraphs to compose, by name.
    #[serde(default)]
    pub subgraphs: BTreeMap<String, SubgraphConfig>,

    /// Where the operations to audit come from.
    #[serde(default)]
    pub operations: OperationsConfig,

    /// The external composition and query planning programs.
    #[serde(default)]
    pub engines: EnginesConfig,

    /// How operations are audited and where reports go.
    #[serde(default)]
    pub audit: AuditSettings,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experimental_fed2readiness: Option<Fed2ReadinessConfig>,
}

impl AuditConfig {
    /// The directory of the config file, the current directory without one.
    pub fn root_directory(&self) -> &Path {
        &self.root_directory
    }

    pub fn graph_ref(&self) -> Option<&Fed2ReadinessConfig> {
        self.experimental_fed2readiness.as_ref()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuditConfigError {
    #[error("Failed to load configuration: {0}")]
    ConfigLoadError(#[from] config::ConfigError),
    #[error("Failed to apply configuration overrides: {0}")]
    EnvVarOverridesError(#[from] EnvVarOverridesError),
    #[error("Failed to load the environment variables: {0}")]
    EnvVarLoadError(#[from] envconfig::Error),
    #[error("Failed to get the current directory: {0}")]
    CurrentDirError(std::io::Error),
    #[error("Failed to parse the configuration file path: {0}")]
    ConfigPathParseError(Infallible),
}

static DEFAULT_FILE_NAMES: &[&str] = &[
    "fed2-audit.config.yaml",
    "fed2-audit.config.yml",
    "fed2-audit.config.json",
];

fn get_current_dir() -> Result<PathBuf, AuditConfigError> {
    std::env::current_dir().map_err(AuditConfigError::CurrentDirError)
}

pub fn load_config(override_config_path: Option<String>) -> Result<AuditConfig, AuditConfigError> {
    let env_overrides = EnvVarOverrides::init_from_env()?;
    let mut config = Config::builder();
    let mut config_root_path = get_current_dir()?;

    if let Some(path_str) = override_config_path {
        let path_buf = path_str
            .parse::<PathBuf>()
            .map_err(AuditConfigError::ConfigPathParseError)?;
        if let Some(parent_dir) = path_buf.parent() {
            config_root_path = config_root_path.join(parent_dir);
        }
        let as_file: File<FileSourceFile, _> = path_buf.into();

        config = config.add_source(as_file.required(true));
    } else {
        for name in DEFAULT_FILE_NAMES {
            config = config.add_source(File::with_name(name).required(false));
        }
    }

    config = env_overrides.apply_overrides(config)?;

    let mut base_cfg = with_start_path(&config_root_path, || {
        config.build()?.try_deserialize::<AuditConfig>()
    })?;

    base_cfg.root_directory = config_root_path;

    Ok(base_cfg)
}

pub fn parse_yaml_config(config_raw: String) -> Result<AuditConfig, AuditConfigError> {
    let config_root_path = get_current_dir()?;
    let config = Config::builder();

    let mut base_cfg = with_start_path(&config_root_path, || {
        config
            .add_source(File::from_str(&config_raw, FileFormat::Yaml))
            .build()?
            .try_deserialize::<AuditConfig>()
    })?;

    base_cfg.root_directory = config_root_path;

    Ok(base_cfg)
}

/// The JSON schema of the config file, for editor completion.
pub fn config_json_schema() -> schemars::Schema {
    schemars::schema_for!(AuditConfig)
}

#[cfg(test)]
mod tests;
