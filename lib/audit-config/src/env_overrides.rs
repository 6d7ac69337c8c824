use config::{builder::BuilderState, ConfigBuilder, ConfigError};
use envconfig::Envconfig;
use tracing::debug;

use crate::log::{LogFormat, LogLevel};

#[derive(Envconfig)]
pub struct EnvVarOverrides {
    // Logger overrides
    #[envconfig(from = "LOG_LEVEL")]
    pub log_level: Option<LogLevel>,
    #[envconfig(from = "LOG_FORMAT")]
    pub log_format: Option<LogFormat>,
    #[envconfig(from = "LOG_FILTER")]
    pub log_filter: Option<String>,

    // Audit overrides
    #[envconfig(from = "AUDIT_OPERATIONS_FILE")]
    pub operations_file: Option<String>,
    #[envconfig(from = "AUDIT_HYBRID_COMPARISON")]
    pub hybrid_comparison: Option<bool>,
    #[envconfig(from = "AUDIT_OUT_DIR")]
    pub out_dir: Option<String>,
    #[envconfig(from = "AUDIT_GRAPH_REF")]
    pub graph_ref: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum EnvVarOverridesError {
    #[error("Failed to override configuration: {0}")]
    FailedToOverrideConfig(#[from] ConfigError),
}

impl EnvVarOverrides {
    pub fn apply_overrides<T: BuilderState>(
        mut self,
        mut config: ConfigBuilder<T>,
    ) -> Result<ConfigBuilder<T>, EnvVarOverridesError> {
        if let Some(log_level) = self.log_level.take() {
            debug!("[config-override] 'log.level' = {:?}", log_level);
            config = config.set_override("log.level", log_level.as_str())?;
        }
        if let Some(log_format) = self.log_format.take() {
            debug!("[config-override] 'log.format' = {:?}", log_format);
            config = config.set_override("log.format", log_format.as_str())?;
        }
        if let Some(log_filter) = self.log_filter.take() {
            debug!("[config-override] 'log.filter' = {:?}", log_filter);
            config = config.set_override("log.filter", log_filter)?;
        }

        if let Some(operations_file) = self.operations_file.take() {
            debug!("[config-override] 'operations.file' = {}", operations_file);
            config = config.set_override("operations.file", operations_file)?;
        }
        if let Some(hybrid_comparison) = self.hybrid_comparison.take() {
            debug!(
                "[config-override] 'audit.hybrid_comparison' = {}",
                hybrid_comparison
            );
            config = config.set_override("audit.hybrid_comparison", hybrid_comparison)?;
        }
        if let Some(out_dir) = self.out_dir.take() {
            debug!("[config-override] 'audit.out' = {}", out_dir);
            config = config.set_override("audit.out", out_dir)?;
        }
        if let Some(graph_ref) = self.graph_ref.take() {
            debug!(
                "[config-override] 'experimental_fed2readiness.graph_ref' = {}",
                graph_ref
            );
            config = config.set_override("experimental_fed2readiness.graph_ref", graph_ref)?;
        }

        Ok(config)
    }
}
