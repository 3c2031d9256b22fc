//! Config loading facade: assembles sources in precedence order.

use crate::config::merge::merge_policy;
use crate::config::sources::{global_file, workspace_file};
use crate::config::SweepConfig;
use crate::error::ApiError;
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use std::path::Path;
use tracing::debug;

/// Environment variable prefix: `HASHSWEEP_VERIFY__OUTDATED_DIR=...`
const ENV_PREFIX: &str = "HASHSWEEP";

/// Loads and validates `SweepConfig`
pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults < user file < `<workspace_root>/hashsweep.toml` < environment
    pub fn load(workspace_root: &Path) -> Result<SweepConfig, ApiError> {
        Self::load_with_env(workspace_root, default_environment())
    }

    /// Like `load`, with an explicit environment source
    pub fn load_with_env(
        workspace_root: &Path,
        environment: Environment,
    ) -> Result<SweepConfig, ApiError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        finish(builder.add_source(environment))
    }

    /// Defaults < `path` < environment. The file must exist.
    pub fn load_from_file(path: &Path) -> Result<SweepConfig, ApiError> {
        Self::load_from_file_with_env(path, default_environment())
    }

    pub fn load_from_file_with_env(
        path: &Path,
        environment: Environment,
    ) -> Result<SweepConfig, ApiError> {
        debug!(config_path = %path.display(), "Loading configuration file");
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true));
        finish(builder.add_source(environment))
    }
}

fn default_environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn finish(builder: ConfigBuilder<DefaultState>) -> Result<SweepConfig, ApiError> {
    let config: SweepConfig = builder.build()?.try_deserialize()?;

    config.validate().map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        ApiError::ConfigError(format!(
            "Configuration validation failed:\n{}",
            error_msgs.join("\n")
        ))
    })?;

    Ok(config)
}
