//! User config file source: `<config dir>/hashsweep/config.toml`
//! ($XDG_CONFIG_HOME/hashsweep on Linux).

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::debug;

/// Path to the user config file, if a home directory can be determined.
pub fn global_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "hashsweep").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Add the user config file source to the builder if it exists.
pub fn add_to_builder(
    mut builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if let Some(config_path) = global_config_path() {
        if config_path.is_file() {
            builder = builder.add_source(File::from(config_path.as_path()).required(false));
        } else {
            debug!(
                config_path = %config_path.display(),
                "No user configuration file"
            );
        }
    }
    Ok(builder)
}
