//! Merge rules: defaults, override order, conflict handling.

use crate::config::LOCAL_STORAGE;
use crate::fetch::{DEFAULT_FETCH_TIMEOUT, DEFAULT_MANIFEST_URL};
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
///
/// Later sources replace whole values, lists included.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("scan.exclude_files", vec![LOCAL_STORAGE])?
        .set_default("scan.exclude_folders", vec![LOCAL_STORAGE])?
        .set_default("generate.output", "hashes.json")?
        .set_default("generate.keep_going", false)?
        .set_default("verify.manifest_url", DEFAULT_MANIFEST_URL)?
        .set_default("verify.manifest_file", "hashes.json")?
        .set_default("verify.outdated_dir", "outdated")?
        .set_default("verify.unknown_dir", "unknown")?
        .set_default("verify.fetch_timeout_secs", DEFAULT_FETCH_TIMEOUT.as_secs())
}
