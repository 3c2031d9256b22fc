//! CLI route: run context and command dispatch to the pipelines and presentation.

use crate::classify::{Classifier, Quarantine};
use crate::cli::parse::Commands;
use crate::cli::presentation::{format_generate_summary, format_verify_summary, OutputFormat};
use crate::config::{ConfigLoader, SweepConfig};
use crate::error::{ApiError, StorageError};
use crate::fetch::ManifestFetcher;
use crate::manifest::{Manifest, ManifestBuilder};
use crate::progress::LogProgress;
use crate::tree::path;
use crate::tree::walker::Exclusions;
use dialoguer::Input;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Text to print plus the number of files that failed during the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub text: String,
    pub failed_files: usize,
}

/// Runtime context for CLI execution: loaded configuration and output style.
pub struct RunContext {
    config: SweepConfig,
    color: bool,
}

impl RunContext {
    /// Load configuration from `config_path`, or from the layered defaults
    /// rooted at the current directory.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match config_path {
            Some(path) => ConfigLoader::load_from_file(&path)?,
            None => {
                let cwd = std::env::current_dir().map_err(StorageError::IoError)?;
                ConfigLoader::load(&cwd)?
            }
        };
        Ok(Self::from_config(config))
    }

    pub fn from_config(config: SweepConfig) -> Self {
        Self {
            config,
            color: false,
        }
    }

    /// Style summaries with terminal colors
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Execute a command and render its summary
    pub fn execute(&self, command: &Commands) -> Result<CommandOutput, ApiError> {
        match command {
            Commands::Generate {
                directory,
                output,
                exclude,
                exclude_folder,
                keep_going,
                format,
            } => {
                let format = OutputFormat::parse(format)?;
                let root = resolve_directory(directory.as_deref())?;
                let output = output
                    .clone()
                    .unwrap_or_else(|| self.config.generate.output.clone());
                let exclusions = self.exclusions(exclude, exclude_folder);
                self.handle_generate(
                    &root,
                    &output,
                    exclusions,
                    *keep_going || self.config.generate.keep_going,
                    format,
                )
            }
            Commands::Verify {
                directory,
                url,
                manifest,
                outdated_dir,
                unknown_dir,
                exclude,
                exclude_folder,
                dry_run,
                format,
            } => {
                let format = OutputFormat::parse(format)?;
                let root = resolve_directory(directory.as_deref())?;
                let verify = &self.config.verify;
                let quarantine = Quarantine::new(
                    outdated_dir.clone().unwrap_or_else(|| verify.outdated_dir.clone()),
                    unknown_dir.clone().unwrap_or_else(|| verify.unknown_dir.clone()),
                );
                if same_location(&quarantine.outdated_dir, &quarantine.unknown_dir)? {
                    return Err(ApiError::InputError(
                        "outdated and unknown folders must differ".to_string(),
                    ));
                }
                let source = match (manifest, url) {
                    (Some(path), _) => ManifestSource::File(path.clone()),
                    (None, Some(url)) => ManifestSource::Url(url.clone()),
                    (None, None) => ManifestSource::Url(verify.manifest_url.clone()),
                };
                let exclusions = self.exclusions(exclude, exclude_folder);
                self.handle_verify(&root, &source, quarantine, exclusions, *dry_run, format)
            }
        }
    }

    /// Configured exclusions plus those given on the command line
    fn exclusions(&self, files: &[String], folders: &[String]) -> Exclusions {
        let mut exclusions = self.config.scan.exclusions();
        for name in files {
            exclusions.add_file_name(name.clone());
        }
        for folder in folders {
            exclusions.add_folder(folder.clone());
        }
        exclusions
    }

    #[instrument(skip(self, exclusions, format), fields(root = %root.display()))]
    fn handle_generate(
        &self,
        root: &Path,
        output: &Path,
        mut exclusions: Exclusions,
        keep_going: bool,
        format: OutputFormat,
    ) -> Result<CommandOutput, ApiError> {
        exclude_if_inside(root, output, &mut exclusions)?;

        let report = ManifestBuilder::new(root)
            .with_exclusions(exclusions)
            .keep_going(keep_going)
            .build(&mut LogProgress::new())?;
        report.manifest.save(output)?;
        info!(output = %output.display(), entries = report.hashed, "Manifest saved");

        Ok(CommandOutput {
            text: format_generate_summary(&report, output, format, self.color)?,
            failed_files: report.failures.len(),
        })
    }

    #[instrument(skip(self, quarantine, exclusions, format), fields(root = %root.display()))]
    fn handle_verify(
        &self,
        root: &Path,
        source: &ManifestSource,
        quarantine: Quarantine,
        mut exclusions: Exclusions,
        dry_run: bool,
        format: OutputFormat,
    ) -> Result<CommandOutput, ApiError> {
        let manifest = match source {
            ManifestSource::File(path) => {
                exclude_if_inside(root, path, &mut exclusions)?;
                Manifest::load(path)?
            }
            ManifestSource::Url(url) => {
                let dest = self.config.verify.manifest_file.clone();
                exclude_if_inside(root, &dest, &mut exclusions)?;
                self.download(url, &dest)?
            }
        };
        info!(entries = manifest.len(), "Manifest loaded");

        let report = Classifier::new(&manifest, root, quarantine.clone())
            .with_exclusions(exclusions)
            .dry_run(dry_run)
            .run(&mut LogProgress::new())?;

        Ok(CommandOutput {
            text: format_verify_summary(&report, &quarantine, format, self.color)?,
            failed_files: report.failures.len(),
        })
    }

    fn download(&self, url: &str, dest: &Path) -> Result<Manifest, ApiError> {
        let fetcher = ManifestFetcher::new(self.config.verify.fetch_timeout())?;
        let runtime = tokio::runtime::Runtime::new().map_err(StorageError::IoError)?;
        let manifest = runtime.block_on(fetcher.fetch_to_file(url, dest))?;
        info!(url, dest = %dest.display(), "Fetched reference manifest");
        Ok(manifest)
    }
}

/// Where the verifier reads its reference manifest from
#[derive(Debug, Clone, PartialEq, Eq)]
enum ManifestSource {
    File(PathBuf),
    Url(String),
}

/// Keep files the run itself writes (manifest copies) out of the scan
fn exclude_if_inside(
    root: &Path,
    path: &Path,
    exclusions: &mut Exclusions,
) -> Result<(), ApiError> {
    let root = path::canonicalize_root(root)?;
    if let Some(key) = path::key_within(&root, path) {
        exclusions.add_path(key);
    }
    Ok(())
}

/// Whether two paths name the same location once resolved
fn same_location(a: &Path, b: &Path) -> Result<bool, ApiError> {
    let a = path::resolve(a).map_err(StorageError::IoError)?;
    let b = path::resolve(b).map_err(StorageError::IoError)?;
    Ok(a == b)
}

/// Use the given directory, or prompt for one on the terminal
fn resolve_directory(directory: Option<&Path>) -> Result<PathBuf, ApiError> {
    let directory = match directory {
        Some(dir) => dir.to_path_buf(),
        None => {
            let answer: String = Input::new()
                .with_prompt("Enter the directory to scan")
                .interact_text()
                .map_err(|e| ApiError::InputError(format!("Failed to read directory: {}", e)))?;
            PathBuf::from(answer.trim())
        }
    };

    if !directory.is_dir() {
        return Err(StorageError::InvalidPath(format!(
            "{} is not a directory",
            directory.display()
        ))
        .into());
    }
    Ok(directory)
}
