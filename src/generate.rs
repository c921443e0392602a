//! Builder: run the external site generator into a clean output directory
//!
//! The generator is an external collaborator; this module only sequences
//! it: full clean of the output directory, one blocking generator run, then
//! the custom-domain marker copy. A generator failure is fatal and leaves
//! whatever partial output exists in place; the next run's clean removes it.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::{Config, CONFIG_FILE};
use crate::error::{InkpressError, InkpressResult};
use crate::fsutil;

/// Options for a single build
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Forward the generator's draft-inclusion flag
    pub drafts: bool,
}

/// Result of a successful build
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub output_dir: PathBuf,
    pub files: usize,
}

/// Run a full build: clean, generate, copy the domain marker.
pub fn build_site(
    root: &Path,
    config: &Config,
    options: &BuildOptions,
) -> InkpressResult<BuildSummary> {
    let output_dir = config.output_dir(root);
    fsutil::clean_dir(&output_dir)?;

    run_generator(root, config, options)?;

    if let Some(domain_file) = config.domain_file(root) {
        copy_domain_file(&domain_file, &output_dir)?;
    }

    let files = fsutil::file_set(&output_dir)?.len();
    Ok(BuildSummary { output_dir, files })
}

/// Command line the builder will run, drafts flag included when requested.
pub fn generator_command(config: &Config, options: &BuildOptions) -> Vec<String> {
    let mut argv = config.build.command.clone();
    if options.drafts {
        argv.push(config.build.drafts_flag.clone());
    }
    argv
}

/// Invoke the configured generator from the blog root, blocking until it
/// exits. A non-zero status aborts the pipeline with that status.
fn run_generator(root: &Path, config: &Config, options: &BuildOptions) -> InkpressResult<()> {
    let argv = generator_command(config, options);
    let (program, args) = argv.split_first().ok_or_else(|| InkpressError::InvalidConfig {
        file: root.join(CONFIG_FILE),
        message: "[build] command is empty".to_string(),
    })?;

    let status = Command::new(program)
        .args(args)
        .current_dir(root)
        .status()
        .map_err(|source| InkpressError::Spawn {
            program: program.clone(),
            source,
        })?;

    if !status.success() {
        return Err(InkpressError::Generator {
            code: status.code().unwrap_or(1),
        });
    }
    Ok(())
}

fn copy_domain_file(domain_file: &Path, output_dir: &Path) -> InkpressResult<()> {
    let name = match domain_file.file_name() {
        Some(name) if domain_file.is_file() => name,
        _ => {
            return Err(InkpressError::MissingDomainFile {
                path: domain_file.to_path_buf(),
            })
        }
    };
    fs::copy(domain_file, output_dir.join(name))?;
    Ok(())
}
