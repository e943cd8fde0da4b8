//! Shared helpers for CLI commands.
//!
//! Contains project root resolution and source file discovery, used by
//! `compile` and `clean`.

use std::path::{Path, PathBuf};

use gantry_config::{ContractsConfig, CONFIG_FILE};

use crate::GlobalArgs;

/// Walks up from `start` looking for the nearest directory containing
/// `gantry.toml`.
///
/// Returns the directory containing the config file, or an error if none is
/// found.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the project root directory from global CLI args.
///
/// If `--config` is specified, uses that path (file → parent dir, dir →
/// itself). Otherwise walks up from the current directory looking for
/// `gantry.toml`.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let p = PathBuf::from(config_path);
        if p.is_file() {
            Ok(p.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".")))
        } else {
            Ok(p)
        }
    } else {
        find_project_root(&std::env::current_dir()?)
    }
}

/// Discovers contract source files under the configured source directory
/// (recursive).
///
/// Returns paths relative to `project_dir`, sorted, keeping only files with
/// one of the configured extensions. A missing source directory yields an
/// empty list rather than an error.
pub fn discover_source_files(
    project_dir: &Path,
    contracts: &ContractsConfig,
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let source_dir = project_dir.join(&contracts.source_dir);
    if !source_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    walk_dir(&source_dir, &contracts.extensions, &mut found)?;

    let mut files = Vec::with_capacity(found.len());
    for path in found {
        files.push(path.strip_prefix(project_dir)?.to_path_buf());
    }
    files.sort();
    Ok(files)
}

/// Recursively walks a directory collecting matching source files.
fn walk_dir(
    dir: &Path,
    extensions: &[String],
    files: &mut Vec<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            walk_dir(&path, extensions, files)?;
        } else if has_source_extension(&path, extensions) {
            files.push(path);
        }
    }
    Ok(())
}

/// Checks whether a file carries one of the configured source extensions.
pub fn has_source_extension(path: &Path, extensions: &[String]) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => extensions.iter().any(|configured| configured == ext),
        None => false,
    }
}
