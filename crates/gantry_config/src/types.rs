//! Configuration types deserialized from `gantry.toml`.

use gantry_cache::FingerprintKind;
use serde::Deserialize;
use std::path::PathBuf;

/// The top-level project configuration parsed from `gantry.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// Core project metadata (name, version).
    pub project: ProjectMeta,
    /// Source and artifact directory layout.
    #[serde(default)]
    pub contracts: ContractsConfig,
    /// The external compiler to invoke.
    pub compiler: CompilerConfig,
    /// Change detection settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Core project metadata required in every `gantry.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// The project version string.
    pub version: String,
    /// A brief description of the project.
    #[serde(default)]
    pub description: String,
    /// List of project authors.
    #[serde(default)]
    pub authors: Vec<String>,
    /// SPDX license identifier.
    #[serde(default)]
    pub license: Option<String>,
}

/// Where sources live and where artifacts go, relative to the project root.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ContractsConfig {
    /// Directory scanned recursively for contract sources.
    pub source_dir: PathBuf,
    /// Directory receiving artifacts and the build manifest.
    pub artifacts_dir: PathBuf,
    /// File extensions treated as contract sources.
    pub extensions: Vec<String>,
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("contracts"),
            artifacts_dir: PathBuf::from("build/artifacts"),
            extensions: vec!["sol".to_string()],
        }
    }
}

/// The external compiler command and its fixed arguments.
#[derive(Debug, Deserialize)]
pub struct CompilerConfig {
    /// Executable to invoke. Resolved through `PATH` unless it contains a
    /// path separator.
    pub command: String,
    /// Arguments passed before the request on every invocation.
    #[serde(default)]
    pub args: Vec<String>,
}

/// Change detection settings.
#[derive(Debug, Default, Deserialize)]
pub struct CacheConfig {
    /// Which fingerprint identifies an unchanged file.
    #[serde(default)]
    pub fingerprint: FingerprintKind,
}
