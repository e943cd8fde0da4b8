//! The build manifest: per-file fingerprints and declaration metadata.
//!
//! The manifest is stored as `manifest.json` in the artifacts directory. For
//! every source file that compiled successfully it records the fingerprint at
//! that compile plus the declarations the compiler reported, including their
//! dependency names. The dependency graph for the next run is rebuilt
//! entirely from this metadata, so unchanged files are never reparsed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CacheError;
use crate::fingerprint::Fingerprint;

/// Name of the manifest file within the artifacts directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Top-level build manifest tracking every successfully compiled file.
///
/// Serialized as pretty JSON so that a manifest diff is reviewable. Loading
/// is fail-safe: anything unreadable means "no prior state" and the next run
/// rebuilds from scratch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildManifest {
    /// Version string of the compiler that produced the recorded artifacts.
    /// A different current version invalidates every record.
    pub compiler_version: String,

    /// Per-source-file state, keyed by path relative to the project root.
    pub files: HashMap<PathBuf, FileRecord>,
}

/// Recorded state for a single source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    /// Fingerprint of the file when it last compiled successfully.
    pub fingerprint: Fingerprint,

    /// Declarations the file defined at that compile, in compiler order.
    pub declarations: Vec<DeclarationRecord>,
}

/// Recorded metadata for a single declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclarationRecord {
    /// Declaration name, unique across the project.
    pub name: String,

    /// Names this declaration depends on directly (inheritance parents,
    /// imports, and library links), as reported by the compiler.
    pub depends_on: Vec<String>,
}

impl BuildManifest {
    /// Creates a new, empty manifest for the given compiler version.
    pub fn new(compiler_version: &str) -> Self {
        Self {
            compiler_version: compiler_version.to_string(),
            files: HashMap::new(),
        }
    }

    /// Loads the manifest from the artifacts directory, returning `None` if
    /// the file doesn't exist or can't be parsed.
    ///
    /// This is fail-safe: any error results in `None` (no prior state),
    /// triggering a full rebuild rather than a hard failure.
    pub fn load(artifacts_dir: &Path) -> Option<Self> {
        let path = artifacts_dir.join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Saves the manifest to the artifacts directory.
    ///
    /// Creates the directory if it doesn't exist. The file is written next
    /// to its final name and renamed into place, so a crash mid-write leaves
    /// the previous manifest intact.
    pub fn save(&self, artifacts_dir: &Path) -> Result<(), CacheError> {
        std::fs::create_dir_all(artifacts_dir).map_err(|e| CacheError::Io {
            path: artifacts_dir.to_path_buf(),
            source: e,
        })?;
        let json = serde_json::to_string_pretty(self).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;
        let path = artifacts_dir.join(MANIFEST_FILE);
        let tmp = artifacts_dir.join(format!("{MANIFEST_FILE}.tmp"));
        std::fs::write(&tmp, json).map_err(|e| CacheError::Io {
            path: tmp.clone(),
            source: e,
        })?;
        std::fs::rename(&tmp, &path).map_err(|e| CacheError::Io { path, source: e })
    }

    /// Returns `true` if the recorded compiler version matches the current one.
    pub fn is_compatible(&self, current_version: &str) -> bool {
        self.compiler_version == current_version
    }
}
