//! Source file fingerprinting and change detection.
//!
//! Computes a fingerprint for every source file currently in the project and
//! compares it against the build manifest to identify which files are new,
//! modified, deleted, or unchanged since the last successful compile. No
//! parsing and no compilation happens here.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use gantry_common::ContentHash;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;
use crate::manifest::BuildManifest;

/// Which fingerprint to compute for change detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintKind {
    /// Hash the file contents (XXH3-128). Immune to timestamp churn.
    #[default]
    Content,
    /// Use modification time and size from file metadata. Cheaper on very
    /// large trees, but fooled by edits that restore both.
    Mtime,
}

/// The stored identity of a source file at its last successful compile.
///
/// Comparing fingerprints is plain equality, so switching the configured
/// [`FingerprintKind`] marks every file modified once and the manifest is
/// rewritten in the new scheme on that run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fingerprint {
    /// XXH3-128 hash of the file bytes.
    Content(ContentHash),
    /// Modification time in milliseconds since the Unix epoch, plus size.
    Mtime {
        /// Modification time in milliseconds since the Unix epoch.
        modified_ms: u64,
        /// File size in bytes.
        size: u64,
    },
}

/// Result of comparing current fingerprints against the build manifest.
#[derive(Debug, Clone)]
pub struct ChangeSet {
    /// Files with no manifest record (first compile or newly added).
    pub new_files: Vec<PathBuf>,

    /// Files whose fingerprint differs from their manifest record.
    pub modified_files: Vec<PathBuf>,

    /// Files with a manifest record but missing from the current file set.
    pub deleted_files: Vec<PathBuf>,

    /// Files whose fingerprint matches their manifest record.
    pub unchanged_files: Vec<PathBuf>,
}

impl ChangeSet {
    /// Returns `true` if nothing changed (no new, modified, or deleted files).
    pub fn is_empty(&self) -> bool {
        self.new_files.is_empty() && self.modified_files.is_empty() && self.deleted_files.is_empty()
    }

    /// Number of files that must be resubmitted before propagation runs.
    pub fn dirty_count(&self) -> usize {
        self.new_files.len() + self.modified_files.len()
    }

    /// Iterates over the files that must be resubmitted (new + modified).
    pub fn dirty_files(&self) -> impl Iterator<Item = &PathBuf> {
        self.new_files.iter().chain(self.modified_files.iter())
    }
}

/// Computes source fingerprints and detects changes against the manifest.
pub struct SourceScanner;

impl SourceScanner {
    /// Computes the fingerprint of a single file.
    pub fn fingerprint_file(path: &Path, kind: FingerprintKind) -> Result<Fingerprint, CacheError> {
        let io_err = |e| CacheError::Io {
            path: path.to_path_buf(),
            source: e,
        };
        match kind {
            FingerprintKind::Content => {
                let content = std::fs::read(path).map_err(io_err)?;
                Ok(Fingerprint::Content(ContentHash::from_bytes(&content)))
            }
            FingerprintKind::Mtime => {
                let meta = std::fs::metadata(path).map_err(io_err)?;
                let modified = meta.modified().map_err(io_err)?;
                let modified_ms = modified
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_millis() as u64)
                    .unwrap_or_default();
                Ok(Fingerprint::Mtime {
                    modified_ms,
                    size: meta.len(),
                })
            }
        }
    }

    /// Computes fingerprints for the whole file set in parallel.
    ///
    /// Paths are relative to `root` and key the returned map, matching how
    /// the manifest stores records. Files that cannot be read are silently
    /// skipped; they will appear as deleted in the change set.
    pub fn fingerprint_files(
        root: &Path,
        paths: &[PathBuf],
        kind: FingerprintKind,
    ) -> HashMap<PathBuf, Fingerprint> {
        paths
            .par_iter()
            .filter_map(|path| {
                Self::fingerprint_file(&root.join(path), kind)
                    .ok()
                    .map(|fp| (path.clone(), fp))
            })
            .collect()
    }

    /// Compares current fingerprints against the manifest to detect changes.
    pub fn detect_changes(
        current: &HashMap<PathBuf, Fingerprint>,
        manifest: &BuildManifest,
    ) -> ChangeSet {
        let mut new_files = Vec::new();
        let mut modified_files = Vec::new();
        let mut unchanged_files = Vec::new();

        for (path, fingerprint) in current {
            match manifest.files.get(path) {
                Some(record) if record.fingerprint == *fingerprint => {
                    unchanged_files.push(path.clone());
                }
                Some(_) => {
                    modified_files.push(path.clone());
                }
                None => {
                    new_files.push(path.clone());
                }
            }
        }

        let mut deleted_files: Vec<PathBuf> = manifest
            .files
            .keys()
            .filter(|p| !current.contains_key(*p))
            .cloned()
            .collect();

        // Sort for deterministic ordering in tests
        new_files.sort();
        modified_files.sort();
        unchanged_files.sort();
        deleted_files.sort();

        ChangeSet {
            new_files,
            modified_files,
            deleted_files,
            unchanged_files,
        }
    }
}
