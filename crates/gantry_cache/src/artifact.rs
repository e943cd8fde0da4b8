//! Per-declaration artifact storage.
//!
//! Every declaration gets one JSON file, `<Name>.json`, in the artifacts
//! directory. Artifacts use camelCase keys because downstream tooling
//! consumes them as-is. The store only ever rewrites artifacts belonging to
//! recompiled files; everything else keeps its bytes and its mtime, which is
//! the observable contract incremental compilation is judged by.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Compiled output for a single declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Declaration name; also the artifact's file stem.
    pub contract_name: String,

    /// Project-relative path of the defining source file.
    pub source_path: PathBuf,

    /// Compiled bytecode, hex-encoded.
    pub bytecode: String,

    /// The declaration's external interface as reported by the compiler.
    pub interface: serde_json::Value,

    /// Version string of the compiler that produced this artifact.
    pub compiler_version: String,

    /// Milliseconds since the Unix epoch at which this artifact was written.
    pub updated_at: u64,
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn unix_millis_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Store for per-declaration artifact files.
pub struct ArtifactStore {
    artifacts_dir: PathBuf,
}

impl ArtifactStore {
    /// Creates a store rooted at the given artifacts directory.
    pub fn new(artifacts_dir: &Path) -> Self {
        Self {
            artifacts_dir: artifacts_dir.to_path_buf(),
        }
    }

    /// Returns the file path for a declaration's artifact.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.artifacts_dir.join(format!("{name}.json"))
    }

    /// Writes an artifact, creating the directory if needed.
    ///
    /// The JSON is written next to its final name and renamed into place, so
    /// readers never observe a half-written artifact.
    pub fn write(&self, artifact: &Artifact) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.artifacts_dir).map_err(|e| CacheError::Io {
            path: self.artifacts_dir.clone(),
            source: e,
        })?;
        let json =
            serde_json::to_string_pretty(artifact).map_err(|e| CacheError::Serialization {
                reason: e.to_string(),
            })?;
        let path = self.path_for(&artifact.contract_name);
        let tmp = self.artifacts_dir.join(format!(
            "{}.json.tmp",
            artifact.contract_name
        ));
        std::fs::write(&tmp, json).map_err(|e| CacheError::Io {
            path: tmp.clone(),
            source: e,
        })?;
        std::fs::rename(&tmp, &path).map_err(|e| CacheError::Io { path, source: e })
    }

    /// Reads an artifact by declaration name.
    ///
    /// Fail-safe: a missing or unparseable artifact is `None`, which callers
    /// treat as "needs recompilation".
    pub fn read(&self, name: &str) -> Option<Artifact> {
        let content = std::fs::read_to_string(self.path_for(name)).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Removes an artifact by declaration name. Missing files are fine;
    /// removal is idempotent.
    pub fn remove(&self, name: &str) -> Result<(), CacheError> {
        let path = self.path_for(name);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::Io { path, source: e }),
        }
    }

    /// Lists the declaration names with an artifact on disk, sorted.
    pub fn list(&self) -> Result<Vec<String>, CacheError> {
        if !self.artifacts_dir.exists() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&self.artifacts_dir).map_err(|e| CacheError::Io {
            path: self.artifacts_dir.clone(),
            source: e,
        })?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CacheError::Io {
                path: self.artifacts_dir.clone(),
                source: e,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if stem != "manifest" {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Removes artifacts whose declaration is no longer live.
    ///
    /// Returns the number of files removed. The manifest is never touched.
    pub fn gc(&self, live: &[&str]) -> Result<usize, CacheError> {
        let mut removed = 0;
        for name in self.list()? {
            if !live.contains(&name.as_str()) {
                self.remove(&name)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}
