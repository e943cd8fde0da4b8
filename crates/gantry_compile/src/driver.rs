//! The incremental compile driver.
//!
//! [`CompileDriver::run`] executes one full build pass:
//!
//! 1. fingerprint every source file on disk,
//! 2. load the prior build manifest and diff against it,
//! 3. rebuild the dependency graph from the recorded declarations,
//! 4. propagate dirtiness through reverse edges and file grouping,
//! 5. submit the dirty files to the compiler in a single invocation,
//! 6. write artifacts, prune stale records, and save the new manifest.
//!
//! Failures in steps 1-5 abort before anything is written, so an
//! interrupted or rejected build leaves the previous artifacts and
//! manifest fully intact.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use gantry_cache::{
    unix_millis_now, Artifact, ArtifactStore, BuildManifest, DeclarationRecord, FileRecord,
    FingerprintKind, SourceScanner, MANIFEST_FILE,
};
use gantry_graph::{
    build_graph, dirty_closure, find_cycles, CycleWarning, DeclMetadata, FileMetadata,
};

use crate::compiler::{Compiler, FileOutput, SourceInput};
use crate::error::CompileError;

/// Everything a compile run needs besides the compiler itself.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Project root; source paths and the artifacts directory resolve
    /// against it.
    pub project_root: PathBuf,
    /// Artifacts directory, relative to the project root.
    pub artifacts_dir: PathBuf,
    /// Source files to consider, relative to the project root.
    pub sources: Vec<PathBuf>,
    /// How file changes are detected.
    pub fingerprint: FingerprintKind,
    /// Recompile everything regardless of recorded fingerprints.
    pub force: bool,
}

/// Why a run recompiled every present file instead of an incremental subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FullRebuildReason {
    /// No build manifest existed.
    FirstBuild,
    /// A manifest file existed but could not be parsed.
    StoreInvalid,
    /// The manifest was produced by a different compiler version.
    CompilerVersionChanged,
    /// The caller passed `force`.
    Forced,
}

impl fmt::Display for FullRebuildReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::FirstBuild => "no build manifest found",
            Self::StoreInvalid => "build manifest was unreadable",
            Self::CompilerVersionChanged => "compiler version changed",
            Self::Forced => "rebuild forced",
        };
        f.write_str(reason)
    }
}

/// What a completed run did, for reporting.
#[derive(Debug, Serialize)]
pub struct CompileSummary {
    /// Files submitted to the compiler this run, sorted by path.
    pub compiled_files: Vec<PathBuf>,
    /// Declarations whose artifacts were rewritten, sorted by name.
    pub compiled_declarations: Vec<String>,
    /// Present files that kept their artifacts untouched.
    pub unchanged_files: usize,
    /// Files whose records and artifacts were removed because the source
    /// is gone, sorted by path.
    pub removed_files: Vec<PathBuf>,
    /// Set when the run recompiled everything, with the reason.
    pub full_rebuild: Option<FullRebuildReason>,
    /// Dependency cycles found in the graph. Non-fatal.
    pub cycle_warnings: Vec<CycleWarning>,
}

impl CompileSummary {
    /// Returns `true` when nothing recompiled and no records were removed.
    pub fn is_noop(&self) -> bool {
        self.compiled_files.is_empty() && self.removed_files.is_empty()
    }
}

/// Drives one incremental build against a [`Compiler`].
pub struct CompileDriver<'a> {
    compiler: &'a dyn Compiler,
    options: CompileOptions,
}

impl<'a> CompileDriver<'a> {
    /// Creates a driver for one run.
    pub fn new(compiler: &'a dyn Compiler, options: CompileOptions) -> Self {
        Self { compiler, options }
    }

    /// Executes the full pipeline described in the module docs.
    pub fn run(&self) -> Result<CompileSummary, CompileError> {
        let root = &self.options.project_root;
        let artifacts_dir = root.join(&self.options.artifacts_dir);
        let store = ArtifactStore::new(&artifacts_dir);
        let version = self.compiler.version();

        // Fingerprint whatever is actually on disk. Sources that vanished
        // since discovery fall out here and count as deleted below.
        let current =
            SourceScanner::fingerprint_files(root, &self.options.sources, self.options.fingerprint);

        let prior = BuildManifest::load(&artifacts_dir);
        let full_rebuild = if self.options.force {
            Some(FullRebuildReason::Forced)
        } else {
            match &prior {
                Some(manifest) if !manifest.is_compatible(version) => {
                    Some(FullRebuildReason::CompilerVersionChanged)
                }
                Some(_) => None,
                None if artifacts_dir.join(MANIFEST_FILE).exists() => {
                    Some(FullRebuildReason::StoreInvalid)
                }
                None => Some(FullRebuildReason::FirstBuild),
            }
        };

        let empty = BuildManifest::new(version);
        let baseline = prior.as_ref().unwrap_or(&empty);
        let changes = SourceScanner::detect_changes(&current, baseline);

        // A full rebuild reuses the incremental path with every present
        // file flagged dirty.
        let changed: HashSet<&PathBuf> = if full_rebuild.is_some() {
            current.keys().collect()
        } else {
            changes.dirty_files().collect()
        };

        let mut present: Vec<&PathBuf> = current.keys().collect();
        present.sort();

        // The graph describes the previous successful build: clean files
        // contribute their recorded declarations, dirty files whatever was
        // recorded before the edit (nothing, for new files).
        let metadata: Vec<FileMetadata> = present
            .iter()
            .map(|&path| {
                let declarations = baseline
                    .files
                    .get(path)
                    .map(|record| {
                        record
                            .declarations
                            .iter()
                            .map(|decl| DeclMetadata {
                                name: decl.name.clone(),
                                depends_on: decl.depends_on.clone(),
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                FileMetadata {
                    path: path.clone(),
                    dirty: changed.contains(path),
                    declarations,
                }
            })
            .collect();

        let graph = build_graph(&metadata)?;
        let cycle_warnings = find_cycles(&graph);
        let dirty = dirty_closure(&graph);

        if dirty.is_empty() && changes.deleted_files.is_empty() {
            // Stray artifacts are collected even when nothing recompiles.
            // Tracked artifacts are never touched, so the run still leaves
            // every recorded file's bytes and timestamp alone.
            if let Some(manifest) = &prior {
                let live: Vec<&str> = manifest
                    .files
                    .values()
                    .flat_map(|record| record.declarations.iter().map(|decl| decl.name.as_str()))
                    .collect();
                store.gc(&live)?;
            }
            return Ok(CompileSummary {
                compiled_files: Vec::new(),
                compiled_declarations: Vec::new(),
                unchanged_files: present.len(),
                removed_files: Vec::new(),
                full_rebuild,
                cycle_warnings,
            });
        }

        // Files were registered in path order, so the ID-sorted dirty set
        // comes back path-sorted.
        let submitted: Vec<PathBuf> = dirty
            .files
            .iter()
            .map(|&id| graph.file(id).path.clone())
            .collect();

        let output = if submitted.is_empty() {
            // Deletions only; the store still needs pruning below.
            Default::default()
        } else {
            let inputs = submitted
                .iter()
                .map(|path| {
                    let content = std::fs::read_to_string(root.join(path)).map_err(|source| {
                        CompileError::SourceRead {
                            path: path.clone(),
                            source,
                        }
                    })?;
                    Ok(SourceInput {
                        path: path.clone(),
                        content,
                    })
                })
                .collect::<Result<Vec<_>, CompileError>>()?;
            self.compiler.compile(&inputs)?
        };

        // Require full coverage before writing anything. Outputs for files
        // that were not submitted are ignored.
        let outputs: HashMap<&Path, &FileOutput> = output
            .files
            .iter()
            .map(|file| (file.path.as_path(), file))
            .collect();
        for path in &submitted {
            if !outputs.contains_key(path.as_path()) {
                return Err(CompileError::MissingOutput { path: path.clone() });
            }
        }

        let mut next = prior.unwrap_or_else(|| BuildManifest::new(version));
        next.compiler_version = version.to_string();
        for path in &changes.deleted_files {
            next.files.remove(path);
        }
        for path in &submitted {
            let declarations = outputs[path.as_path()]
                .declarations
                .iter()
                .map(|decl| DeclarationRecord {
                    name: decl.name.clone(),
                    depends_on: decl.depends_on.clone(),
                })
                .collect();
            next.files.insert(
                path.clone(),
                FileRecord {
                    fingerprint: current[path],
                    declarations,
                },
            );
        }

        // The store never admits two declarations with one name; a collision
        // in the merged records aborts before anything is written.
        let mut sorted_records: Vec<(&PathBuf, &FileRecord)> = next.files.iter().collect();
        sorted_records.sort_by(|a, b| a.0.cmp(b.0));
        let mut owners: HashMap<&str, &Path> = HashMap::new();
        for (path, record) in sorted_records {
            for decl in &record.declarations {
                if let Some(previous) = owners.insert(decl.name.as_str(), path.as_path()) {
                    return Err(CompileError::DuplicateOutput {
                        name: decl.name.clone(),
                        file: path.clone(),
                        previous: previous.to_path_buf(),
                    });
                }
            }
        }

        // One timestamp for the whole run; untouched artifacts keep theirs.
        let updated_at = unix_millis_now();
        let mut compiled_declarations = Vec::new();
        for path in &submitted {
            for decl in &outputs[path.as_path()].declarations {
                store.write(&Artifact {
                    contract_name: decl.name.clone(),
                    source_path: path.clone(),
                    bytecode: decl.bytecode.clone(),
                    interface: decl.interface.clone(),
                    compiler_version: version.to_string(),
                    updated_at,
                })?;
                compiled_declarations.push(decl.name.clone());
            }
        }
        compiled_declarations.sort();

        // Artifacts first, then orphan collection, manifest last. A crash
        // in between leaves a manifest that re-dirties or re-prunes the
        // same work on the next run.
        let live: Vec<&str> = next
            .files
            .values()
            .flat_map(|record| record.declarations.iter().map(|decl| decl.name.as_str()))
            .collect();
        store.gc(&live)?;
        next.save(&artifacts_dir)?;

        Ok(CompileSummary {
            unchanged_files: present.len() - submitted.len(),
            compiled_files: submitted,
            compiled_declarations,
            removed_files: changes.deleted_files,
            full_rebuild,
            cycle_warnings,
        })
    }
}
