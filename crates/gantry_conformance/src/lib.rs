//! Integration test helpers for the Gantry build pipeline.
//!
//! Provides a scripted in-process [`Compiler`] over a tiny contract syntax,
//! plus a project harness that scaffolds sources on disk, runs the
//! incremental driver, and inspects the resulting store.
//!
//! The scripted syntax is one declaration per line:
//!
//! ```text
//! contract Token : Ownable SafeMath
//! ```
//!
//! declares `Token` depending on `Ownable` and `SafeMath`. Lines without the
//! `contract` keyword are ignored, so appending arbitrary text to a file
//! changes its fingerprint without changing what it declares.

#![warn(missing_docs)]

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use gantry_cache::{Artifact, ArtifactStore, BuildManifest, FingerprintKind, MANIFEST_FILE};
use gantry_common::ContentHash;
use gantry_compile::{
    CompileDriver, CompileError, CompileOptions, CompileSummary, CompiledDecl, Compiler,
    CompilerError, CompilerOutput, Diagnostic, FileOutput, SourceInput,
};

/// Source directory used by [`TestProject`].
pub const SOURCE_DIR: &str = "contracts";

/// Artifacts directory used by [`TestProject`], relative to the project root.
pub const ARTIFACTS_DIR: &str = "build/artifacts";

/// Project-relative path of the source file named `name`.
pub fn source_path(name: &str) -> PathBuf {
    PathBuf::from(format!("{SOURCE_DIR}/{name}.sol"))
}

/// An in-process [`Compiler`] driven by the scripted contract syntax.
///
/// Records every batch of sources it receives, so tests can assert on what
/// the driver chose to resubmit. Bytecode is a hash of the declaring line,
/// so it changes exactly when the declaration itself changes.
pub struct ScriptCompiler {
    version: String,
    batches: RefCell<Vec<Vec<PathBuf>>>,
    diagnostics: RefCell<Option<Vec<Diagnostic>>>,
}

impl ScriptCompiler {
    /// Creates a compiler reporting the given version string.
    pub fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            batches: RefCell::new(Vec::new()),
            diagnostics: RefCell::new(None),
        }
    }

    /// Number of times `compile` was invoked.
    pub fn invocations(&self) -> usize {
        self.batches.borrow().len()
    }

    /// The source paths submitted on invocation `index`.
    pub fn batch(&self, index: usize) -> Vec<PathBuf> {
        self.batches.borrow()[index].clone()
    }

    /// Makes the next `compile` call fail with the given diagnostics.
    pub fn fail_next(&self, diagnostics: Vec<Diagnostic>) {
        *self.diagnostics.borrow_mut() = Some(diagnostics);
    }
}

impl Compiler for ScriptCompiler {
    fn version(&self) -> &str {
        &self.version
    }

    fn compile(&self, sources: &[SourceInput]) -> Result<CompilerOutput, CompilerError> {
        self.batches
            .borrow_mut()
            .push(sources.iter().map(|s| s.path.clone()).collect());
        if let Some(diagnostics) = self.diagnostics.borrow_mut().take() {
            return Err(CompilerError::Diagnostics(diagnostics));
        }
        let files = sources.iter().map(compile_source).collect();
        Ok(CompilerOutput { files })
    }
}

fn compile_source(source: &SourceInput) -> FileOutput {
    FileOutput {
        path: source.path.clone(),
        declarations: source.content.lines().filter_map(parse_line).collect(),
    }
}

fn parse_line(line: &str) -> Option<CompiledDecl> {
    let rest = line.trim().strip_prefix("contract ")?;
    let (name, deps) = match rest.split_once(':') {
        Some((name, deps)) => (
            name.trim(),
            deps.split_whitespace().map(String::from).collect(),
        ),
        None => (rest.trim(), Vec::new()),
    };
    Some(CompiledDecl {
        name: name.to_string(),
        depends_on: deps,
        bytecode: format!("0x{}", ContentHash::from_bytes(line.trim().as_bytes())),
        interface: serde_json::Value::Array(Vec::new()),
    })
}

/// A contract project scaffolded on disk for driver-level integration tests.
///
/// Wraps a directory (typically a fresh tempdir owned by the test), writes
/// sources under [`SOURCE_DIR`], and runs builds against [`ARTIFACTS_DIR`].
pub struct TestProject {
    root: PathBuf,
}

impl TestProject {
    /// Wraps an existing directory.
    pub fn at(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// The project root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes (or rewrites) the source file named `name`.
    pub fn write_source(&self, name: &str, content: &str) {
        let path = self.root.join(source_path(name));
        fs::create_dir_all(path.parent().expect("source path has a parent"))
            .expect("create source dir");
        fs::write(path, content).expect("write source");
    }

    /// Appends a line to a source file, changing its fingerprint without
    /// changing its declarations.
    pub fn touch_source(&self, name: &str) {
        let path = self.root.join(source_path(name));
        let mut content = fs::read_to_string(&path).expect("read source");
        content.push_str("\n// touched\n");
        fs::write(path, content).expect("rewrite source");
    }

    /// Deletes the source file named `name`.
    pub fn delete_source(&self, name: &str) {
        fs::remove_file(self.root.join(source_path(name))).expect("delete source");
    }

    /// Present source files, relative to the root, sorted.
    pub fn sources(&self) -> Vec<PathBuf> {
        let mut found = Vec::new();
        collect_sources(&self.root.join(SOURCE_DIR), &mut found);
        let mut files: Vec<PathBuf> = found
            .iter()
            .map(|path| {
                path.strip_prefix(&self.root)
                    .expect("source under project root")
                    .to_path_buf()
            })
            .collect();
        files.sort();
        files
    }

    /// Runs one incremental build with the given compiler.
    pub fn compile(&self, compiler: &dyn Compiler) -> Result<CompileSummary, CompileError> {
        self.compile_with(compiler, false)
    }

    /// Runs one build, optionally forcing a full rebuild.
    pub fn compile_with(
        &self,
        compiler: &dyn Compiler,
        force: bool,
    ) -> Result<CompileSummary, CompileError> {
        let driver = CompileDriver::new(
            compiler,
            CompileOptions {
                project_root: self.root.clone(),
                artifacts_dir: PathBuf::from(ARTIFACTS_DIR),
                sources: self.sources(),
                fingerprint: FingerprintKind::Content,
                force,
            },
        );
        driver.run()
    }

    /// The artifact store for direct inspection.
    pub fn store(&self) -> ArtifactStore {
        ArtifactStore::new(&self.root.join(ARTIFACTS_DIR))
    }

    /// Reads a stored artifact by declaration name.
    pub fn artifact(&self, name: &str) -> Option<Artifact> {
        self.store().read(name)
    }

    /// Raw bytes of a stored artifact file.
    pub fn artifact_bytes(&self, name: &str) -> Option<Vec<u8>> {
        fs::read(self.store().path_for(name)).ok()
    }

    /// Filesystem modification time of a stored artifact file.
    pub fn artifact_mtime(&self, name: &str) -> Option<SystemTime> {
        fs::metadata(self.store().path_for(name)).ok()?.modified().ok()
    }

    /// Loads the current build manifest, if readable.
    pub fn manifest(&self) -> Option<BuildManifest> {
        BuildManifest::load(&self.root.join(ARTIFACTS_DIR))
    }

    /// Path of the manifest file inside the artifacts directory.
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(ARTIFACTS_DIR).join(MANIFEST_FILE)
    }

    /// Overwrites the manifest file with bytes that do not parse.
    pub fn corrupt_manifest(&self) {
        fs::write(self.manifest_path(), "{ not a manifest").expect("corrupt manifest");
    }
}

fn collect_sources(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_sources(&path, files);
        } else if path.extension().is_some_and(|ext| ext == "sol") {
            files.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn script_compiler_parses_contract_lines() {
        let compiler = ScriptCompiler::new("1.0.0");
        let output = compiler
            .compile(&[SourceInput {
                path: source_path("token"),
                content: "// header\ncontract Token : Ownable SafeMath\ncontract Helper\n"
                    .to_string(),
            }])
            .unwrap();

        assert_eq!(output.files.len(), 1);
        let decls = &output.files[0].declarations;
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].name, "Token");
        assert_eq!(decls[0].depends_on, vec!["Ownable", "SafeMath"]);
        assert_eq!(decls[1].name, "Helper");
        assert!(decls[1].depends_on.is_empty());
    }

    #[test]
    fn bytecode_tracks_the_declaring_line() {
        let compiler = ScriptCompiler::new("1.0.0");
        let compile_one = |content: &str| {
            let output = compiler
                .compile(&[SourceInput {
                    path: source_path("a"),
                    content: content.to_string(),
                }])
                .unwrap();
            output.files[0].declarations[0].bytecode.clone()
        };

        let original = compile_one("contract A : B");
        assert_eq!(original, compile_one("contract A : B\n// comment"));
        assert_ne!(original, compile_one("contract A : B C"));
    }

    #[test]
    fn script_compiler_records_batches() {
        let compiler = ScriptCompiler::new("1.0.0");
        compiler.compile(&[]).unwrap();
        compiler
            .compile(&[SourceInput {
                path: source_path("a"),
                content: String::new(),
            }])
            .unwrap();

        assert_eq!(compiler.invocations(), 2);
        assert!(compiler.batch(0).is_empty());
        assert_eq!(compiler.batch(1), vec![source_path("a")]);
    }

    #[test]
    fn fail_next_injects_diagnostics_once() {
        let compiler = ScriptCompiler::new("1.0.0");
        compiler.fail_next(vec![Diagnostic {
            path: Some(source_path("a")),
            line: Some(1),
            message: "bad".to_string(),
        }]);

        assert!(compiler.compile(&[]).is_err());
        assert!(compiler.compile(&[]).is_ok());
    }

    #[test]
    fn harness_scaffolds_and_compiles() {
        let tmp = TempDir::new().unwrap();
        let project = TestProject::at(tmp.path());
        project.write_source("base", "contract Base");
        project.write_source("token", "contract Token : Base");

        assert_eq!(
            project.sources(),
            vec![source_path("base"), source_path("token")]
        );

        let compiler = ScriptCompiler::new("1.0.0");
        let summary = project.compile(&compiler).unwrap();
        assert_eq!(summary.compiled_declarations, vec!["Base", "Token"]);
        assert!(project.artifact("Token").is_some());
        assert!(project.manifest().is_some());
    }
}
