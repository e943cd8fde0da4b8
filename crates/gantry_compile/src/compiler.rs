//! The compiler capability and its wire types.
//!
//! gantry never parses contract sources itself. The [`Compiler`] trait is the
//! seam to whatever does: a subprocess wrapping the real toolchain in
//! production, an in-process fake in tests. One call compiles one batch of
//! files and reports, per file, the declarations it defines together with
//! their direct dependency names. Those names are what the dependency graph
//! is built from on the next run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// One source file submitted for compilation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInput {
    /// Project-relative source path.
    pub path: PathBuf,
    /// Full file content.
    pub content: String,
}

/// Everything a successful compiler run reports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompilerOutput {
    /// One entry per submitted file. Entries for files that were not
    /// submitted are ignored by the reconciler.
    pub files: Vec<FileOutput>,
}

/// Compiled results for one source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutput {
    /// The submitted project-relative path.
    pub path: PathBuf,
    /// Declarations the file defines, in source order.
    pub declarations: Vec<CompiledDecl>,
}

/// One compiled declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledDecl {
    /// Declaration name.
    pub name: String,
    /// Names of direct dependencies: inheritance parents, imports, and
    /// library links.
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// Compiled bytecode, hex-encoded.
    pub bytecode: String,
    /// The declaration's external interface.
    #[serde(default)]
    pub interface: serde_json::Value,
}

/// A source-level problem reported by the compiler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// File the problem was found in, when known.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// One-based line number, when known.
    #[serde(default)]
    pub line: Option<u32>,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.path, self.line) {
            (Some(path), Some(line)) => write!(f, "{}:{line}: {}", path.display(), self.message),
            (Some(path), None) => write!(f, "{}: {}", path.display(), self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}

/// Errors a compiler implementation can report.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CompilerError {
    /// The sources have problems. Fatal for this invocation; nothing is
    /// written, and a corrected re-run starts fresh.
    #[error("compilation failed with {} diagnostic(s)", .0.len())]
    Diagnostics(Vec<Diagnostic>),

    /// The compiler could not be invoked or violated the exchange protocol.
    #[error("compiler invocation failed: {reason}")]
    Invocation {
        /// Description of the failure.
        reason: String,
    },
}

/// Capability for compiling a batch of contract sources.
///
/// Implementations are synchronous; the one blocking call per build
/// invocation happens here.
pub trait Compiler {
    /// Identifying version string, recorded in the manifest and in every
    /// artifact. A change forces a full rebuild.
    fn version(&self) -> &str;

    /// Compiles one batch of sources.
    ///
    /// The returned output must contain an entry for every submitted file.
    /// Any diagnostic fails the whole batch.
    fn compile(&self, sources: &[SourceInput]) -> Result<CompilerOutput, CompilerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_display_with_location() {
        let d = Diagnostic {
            path: Some(PathBuf::from("contracts/root.vy")),
            line: Some(12),
            message: "unknown identifier `Branchh`".to_string(),
        };
        assert_eq!(
            d.to_string(),
            "contracts/root.vy:12: unknown identifier `Branchh`"
        );
    }

    #[test]
    fn diagnostic_display_without_location() {
        let d = Diagnostic {
            path: None,
            line: None,
            message: "internal compiler error".to_string(),
        };
        assert_eq!(d.to_string(), "internal compiler error");
    }

    #[test]
    fn diagnostics_error_counts() {
        let err = CompilerError::Diagnostics(vec![
            Diagnostic {
                path: None,
                line: None,
                message: "first".to_string(),
            },
            Diagnostic {
                path: None,
                line: None,
                message: "second".to_string(),
            },
        ]);
        assert_eq!(err.to_string(), "compilation failed with 2 diagnostic(s)");
    }

    #[test]
    fn compiled_decl_optional_fields_default() {
        let decl: CompiledDecl = serde_json::from_str(
            r#"{ "name": "Root", "bytecode": "0x00" }"#,
        )
        .unwrap();
        assert!(decl.depends_on.is_empty());
        assert!(decl.interface.is_null());
    }

    #[test]
    fn output_roundtrips_through_json() {
        let output = CompilerOutput {
            files: vec![FileOutput {
                path: PathBuf::from("contracts/root.vy"),
                declarations: vec![CompiledDecl {
                    name: "Root".to_string(),
                    depends_on: vec!["Branch".to_string()],
                    bytecode: "0x6001".to_string(),
                    interface: serde_json::json!([]),
                }],
            }],
        };
        let json = serde_json::to_string(&output).unwrap();
        let back: CompilerOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(back.files.len(), 1);
        assert_eq!(back.files[0].declarations[0].name, "Root");
        assert_eq!(back.files[0].declarations[0].depends_on, vec!["Branch"]);
    }
}
