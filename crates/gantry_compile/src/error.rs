//! Errors surfaced by the incremental compile driver.

use std::path::PathBuf;

use gantry_cache::CacheError;
use gantry_graph::GraphError;
use thiserror::Error;

use crate::compiler::CompilerError;

/// Any failure that aborts a [`CompileDriver::run`](crate::CompileDriver::run) call.
///
/// All variants are raised before build state is modified, except
/// [`CompileError::Cache`], which can also occur while artifacts are being
/// written back.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The dependency graph could not be built from the project sources.
    #[error("dependency graph error: {0}")]
    Graph(#[from] GraphError),

    /// The compiler rejected the submitted sources or could not be invoked.
    #[error("{0}")]
    Compiler(#[from] CompilerError),

    /// The fingerprint store or artifact directory could not be read or written.
    #[error("store error: {0}")]
    Cache(#[from] CacheError),

    /// A source file scheduled for compilation could not be read.
    #[error("failed to read source {path}: {source}")]
    SourceRead {
        /// Project-relative path of the unreadable file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The compiler's response did not cover a file it was given.
    #[error("compiler produced no output for {path}")]
    MissingOutput {
        /// Project-relative path of the file without output.
        path: PathBuf,
    },

    /// The compiler produced a declaration name already owned by another file.
    #[error("compiler output defines `{name}` in {file}, already defined in {previous}")]
    DuplicateOutput {
        /// The colliding declaration name.
        name: String,
        /// The file whose output introduced the collision.
        file: PathBuf,
        /// The file that already owns the name.
        previous: PathBuf,
    },
}
