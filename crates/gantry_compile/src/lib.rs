//! Compile orchestration: the [`Compiler`] seam and the incremental driver.
//!
//! The driver decides *what* to compile; the [`Compiler`] trait hides *how*.
//! [`CommandCompiler`] is the production implementation, talking JSON over
//! stdin/stdout to whatever toolchain the project configures.

#![warn(missing_docs)]

pub mod compiler;
pub mod driver;
pub mod error;
pub mod external;

pub use compiler::{
    CompiledDecl, Compiler, CompilerError, CompilerOutput, Diagnostic, FileOutput, SourceInput,
};
pub use driver::{CompileDriver, CompileOptions, CompileSummary, FullRebuildReason};
pub use error::CompileError;
pub use external::CommandCompiler;
