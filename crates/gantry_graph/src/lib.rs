//! Declaration dependency graph for incremental recompilation.
//!
//! This crate builds a per-invocation graph of every declaration the project
//! defines, then answers the one question the build orchestrator has: given
//! the files that changed, which declarations (and therefore which files)
//! must be resubmitted to the compiler.

#![warn(missing_docs)]

pub mod arena;
pub mod error;
pub mod extract;
pub mod graph;
pub mod ids;
pub mod propagate;

pub use arena::{Arena, ArenaId};
pub use error::GraphError;
pub use extract::{build_graph, DeclMetadata, FileMetadata};
pub use graph::{Declaration, DependencyGraph, FileNode};
pub use ids::{DeclId, FileId};
pub use propagate::{dirty_closure, find_cycles, CycleWarning, DirtySet};
