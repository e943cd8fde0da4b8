//! Error types for graph construction.

use std::path::PathBuf;

/// Errors detected while building the dependency graph.
///
/// Both variants are fatal and surface before the compiler is invoked, so a
/// failed extraction never mutates the build manifest or any artifact.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A declaration references a name that no longer resolves anywhere in
    /// the project, for example after the file defining it was deleted.
    #[error("`{referenced_by}` in {file} references unknown declaration `{name}`")]
    BrokenReference {
        /// The unresolved dependency name.
        name: String,
        /// The declaration holding the dangling reference.
        referenced_by: String,
        /// The file that defines `referenced_by`.
        file: PathBuf,
    },

    /// Two files define a declaration with the same name.
    #[error("declaration `{name}` in {file} is already defined in {previous}")]
    DuplicateDeclaration {
        /// The duplicated declaration name.
        name: String,
        /// The file with the second definition.
        file: PathBuf,
        /// The file that defined the name first.
        previous: PathBuf,
    },
}
