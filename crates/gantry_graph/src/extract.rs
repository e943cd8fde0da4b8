//! Builds the dependency graph from per-file declaration metadata.
//!
//! Metadata comes from the build manifest: for every file that compiled
//! successfully before, the manifest remembers which declarations it defines
//! and what each one depends on. Files scheduled for recompilation still
//! contribute their last-known declarations so that their dependents can be
//! reached, but their unresolved references are forgiven since the metadata
//! will be re-derived from fresh compiler output.

use crate::error::GraphError;
use crate::graph::DependencyGraph;
use crate::ids::DeclId;
use std::path::PathBuf;

/// Last-known metadata for one declaration.
#[derive(Debug, Clone)]
pub struct DeclMetadata {
    /// Declaration name as reported by the compiler.
    pub name: String,
    /// Names of direct dependencies (inheritance parents, imports, links).
    pub depends_on: Vec<String>,
}

/// Declaration metadata for one source file.
#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// Project-relative source path.
    pub path: PathBuf,
    /// Whether the file is already scheduled for recompilation. New and
    /// modified files carry `true`; a new file has no declarations yet.
    pub dirty: bool,
    /// Declarations the file defined at its last successful compile.
    pub declarations: Vec<DeclMetadata>,
}

/// Builds the full dependency graph for one compile invocation.
///
/// Every declaration name is interned and registered before any edge is
/// resolved, so declaration order across files does not matter.
///
/// # Errors
///
/// [`GraphError::DuplicateDeclaration`] if two files define the same name,
/// and [`GraphError::BrokenReference`] if a declaration owned by a clean
/// file references a name that no longer resolves. Dangling references from
/// dirty files are dropped instead: their metadata is stale by definition.
pub fn build_graph(files: &[FileMetadata]) -> Result<DependencyGraph, GraphError> {
    let mut graph = DependencyGraph::new();
    let mut planned: Vec<Vec<DeclId>> = Vec::with_capacity(files.len());

    for meta in files {
        let file = graph.add_file(meta.path.clone(), meta.dirty);
        let mut ids = Vec::with_capacity(meta.declarations.len());
        for decl in &meta.declarations {
            let name = graph.intern(&decl.name);
            if let Some(existing) = graph.lookup(name) {
                let previous = graph.file(graph.decl(existing).file).path.clone();
                return Err(GraphError::DuplicateDeclaration {
                    name: decl.name.clone(),
                    file: meta.path.clone(),
                    previous,
                });
            }
            ids.push(graph.add_declaration(name, file));
        }
        planned.push(ids);
    }

    for (meta, ids) in files.iter().zip(&planned) {
        for (decl, &from) in meta.declarations.iter().zip(ids) {
            for dep in &decl.depends_on {
                let name = graph.intern(dep);
                match graph.lookup(name) {
                    // Self-references carry no scheduling information.
                    Some(to) if to == from => {}
                    Some(to) => graph.add_edge(from, to),
                    None if meta.dirty => {}
                    None => {
                        return Err(GraphError::BrokenReference {
                            name: dep.clone(),
                            referenced_by: decl.name.clone(),
                            file: meta.path.clone(),
                        })
                    }
                }
            }
        }
    }

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, dirty: bool, decls: &[(&str, &[&str])]) -> FileMetadata {
        FileMetadata {
            path: PathBuf::from(path),
            dirty,
            declarations: decls
                .iter()
                .map(|(name, deps)| DeclMetadata {
                    name: name.to_string(),
                    depends_on: deps.iter().map(|d| d.to_string()).collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn resolves_edges_across_files() {
        let graph = build_graph(&[
            file("root.vy", false, &[("Root", &["Base"])]),
            file("base.vy", false, &[("Base", &[])]),
        ])
        .unwrap();
        let root = graph.lookup_name("Root").unwrap();
        let base = graph.lookup_name("Base").unwrap();
        assert_eq!(graph.decl(root).depends_on, vec![base]);
        assert_eq!(graph.dependents(base), &[root]);
    }

    #[test]
    fn declaration_order_does_not_matter() {
        // Root is registered before Base is seen.
        let graph = build_graph(&[
            file("root.vy", false, &[("Root", &["Base"])]),
            file("base.vy", false, &[("Base", &[])]),
        ])
        .unwrap();
        assert_eq!(graph.decl_count(), 2);
        let reversed = build_graph(&[
            file("base.vy", false, &[("Base", &[])]),
            file("root.vy", false, &[("Root", &["Base"])]),
        ])
        .unwrap();
        assert_eq!(reversed.decl_count(), 2);
    }

    #[test]
    fn broken_reference_in_clean_file_is_fatal() {
        let err = build_graph(&[file("root.vy", false, &[("Root", &["Gone"])])]).unwrap_err();
        match err {
            GraphError::BrokenReference {
                name,
                referenced_by,
                file,
            } => {
                assert_eq!(name, "Gone");
                assert_eq!(referenced_by, "Root");
                assert_eq!(file, PathBuf::from("root.vy"));
            }
            other => panic!("expected BrokenReference, got {other:?}"),
        }
    }

    #[test]
    fn dangling_reference_in_dirty_file_is_dropped() {
        let graph = build_graph(&[file("root.vy", true, &[("Root", &["Gone"])])]).unwrap();
        let root = graph.lookup_name("Root").unwrap();
        assert!(graph.decl(root).depends_on.is_empty());
    }

    #[test]
    fn duplicate_names_across_files_are_fatal() {
        let err = build_graph(&[
            file("a.vy", false, &[("Token", &[])]),
            file("b.vy", false, &[("Token", &[])]),
        ])
        .unwrap_err();
        match err {
            GraphError::DuplicateDeclaration {
                name,
                file,
                previous,
            } => {
                assert_eq!(name, "Token");
                assert_eq!(file, PathBuf::from("b.vy"));
                assert_eq!(previous, PathBuf::from("a.vy"));
            }
            other => panic!("expected DuplicateDeclaration, got {other:?}"),
        }
    }

    #[test]
    fn self_reference_is_ignored() {
        let graph = build_graph(&[file("a.vy", false, &[("Recursive", &["Recursive"])])]).unwrap();
        let id = graph.lookup_name("Recursive").unwrap();
        assert!(graph.decl(id).depends_on.is_empty());
        assert!(graph.dependents(id).is_empty());
    }

    #[test]
    fn new_file_contributes_no_declarations() {
        let graph = build_graph(&[
            file("new.vy", true, &[]),
            file("old.vy", false, &[("Old", &[])]),
        ])
        .unwrap();
        assert_eq!(graph.decl_count(), 1);
        assert_eq!(graph.file_count(), 2);
        let (_, node) = graph.files().next().unwrap();
        assert!(node.dirty);
        assert!(node.decls.is_empty());
    }
}
