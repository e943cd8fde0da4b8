//! The declaration dependency graph.
//!
//! One graph is built per compile invocation from per-file declaration
//! metadata, consulted during dirty propagation, and discarded. Edges point
//! from a declaration to the declarations it depends on; a reverse adjacency
//! list is maintained alongside so dependents can be walked without a scan.

use crate::arena::Arena;
use crate::ids::{DeclId, FileId};
use gantry_common::{Ident, Interner};
use std::collections::HashMap;
use std::path::PathBuf;

/// A single declaration: a contract, library, or interface.
#[derive(Debug)]
pub struct Declaration {
    /// Interned name, unique across the whole project.
    pub name: Ident,
    /// The file that defines this declaration.
    pub file: FileId,
    /// Direct dependencies: inheritance parents, imports, and library links.
    pub depends_on: Vec<DeclId>,
}

/// A source file and the declarations it defines.
///
/// The file is the compiler's atomic unit: its declarations recompile
/// together or not at all.
#[derive(Debug)]
pub struct FileNode {
    /// Project-relative source path.
    pub path: PathBuf,
    /// Whether the file is already scheduled for recompilation this run.
    pub dirty: bool,
    /// Declarations defined in this file, in metadata order.
    pub decls: Vec<DeclId>,
}

/// Dependency graph over every declaration known to the project.
///
/// Tolerates cycles; all traversals carry a visited set.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    interner: Interner,
    decls: Arena<DeclId, Declaration>,
    files: Arena<FileId, FileNode>,
    by_name: HashMap<Ident, DeclId>,
    /// Reverse adjacency, parallel to `decls`: who depends on me.
    dependents: Vec<Vec<DeclId>>,
}

impl DependencyGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a declaration or dependency name.
    pub(crate) fn intern(&self, name: &str) -> Ident {
        self.interner.get_or_intern(name)
    }

    pub(crate) fn add_file(&mut self, path: PathBuf, dirty: bool) -> FileId {
        self.files.alloc(FileNode {
            path,
            dirty,
            decls: Vec::new(),
        })
    }

    pub(crate) fn add_declaration(&mut self, name: Ident, file: FileId) -> DeclId {
        let id = self.decls.alloc(Declaration {
            name,
            file,
            depends_on: Vec::new(),
        });
        self.dependents.push(Vec::new());
        self.files[file].decls.push(id);
        self.by_name.insert(name, id);
        id
    }

    /// Records `from depends on to`. Duplicate edges are collapsed.
    pub(crate) fn add_edge(&mut self, from: DeclId, to: DeclId) {
        let forward = &mut self.decls[from].depends_on;
        if !forward.contains(&to) {
            forward.push(to);
            self.dependents[to.as_raw() as usize].push(from);
        }
    }

    /// Looks up a declaration by interned name.
    pub fn lookup(&self, name: Ident) -> Option<DeclId> {
        self.by_name.get(&name).copied()
    }

    /// Looks up a declaration by its string name.
    pub fn lookup_name(&self, name: &str) -> Option<DeclId> {
        self.lookup(self.interner.get_or_intern(name))
    }

    /// Resolves a declaration's name to its string form.
    pub fn name(&self, id: DeclId) -> &str {
        self.interner.resolve(self.decls[id].name)
    }

    /// Returns the declaration with the given ID.
    pub fn decl(&self, id: DeclId) -> &Declaration {
        &self.decls[id]
    }

    /// Returns the file node with the given ID.
    pub fn file(&self, id: FileId) -> &FileNode {
        &self.files[id]
    }

    /// Declarations that directly depend on `id`.
    pub fn dependents(&self, id: DeclId) -> &[DeclId] {
        &self.dependents[id.as_raw() as usize]
    }

    /// Iterates over all declarations in allocation order.
    pub fn declarations(&self) -> impl Iterator<Item = (DeclId, &Declaration)> {
        self.decls.iter()
    }

    /// Iterates over all file nodes in allocation order.
    pub fn files(&self) -> impl Iterator<Item = (FileId, &FileNode)> {
        self.files.iter()
    }

    /// Number of declarations in the graph.
    pub fn decl_count(&self) -> usize {
        self.decls.len()
    }

    /// Number of files in the graph.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}
