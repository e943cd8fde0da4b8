//! Dirty-set propagation and cycle analysis.
//!
//! Propagation computes the reverse-edge transitive closure of everything a
//! changed file defines, folding in file grouping as it goes: a dirty
//! declaration dirties its whole file, and a dirty file dirties all of its
//! declarations. Both rules feed one work queue, so the joint fixpoint is
//! reached in a single traversal. A visited set makes the traversal safe on
//! cyclic graphs.

use crate::graph::DependencyGraph;
use crate::ids::{DeclId, FileId};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::fmt;

/// Everything that must be resubmitted to the compiler this run.
#[derive(Debug, Clone)]
pub struct DirtySet {
    /// Dirty declarations, sorted by ID.
    pub declarations: Vec<DeclId>,
    /// Dirty files, sorted by ID. Every dirty declaration's owning file is
    /// listed, and every declaration of a listed file is dirty.
    pub files: Vec<FileId>,
}

impl DirtySet {
    /// Returns `true` when nothing needs to recompile.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Computes the dirty closure from the files flagged dirty in the graph.
///
/// A declaration ends up dirty exactly when it has a dependency path, direct
/// or through file grouping, to a changed file. Declarations with no such
/// path are never included, regardless of what else recompiles this run.
pub fn dirty_closure(graph: &DependencyGraph) -> DirtySet {
    let mut dirty_decls: HashSet<DeclId> = HashSet::new();
    let mut dirty_files: HashSet<FileId> = HashSet::new();
    let mut queue: VecDeque<DeclId> = VecDeque::new();

    for (file_id, file) in graph.files() {
        if file.dirty {
            dirty_files.insert(file_id);
            for &decl in &file.decls {
                if dirty_decls.insert(decl) {
                    queue.push_back(decl);
                }
            }
        }
    }

    while let Some(decl) = queue.pop_front() {
        for &dependent in graph.dependents(decl) {
            if dirty_decls.insert(dependent) {
                queue.push_back(dependent);
            }
        }
        // The owning file recompiles as a unit, dragging siblings along.
        let file_id = graph.decl(decl).file;
        if dirty_files.insert(file_id) {
            for &sibling in &graph.file(file_id).decls {
                if dirty_decls.insert(sibling) {
                    queue.push_back(sibling);
                }
            }
        }
    }

    let mut declarations: Vec<_> = dirty_decls.into_iter().collect();
    declarations.sort();
    let mut files: Vec<_> = dirty_files.into_iter().collect();
    files.sort();
    DirtySet {
        declarations,
        files,
    }
}

/// A dependency cycle. Non-fatal: members recompile together whenever any
/// one of them is dirty, and every traversal terminates regardless.
#[derive(Debug, Clone, Serialize)]
pub struct CycleWarning {
    /// Names of the declarations forming the cycle, sorted.
    pub members: Vec<String>,
}

impl fmt::Display for CycleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "circular dependency among {}", self.members.join(", "))
    }
}

/// Finds every dependency cycle in the graph.
///
/// Kosaraju's algorithm over the arena: a forward DFS records completion
/// order, then a reverse DFS in reverse completion order peels off strongly
/// connected components. Components with more than one member are cycles
/// (self-references are dropped at extraction, so singletons never are).
pub fn find_cycles(graph: &DependencyGraph) -> Vec<CycleWarning> {
    let n = graph.decl_count();
    let mut visited = vec![false; n];
    let mut order: Vec<DeclId> = Vec::with_capacity(n);

    for (start, _) in graph.declarations() {
        if visited[start.as_raw() as usize] {
            continue;
        }
        visited[start.as_raw() as usize] = true;
        let mut stack: Vec<(DeclId, usize)> = vec![(start, 0)];
        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            let child = frame.1;
            let deps = &graph.decl(node).depends_on;
            if child < deps.len() {
                frame.1 += 1;
                let next = deps[child];
                let slot = next.as_raw() as usize;
                if !visited[slot] {
                    visited[slot] = true;
                    stack.push((next, 0));
                }
            } else {
                order.push(node);
                stack.pop();
            }
        }
    }

    let mut component = vec![usize::MAX; n];
    let mut cycles = Vec::new();
    let mut next_component = 0usize;

    for &root in order.iter().rev() {
        if component[root.as_raw() as usize] != usize::MAX {
            continue;
        }
        component[root.as_raw() as usize] = next_component;
        let mut members = vec![root];
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            for &dependent in graph.dependents(node) {
                let slot = dependent.as_raw() as usize;
                if component[slot] == usize::MAX {
                    component[slot] = next_component;
                    members.push(dependent);
                    stack.push(dependent);
                }
            }
        }
        next_component += 1;
        if members.len() > 1 {
            let mut names: Vec<String> = members
                .iter()
                .map(|&member| graph.name(member).to_string())
                .collect();
            names.sort();
            cycles.push(CycleWarning { members: names });
        }
    }

    cycles.sort_by(|a, b| a.members.cmp(&b.members));
    cycles
}
