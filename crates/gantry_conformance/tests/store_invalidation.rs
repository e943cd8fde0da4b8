//! Recovery paths when the store can no longer be trusted: corrupt or
//! missing manifests, compiler upgrades, forced rebuilds, and references
//! into files that no longer exist.

use gantry_compile::{CompileError, FullRebuildReason};
use gantry_conformance::{source_path, ScriptCompiler, TestProject};
use gantry_graph::GraphError;
use tempfile::TempDir;

fn scaffold_pair(project: &TestProject) {
    project.write_source("base", "contract Base");
    project.write_source("token", "contract Token : Base");
}

#[test]
fn corrupt_manifest_forces_a_full_rebuild_and_heals() {
    let tmp = TempDir::new().unwrap();
    let project = TestProject::at(tmp.path());
    scaffold_pair(&project);

    let compiler = ScriptCompiler::new("1.0.0");
    project.compile(&compiler).unwrap();
    project.corrupt_manifest();

    let summary = project.compile(&compiler).unwrap();
    assert_eq!(summary.full_rebuild, Some(FullRebuildReason::StoreInvalid));
    assert_eq!(summary.compiled_declarations, vec!["Base", "Token"]);
    assert_eq!(compiler.invocations(), 2);

    // The rebuild rewrote a readable manifest; the next run trusts it again.
    let third = project.compile(&compiler).unwrap();
    assert!(third.is_noop());
    assert_eq!(third.full_rebuild, None);
}

#[test]
fn missing_manifest_is_treated_as_a_first_build() {
    let tmp = TempDir::new().unwrap();
    let project = TestProject::at(tmp.path());
    scaffold_pair(&project);

    let compiler = ScriptCompiler::new("1.0.0");
    project.compile(&compiler).unwrap();
    std::fs::remove_file(project.manifest_path()).unwrap();

    let summary = project.compile(&compiler).unwrap();
    assert_eq!(summary.full_rebuild, Some(FullRebuildReason::FirstBuild));
    assert_eq!(summary.compiled_declarations, vec!["Base", "Token"]);
}

#[test]
fn compiler_upgrade_rewrites_everything() {
    let tmp = TempDir::new().unwrap();
    let project = TestProject::at(tmp.path());
    scaffold_pair(&project);

    project.compile(&ScriptCompiler::new("1.0.0")).unwrap();
    let upgraded = ScriptCompiler::new("2.0.0");
    let summary = project.compile(&upgraded).unwrap();

    assert_eq!(
        summary.full_rebuild,
        Some(FullRebuildReason::CompilerVersionChanged)
    );
    assert_eq!(summary.compiled_declarations, vec!["Base", "Token"]);
    assert_eq!(project.artifact("Base").unwrap().compiler_version, "2.0.0");
    assert_eq!(project.manifest().unwrap().compiler_version, "2.0.0");
}

#[test]
fn forced_rebuild_recompiles_clean_files() {
    let tmp = TempDir::new().unwrap();
    let project = TestProject::at(tmp.path());
    scaffold_pair(&project);

    let compiler = ScriptCompiler::new("1.0.0");
    project.compile(&compiler).unwrap();
    let summary = project.compile_with(&compiler, true).unwrap();

    assert_eq!(summary.full_rebuild, Some(FullRebuildReason::Forced));
    assert_eq!(summary.compiled_declarations, vec!["Base", "Token"]);
    assert_eq!(compiler.invocations(), 2);
}

#[test]
fn reference_into_a_deleted_file_fails_fast() {
    let tmp = TempDir::new().unwrap();
    let project = TestProject::at(tmp.path());
    scaffold_pair(&project);

    let compiler = ScriptCompiler::new("1.0.0");
    project.compile(&compiler).unwrap();
    project.delete_source("base");

    let err = project.compile(&compiler).unwrap_err();
    match err {
        CompileError::Graph(GraphError::BrokenReference {
            name,
            referenced_by,
            file,
        }) => {
            assert_eq!(name, "Base");
            assert_eq!(referenced_by, "Token");
            assert_eq!(file, source_path("token"));
        }
        other => panic!("expected a broken reference, got {other}"),
    }
    // The failure happened before the compiler or the store were touched.
    assert_eq!(compiler.invocations(), 1);
    assert!(project.artifact("Base").is_some());
    assert_eq!(project.manifest().unwrap().files.len(), 2);
}

#[test]
fn editing_the_referencing_file_recovers() {
    let tmp = TempDir::new().unwrap();
    let project = TestProject::at(tmp.path());
    scaffold_pair(&project);

    let compiler = ScriptCompiler::new("1.0.0");
    project.compile(&compiler).unwrap();
    project.delete_source("base");
    project.compile(&compiler).unwrap_err();

    // Dropping the reference clears the edit; the stale record for the
    // deleted file is pruned in the same run.
    project.write_source("token", "contract Token");
    let summary = project.compile(&compiler).unwrap();

    assert_eq!(summary.compiled_declarations, vec!["Token"]);
    assert_eq!(summary.removed_files, vec![source_path("base")]);
    assert!(project.artifact("Base").is_none());
    assert!(project.artifact("Token").is_some());
}
