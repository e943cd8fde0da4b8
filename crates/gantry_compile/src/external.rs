//! Subprocess-backed compiler implementation.
//!
//! `CommandCompiler` spawns a configured executable once per batch, writes a
//! JSON request to its stdin, and reads a JSON response from its stdout:
//!
//! ```text
//! request:  { "sources": [ { "path": "...", "content": "..." }, ... ] }
//! response: { "files": [ ... ] }                 on success
//!           { "diagnostics": [ ... ] }           on source errors
//! ```
//!
//! The version is probed with `<command> --version` when the compiler is
//! constructed, so a missing or broken toolchain surfaces before any build
//! state is touched.

use std::io::Write;
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::compiler::{Compiler, CompilerError, CompilerOutput, Diagnostic, FileOutput, SourceInput};

#[derive(Serialize)]
struct WireRequest<'a> {
    sources: &'a [SourceInput],
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    files: Vec<FileOutput>,
    #[serde(default)]
    diagnostics: Vec<Diagnostic>,
}

/// A [`Compiler`] that shells out to an external toolchain.
#[derive(Debug)]
pub struct CommandCompiler {
    command: String,
    args: Vec<String>,
    version: String,
}

impl CommandCompiler {
    /// Probes `<command> --version` and returns a ready compiler.
    ///
    /// The first line of the probe's stdout becomes the version string.
    pub fn new(command: &str, args: &[String]) -> Result<Self, CompilerError> {
        let probe = Command::new(command)
            .arg("--version")
            .output()
            .map_err(|e| CompilerError::Invocation {
                reason: format!("failed to run `{command} --version`: {e}"),
            })?;
        if !probe.status.success() {
            return Err(CompilerError::Invocation {
                reason: format!("`{command} --version` exited with {}", probe.status),
            });
        }
        let version = String::from_utf8_lossy(&probe.stdout)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        if version.is_empty() {
            return Err(CompilerError::Invocation {
                reason: format!("`{command} --version` reported no version"),
            });
        }
        Ok(Self {
            command: command.to_string(),
            args: args.to_vec(),
            version,
        })
    }
}

impl Compiler for CommandCompiler {
    fn version(&self) -> &str {
        &self.version
    }

    fn compile(&self, sources: &[SourceInput]) -> Result<CompilerOutput, CompilerError> {
        let invocation = |reason: String| CompilerError::Invocation { reason };

        let request = serde_json::to_vec(&WireRequest { sources })
            .map_err(|e| invocation(format!("failed to encode request: {e}")))?;

        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| invocation(format!("failed to spawn `{}`: {e}", self.command)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| invocation("compiler stdin unavailable".to_string()))?;
        stdin
            .write_all(&request)
            .map_err(|e| invocation(format!("failed to write request: {e}")))?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .map_err(|e| invocation(format!("failed to wait for `{}`: {e}", self.command)))?;

        // Diagnostics may arrive with any exit status; parse stdout first so
        // a nonzero exit with a well-formed response still reports them.
        if let Ok(response) = serde_json::from_slice::<WireResponse>(&output.stdout) {
            if !response.diagnostics.is_empty() {
                return Err(CompilerError::Diagnostics(response.diagnostics));
            }
            if output.status.success() {
                return Ok(CompilerOutput {
                    files: response.files,
                });
            }
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        if output.status.success() {
            Err(invocation(format!(
                "`{}` returned an unparseable response",
                self.command
            )))
        } else if stderr.is_empty() {
            Err(invocation(format!(
                "`{}` exited with {}",
                self.command, output.status
            )))
        } else {
            Err(invocation(format!(
                "`{}` exited with {}: {stderr}",
                self.command, output.status
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[cfg(unix)]
    fn script_compiler(dir: &std::path::Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("fakec");
        let script = format!(
            "#!/bin/sh\nif [ \"$1\" = \"--version\" ]; then echo \"fakec 1.2.3\"; exit 0; fi\n{body}\n"
        );
        std::fs::write(&path, script).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn sample_sources() -> Vec<SourceInput> {
        vec![SourceInput {
            path: PathBuf::from("contracts/root.vy"),
            content: "contract Root {}".to_string(),
        }]
    }

    #[test]
    fn missing_binary_fails_at_construction() {
        let err = CommandCompiler::new("/nonexistent/compiler", &[]).unwrap_err();
        assert!(matches!(err, CompilerError::Invocation { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn version_comes_from_probe() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = script_compiler(dir.path(), "cat > /dev/null; echo '{\"files\":[]}'");
        let compiler = CommandCompiler::new(&cmd, &[]).unwrap();
        assert_eq!(compiler.version(), "fakec 1.2.3");
    }

    #[cfg(unix)]
    #[test]
    fn well_formed_response_parses() {
        let dir = tempfile::tempdir().unwrap();
        let body = r#"cat > /dev/null
cat <<'EOF'
{"files":[{"path":"contracts/root.vy","declarations":[{"name":"Root","depends_on":[],"bytecode":"0x6001","interface":[]}]}]}
EOF"#;
        let cmd = script_compiler(dir.path(), body);
        let compiler = CommandCompiler::new(&cmd, &[]).unwrap();
        let output = compiler.compile(&sample_sources()).unwrap();
        assert_eq!(output.files.len(), 1);
        assert_eq!(output.files[0].declarations[0].name, "Root");
    }

    #[cfg(unix)]
    #[test]
    fn diagnostics_response_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let body = r#"cat > /dev/null
cat <<'EOF'
{"diagnostics":[{"path":"contracts/root.vy","line":3,"message":"unknown identifier"}]}
EOF
exit 1"#;
        let cmd = script_compiler(dir.path(), body);
        let compiler = CommandCompiler::new(&cmd, &[]).unwrap();
        let err = compiler.compile(&sample_sources()).unwrap_err();
        match err {
            CompilerError::Diagnostics(diags) => {
                assert_eq!(diags.len(), 1);
                assert_eq!(diags[0].line, Some(3));
            }
            other => panic!("expected Diagnostics, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn crash_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let body = "cat > /dev/null; echo 'segfault imminent' >&2; exit 139";
        let cmd = script_compiler(dir.path(), body);
        let compiler = CommandCompiler::new(&cmd, &[]).unwrap();
        let err = compiler.compile(&sample_sources()).unwrap_err();
        match err {
            CompilerError::Invocation { reason } => assert!(reason.contains("segfault imminent")),
            other => panic!("expected Invocation, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn garbage_stdout_is_an_invocation_error() {
        let dir = tempfile::tempdir().unwrap();
        let body = "cat > /dev/null; echo 'not json at all'";
        let cmd = script_compiler(dir.path(), body);
        let compiler = CommandCompiler::new(&cmd, &[]).unwrap();
        let err = compiler.compile(&sample_sources()).unwrap_err();
        match err {
            CompilerError::Invocation { reason } => assert!(reason.contains("unparseable")),
            other => panic!("expected Invocation, got {other:?}"),
        }
    }
}
