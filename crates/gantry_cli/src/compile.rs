//! `gantry compile` — incremental project compilation.
//!
//! Loads the project configuration, discovers contract sources, and hands
//! them to the compile driver. Only files whose fingerprints changed, plus
//! their transitive dependents, are recompiled; everything else keeps its
//! artifacts byte for byte.

use gantry_compile::{
    CommandCompiler, CompileDriver, CompileError, CompileOptions, CompileSummary, Compiler,
    CompilerError,
};

use crate::pipeline::{discover_source_files, resolve_project_root};
use crate::{CompileArgs, GlobalArgs, ReportFormat};

/// Runs the `gantry compile` command.
///
/// Returns exit code 0 on success (no-op runs included), 1 when the
/// compiler rejects the sources.
pub fn run(args: &CompileArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    // Step 1: Find project root and load config
    let project_dir = resolve_project_root(global)?;
    let config = gantry_config::load_config(&project_dir)?;

    if !global.quiet {
        eprintln!(
            "   Compiling {} v{}",
            config.project.name, config.project.version
        );
    }

    // Step 2: Discover sources
    let sources = discover_source_files(&project_dir, &config.contracts)?;
    if sources.is_empty() && !global.quiet {
        eprintln!(
            "warning: no source files found in {}",
            project_dir.join(&config.contracts.source_dir).display()
        );
    }

    // Step 3: Probe the configured compiler
    let compiler = CommandCompiler::new(&config.compiler.command, &config.compiler.args)?;
    if !global.quiet {
        eprintln!("    Compiler {}", compiler.version());
    }

    // Step 4: Run the incremental driver
    let driver = CompileDriver::new(
        &compiler,
        CompileOptions {
            project_root: project_dir.clone(),
            artifacts_dir: config.contracts.artifacts_dir.clone(),
            sources,
            fingerprint: config.cache.fingerprint,
            force: args.force,
        },
    );

    let summary = match driver.run() {
        Ok(summary) => summary,
        Err(CompileError::Compiler(CompilerError::Diagnostics(diagnostics))) => {
            for diagnostic in &diagnostics {
                eprintln!("error: {diagnostic}");
            }
            eprintln!("error: compilation failed; existing artifacts were left untouched");
            return Ok(1);
        }
        Err(other) => return Err(other.into()),
    };

    // Step 5: Report
    if !global.quiet {
        for warning in &summary.cycle_warnings {
            eprintln!("warning: {warning}");
        }
    }

    match args.format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        ReportFormat::Text => {
            if !global.quiet {
                report_text(&summary, global.verbose);
            }
        }
    }

    Ok(0)
}

/// Prints the human-readable build summary to stderr.
fn report_text(summary: &CompileSummary, verbose: bool) {
    if let Some(reason) = summary.full_rebuild {
        eprintln!("     Rebuild {reason}");
    }
    if summary.is_noop() {
        eprintln!("  Up to date ({} files)", summary.unchanged_files);
        return;
    }
    if verbose {
        for path in &summary.compiled_files {
            eprintln!("    Compiled {}", path.display());
        }
        for path in &summary.removed_files {
            eprintln!("     Removed {}", path.display());
        }
    }
    eprintln!(
        "    Compiled {} files ({} declarations), {} unchanged",
        summary.compiled_files.len(),
        summary.compiled_declarations.len(),
        summary.unchanged_files
    );
    if !summary.removed_files.is_empty() && !verbose {
        eprintln!("     Removed {} stale records", summary.removed_files.len());
    }
}
