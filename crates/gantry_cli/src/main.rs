//! Gantry CLI — the command-line interface for the Gantry build tool.
//!
//! Provides `gantry compile` for incremental contract compilation,
//! `gantry clean` for removing build state, and `gantry init` for project
//! scaffolding.

#![warn(missing_docs)]

mod clean;
mod compile;
mod init;
mod pipeline;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Gantry — an incremental build tool for contract projects.
#[derive(Parser, Debug)]
#[command(name = "gantry", version, about = "Gantry contract build tool")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `gantry.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile the project, recompiling only what changed.
    Compile(CompileArgs),
    /// Remove the artifacts directory and build manifest.
    Clean,
    /// Create a new Gantry project.
    Init {
        /// Project name (creates a subdirectory). If omitted, initializes in
        /// the current directory.
        name: Option<String>,

        /// Compiler command to record in `gantry.toml`.
        #[arg(long)]
        compiler: Option<String>,
    },
}

/// Arguments for the `gantry compile` subcommand.
#[derive(Parser, Debug)]
pub struct CompileArgs {
    /// Recompile every file, ignoring recorded fingerprints.
    #[arg(short, long)]
    pub force: bool,

    /// Output format for the build summary.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Build summary output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Compile(ref args) => compile::run(args, &global),
        Command::Clean => clean::run(&global),
        Command::Init { name, compiler } => init::run(name, compiler.as_deref()),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_compile_default() {
        let cli = Cli::parse_from(["gantry", "compile"]);
        match cli.command {
            Command::Compile(ref args) => {
                assert!(!args.force);
                assert_eq!(args.format, ReportFormat::Text);
            }
            _ => panic!("expected Compile command"),
        }
    }

    #[test]
    fn parse_compile_force() {
        let cli = Cli::parse_from(["gantry", "compile", "--force"]);
        match cli.command {
            Command::Compile(ref args) => assert!(args.force),
            _ => panic!("expected Compile command"),
        }
    }

    #[test]
    fn parse_compile_force_short() {
        let cli = Cli::parse_from(["gantry", "compile", "-f"]);
        match cli.command {
            Command::Compile(ref args) => assert!(args.force),
            _ => panic!("expected Compile command"),
        }
    }

    #[test]
    fn parse_compile_format_json() {
        let cli = Cli::parse_from(["gantry", "compile", "--format", "json"]);
        match cli.command {
            Command::Compile(ref args) => assert_eq!(args.format, ReportFormat::Json),
            _ => panic!("expected Compile command"),
        }
    }

    #[test]
    fn parse_clean() {
        let cli = Cli::parse_from(["gantry", "clean"]);
        assert!(matches!(cli.command, Command::Clean));
    }

    #[test]
    fn parse_init_default() {
        let cli = Cli::parse_from(["gantry", "init"]);
        match cli.command {
            Command::Init { name, compiler } => {
                assert!(name.is_none());
                assert!(compiler.is_none());
            }
            _ => panic!("expected Init command"),
        }
    }

    #[test]
    fn parse_init_with_name_and_compiler() {
        let cli = Cli::parse_from(["gantry", "init", "tokens", "--compiler", "solc-json"]);
        match cli.command {
            Command::Init { name, compiler } => {
                assert_eq!(name.as_deref(), Some("tokens"));
                assert_eq!(compiler.as_deref(), Some("solc-json"));
            }
            _ => panic!("expected Init command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["gantry", "--quiet", "compile"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
    }

    #[test]
    fn parse_verbose_flag() {
        let cli = Cli::parse_from(["gantry", "--verbose", "compile"]);
        assert!(cli.verbose);
        assert!(!cli.quiet);
    }

    #[test]
    fn parse_config_path() {
        let cli = Cli::parse_from(["gantry", "--config", "/path/to/gantry.toml", "clean"]);
        assert_eq!(cli.config.as_deref(), Some("/path/to/gantry.toml"));
    }

    #[test]
    fn global_flags_accepted_after_subcommand() {
        let cli = Cli::parse_from(["gantry", "compile", "--quiet"]);
        assert!(cli.quiet);
    }
}
