//! `gantry init` — project scaffolding command.
//!
//! Creates a new Gantry project: a `gantry.toml` config file, a `contracts/`
//! source directory, and a starter contract.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Compiler command written to the scaffolded config when none is given.
const DEFAULT_COMPILER: &str = "solc-json";

/// Runs the `gantry init` command.
///
/// If `name` is `Some`, creates a new subdirectory with that name.
/// Otherwise initializes in the current working directory.
/// Returns exit code 0 on success.
pub fn run(name: Option<String>, compiler: Option<&str>) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = match &name {
        Some(n) => {
            let dir = PathBuf::from(n);
            if dir.exists() {
                return Err(format!("directory '{}' already exists", n).into());
            }
            fs::create_dir_all(&dir)?;
            dir
        }
        None => std::env::current_dir()?,
    };

    let project_name = project_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("my_project");

    eprintln!("  Creating new Gantry project `{project_name}`");

    fs::create_dir_all(project_dir.join("contracts"))?;
    write_gantry_toml(&project_dir, project_name, compiler.unwrap_or(DEFAULT_COMPILER))?;
    write_starter_contract(&project_dir)?;

    eprintln!("     Created {}", project_dir.join("gantry.toml").display());
    eprintln!(
        "     Created {}",
        project_dir.join("contracts").join("counter.sol").display()
    );

    Ok(0)
}

/// Writes the `gantry.toml` configuration file.
fn write_gantry_toml(root: &Path, name: &str, compiler: &str) -> io::Result<()> {
    let content = format!(
        r#"[project]
name = "{name}"
version = "0.1.0"

[contracts]
source_dir = "contracts"
artifacts_dir = "build/artifacts"
extensions = ["sol"]

# The command must speak the Gantry JSON protocol on stdin/stdout.
[compiler]
command = "{compiler}"
args = []

[cache]
fingerprint = "content"
"#
    );
    fs::write(root.join("gantry.toml"), content)
}

/// Writes a starter contract source file.
fn write_starter_contract(root: &Path) -> io::Result<()> {
    let content = r#"contract Counter {
    uint256 value;

    function increment() public {
        value += 1;
    }

    function current() public view returns (uint256) {
        return value;
    }
}
"#;
    fs::write(root.join("contracts").join("counter.sol"), content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_creates_directory_structure() {
        let tmp = TempDir::new().unwrap();
        let project_dir = tmp.path().join("demo");
        run(Some(project_dir.to_str().unwrap().to_string()), None).unwrap();

        assert!(project_dir.join("gantry.toml").exists());
        assert!(project_dir.join("contracts").is_dir());
        assert!(project_dir.join("contracts").join("counter.sol").exists());
    }

    #[test]
    fn init_generates_valid_toml() {
        let tmp = TempDir::new().unwrap();
        let project_dir = tmp.path().join("toml_proj");
        run(Some(project_dir.to_str().unwrap().to_string()), None).unwrap();

        let toml_str = fs::read_to_string(project_dir.join("gantry.toml")).unwrap();
        let config = gantry_config::load_config_from_str(&toml_str);
        assert!(
            config.is_ok(),
            "generated gantry.toml should be valid: {config:?}"
        );
        let config = config.unwrap();
        assert_eq!(config.project.name, "toml_proj");
        assert_eq!(config.project.version, "0.1.0");
        assert_eq!(config.compiler.command, DEFAULT_COMPILER);
    }

    #[test]
    fn init_records_the_chosen_compiler() {
        let tmp = TempDir::new().unwrap();
        let project_dir = tmp.path().join("custom");
        run(
            Some(project_dir.to_str().unwrap().to_string()),
            Some("vyper-json"),
        )
        .unwrap();

        let config = gantry_config::load_config(&project_dir).unwrap();
        assert_eq!(config.compiler.command, "vyper-json");
    }

    #[test]
    fn init_existing_dir_error() {
        let tmp = TempDir::new().unwrap();
        let project_dir = tmp.path().join("exists");
        fs::create_dir_all(&project_dir).unwrap();

        let result = run(Some(project_dir.to_str().unwrap().to_string()), None);
        assert!(result.is_err());
    }

    #[test]
    fn starter_project_discovers_cleanly() {
        let tmp = TempDir::new().unwrap();
        let project_dir = tmp.path().join("walkable");
        run(Some(project_dir.to_str().unwrap().to_string()), None).unwrap();

        let config = gantry_config::load_config(&project_dir).unwrap();
        let files =
            crate::pipeline::discover_source_files(&project_dir, &config.contracts).unwrap();
        assert_eq!(files, vec![PathBuf::from("contracts/counter.sol")]);
    }
}
