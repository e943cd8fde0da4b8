//! `gantry clean` — removes all build state.

use crate::pipeline::resolve_project_root;
use crate::GlobalArgs;

/// Runs the `gantry clean` command.
///
/// Removes the configured artifacts directory, manifest included. The next
/// compile starts from scratch. Missing build state is not an error.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = resolve_project_root(global)?;
    let config = gantry_config::load_config(&project_dir)?;
    let artifacts_dir = project_dir.join(&config.contracts.artifacts_dir);

    match std::fs::remove_dir_all(&artifacts_dir) {
        Ok(()) => {
            if !global.quiet {
                eprintln!("     Removed {}", artifacts_dir.display());
            }
            Ok(0)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if !global.quiet {
                eprintln!("       Clean (no artifacts to remove)");
            }
            Ok(0)
        }
        Err(e) => Err(e.into()),
    }
}
