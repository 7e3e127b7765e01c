//! Init command implementation.

use crate::cli::InitArgs;
use crate::config::STARTER_CONFIG;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::fs;
use std::path::Path;

/// Execute the init command.
pub fn execute_init(args: InitArgs, formatter: &Formatter) -> Result<()> {
    write_starter(&args.path, args.force)?;
    println!(
        "{}",
        formatter.success(&format!("Wrote {}", args.path.display()))
    );
    Ok(())
}

/// Write the starter configuration to `path`.
pub fn write_starter(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(CliError::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, STARTER_CONFIG)?;
    Ok(())
}
