use super::configure_project;
use crate::utils::find_build_files;
use anyhow::{Result, anyhow};
use declarative_core::DeclarativeConfig;
use std::path::Path;
use tracing::debug;

/// Apply every build file under `root`, printing one line per file
pub fn check_command(root: &Path, strict: bool) -> Result<()> {
    let config = DeclarativeConfig::discover(root)?;
    let files = find_build_files(root, config.build_file_name());
    if files.is_empty() {
        return Err(anyhow!(
            "No {} found under {}",
            config.build_file_name(),
            root.display()
        ));
    }

    let mut failures = 0;
    for file in &files {
        debug!("Checking {:?}", file);
        match configure_project(file, strict, None, true) {
            Ok(_) => println!("✅ {}", file.display()),
            Err(e) => {
                failures += 1;
                println!("❌ {}", file.display());
                println!("   {:#}", e);
            }
        }
    }

    println!();
    println!("{} checked, {} failed", files.len(), failures);
    if failures > 0 {
        return Err(anyhow!("{} of {} build files failed", failures, files.len()));
    }
    Ok(())
}
