use crate::utils::locate_build_file;
use anyhow::{Context, Result};
use declarative_core::android::{AndroidProject, ProjectReport};
use declarative_core::document::load_file;
use declarative_core::{Declarative, DeclarativeConfig, Strictness};
use std::path::Path;
use tracing::debug;

/// Apply the build file at `path` and print the configured project as JSON
pub fn apply_command(
    path: &Path,
    strict: bool,
    project_root: Option<&Path>,
    run_variants: bool,
) -> Result<()> {
    debug!("Applying declarative build at {:?}", path);
    let report = configure_project(path, strict, project_root, run_variants)?;
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize project")?;
    println!("{json}");
    Ok(())
}

/// Load, apply and optionally finish configuring the project at `path`
///
/// `strict` and `project_root` override whatever the discovered
/// `.declarative.json` says.
pub fn configure_project(
    path: &Path,
    strict: bool,
    project_root: Option<&Path>,
    run_variants: bool,
) -> Result<ProjectReport> {
    let config = DeclarativeConfig::discover(path)
        .with_context(|| format!("Failed to load configuration for {}", path.display()))?;
    let location = locate_build_file(path, config.build_file_name())?;

    let mut options = config.to_options(&location.project_dir);
    if let Some(root) = project_root {
        options.project_root = root.to_path_buf();
    }
    if strict {
        options.strictness = Strictness::Strict;
    }
    debug!("Mapper options: {:?}", options);

    let document = load_file(&location.build_file)?;
    let mut project = AndroidProject::new(options.project_root.clone());
    Declarative::new(options)
        .apply(&document, &mut project)
        .with_context(|| format!("Failed to apply {}", location.build_file.display()))?;

    let variants = if run_variants {
        project
            .finish_configuration()
            .context("Variant callback failed")?
    } else {
        Vec::new()
    };
    Ok(project.report(variants))
}
