use anyhow::{Result, anyhow};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directories never searched for build files
const SKIPPED_DIRS: &[&str] = &["build", ".gradle", ".git", "target", "node_modules"];

/// A project directory together with its declarative build file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLocation {
    pub project_dir: PathBuf,
    pub build_file: PathBuf,
}

/// Resolve a CLI path argument: either a build file or a directory holding one
pub fn locate_build_file(path: &Path, build_file_name: &str) -> Result<BuildLocation> {
    if !path.exists() {
        return Err(anyhow!("Path not found: {}", path.display()));
    }

    if path.is_file() {
        let project_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        return Ok(BuildLocation {
            project_dir,
            build_file: path.to_path_buf(),
        });
    }

    let build_file = path.join(build_file_name);
    if !build_file.is_file() {
        return Err(anyhow!(
            "No {} found in {}",
            build_file_name,
            path.display()
        ));
    }
    Ok(BuildLocation {
        project_dir: path.to_path_buf(),
        build_file,
    })
}

/// Every build file named `build_file_name` below `root`, sorted by path
pub fn find_build_files(root: &Path, build_file_name: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| {
            !(entry.file_type().is_dir()
                && entry.depth() > 0
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| SKIPPED_DIRS.contains(&name)))
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == build_file_name)
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_locate_from_directory_and_file() {
        let temp = TempDir::new().unwrap();
        let build_file = temp.path().join("build.gradle.toml");
        fs::write(&build_file, "").unwrap();

        let from_dir = locate_build_file(temp.path(), "build.gradle.toml").unwrap();
        assert_eq!(from_dir.project_dir, temp.path());
        assert_eq!(from_dir.build_file, build_file);

        let from_file = locate_build_file(&build_file, "build.gradle.toml").unwrap();
        assert_eq!(from_file, from_dir);
    }

    #[test]
    fn test_locate_missing_build_file() {
        let temp = TempDir::new().unwrap();
        let err = locate_build_file(temp.path(), "build.gradle.toml").unwrap_err();
        assert!(err.to_string().starts_with("No build.gradle.toml found in"));
        assert!(locate_build_file(&temp.path().join("missing"), "build.gradle.toml").is_err());
    }

    #[test]
    fn test_find_build_files_skips_output_dirs() {
        let temp = TempDir::new().unwrap();
        for dir in ["app", "lib/core", "app/build/generated"] {
            fs::create_dir_all(temp.path().join(dir)).unwrap();
            fs::write(temp.path().join(dir).join("build.gradle.toml"), "").unwrap();
        }

        let files = find_build_files(temp.path(), "build.gradle.toml");
        assert_eq!(
            files,
            vec![
                temp.path().join("app/build.gradle.toml"),
                temp.path().join("lib/core/build.gradle.toml"),
            ]
        );
    }
}
