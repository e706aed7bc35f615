//! Project definitions: a `<name>.project` JSON file naming
//! subprojects, their makefiles, and their files.
//!
//! Path resolution: `baseDirectory` is relative to the project file's
//! directory, each subproject directory is relative to the base, and
//! each file is relative to its subproject.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ProjectFile {
    #[serde(rename = "projectName")]
    project_name: String,
    #[serde(rename = "baseDirectory")]
    base_directory: String,
    subprojects: Vec<SubprojectFile>,
}

impl Default for ProjectFile {
    fn default() -> Self {
        Self {
            project_name: String::new(),
            base_directory: String::new(),
            subprojects: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SubprojectFile {
    name: String,
    directory: String,
    makefile: String,
    files: Vec<String>,
    #[serde(rename = "isDefault")]
    is_default: bool,
}

#[derive(Debug, Clone)]
pub struct Subproject {
    pub name: String,
    pub directory: PathBuf,
    pub makefile: String,
    pub files: Vec<String>,
    pub is_default: bool,
}

#[derive(Debug)]
pub struct Project {
    name: String,
    file_path: PathBuf,
    base_dir: PathBuf,
    subprojects: Vec<Subproject>,
}

impl Project {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let file: ProjectFile = serde_json::from_str(&raw)
            .with_context(|| format!("parsing {}", path.display()))?;

        let project_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        let base_dir = if file.base_directory.is_empty() {
            project_dir.clone()
        } else {
            let base = PathBuf::from(&file.base_directory);
            if base.is_absolute() {
                base
            } else {
                project_dir.join(base)
            }
        };

        let subprojects = file
            .subprojects
            .into_iter()
            .map(|sub| Subproject {
                directory: base_dir.join(&sub.directory),
                name: sub.name,
                makefile: sub.makefile,
                files: sub.files,
                is_default: sub.is_default,
            })
            .collect();

        info!(target: "project", path = %path.display(), "loaded project");
        Ok(Self {
            name: file.project_name,
            file_path: path.to_path_buf(),
            base_dir,
            subprojects,
        })
    }

    /// Look for a `*.project` file in `start` or any parent directory.
    pub fn discover(start: &Path) -> Option<Self> {
        let mut dir = Some(start.to_path_buf());
        while let Some(current) = dir {
            if let Ok(entries) = fs::read_dir(&current) {
                let mut candidates: Vec<PathBuf> = entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.path())
                    .filter(|p| {
                        p.extension().and_then(|x| x.to_str()) == Some("project")
                    })
                    .collect();
                candidates.sort();
                if let Some(path) = candidates.first() {
                    return Self::load(path).ok();
                }
            }
            dir = current.parent().map(Path::to_path_buf);
        }
        None
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn subprojects(&self) -> &[Subproject] {
        &self.subprojects
    }

    pub fn default_subproject(&self) -> Option<&Subproject> {
        self.subprojects
            .iter()
            .find(|s| s.is_default)
            .or_else(|| self.subprojects.first())
    }

    /// Flat (display label, resolved path) list across subprojects.
    pub fn files(&self) -> Vec<(String, PathBuf)> {
        let mut out = Vec::new();
        for sub in &self.subprojects {
            for file in &sub.files {
                let label = format!("{}/{}", sub.name, file);
                out.push((label, sub.directory.join(file)));
            }
        }
        out
    }
}
