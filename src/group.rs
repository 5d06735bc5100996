use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;
use thiserror::Error;
use walkdir::WalkDir;

use crate::name::to_name;

/// File inside a group directory whose first line describes the group
pub const DESCRIPTION_FILE: &str = "README.md";

static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*#{1,6}(?:\s+(?P<text>.*?))?\s*$").expect("heading pattern is valid")
});

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GroupError {
    #[error("Can't find script: {0}")]
    ScriptNotFound(String),
}

/// A named collection of scripts discovered below one directory
#[derive(Debug, Clone, Default)]
pub struct Group {
    name: String,
    path: PathBuf,
    description: String,
    scripts: Vec<PathBuf>,
}

impl Group {
    /// Build a group from a directory, reading its description and collecting
    /// every executable file beneath it.
    ///
    /// Missing descriptions or unreadable entries never fail construction.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let description = read_description(&path);
        let scripts = collect_scripts(&path);
        debug!(
            "Group '{}' at {}: {} script(s)",
            name,
            path.display(),
            scripts.len()
        );
        warn_on_collisions(&name, &scripts);
        Group {
            name,
            path,
            description,
            scripts,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Script paths, sorted by path
    #[must_use]
    pub fn scripts(&self) -> &[PathBuf] {
        &self.scripts
    }

    /// Resolve a script name (file name without extension) to its path.
    ///
    /// # Errors
    ///
    /// Returns `GroupError::ScriptNotFound` if no script resolves to `script_name`.
    pub fn find_script(&self, script_name: &str) -> Result<&Path, GroupError> {
        self.scripts
            .iter()
            .find(|script| to_name(script) == script_name)
            .map(PathBuf::as_path)
            .ok_or_else(|| GroupError::ScriptNotFound(script_name.to_string()))
    }
}

/// Extract the one-line summary of a group from its description file.
fn read_description(dir: &Path) -> String {
    let readme = dir.join(DESCRIPTION_FILE);
    match std::fs::read_to_string(&readme) {
        Ok(contents) => parse_description(&contents),
        Err(e) => {
            debug!("No description for {}: {e}", dir.display());
            String::new()
        }
    }
}

/// First line of `contents`, with a leading markdown heading marker removed.
pub(crate) fn parse_description(contents: &str) -> String {
    let contents = contents.strip_prefix('\u{feff}').unwrap_or(contents);
    let Some(first) = contents.lines().next() else {
        return String::new();
    };
    match HEADING.captures(first) {
        Some(caps) => caps
            .name("text")
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
        None => first.trim().to_string(),
    }
}

fn collect_scripts(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping entry under {}: {e}", dir.display());
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| match entry.metadata() {
            Ok(metadata) => is_executable(&metadata),
            Err(e) => {
                warn!("Unable to stat {}: {e}", entry.path().display());
                false
            }
        })
        .map(walkdir::DirEntry::into_path)
        .collect()
}

#[cfg(unix)]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &std::fs::Metadata) -> bool {
    true
}

fn warn_on_collisions(group: &str, scripts: &[PathBuf]) {
    let mut seen: HashMap<String, &Path> = HashMap::new();
    for script in scripts {
        let name = to_name(script);
        if let Some(first) = seen.get(&name) {
            warn!(
                "Group '{group}': script name '{name}' is ambiguous, {} shadows {}",
                first.display(),
                script.display()
            );
        } else {
            seen.insert(name, script);
        }
    }
}
