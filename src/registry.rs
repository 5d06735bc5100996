use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use thiserror::Error;

use crate::group::Group;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Scripts root not found or not a directory: {0}")]
    RootNotFound(PathBuf),
    #[error("Unable to read scripts root {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Can't find group: {0}")]
    GroupNotFound(String),
}

/// Index of every group found directly below the scripts root
#[derive(Debug, Clone)]
pub struct Registry {
    root: PathBuf,
    groups: BTreeMap<String, Group>,
}

impl Registry {
    /// Scan `root` once, turning each immediate subdirectory into a [`Group`].
    ///
    /// Groups are registered whether or not they contain scripts or a
    /// description. Directories nested below a group are only searched for
    /// scripts by that group.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::RootNotFound` if `root` is missing or not a
    /// directory, or `RegistryError::Io` if it cannot be listed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, RegistryError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(RegistryError::RootNotFound(root));
        }
        debug!("Scanning for groups in {}", root.display());

        let entries = std::fs::read_dir(&root).map_err(|source| RegistryError::Io {
            path: root.clone(),
            source,
        })?;

        let mut dirs: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping entry in {}: {e}", root.display());
                    continue;
                }
            };
            // file_type does not follow symlinks, so linked directories are skipped
            match entry.file_type() {
                Ok(file_type) if file_type.is_dir() => dirs.push(entry.path()),
                Ok(_) => {}
                Err(e) => warn!("Unable to stat {}: {e}", entry.path().display()),
            }
        }
        dirs.sort();

        let mut groups: BTreeMap<String, Group> = BTreeMap::new();
        for dir in dirs {
            let group = Group::new(dir);
            match groups.entry(group.name().to_string()) {
                Entry::Vacant(slot) => {
                    slot.insert(group);
                }
                Entry::Occupied(existing) => warn!(
                    "Group name '{}' is ambiguous, {} shadows {}",
                    existing.key(),
                    existing.get().path().display(),
                    group.path().display()
                ),
            }
        }

        debug!("Found {} group(s)", groups.len());
        Ok(Registry { root, groups })
    }

    /// Look up a group by its exact name.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::GroupNotFound` if no group has that name.
    pub fn find_group(&self, name: &str) -> Result<&Group, RegistryError> {
        self.groups
            .get(name)
            .ok_or_else(|| RegistryError::GroupNotFound(name.to_string()))
    }

    /// All groups, ordered by name
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
