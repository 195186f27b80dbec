//! Board name to definition file mapping.

use crate::config::Config;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("cannot read {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("malformed manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("board file name {0} is not valid UTF-8")]
    NonUtf8Name(PathBuf),

    #[error("board '{0}' is not registered")]
    UnknownBoard(String),
}

/// Registered boards, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    boards: BTreeMap<String, PathBuf>,
}

impl Registry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a board
    pub fn insert(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.boards.insert(name.into(), path.into());
    }

    /// Build the registry described by `config`: the manifest if one is set,
    /// otherwise every `*.json` file in the input directory.
    pub fn load(config: &Config) -> Result<Self, RegistryError> {
        let registry = match &config.manifest {
            Some(manifest) => Self::from_manifest(manifest)?,
            None => Self::scan(&config.input_dir)?,
        };
        registry.restrict(&config.only)
    }

    /// Read a manifest `{"Name": "file.json", ...}`. Relative paths are
    /// resolved against the manifest's directory.
    pub fn from_manifest(path: &Path) -> Result<Self, RegistryError> {
        let bytes = fs::read(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: BTreeMap<String, PathBuf> =
            serde_json::from_slice(&bytes).map_err(|source| RegistryError::Manifest {
                path: path.to_path_buf(),
                source,
            })?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let boards = entries
            .into_iter()
            .map(|(name, file)| (name, base.join(file)))
            .collect();
        Ok(Self { boards })
    }

    /// Register every `*.json` file in `dir` under its file stem.
    pub fn scan(dir: &Path) -> Result<Self, RegistryError> {
        let io_err = |source| RegistryError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut registry = Self::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let stem = match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => stem.to_string(),
                None => return Err(RegistryError::NonUtf8Name(path)),
            };
            registry.insert(stem, path);
        }
        Ok(registry)
    }

    /// Keep only the named boards. An empty list keeps everything.
    pub fn restrict(self, names: &[String]) -> Result<Self, RegistryError> {
        if names.is_empty() {
            return Ok(self);
        }

        let mut boards = BTreeMap::new();
        for name in names {
            let path = self
                .boards
                .get(name)
                .ok_or_else(|| RegistryError::UnknownBoard(name.clone()))?;
            boards.insert(name.clone(), path.clone());
        }
        Ok(Self { boards })
    }

    /// Registered boards in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.boards.iter().map(|(n, p)| (n.as_str(), p.as_path()))
    }

    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_picks_json_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("standard.json"), "{}").unwrap();
        fs::write(dir.path().join("large.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        let registry = Registry::scan(dir.path()).unwrap();
        let names: Vec<&str> = registry.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["large", "standard"]);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_scan_refuses_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("standard.json"), "{}").unwrap();
        let odd = dir.path().join(OsStr::from_bytes(b"bad\xff.json"));
        fs::write(&odd, "{}").unwrap();

        assert!(matches!(
            Registry::scan(dir.path()),
            Err(RegistryError::NonUtf8Name(path)) if path == odd
        ));
    }

    #[test]
    fn test_manifest_paths_are_relative_to_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("boards.json");
        fs::write(&manifest, r#"{"Standard": "raw/standard.json"}"#).unwrap();

        let registry = Registry::from_manifest(&manifest).unwrap();
        let (name, path) = registry.iter().next().unwrap();
        assert_eq!(name, "Standard");
        assert_eq!(path, dir.path().join("raw/standard.json"));
    }

    #[test]
    fn test_malformed_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("boards.json");
        fs::write(&manifest, "[1, 2]").unwrap();

        assert!(matches!(
            Registry::from_manifest(&manifest),
            Err(RegistryError::Manifest { .. })
        ));
    }

    #[test]
    fn test_missing_input_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Registry::scan(&dir.path().join("nope")),
            Err(RegistryError::Io { .. })
        ));
    }

    #[test]
    fn test_restrict() {
        let mut registry = Registry::new();
        registry.insert("Standard", "a.json");
        registry.insert("Large", "b.json");

        let only = registry.clone().restrict(&["Large".to_string()]).unwrap();
        assert_eq!(only.len(), 1);

        let all = registry.clone().restrict(&[]).unwrap();
        assert_eq!(all.len(), 2);

        assert!(matches!(
            registry.restrict(&["XLarge".to_string()]),
            Err(RegistryError::UnknownBoard(name)) if name == "XLarge"
        ));
    }
}
