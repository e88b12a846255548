//! Generator plugin discovery.
//!
//! A plugin is any executable named `openapi-gen-<kind>-<name>` found under
//! a directory of the search path, e.g. `openapi-gen-cli-typescript` is the
//! `typescript` plugin of kind `cli`.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const PLUGIN_PREFIX: &str = "openapi-gen-";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plugin {
    pub name: String,
    pub kind: String,
    pub path: PathBuf,
}

impl Plugin {
    /// Parse a file name of the form `<prefix><kind>-<name>`.
    ///
    /// Returns `None` when the prefix is missing or the remainder does not
    /// split into a non-empty kind and name.
    pub fn from_file_name(file_name: &str, prefix: &str, path: &Path) -> Option<Self> {
        let rest = file_name.strip_prefix(prefix)?;
        let (kind, name) = rest.split_once('-')?;
        if kind.is_empty() || name.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_string(),
            kind: kind.to_string(),
            path: path.to_path_buf(),
        })
    }
}

impl std::fmt::Display for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t{}\t{}", self.kind, self.name, self.path.display())
    }
}

/// Discovered plugins grouped by kind.
///
/// Built once, then only read. Each kind keeps scan order and duplicates
/// from later directories are kept behind the earlier ones.
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: BTreeMap<String, Vec<Plugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan every directory on `PATH`.
    pub fn from_env() -> Self {
        let dirs: Vec<PathBuf> = std::env::var_os("PATH")
            .map(|path| std::env::split_paths(&path).collect())
            .unwrap_or_default();
        Self::discover(&dirs, PLUGIN_PREFIX)
    }

    /// Recursively walk `search_dirs` in order and register every entry whose
    /// file name carries `prefix`.
    ///
    /// Never fails: unreadable directories and malformed names are logged and
    /// skipped.
    pub fn discover<P: AsRef<Path>>(search_dirs: &[P], prefix: &str) -> Self {
        let mut registry = Self::new();

        for dir in search_dirs {
            let dir = dir.as_ref();
            log::debug!("Scanning {} for plugins", dir.display());

            for entry in WalkDir::new(dir).sort_by_file_name() {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        log::warn!("walk error in {}: {}", dir.display(), err);
                        continue;
                    }
                };

                if entry.file_type().is_dir() {
                    continue;
                }

                let file_name = entry.file_name().to_string_lossy();
                if !file_name.starts_with(prefix) {
                    continue;
                }

                match Plugin::from_file_name(&file_name, prefix, entry.path()) {
                    Some(plugin) => {
                        log::debug!("Found {} plugin {}", plugin.kind, plugin.name);
                        registry.insert(plugin);
                    }
                    None => log::warn!(
                        "Skipping malformed plugin name {} (expected {}<kind>-<name>)",
                        entry.path().display(),
                        prefix
                    ),
                }
            }
        }

        registry
    }

    pub fn insert(&mut self, plugin: Plugin) {
        self.plugins
            .entry(plugin.kind.clone())
            .or_default()
            .push(plugin);
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }

    pub fn plugins(&self, kind: &str) -> &[Plugin] {
        self.plugins.get(kind).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.plugins.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Select the plugin for a build target.
    ///
    /// The first plugin found wins over later duplicates, as on a search path.
    /// With an empty `language` the kind must hold exactly one plugin name.
    pub fn find(&self, kind: &str, language: &str) -> crate::Result<&Plugin> {
        let candidates = self.plugins(kind);
        if candidates.is_empty() {
            return Err(crate::Error::Plugin(format!(
                "no plugins registered for kind `{}`",
                kind
            )));
        }

        if !language.is_empty() {
            return candidates
                .iter()
                .find(|plugin| plugin.name == language)
                .ok_or_else(|| {
                    crate::Error::Plugin(format!(
                        "no `{}` plugin registered for kind `{}`",
                        language, kind
                    ))
                });
        }

        let first = &candidates[0];
        if candidates.iter().all(|plugin| plugin.name == first.name) {
            Ok(first)
        } else {
            Err(crate::Error::Plugin(format!(
                "kind `{}` has several plugins, pick one with --language",
                kind
            )))
        }
    }
}
