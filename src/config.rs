//! Build request model.
//!
//! A [`Config`] document describes one or more [`BuildInfo`] targets. It can
//! be written as YAML or JSON; license, copyright and vars fields sit inline
//! next to the other keys:
//!
//! ```yaml
//! license_name: MIT
//! copyright_text: (c) Example Corp
//! build:
//!   - kind: cli
//!     language: go
//!     spec: petstore.yaml
//!     output: out/go
//!     vars_values:
//!       package: petstore
//!     vars_files: [defaults.yaml]
//! ```
//!
//! Var values may be any scalar and are passed to plugins as strings.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Read a JSON (`.json`) or YAML (anything else) document from disk.
pub fn load_document<T: DeserializeOwned>(path: impl AsRef<Path>) -> crate::Result<T> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        crate::Error::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;

    if path.extension().and_then(|s| s.to_str()) == Some("json") {
        serde_json::from_str(&content).map_err(|e| {
            crate::Error::Parse(format!("Failed to parse JSON {}: {}", path.display(), e))
        })
    } else {
        serde_yaml::from_str(&content).map_err(|e| {
            crate::Error::Parse(format!("Failed to parse YAML {}: {}", path.display(), e))
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct License {
    pub license_name: String,
    pub license_text: String,
    pub license_file: String,
}

impl License {
    pub fn is_empty(&self) -> bool {
        self.license_name.is_empty() && self.license_text.is_empty() && self.license_file.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Copyright {
    pub copyright_text: String,
    pub copyright_file: String,
}

impl Copyright {
    pub fn is_empty(&self) -> bool {
        self.copyright_text.is_empty() && self.copyright_file.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vars {
    #[serde(deserialize_with = "deserialize_vars")]
    pub vars_values: BTreeMap<String, String>,
    pub vars_files: Vec<String>,
}

impl Vars {
    /// Merge every vars file in listed order, later files overriding earlier
    /// ones, then apply `vars_values` on top.
    pub fn merged(&self) -> crate::Result<BTreeMap<String, String>> {
        let mut merged = BTreeMap::new();
        for file in &self.vars_files {
            let raw: BTreeMap<String, serde_yaml::Value> = load_document(file)?;
            let values = scalar_strings(raw)
                .map_err(|e| crate::Error::Parse(format!("Invalid vars file {}: {}", file, e)))?;
            log::debug!("Loaded {} vars from {}", values.len(), file);
            merged.extend(values);
        }
        merged.extend(
            self.vars_values
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        Ok(merged)
    }
}

/// Vars are strings; numbers, booleans and null are accepted and rendered
/// as text (`null` becomes empty). Nested values are rejected.
fn scalar_strings(
    raw: BTreeMap<String, serde_yaml::Value>,
) -> Result<BTreeMap<String, String>, String> {
    raw.into_iter()
        .map(|(key, value)| {
            let text = match value {
                serde_yaml::Value::String(text) => text,
                serde_yaml::Value::Number(number) => number.to_string(),
                serde_yaml::Value::Bool(flag) => flag.to_string(),
                serde_yaml::Value::Null => String::new(),
                _ => return Err(format!("`{}` must be a scalar", key)),
            };
            Ok((key, text))
        })
        .collect()
}

fn deserialize_vars<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, serde_yaml::Value>::deserialize(deserializer)?;
    scalar_strings(raw).map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildInfo {
    #[serde(flatten)]
    pub license: License,
    #[serde(flatten)]
    pub copyright: Copyright,
    pub kind: String,
    pub spec: String,
    #[serde(flatten)]
    pub vars: Vars,
    pub output: String,
    pub language: String,
    pub templates: String,
    pub user_agent: String,
    pub version: String,
    pub api_service_prefix: String,
    pub api_service_suffix: String,
}

impl BuildInfo {
    /// Short `kind/language` label used in reports.
    pub fn target(&self) -> String {
        if self.language.is_empty() {
            self.kind.clone()
        } else {
            format!("{}/{}", self.kind, self.language)
        }
    }

    /// Replace fields with the non-empty ones of `overrides`. Vars are
    /// extended rather than replaced.
    pub fn apply_overrides(&mut self, overrides: &BuildInfo) {
        fn set(target: &mut String, value: &str) {
            if !value.is_empty() {
                *target = value.to_string();
            }
        }

        if !overrides.license.is_empty() {
            self.license = overrides.license.clone();
        }
        if !overrides.copyright.is_empty() {
            self.copyright = overrides.copyright.clone();
        }
        set(&mut self.kind, &overrides.kind);
        set(&mut self.spec, &overrides.spec);
        set(&mut self.output, &overrides.output);
        set(&mut self.language, &overrides.language);
        set(&mut self.templates, &overrides.templates);
        set(&mut self.user_agent, &overrides.user_agent);
        set(&mut self.version, &overrides.version);
        set(&mut self.api_service_prefix, &overrides.api_service_prefix);
        set(&mut self.api_service_suffix, &overrides.api_service_suffix);

        self.vars
            .vars_files
            .extend(overrides.vars.vars_files.iter().cloned());
        self.vars.vars_values.extend(
            overrides
                .vars
                .vars_values
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
    }

    /// Services generated for `tags`, named `<prefix><Tag><suffix>`.
    pub fn service_names<'a>(&self, tags: impl IntoIterator<Item = &'a String>) -> Vec<String> {
        tags.into_iter()
            .map(|tag| {
                format!(
                    "{}{}{}",
                    self.api_service_prefix,
                    crate::case::to_pascal(tag),
                    self.api_service_suffix
                )
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(flatten)]
    pub license: License,
    #[serde(flatten)]
    pub copyright: Copyright,
    pub build: Vec<BuildInfo>,
}

impl Config {
    pub fn from_path(path: impl AsRef<Path>) -> crate::Result<Self> {
        load_document(path)
    }

    /// Every build target, with the top-level license and copyright filled
    /// in where a target leaves its own empty.
    pub fn builds(&self) -> Vec<BuildInfo> {
        self.build
            .iter()
            .map(|build| {
                let mut build = build.clone();
                if build.license.is_empty() {
                    build.license = self.license.clone();
                }
                if build.copyright.is_empty() {
                    build.copyright = self.copyright.clone();
                }
                build
            })
            .collect()
    }
}
