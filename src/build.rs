//! Build dispatch.
//!
//! Each [`BuildInfo`] is resolved into a [`ResolvedBuild`], serialized as a
//! single JSON object and written to the selected plugin's stdin. The plugin
//! runs inside the output directory. Builds are independent: one failing
//! target is reported and the rest still run.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

use crate::config::{BuildInfo, Copyright, License};
use crate::inspect::{InspectedOperation, inspect};
use crate::openapi::parse_openapi_spec_from_path;
use crate::plugin::{Plugin, PluginRegistry};
use crate::shell::PluginRunner;

pub const DEFAULT_OUTPUT_DIR: &str = "./output";

/// The request handed to a generator plugin.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedBuild {
    #[serde(flatten)]
    pub license: License,
    #[serde(flatten)]
    pub copyright: Copyright,
    pub kind: String,
    pub language: String,
    pub spec: String,
    pub templates: String,
    pub output: String,
    pub vars: BTreeMap<String, String>,
    pub user_agent: String,
    pub version: String,
    pub api_service_prefix: String,
    pub api_service_suffix: String,
    pub title: String,
    pub namespace: Option<String>,
    pub services: Vec<String>,
    pub operations: Vec<InspectedOperation>,
}

impl ResolvedBuild {
    pub fn resolve(info: &BuildInfo) -> crate::Result<Self> {
        if info.kind.is_empty() {
            return Err(crate::Error::Validation("build has no kind".to_string()));
        }
        if info.spec.is_empty() {
            return Err(crate::Error::Validation(format!(
                "build {} has no spec",
                info.target()
            )));
        }
        if !info.templates.is_empty() && !Path::new(&info.templates).is_dir() {
            return Err(crate::Error::Validation(format!(
                "templates directory {} does not exist",
                info.templates
            )));
        }

        let vars = info.vars.merged()?;
        let spec = parse_openapi_spec_from_path(&info.spec)?;
        let inspection = inspect(&spec)?;

        let version = if info.version.is_empty() {
            inspection.version.clone()
        } else {
            info.version.clone()
        };
        let output = if info.output.is_empty() {
            DEFAULT_OUTPUT_DIR.to_string()
        } else {
            info.output.clone()
        };

        Ok(Self {
            license: info.license.clone(),
            copyright: info.copyright.clone(),
            kind: info.kind.clone(),
            language: info.language.clone(),
            spec: info.spec.clone(),
            templates: info.templates.clone(),
            output,
            vars,
            user_agent: info.user_agent.clone(),
            version,
            api_service_prefix: info.api_service_prefix.clone(),
            api_service_suffix: info.api_service_suffix.clone(),
            title: inspection.title,
            namespace: inspection.namespace,
            services: info.service_names(&inspection.tags),
            operations: inspection.operations,
        })
    }
}

#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub plugin: Plugin,
    pub code: Option<i32>,
    pub success: bool,
    pub stderr: String,
    /// Files created or modified under the output directory.
    pub files_written: Vec<PathBuf>,
}

#[derive(Debug)]
pub struct BuildReport {
    pub target: String,
    pub result: crate::Result<BuildOutcome>,
}

impl BuildReport {
    pub fn succeeded(&self) -> bool {
        matches!(&self.result, Ok(outcome) if outcome.success)
    }
}

impl std::fmt::Display for BuildReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.result {
            Ok(outcome) => {
                let status = match outcome.code {
                    Some(code) => code.to_string(),
                    None => "signal".to_string(),
                };
                write!(
                    f,
                    "{}: {} exited with {} ({} files written)",
                    self.target,
                    outcome.plugin.path.display(),
                    status,
                    outcome.files_written.len()
                )?;
                for file in &outcome.files_written {
                    write!(f, "\n  {}", file.display())?;
                }
                if !outcome.success && !outcome.stderr.is_empty() {
                    write!(f, "\n  stderr: {}", outcome.stderr.trim_end())?;
                }
                Ok(())
            }
            Err(err) => write!(f, "{}: {}", self.target, err),
        }
    }
}

/// Selects and runs a plugin for each build target.
pub struct Dispatcher<'a> {
    registry: &'a PluginRegistry,
    runner: &'a dyn PluginRunner,
}

impl<'a> Dispatcher<'a> {
    pub fn new(registry: &'a PluginRegistry, runner: &'a dyn PluginRunner) -> Self {
        Self { registry, runner }
    }

    pub fn dispatch_all(&self, builds: &[BuildInfo]) -> Vec<BuildReport> {
        builds
            .iter()
            .map(|build| {
                let result = self.dispatch(build);
                if let Err(err) = &result {
                    log::warn!("build {} failed: {}", build.target(), err);
                }
                BuildReport {
                    target: build.target(),
                    result,
                }
            })
            .collect()
    }

    pub fn dispatch(&self, build: &BuildInfo) -> crate::Result<BuildOutcome> {
        let resolved = ResolvedBuild::resolve(build)?;
        let plugin = self.registry.find(&resolved.kind, &resolved.language)?;
        let payload = serde_json::to_vec(&resolved)
            .map_err(|e| crate::Error::Serialization(e.to_string()))?;

        let output_dir = Path::new(&resolved.output);
        fs::create_dir_all(output_dir)?;
        let before = snapshot(output_dir);

        let output = self.runner.run(plugin, &payload, output_dir)?;
        let files_written = changed_files(&before, &snapshot(output_dir));

        Ok(BuildOutcome {
            plugin: plugin.clone(),
            code: output.code,
            success: output.success,
            stderr: output.stderr,
            files_written,
        })
    }
}

fn snapshot(dir: &Path) -> HashMap<PathBuf, Option<SystemTime>> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let modified = entry.metadata().ok().and_then(|m| m.modified().ok());
            (entry.into_path(), modified)
        })
        .collect()
}

fn changed_files(
    before: &HashMap<PathBuf, Option<SystemTime>>,
    after: &HashMap<PathBuf, Option<SystemTime>>,
) -> Vec<PathBuf> {
    let mut changed: Vec<PathBuf> = after
        .iter()
        .filter(|(path, modified)| before.get(*path) != Some(*modified))
        .map(|(path, _)| path.clone())
        .collect();
    changed.sort();
    changed
}
