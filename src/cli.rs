use clap::{Arg, ArgAction, ArgMatches, Command};
use std::io::Write;
use std::path::PathBuf;

use crate::build::Dispatcher;
use crate::config::{BuildInfo, Config};
use crate::inspect::inspect;
use crate::openapi::parse_openapi_spec_from_path;
use crate::plugin::PluginRegistry;
use crate::shell::{NativeRunner, PluginRunner};

pub fn build_cli() -> Command {
    Command::new("openapi-gen")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Discover OpenAPI generator plugins and drive code generation")
        .subcommand_negates_reqs(true)
        .arg(
            Arg::new("spec")
                .value_name("SPEC")
                .help("Path to the OpenAPI specification to inspect")
                .required(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Increase log output (-v info, -vv debug)"),
        )
        .subcommand(list_command())
        .subcommand(build_command())
}

fn list_command() -> Command {
    Command::new("list")
        .about("List discovered generator plugins")
        .arg(
            Arg::new("cli")
                .long("cli")
                .action(ArgAction::SetTrue)
                .help("list cli generators"),
        )
        .arg(
            Arg::new("lib")
                .long("lib")
                .action(ArgAction::SetTrue)
                .help("list lib templates"),
        )
        .arg(
            Arg::new("all")
                .long("all")
                .action(ArgAction::SetTrue)
                .help("list all generators"),
        )
}

fn list_arg(id: &'static str, short: char, help: &'static str) -> Arg {
    Arg::new(id)
        .short(short)
        .long(id)
        .value_name("LIST")
        .value_delimiter(',')
        .action(ArgAction::Append)
        .help(help)
}

fn build_command() -> Command {
    Command::new("build")
        .about("Run generator plugins for one or more build targets")
        .arg(
            Arg::new("kind")
                .short('k')
                .long("kind")
                .value_name("KIND")
                .help("Plugin kind, e.g. cli or lib"),
        )
        .arg(
            Arg::new("language")
                .short('l')
                .long("language")
                .value_name("LANGUAGE")
                .help("Target language, selects the plugin within the kind"),
        )
        .arg(
            Arg::new("spec")
                .short('s')
                .long("spec")
                .value_name("FILE")
                .help("Path to the OpenAPI specification"),
        )
        .arg(
            Arg::new("var")
                .short('R')
                .long("var")
                .value_name("KEY=VALUE")
                .value_parser(parse_var)
                .action(ArgAction::Append)
                .help("Template variable, overrides values from vars files"),
        )
        .arg(
            Arg::new("vars-file")
                .short('F')
                .long("vars-file")
                .value_name("FILE")
                .action(ArgAction::Append)
                .help("YAML or JSON file of template variables"),
        )
        .arg(
            Arg::new("templates")
                .short('T')
                .long("templates")
                .value_name("DIR")
                .help("Template directory handed to the plugin"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Output directory for generated code [default: ./output]"),
        )
        .arg(list_arg("except", 'E', "Skip targets with these languages"))
        .arg(list_arg("only", 'O', "Only build targets with these languages"))
        .arg(list_arg("skip", 'S', "Skip targets of these kinds"))
        .arg(
            Arg::new("from-file")
                .short('f')
                .long("from-file")
                .value_name("FILE")
                .help("Build configuration file (YAML or JSON)"),
        )
}

fn parse_var(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{}`", s)),
    }
}

/// Highest `-v` count given at any level of the command line.
pub fn verbosity(matches: &ArgMatches) -> u8 {
    let sub = matches
        .subcommand()
        .map(|(_, sub)| sub.get_count("verbose"))
        .unwrap_or(0);
    sub.max(matches.get_count("verbose"))
}

#[derive(Debug, Default)]
pub struct BuildOptions {
    /// Flags applied on top of every build target.
    pub overrides: BuildInfo,
    pub from_file: Option<PathBuf>,
    pub only: Vec<String>,
    pub except: Vec<String>,
    pub skip: Vec<String>,
}

impl BuildOptions {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        let string = |id: &str| matches.get_one::<String>(id).cloned().unwrap_or_default();
        let strings = |id: &str| -> Vec<String> {
            matches
                .get_many::<String>(id)
                .map(|values| values.cloned().collect())
                .unwrap_or_default()
        };

        let mut overrides = BuildInfo {
            kind: string("kind"),
            language: string("language"),
            spec: string("spec"),
            templates: string("templates"),
            output: string("output"),
            ..Default::default()
        };
        overrides.vars.vars_files = strings("vars-file");
        if let Some(vars) = matches.get_many::<(String, String)>("var") {
            overrides.vars.vars_values.extend(vars.cloned());
        }

        Self {
            overrides,
            from_file: matches.get_one::<String>("from-file").map(PathBuf::from),
            only: strings("only"),
            except: strings("except"),
            skip: strings("skip"),
        }
    }

    /// The build targets to run, after overrides and filters.
    pub fn targets(&self) -> crate::Result<Vec<BuildInfo>> {
        let builds = match &self.from_file {
            Some(path) => {
                let mut builds = Config::from_path(path)?.builds();
                for build in &mut builds {
                    build.apply_overrides(&self.overrides);
                }
                builds
            }
            None if self.overrides.kind.is_empty() => {
                return Err(crate::Error::Validation(
                    "build needs --kind or --from-file".to_string(),
                ));
            }
            None => vec![self.overrides.clone()],
        };

        let selected: Vec<BuildInfo> = builds
            .into_iter()
            .filter(|build| self.only.is_empty() || self.only.contains(&build.language))
            .filter(|build| !self.except.contains(&build.language))
            .filter(|build| !self.skip.contains(&build.kind))
            .collect();

        if selected.is_empty() {
            log::warn!("no build targets left after filtering");
        }
        Ok(selected)
    }
}

pub fn run(matches: &ArgMatches, registry: &PluginRegistry) -> crate::Result<()> {
    let mut stdout = std::io::stdout().lock();
    match matches.subcommand() {
        Some(("list", sub)) => run_list(sub, registry, &mut stdout),
        Some(("build", sub)) => run_build(sub, registry, &NativeRunner, &mut stdout),
        _ => {
            let spec = matches
                .get_one::<String>("spec")
                .ok_or_else(|| crate::Error::Validation("no spec given".to_string()))?;
            run_inspect(spec, &mut stdout)
        }
    }
}

pub fn run_inspect<W: Write>(spec: &str, out: &mut W) -> crate::Result<()> {
    let spec = parse_openapi_spec_from_path(spec)?;
    let inspection = inspect(&spec)?;
    inspection.write_report(out)?;
    Ok(())
}

pub fn run_list<W: Write>(
    matches: &ArgMatches,
    registry: &PluginRegistry,
    out: &mut W,
) -> crate::Result<()> {
    let mut wanted = Vec::new();
    if matches.get_flag("cli") {
        wanted.push("cli");
    }
    if matches.get_flag("lib") {
        wanted.push("lib");
    }
    let everything = matches.get_flag("all") || wanted.is_empty();

    if registry.is_empty() {
        log::info!("no generator plugins found");
    }
    for kind in registry.kinds() {
        if !everything && !wanted.contains(&kind) {
            continue;
        }
        for plugin in registry.plugins(kind) {
            writeln!(out, "{}", plugin)?;
        }
    }
    Ok(())
}

pub fn run_build<W: Write>(
    matches: &ArgMatches,
    registry: &PluginRegistry,
    runner: &dyn PluginRunner,
    out: &mut W,
) -> crate::Result<()> {
    let builds = BuildOptions::from_matches(matches).targets()?;
    let reports = Dispatcher::new(registry, runner).dispatch_all(&builds);

    for report in &reports {
        writeln!(out, "{}", report)?;
    }

    let failed = reports.iter().filter(|report| !report.succeeded()).count();
    if failed > 0 {
        return Err(crate::Error::Plugin(format!(
            "{} of {} builds failed",
            failed,
            reports.len()
        )));
    }
    Ok(())
}
