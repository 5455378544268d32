//! Generate CLI Command
//!
//! Resolves the generator configuration from flags, `routegen.toml` and
//! `go.mod`, runs the pipeline once and optionally keeps watching.

use crate::config::{
    detect_module_name, parse_extensions, GeneratorConfig, ProjectConfig, DEFAULT_OUTPUT_DIR,
    DEFAULT_PACKAGE, DEFAULT_ROOT, DEFAULT_WATCH_EXTENSIONS,
};
use crate::keys::KeyStrategy;
use crate::pipeline::{GenerateReport, Generator};
use crate::symbols::Selection;
use crate::watch::{WatchOptions, Watcher};
use crate::Result;
use anyhow::Context;
use clap::Args;
use colored::Colorize;
use std::env;
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Directory containing the compiled templates (default: app)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Output directory for registry.go (default: internal/registry)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Module path used in import paths (default: read from go.mod)
    #[arg(short, long)]
    pub module: Option<String>,

    /// Package name of the generated file (default: registry)
    #[arg(short, long)]
    pub package: Option<String>,

    /// Only scan the templates directly inside this sub-directory of the root
    #[arg(long)]
    pub only: Option<PathBuf>,

    /// Derive opaque keys from import path and function name
    #[arg(long)]
    pub stable_keys: bool,

    /// Regenerate whenever a watched file changes
    #[arg(short, long)]
    pub watch: bool,

    /// Comma-separated extensions that trigger regeneration (default: go,toml)
    #[arg(long)]
    pub watch_ext: Option<String>,

    /// Print the generation report as JSON
    #[arg(long)]
    pub json: bool,

    /// Configuration file (default: ./routegen.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Merge flags over the project configuration file
///
/// Returns the generator configuration and the watch extension list.
pub fn resolve_config(
    args: &GenerateArgs,
    project_root: &Path,
) -> Result<(GeneratorConfig, Vec<String>)> {
    let file = match &args.config {
        Some(path) => ProjectConfig::load_file(&project_root.join(path))?,
        None => ProjectConfig::load(project_root)?,
    };

    let module = args
        .module
        .clone()
        .or(file.module)
        .or_else(|| detect_module_name(project_root))
        .context("No module name: pass --module, set `module` in routegen.toml, or add a go.mod")?;

    let root = args
        .root
        .clone()
        .or(file.root)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT));
    let out = args
        .out
        .clone()
        .or(file.out)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    let package = args
        .package
        .clone()
        .or(file.package)
        .unwrap_or_else(|| DEFAULT_PACKAGE.to_string());

    let mut config = GeneratorConfig::new(
        project_root.join(root),
        project_root.join(out),
        module,
        package,
    );
    if args.stable_keys || file.stable_keys.unwrap_or(false) {
        config.key_strategy = KeyStrategy::Stable;
    }
    if let Some(only) = &args.only {
        config.selection = Selection::Package(only.clone());
    }

    let watch_ext = args
        .watch_ext
        .clone()
        .or(file.watch_ext)
        .unwrap_or_else(|| DEFAULT_WATCH_EXTENSIONS.to_string());

    Ok((config, parse_extensions(&watch_ext)))
}

/// Run the generate command
pub fn run(args: GenerateArgs) -> Result<()> {
    let project_root = env::current_dir()?;
    let (config, watch_ext) = resolve_config(&args, &project_root)?;
    config.validate()?;

    if !args.json {
        println!("{}", "routegen".cyan().bold());
        println!(
            "{}",
            format!("Scan root: {}", config.scan_root.display()).bright_black()
        );
        println!(
            "{}",
            format!("Module:    {}", config.module_name).bright_black()
        );
        if let Selection::Package(dir) = &config.selection {
            println!(
                "{}",
                format!("Only:      {}", dir.display()).bright_black()
            );
        }
        if config.key_strategy == KeyStrategy::Stable {
            println!("{}", "Stable keys enabled".bright_black());
        }
        println!();
    }

    let first = generate_once(&config, args.json);
    if !args.watch {
        return first;
    }
    if let Err(e) = first {
        eprintln!("{}", format!("Error: {:#}", e).red());
    }

    let scan_root = config.scan_root.canonicalize().with_context(|| {
        format!("Scan root does not exist: {}", config.scan_root.display())
    })?;
    let output_dir = config
        .output_dir
        .canonicalize()
        .unwrap_or_else(|_| config.output_dir.clone());

    let options = WatchOptions::new(&scan_root, watch_ext.clone()).ignoring(output_dir);
    println!(
        "{}",
        format!(
            "Watching {} for changes to: {}",
            scan_root.display(),
            watch_ext.join(", ")
        )
        .cyan()
    );

    let mut watcher = Watcher::new(options);
    watcher.run(|path| {
        println!(
            "{}",
            format!("Changed: {}", path.display()).bright_black()
        );
        if let Err(e) = generate_once(&config, args.json) {
            eprintln!("{}", format!("Error: {:#}", e).red());
        }
    })
}

fn generate_once(config: &GeneratorConfig, json: bool) -> Result<()> {
    let report = Generator::new(config).run()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

/// Display warnings and a summary of the generated registry
pub fn print_report(report: &GenerateReport) {
    if !report.warnings.is_empty() {
        println!(
            "{}",
            format!("{} function(s) skipped:", report.warnings.len()).yellow()
        );
        for warning in &report.warnings {
            println!("  {}", warning.format().yellow());
        }
        println!();
    }

    for entry in &report.entries {
        let data = entry
            .data
            .as_ref()
            .map(|d| format!(" [{}]", d.service_interface))
            .unwrap_or_default();
        println!(
            "  {:<32} {}{}",
            entry.route.green(),
            entry.human_name,
            data.bright_black()
        );
    }

    println!();
    println!(
        "{}",
        format!(
            "Generated {} ({} templates, {} imports)",
            report.output_path.display(),
            report.entries.len(),
            report.imports.len()
        )
        .green()
        .bold()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_defaults_with_go_mod() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("go.mod"), "module example.com/site\n").unwrap();

        let (config, watch_ext) =
            resolve_config(&GenerateArgs::default(), temp_dir.path()).unwrap();

        assert_eq!(config.scan_root, temp_dir.path().join("app"));
        assert_eq!(config.output_dir, temp_dir.path().join("internal/registry"));
        assert_eq!(config.module_name, "example.com/site");
        assert_eq!(config.package_name, "registry");
        assert_eq!(config.key_strategy, KeyStrategy::Random);
        assert_eq!(config.selection, Selection::All);
        assert_eq!(watch_ext, vec!["go", "toml"]);
    }

    #[test]
    fn test_flags_override_config_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("routegen.toml"),
            "root = \"web\"\nmodule = \"example.com/from-file\"\npackage = \"routes\"\nstable_keys = true\nwatch_ext = \"templ\"\n",
        )
        .unwrap();

        let args = GenerateArgs {
            module: Some("example.com/from-flag".to_string()),
            only: Some(PathBuf::from("users")),
            ..Default::default()
        };
        let (config, watch_ext) = resolve_config(&args, temp_dir.path()).unwrap();

        assert_eq!(config.scan_root, temp_dir.path().join("web"));
        assert_eq!(config.module_name, "example.com/from-flag");
        assert_eq!(config.package_name, "routes");
        assert_eq!(config.key_strategy, KeyStrategy::Stable);
        assert_eq!(config.selection, Selection::Package(PathBuf::from("users")));
        assert_eq!(watch_ext, vec!["templ"]);
    }

    #[test]
    fn test_missing_module_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = resolve_config(&GenerateArgs::default(), temp_dir.path());
        assert!(result.is_err());
    }
}
