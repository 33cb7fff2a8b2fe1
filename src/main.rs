//! Scopeweld CLI - drives the merge engine the way a host build pipeline would

use clap::{Parser, Subcommand};
use scopeweld::config::{self, WeldConfig};
use scopeweld::driver::Driver;
use scopeweld::metadata::Declaration;
use scopeweld::registry::ScopeRegistry;
use scopeweld::scanner::{Scanner, UnitInputs};
use scopeweld::{marker, ui};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "scopeweld")]
#[command(version = "0.0.1")]
#[command(about = "Build-time contribution merger for scope-partitioned dependency injection")]
#[command(long_about = r#"
Scopeweld collects DI contribution declarations across compilation units
(local metadata plus markers published by pre-compiled dependencies) and
synthesizes one merged container per scope per merge point.

Example usage:
  scopeweld generate --unit app/meta --unit lib/meta --out generated/weld
  scopeweld inspect --unit app/meta
  scopeweld markers --dir deps/markers
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan every unit, then resolve and write merged containers
    Generate {
        /// Path to the config file (default: weld.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Compilation-unit metadata directory (repeatable, scanned in order)
        #[arg(short, long)]
        unit: Vec<PathBuf>,

        /// Marker directory published by a dependency (repeatable)
        #[arg(short, long)]
        markers: Vec<PathBuf>,

        /// Root for generated container files
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Publish this build's markers into the given directory
        #[arg(long)]
        publish_markers: Option<PathBuf>,
    },

    /// Scan without writing anything and show the accumulated registry
    Inspect {
        /// Path to the config file (default: weld.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Compilation-unit metadata directory (repeatable)
        #[arg(short, long)]
        unit: Vec<PathBuf>,

        /// Marker directory published by a dependency (repeatable)
        #[arg(short, long)]
        markers: Vec<PathBuf>,
    },

    /// List marker files under a directory
    Markers {
        /// Marker directory to list
        #[arg(short, long)]
        dir: PathBuf,
    },

    /// Write a starter weld.toml
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
}

/// Effective inputs after merging the config file with CLI arguments.
/// CLI paths extend the config's; the CLI out dir wins.
struct EffectiveInputs {
    out_dir: PathBuf,
    units: Vec<PathBuf>,
    marker_dirs: Vec<PathBuf>,
    publish_markers: Option<PathBuf>,
}

fn effective_inputs(
    config_path: Option<&Path>,
    units: Vec<PathBuf>,
    marker_dirs: Vec<PathBuf>,
    out: Option<PathBuf>,
    publish_markers: Option<PathBuf>,
) -> anyhow::Result<EffectiveInputs> {
    let config = config::load_config(config_path)?.unwrap_or_else(WeldConfig::default);

    let mut all_units: Vec<PathBuf> = config.units.iter().map(PathBuf::from).collect();
    all_units.extend(units);
    if all_units.is_empty() {
        anyhow::bail!("no units to scan (pass --unit or list them in weld.toml)");
    }

    let mut all_markers: Vec<PathBuf> = config.marker_dirs.iter().map(PathBuf::from).collect();
    all_markers.extend(marker_dirs);

    let out_dir = out
        .or_else(|| config.out_dir.as_ref().map(PathBuf::from))
        .unwrap_or_else(config::default_out_dir);

    let publish_markers = publish_markers.or_else(|| config.publish_markers.as_ref().map(PathBuf::from));

    Ok(EffectiveInputs {
        out_dir,
        units: all_units,
        marker_dirs: all_markers,
        publish_markers,
    })
}

fn unit_inputs(inputs: &EffectiveInputs) -> Vec<UnitInputs> {
    inputs
        .units
        .iter()
        .map(|unit| UnitInputs {
            declarations_dir: unit.clone(),
            marker_dirs: inputs.marker_dirs.clone(),
            publish_markers_to: inputs.publish_markers.clone(),
        })
        .collect()
}

fn run_generate(inputs: EffectiveInputs) -> anyhow::Result<()> {
    let mut driver = Driver::new(&inputs.out_dir);
    for unit in unit_inputs(&inputs) {
        driver.scan_round(&unit)?;
    }

    let stats = driver.registry().stats();
    let report = driver.finalize()?;

    ui::section("Merged containers");
    for container in &report.containers {
        let note = if container.rewritten { "written" } else { "up to date" };
        ui::summary_row(note, &container.path.display().to_string());
    }
    ui::info("Scopes", &stats.scopes.to_string());
    ui::info(
        "Contributions",
        &(stats.bindings + stats.multibindings).to_string(),
    );

    if !report.is_clean() {
        ui::section("Resolution failures");
        for diagnostic in &report.diagnostics {
            ui::diagnostic(diagnostic);
        }
        anyhow::bail!("{} declaration(s) failed resolution", report.diagnostics.len());
    }

    ui::success(&format!("{} container(s) synthesized", report.containers.len()));
    Ok(())
}

fn run_inspect(inputs: EffectiveInputs) -> anyhow::Result<()> {
    let mut registry = ScopeRegistry::new();
    let mut scanner = Scanner::new(&mut registry, &inputs.out_dir);
    for unit in unit_inputs(&inputs) {
        scanner.scan_unit(&unit)?;
    }

    println!("{}", registry.stats());

    let rows: Vec<ui::ScopeRow> = registry
        .scopes()
        .into_iter()
        .map(|scope| {
            let snapshot = registry.snapshot(scope);
            ui::ScopeRow {
                scope: scope.qualified_name().to_string(),
                targets: snapshot.targets.len(),
                bindings: snapshot.bindings.len(),
                multibindings: snapshot.multibindings.len(),
                modules: snapshot.modules.len(),
                excludes: snapshot.excludes.len(),
            }
        })
        .collect();

    let table = ui::scope_table(rows);
    if table.is_empty() {
        ui::warn("no merge targets registered");
    } else {
        println!("{}", table);
    }
    Ok(())
}

fn run_markers(dir: &Path) -> anyhow::Result<()> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .collect();
    entries.sort();

    let mut found = 0;
    for path in entries {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(kind) = marker::classify_file_name(name) else {
            continue;
        };
        found += 1;
        match marker::read_marker(&path)? {
            Declaration::Contribution(record) => {
                ui::info(kind.as_str(), record.concrete_type.qualified_name());
            }
            Declaration::Module(module) => {
                ui::info(kind.as_str(), module.module_type.qualified_name());
            }
            Declaration::MergePoint { .. } => {}
        }
    }

    if found == 0 {
        ui::warn(&format!("no markers under {}", dir.display()));
    }
    Ok(())
}

fn run_init(force: bool) -> anyhow::Result<()> {
    let path = config::default_config_path();
    let config = WeldConfig {
        out_dir: Some(config::default_out_dir().display().to_string()),
        units: vec!["meta".to_string()],
        marker_dirs: vec![],
        publish_markers: None,
    };
    config::write_config(&path, &config, force)?;
    ui::success(&format!("wrote {}", path.display()));
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "scopeweld=debug" } else { "scopeweld=info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Generate {
            config,
            unit,
            markers,
            out,
            publish_markers,
        } => {
            let inputs = effective_inputs(config.as_deref(), unit, markers, out, publish_markers)?;
            run_generate(inputs)
        }
        Commands::Inspect { config, unit, markers } => {
            let inputs = effective_inputs(config.as_deref(), unit, markers, None, None)?;
            run_inspect(inputs)
        }
        Commands::Markers { dir } => run_markers(&dir),
        Commands::Init { force } => run_init(force),
    }
}
