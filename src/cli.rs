//! Command-line interface for facade-ide-helper.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::{self, Config, NamespaceGrouping, DEFAULT_CONFIG_NAMES};
use crate::generator::Generator;
use crate::logging;
use crate::registry::ContainerRegistry;
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 2;

/// Config template written by `init`.
const CONFIG_TEMPLATE: &str = include_str!("templates/facade-helper.yaml");

/// Generate IDE helper stubs for PHP facades.
///
/// Scans the project sources for facade classes, resolves the service each
/// one forwards to and writes `_ide-helper.php` with a static method stub
/// for every public method of that service.
#[derive(Parser)]
#[command(name = "facade-ide-helper")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the facade helper file
    #[command(visible_alias = "app:generate-facade-helpers")]
    Generate(GenerateArgs),
    /// Create a facade-helper.yaml config from the template
    Init(InitArgs),
}

/// Arguments for the generate command.
#[derive(Parser)]
pub struct GenerateArgs {
    /// Project root (default: current directory)
    #[arg(short, long)]
    pub project_dir: Option<PathBuf>,

    /// Path to config YAML file (default: auto-discover in the project root)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Helper file to write, relative to the project root
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Open a new namespace block whenever the namespace changes instead of
    /// one block per namespace
    #[arg(long)]
    pub interleave: bool,

    /// Log skipped files and resolved facades to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "facade-helper.yaml")]
    pub output: PathBuf,
}

/// Load the config for `root`: an explicit path, a discovered file, or the
/// defaults.
fn load_config(root: &Path, explicit: Option<&Path>) -> anyhow::Result<Config> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => Config::discover(root),
    };

    match path {
        Some(p) => {
            tracing::debug!(path = %p.display(), "loading config");
            Config::parse_file(&p)
                .map_err(|e| anyhow::anyhow!("parsing config {}: {}", p.display(), e))
        }
        None => Ok(Config::default()),
    }
}

/// Run the generate command.
pub fn run_generate(args: &GenerateArgs) -> anyhow::Result<i32> {
    logging::init(args.verbose);

    // Validate format
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    // Resolve project root
    let requested = args.project_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    let root = match requested.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: cannot access project directory {:?}: {}", requested, e);
            return Ok(EXIT_ERROR);
        }
    };

    let mut config = match load_config(&root, args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    // Command-line flags override the file
    config.project_dir = Some(match (&args.project_dir, &config.project_dir) {
        (None, Some(dir)) => root.join(dir),
        _ => root,
    });
    if let Some(output) = &args.output {
        config.output = output.clone();
    }
    if args.interleave {
        config.namespace_grouping = NamespaceGrouping::Interleaved;
    }

    if let Err(e) = config::validate(&config) {
        eprintln!("Error: {}", e);
        return Ok(EXIT_ERROR);
    }

    let registry = ContainerRegistry::from_config(&config);
    let generator = Generator::new(config, registry);

    let report = match generator.run() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    match args.format.as_str() {
        "json" => report::write_json(&report)?,
        _ => report::write_pretty(&report, args.verbose),
    }

    Ok(EXIT_SUCCESS)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    // Check if output already exists
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, CONFIG_TEMPLATE) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Map your facade accessors to service classes under `services:`");
    println!("  2. Run: facade-ide-helper generate");
    if !DEFAULT_CONFIG_NAMES.iter().any(|n| args.output.ends_with(n)) {
        println!(
            "     (pass --config {} since it is not a default config name)",
            args.output.display()
        );
    }

    Ok(EXIT_SUCCESS)
}
