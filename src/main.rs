/// The Big IDEA:
/// A MyBatis project ends up with one mapper interface per table and
/// a service class per mapper that does nothing but forward every
/// call to it. Writing those forwarding classes by hand is tedious
/// and they drift out of date as soon as a mapper gains a method.
/// msbl reads the mapper interfaces and writes the delegating
/// service classes for you, merging mappers that belong to the
/// same table (`UserMapper`, `UserExtMapper`) into one service.
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{debug, error};
use std::path::PathBuf;
use std::process::ExitCode;

use msbl::builders::reporter::{ConsoleReporter, StatusReporter};
use msbl::core::config::{ConfigManager, ConfigProvider};
use msbl::core::engine::{BuildRequest, GenerateEngine};
use msbl::core::error::MsblError;
use msbl::utils;

#[derive(Parser)]
#[command(name = "msbl")]
#[command(about = "Generates delegating service classes from mapper interfaces")]
struct Cli {
    /// Project directory (default: the current directory)
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    /// Source file encoding
    #[arg(short, long, global = true)]
    encoding: Option<String>,

    /// Config file, relative to the current directory
    #[arg(short, long, global = true)]
    config_path: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); falls back to RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Fail when a mapper's package or interface declaration is not found
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default msbl.config.yml into the project
    Init,
    /// Generate merged service classes from the configured mappers
    #[command(alias = "g")]
    Generate {
        /// Overwrite existing files and create directories without asking
        #[arg(short, long)]
        force: bool,
    },
    /// Rewrite every mapper of one directory into another, one class per mapper
    Build {
        /// Directory holding the mapper interfaces
        #[arg(long)]
        from: PathBuf,
        /// Existing directory the service classes are written to
        #[arg(long)]
        to: PathBuf,
        /// Class name suffix of the sources (default: last package segment)
        #[arg(long)]
        source_suffix: Option<String>,
        /// Class name suffix of the targets (default: last package segment)
        #[arg(long)]
        target_suffix: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    utils::init_logger(cli.log_level.as_deref());

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<MsblError>() {
                Some(msbl_error) => {
                    error!("{msbl_error}");
                    debug!("{err:?}");
                }
                None => error!("{err:?}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let project_dir = match cli.project {
        Some(project) if project.is_absolute() => project,
        Some(project) => std::env::current_dir()?.join(project),
        None => std::env::current_dir()?,
    };
    let config_manager = ConfigManager::new(project_dir.clone(), cli.config_path)?;

    match cli.command {
        Commands::Init => {
            let path = config_manager.get_config_path()?;
            if config_manager.initialize()? {
                println!("✓ Created {}", path.display());
            } else {
                println!("✓ {} already exists", path.display());
            }
            println!("Edit it, then run 'msbl generate'");
            Ok(())
        }
        Commands::Generate { force } => {
            let mut config = config_manager.load_validated()?;
            if let Some(encoding) = cli.encoding {
                config.global.encoding = encoding;
            }
            check_encoding(&config.global.encoding)?;

            let settings = config
                .generate
                .ok_or_else(|| MsblError::bad_config("no generate section in config file."))?;
            let force = force || settings.force;

            let engine = GenerateEngine::new(project_dir, config.global.rewrite_options())
                .with_strict(cli.strict);
            let report = engine.generate(&settings, force)?;
            ConsoleReporter::new().generate_status_report(&report)
        }
        Commands::Build {
            from,
            to,
            source_suffix,
            target_suffix,
        } => {
            let mut config = config_manager.load_or_default()?;
            if let Some(encoding) = cli.encoding {
                config.global.encoding = encoding;
            }
            check_encoding(&config.global.encoding)?;

            let engine = GenerateEngine::new(project_dir, config.global.rewrite_options())
                .with_strict(cli.strict);
            let report = engine.build(&BuildRequest {
                from,
                to,
                source_suffix,
                target_suffix,
            })?;
            ConsoleReporter::new().generate_status_report(&report)
        }
    }
}

fn check_encoding(encoding: &str) -> Result<()> {
    if encoding.eq_ignore_ascii_case("utf-8") || encoding.eq_ignore_ascii_case("utf8") {
        Ok(())
    } else {
        Err(MsblError::bad_argument(format!("unsupported encoding {encoding}.")).into())
    }
}
