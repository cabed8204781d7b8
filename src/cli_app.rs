//! Top-level CLI definition and dispatch.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, FromArgMatches, Parser};
use thiserror::Error;

use filekeeper::core::config::{Config, write_example_config};
use filekeeper::core::context::RunContext;
use filekeeper::logger::activity::{ActivityEvent, ActivityLogger};
use filekeeper::service::systemd::{SystemdUnits, render_templates};
use filekeeper::sweep::sweeper::RetentionSweeper;

const INIT_HINT: &str = "Run 'filekeeper --init' to create a default configuration file.";

/// FileKeeper — removes files older than a specified retention period.
#[derive(Debug, Parser)]
#[command(
    name = "filekeeper",
    version = concat!("v", env!("CARGO_PKG_VERSION")),
    about = "A program to remove files older than a specified retention period",
    long_about = None
)]
pub struct Cli {
    /// Create a default configuration file (`<config>.example`).
    #[arg(long)]
    init: bool,
    /// Specify an alternative configuration file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Create systemd service and timer files.
    #[arg(long, conflicts_with = "systemd_template_only")]
    install_systemd: bool,
    /// Output systemd templates without creating files.
    #[arg(long)]
    systemd_template_only: bool,
    /// Run without actually deleting any files.
    #[arg(long)]
    dry_run: bool,
    /// Run even if disabled in the configuration.
    #[arg(long)]
    force: bool,
}

impl Cli {
    /// Invoked with no flags at all.
    const fn is_bare(&self) -> bool {
        !self.init
            && self.config.is_none()
            && !self.install_systemd
            && !self.systemd_template_only
            && !self.dry_run
            && !self.force
    }

    fn config_path(&self, ctx: &RunContext) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| ctx.config_file.clone())
    }
}

/// Errors surfaced by CLI dispatch.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input or unusable configuration.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// At least one directory policy failed structurally.
    #[error("{0}")]
    Partial(String),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Partial(_) => 4,
        }
    }
}

/// clap command with the context-dependent help footer attached.
fn command(ctx: &RunContext) -> clap::Command {
    Cli::command().after_help(help_footer(ctx))
}

fn help_footer(ctx: &RunContext) -> String {
    format!(
        "Default configuration paths:\n  - {}: {}\n\n\
         Examples:\n  \
         filekeeper --init              # Create default configuration\n  \
         filekeeper                     # Run with default configuration\n  \
         filekeeper --dry-run           # Simulate deletion without removing files\n  \
         filekeeper --install-systemd   # Install systemd service and timer\n\n\
         {INIT_HINT}",
        ctx.scope_label(),
        ctx.config_file.display()
    )
}

/// Parse process arguments, exiting on `--help`, `--version` or a usage error.
pub fn parse(ctx: &RunContext) -> Cli {
    parse_from(ctx, std::env::args_os()).unwrap_or_else(|e| e.exit())
}

fn parse_from<I, T>(ctx: &RunContext, args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command(ctx).try_get_matches_from(args)?;
    Cli::from_arg_matches(&matches)
}

/// Dispatch a parsed invocation.
pub fn run(cli: &Cli, ctx: &RunContext) -> Result<(), CliError> {
    let config_path = cli.config_path(ctx);

    if cli.is_bare() && !config_path.exists() {
        command(ctx).print_help()?;
        println!();
        return Ok(());
    }
    if cli.init {
        return run_init(&config_path, ctx);
    }
    if cli.systemd_template_only {
        print!("{}", render_templates());
        return Ok(());
    }
    if cli.install_systemd {
        return run_install_systemd(ctx);
    }
    run_sweep(cli, &config_path)
}

fn example_path(config_path: &Path) -> PathBuf {
    let mut raw = config_path.as_os_str().to_owned();
    raw.push(".example");
    PathBuf::from(raw)
}

fn run_init(config_path: &Path, ctx: &RunContext) -> Result<(), CliError> {
    let example = example_path(config_path);
    write_example_config(&example, ctx)
        .map_err(|e| CliError::Runtime(format!("Error creating example configuration: {e}")))?;
    println!("Created example configuration file: {}", example.display());
    println!(
        "Please review and rename to {} when ready.",
        config_path.display()
    );
    Ok(())
}

fn run_install_systemd(ctx: &RunContext) -> Result<(), CliError> {
    let installed = SystemdUnits::new(!ctx.is_root)
        .install(&ctx.systemd_dir)
        .map_err(|e| CliError::Runtime(format!("Error creating systemd files: {e}")))?;

    println!("Systemd files created successfully:");
    println!("  - Service: {}", installed.service_path.display());
    println!("  - Timer: {}", installed.timer_path.display());
    println!();
    println!("To activate, run:");
    for cmd in &installed.activation_commands {
        println!("  {cmd}");
    }
    Ok(())
}

fn run_sweep(cli: &Cli, config_path: &Path) -> Result<(), CliError> {
    let mut config = Config::load(config_path).map_err(|e| {
        CliError::User(format!(
            "Error loading configuration from {}: {e}\n{INIT_HINT}",
            config_path.display()
        ))
    })?;

    if !config.general.enabled && !cli.force {
        println!("Program is disabled in configuration. Use --force to run anyway.");
        return Ok(());
    }
    if cli.dry_run {
        config.security.dry_run = true;
    }

    let mut logger = ActivityLogger::from_config(&config.general.logging);
    logger.log(ActivityEvent::RunStarted {
        version: env!("CARGO_PKG_VERSION").to_string(),
        config_path: config_path.to_path_buf(),
        dry_run: config.security.dry_run,
    });
    if config.security.dry_run {
        println!("Running in dry-run mode - no files will be deleted");
    }

    let mut failed = 0usize;
    for policy in &config.directories {
        let outcome = RetentionSweeper::new(&config.security, &mut logger).sweep(policy);
        if let Err(e) = outcome {
            failed += 1;
            logger.log(ActivityEvent::PolicyFailed {
                root: policy.path.clone(),
                error_code: e.code().to_string(),
                message: e.to_string(),
            });
            eprintln!("Error processing directory {}: {e}", policy.path.display());
        }
    }

    logger.log(ActivityEvent::RunFinished {
        policies: config.directories.len(),
        failed_policies: failed,
    });
    logger.flush();

    if failed > 0 {
        return Err(CliError::Partial(format!(
            "{failed} of {} directories failed",
            config.directories.len()
        )));
    }
    Ok(())
}
