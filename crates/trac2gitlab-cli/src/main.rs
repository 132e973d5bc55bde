//! trac2gitlab - Toolbox for Trac to GitLab migrations

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "trac2gitlab")]
#[command(about = "Toolbox for Trac to GitLab migrations")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file
    #[arg(long, global = true, env = "TRAC2GITLAB_CONFIG_FILE")]
    config_file: Option<PathBuf>,

    /// Run in verbose mode
    #[arg(long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate a Trac project extract
    Migrate(MigrateArgs),

    /// Collect users from a Trac project extract
    Users {
        /// Path to the JSON project extract
        extract: PathBuf,

        /// Skip wiki authors
        #[arg(long)]
        no_wiki: bool,

        /// Skip ticket reporters, owners and commenters
        #[arg(long)]
        no_tickets: bool,

        /// Print a user mapping file skeleton
        #[arg(long)]
        template: bool,
    },

    /// List supported GitLab target versions
    Versions,

    /// Show or create configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(clap::Args)]
pub struct MigrateArgs {
    /// Path to the JSON project extract
    pub extract: PathBuf,

    /// Output directory of the target sink
    #[arg(short, long, env = "TRAC2GITLAB_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Migrate into memory only and report what would happen
    #[arg(long)]
    pub dry_run: bool,

    /// Target project id
    #[arg(long, env = "TRAC2GITLAB_PROJECT_ID")]
    pub project_id: Option<u64>,

    /// GitLab target version
    #[arg(long, env = "TRAC2GITLAB_GITLAB_VERSION")]
    pub gitlab_version: Option<String>,

    /// Target user for unmapped source users
    #[arg(long, env = "TRAC2GITLAB_FALLBACK_USER")]
    pub fallback_user: Option<String>,

    /// User mapping pair (source=target), may be repeated
    #[arg(short = 'u', long = "usermap")]
    pub usermap: Vec<String>,

    /// User mapping file, may be repeated
    #[arg(long = "usermap-file")]
    pub usermap_files: Vec<PathBuf>,

    /// Append the audit trail to this JSONL file
    #[arg(long)]
    pub audit: Option<PathBuf>,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Write a commented default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_file = cli.config_file.or_else(trac2gitlab_core::Config::default_path);

    match cli.command {
        Commands::Migrate(args) => commands::migrate(config_file.as_deref(), args, cli.json),
        Commands::Users {
            extract,
            no_wiki,
            no_tickets,
            template,
        } => commands::users(&extract, !no_wiki, !no_tickets, template, cli.json),
        Commands::Versions => commands::versions(cli.json),
        Commands::Config { command } => match command {
            Some(ConfigCommands::Show) | None => commands::config_show(config_file.as_deref(), cli.json),
            Some(ConfigCommands::Init { force }) => commands::config_init(config_file.as_deref(), force),
        },
    }
}
