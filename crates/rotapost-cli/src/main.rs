mod cmd;
mod output;
mod pacer;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "rotapost",
    about = "Rotate content across posting destinations on a bi-weekly calendar",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .rotapost/)
    #[arg(long, global = true, env = "ROTAPOST_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Log filter, e.g. `debug` or `rotapost_core=trace` (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// How posts are delivered for `run` and `post`.
#[derive(clap::Args, Clone, Debug, Default)]
pub struct ExecArgs {
    /// Log requests instead of posting; nothing is recorded
    #[arg(long)]
    pub dry_run: bool,

    /// Program that receives each request as JSON on stdin
    #[arg(long, value_name = "PROGRAM")]
    pub exec: Option<PathBuf>,

    /// Extra arguments passed to the executor program
    #[arg(long = "exec-arg", value_name = "ARG")]
    pub exec_args: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .rotapost/ with sample configuration
    Init,

    /// Run today's posting cycle
    Run {
        #[command(flatten)]
        exec: ExecArgs,

        /// Only serve the page slot
        #[arg(long)]
        page_only: bool,

        /// Do not wait between posts
        #[arg(long)]
        no_delay: bool,
    },

    /// Show posting statistics and pause state
    Status,

    /// Preview today's plan without posting
    Generate {
        /// Plan for this date instead of today (YYYY-MM-DD)
        #[arg(long)]
        date: Option<chrono::NaiveDate>,
    },

    /// Post to one destination now, ignoring the schedule
    Post {
        /// Destination id
        id: String,

        #[command(flatten)]
        exec: ExecArgs,
    },

    /// Stop future runs until `rotapost resume`
    Pause {
        /// Why posting is paused
        reason: Vec<String>,
    },

    /// Remove the pause marker
    Resume,

    /// Validate the configuration files
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Run { .. } | Commands::Post { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };
    let filter = match &cli.log_level {
        Some(directives) => tracing_subscriber::EnvFilter::new(directives),
        None => tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Run {
            exec,
            page_only,
            no_delay,
        } => cmd::run::run(&root, &exec, page_only, no_delay, cli.json),
        Commands::Status => cmd::status::run(&root, cli.json),
        Commands::Generate { date } => cmd::generate::run(&root, date, cli.json),
        Commands::Post { id, exec } => cmd::post::run(&root, &id, &exec, cli.json),
        Commands::Pause { reason } => cmd::pause::pause(&root, &reason.join(" ")),
        Commands::Resume => cmd::pause::resume(&root),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
