//! Command-line interface definition.
//!
//! - `peco plan` - print the bundler plan(s) as JSON
//! - `peco sw` - write `sw-events.js` and print the service-worker plan
//! - `peco serve` - serve a generated site directory

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use peco_plan::{Mode, Target};

/// Peco - build plans for a static site generator
#[derive(Parser, Debug)]
#[command(name = "peco", version, about = "Compile and inspect peco bundler plans")]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the bundler plan for one or both targets
    Plan(PlanArgs),

    /// Write the service-worker event script and print the generation plan
    Sw(SwArgs),

    /// Serve a generated site directory
    Serve(ServeArgs),
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum ModeArg {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "production", alias = "prod")]
    Production,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Development => Mode::Development,
            ModeArg::Production => Mode::Production,
        }
    }
}

/// Which half of the build to plan
#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum TargetArg {
    Client,
    Server,
    /// Client then server, printed as a JSON array
    Both,
}

impl TargetArg {
    pub fn targets(self) -> Vec<Target> {
        match self {
            TargetArg::Client => vec![Target::Client],
            TargetArg::Server => vec![Target::Server],
            TargetArg::Both => vec![Target::Client, Target::Server],
        }
    }
}

/// Options shared by commands that read a project
#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Project directory containing peco.toml
    #[arg(short = 'C', long = "dir", default_value = ".")]
    pub dir: PathBuf,

    /// Build mode
    #[arg(short, long, value_enum, default_value = "development")]
    pub mode: ModeArg,
}

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Target to plan
    #[arg(short, long, value_enum, default_value = "both")]
    pub target: TargetArg,

    /// Extra module and loader search directory (repeatable)
    #[arg(long = "module-dir", value_name = "DIR")]
    pub module_dirs: Vec<PathBuf>,

    /// Keep the minimizer off in production client builds
    #[arg(long)]
    pub no_minimize: bool,

    /// Leave out the progress bar plugin
    #[arg(long)]
    pub no_progress: bool,

    /// Ask the progress bar to profile loaders
    #[arg(long)]
    pub profile: bool,

    /// Report warnings and mention the query playground
    #[arg(long)]
    pub debug: bool,

    /// Development server port reported when a build is ready
    #[arg(short, long, default_value_t = 4000)]
    pub port: u16,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SwArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Only print the plan; do not write sw-events.js
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Project directory containing peco.toml
    #[arg(short = 'C', long = "dir", default_value = ".")]
    pub dir: PathBuf,

    /// Directory to serve (defaults to <dir>/.peco/website)
    pub root: Option<PathBuf>,

    /// Server mode; the service-worker stand-in is only mounted while developing
    #[arg(short, long, value_enum, default_value = "development")]
    pub mode: ModeArg,

    /// Port to listen on
    #[arg(short, long, default_value_t = 4000)]
    pub port: u16,
}
