use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(name = "pylet")]
#[clap(version, about = "Workspace-scoped, time-bounded script execution")]
#[clap(propagate_version = true)]
pub struct Cli {
    #[clap(flatten)]
    pub global_opts: GlobalOpts,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct GlobalOpts {
    /// Configuration file path
    #[clap(short, long, global = true, env = "PYLET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Workspace root directory (defaults to the current directory)
    #[clap(short, long, global = true, env = "PYLET_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format
    #[clap(long, global = true, default_value = "text", value_enum)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute code as a script in the workspace scratch directory
    Exec(ExecArgs),

    /// Initialize a new pylet configuration
    Init(InitArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Inline code to execute
    #[clap(short = 'e', long = "code", conflicts_with = "file")]
    pub code: Option<String>,

    /// Read code from a file, or from stdin with '-'
    #[clap(short, long)]
    pub file: Option<PathBuf>,

    /// Logical script name (".py" appended when missing; generated if absent)
    #[clap(short, long)]
    pub name: Option<String>,

    /// Timeout in seconds (values above the configured cap are clamped)
    #[clap(short, long)]
    pub timeout: Option<i64>,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Force overwrite existing configuration
    #[clap(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[clap(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Show configuration file path
    Path,
}

#[derive(Debug, Clone, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
