use crate::render::DiffFormat;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "fman",
    about = "Interactive command-line file manager",
    version,
    after_help = "Without a command an interactive shell starts; type `help` there for the command list."
)]
pub struct Cli {
    /// Config file [default: <config dir>/fman/config.toml]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory to start in
    #[arg(short = 'C', long, value_name = "DIR")]
    pub start_dir: Option<PathBuf>,

    /// Disable colored diff output
    #[arg(long)]
    pub no_color: bool,

    /// Output format of `diff`
    #[arg(long, value_enum)]
    pub format: Option<DiffFormat>,

    /// Log debug output to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Run a single shell command and exit, e.g. `fman diff old.txt new.txt`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}
