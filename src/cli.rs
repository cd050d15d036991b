use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mython")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Mython language interpreter", long_about = None)]
pub struct Args {
    /// Program file; the program is read from stdin when absent
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Program text passed inline
    #[arg(short = 'e', long = "eval", value_name = "SOURCE", conflicts_with = "file")]
    pub eval: Option<String>,

    /// Dump the token stream instead of executing
    #[arg(long = "tokens")]
    pub tokens: bool,

    /// When to colorize diagnostics
    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a completion script for the given shell
    Complete {
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

pub fn generate_completions(shell: Shell) {
    let mut command = Args::command();
    generate(shell, &mut command, "mython", &mut io::stdout());
}
