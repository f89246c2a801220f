//! Defines the command-line arguments and subcommands.
//!
//! Uses the `clap` crate with its "derive" feature for a declarative,
//! type-safe argument structure. Both subcommands claim `-h` for their
//! header argument, so the automatic help short flag is disabled there and
//! `--help` is wired up explicitly.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "headerforge",
    version,
    about = "Scans a C-family dialect and generates enum stringifiers, accessor expansions, and a JSON code index."
)]
pub struct ForgeArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate to_string and stream operators for every enum in a file.
    #[command(name = "gen-enums", disable_help_flag = true)]
    GenEnums {
        /// Input file with enum declarations.
        #[arg(short = 'i', long = "input", required = true)]
        input: PathBuf,
        /// Output source file.
        #[arg(short = 'c', long = "cpp", required = true)]
        cpp: PathBuf,
        /// Output header file.
        #[arg(short = 'h', long = "header", required = true)]
        header: PathBuf,
        /// Print help.
        #[arg(long = "help", action = ArgAction::Help)]
        help: Option<bool>,
    },
    /// Index headers into a JSON catalog of enums and classes.
    #[command(name = "index", disable_help_flag = true)]
    Index {
        /// Header to process; repeat the flag to process more than one.
        #[arg(short = 'h', long = "header", required = true)]
        headers: Vec<PathBuf>,
        /// JSON output file.
        #[arg(short = 'o', long = "output", required = true)]
        output: PathBuf,
        /// Print help.
        #[arg(long = "help", action = ArgAction::Help)]
        help: Option<bool>,
    },
}
