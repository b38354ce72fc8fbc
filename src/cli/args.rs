//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Canonical, diff-stable XML normalization
#[derive(Parser, Debug)]
#[command(name = "xmlnorm")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-d, -dd, -ddd)
    #[arg(short = 'd', long = "debug", action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Normalize one XML file (stdout unless -o is given)
    Normalize {
        /// Input XML file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Write result here instead of stdout (overwrites)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,

        /// TOML rules file (ignore set + sort forest)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        rules: Option<PathBuf>,
    },

    /// Normalize every matching file under a directory, in place
    Batch {
        /// Directory to walk
        #[arg(value_hint = ValueHint::DirPath)]
        dir: PathBuf,

        /// TOML rules file (ignore set + sort forest)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        rules: Option<PathBuf>,

        /// File extension to match
        #[arg(long, default_value = "xml")]
        ext: String,
    },

    /// Exit non-zero if a file is not already in canonical form
    Check {
        /// Input XML file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// TOML rules file (ignore set + sort forest)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        rules: Option<PathBuf>,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
