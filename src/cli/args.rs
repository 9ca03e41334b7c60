//! CLI argument definitions using clap
//!
//! Commands:
//! - expander expand --input <file|-> [--expand <expr>] [--fields <expr>] [--config <path>]
//! - expander parse <expr>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Expand references and select fields in JSON documents
#[derive(Parser, Debug)]
#[command(name = "expander")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Expand a JSON object or array and print the result
    Expand {
        /// Input document, or "-" for stdin
        #[arg(long, default_value = "-")]
        input: PathBuf,

        /// References to expand ("*" for all)
        #[arg(long, default_value = "*")]
        expand: String,

        /// Fields to keep (empty keeps everything)
        #[arg(long, default_value = "")]
        fields: String,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Parse a selection expression and print its tree
    Parse {
        /// Expression such as "a,b(c,d)"
        expression: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_defaults() {
        let cli = Cli::try_parse_from(["expander", "expand"]).unwrap();
        match cli.command {
            Command::Expand {
                input,
                expand,
                fields,
                config,
            } => {
                assert_eq!(input, PathBuf::from("-"));
                assert_eq!(expand, "*");
                assert_eq!(fields, "");
                assert!(config.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_command() {
        let cli = Cli::try_parse_from(["expander", "parse", "a,b(c)"]).unwrap();
        assert!(matches!(cli.command, Command::Parse { expression } if expression == "a,b(c)"));
    }
}
