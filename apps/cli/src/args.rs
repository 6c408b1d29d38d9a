//! # CLI Argument Definitions

use clap::{Parser, Subcommand};
use keyroute_logger::LevelFilter;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "keyroute")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Encrypt and decrypt text with named credentials")]
pub(crate) struct Cli {
    /// Configuration file (defaults to `keyroute.*` in the working directory)
    #[arg(long, short, global = true)]
    pub(crate) config: Option<PathBuf>,

    /// Log level, overrides the config file (off, error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub(crate) log_level: Option<LevelFilter>,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Encrypt TEXT and print the Base64 ciphertext
    Encrypt {
        /// Credential name (the default credential when omitted)
        #[arg(long, short)]
        name: Option<String>,
        text: String,
    },
    /// Decrypt Base64 TEXT and print the plaintext
    Decrypt {
        /// Credential name (the default credential when omitted)
        #[arg(long, short)]
        name: Option<String>,
        text: String,
    },
    /// Report whether a credential can encrypt and decrypt
    Probe {
        /// Credential name (the default credential when omitted)
        #[arg(long, short)]
        name: Option<String>,
    },
}

impl Command {
    pub(crate) fn name(&self) -> Option<&str> {
        match self {
            Self::Encrypt { name, .. } | Self::Decrypt { name, .. } | Self::Probe { name } => {
                name.as_deref()
            }
        }
    }
}
