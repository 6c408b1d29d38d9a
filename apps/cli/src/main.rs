mod args;
mod settings;

use anyhow::Context;
use args::{Cli, Command};
use clap::Parser;
use keyroute_crypto::{CompositeCrypto, Crypto, load_config};
use keyroute_logger::{LevelFilter, Logger};
use settings::{LogSettings, Settings};
use std::io::{self, Write};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings: Settings =
        load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    let _logger = init_logger(&settings.log, cli.log_level)?;

    let crypto = settings.crypto.build().context("Failed to build crypto providers")?;
    tracing::debug!(providers = crypto.len(), credential = ?cli.command.name(), "Running command");

    let output = run(&crypto, cli.command)?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{output}")?;
    Ok(())
}

fn init_logger(log: &LogSettings, level: Option<LevelFilter>) -> anyhow::Result<Logger> {
    let level = match level {
        Some(level) => level,
        None => log
            .level
            .parse::<LevelFilter>()
            .with_context(|| format!("Invalid log level '{}'", log.level))?,
    };

    let mut builder = Logger::builder().name(env!("CARGO_PKG_NAME")).level(level).console(true);
    if let Some(dir) = &log.dir {
        builder = builder.path(dir.clone());
        if log.json {
            builder = builder.json();
        }
    }

    Ok(builder.init()?)
}

fn run(crypto: &CompositeCrypto, command: Command) -> anyhow::Result<String> {
    let output = match command {
        Command::Encrypt { name, text } => crypto
            .encrypt_text(&text, name.as_deref())
            .with_context(|| format!("Failed to encrypt with {}", describe(name.as_deref())))?,
        Command::Decrypt { name, text } => crypto
            .decrypt_text(&text, name.as_deref())
            .with_context(|| format!("Failed to decrypt with {}", describe(name.as_deref())))?,
        Command::Probe { name } => {
            let name = name.as_deref();
            format!("encrypt={} decrypt={}", crypto.can_encrypt(name), crypto.can_decrypt(name))
        }
    };
    Ok(output)
}

fn describe(name: Option<&str>) -> String {
    name.map_or_else(|| "the default credential".to_owned(), |n| format!("credential '{n}'"))
}
