mod app;
mod cli;
mod error;
mod logging;
mod server;

use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use std::io::Write;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = app::load_config(cli.command.config().config.as_deref())?;
    logging::init(&config.logging)?;

    match cli.command {
        Command::Serve(args) => {
            if let Some(bind) = args.bind {
                config.server.bind = bind;
            }
            let migrator = app::migrator(&config).await?;
            server::serve(config.server.bind, migrator).await
        },
        Command::Migrate(args) => {
            let migrator = app::migrator(&config).await?;
            let grantee = args.email.as_deref().filter(|email| !email.is_empty());
            let report = match args.entity_type.as_deref().filter(|entity_type| !entity_type.is_empty()) {
                Some(entity_type) => migrator.migrate_by_entity_type(entity_type, grantee).await,
                None => migrator.migrate_all(grantee).await,
            }
            .or_raise(|| ErrorKind::Migration)?;
            let json = serde_json::to_string_pretty(&report).or_raise(|| ErrorKind::Output)?;
            writeln!(std::io::stdout().lock(), "{json}").or_raise(|| ErrorKind::Output)
        },
    }
}
