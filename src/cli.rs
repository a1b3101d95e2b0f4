//! Command-line interface.

use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "crosscloud", version, about = "Migrate Salesforce files into Google Drive folders")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the HTTP migration trigger.
    Serve(ServeArgs),
    /// Run one migration and print its report as JSON.
    Migrate(MigrateArgs),
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Configuration file (TOML, YAML or JSON).
    #[arg(long, short, env = "CROSSCLOUD_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
    /// Address to listen on, overriding `server.bind`.
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[derive(Debug, Args)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
    /// Only migrate files attached to records of this type, one folder per
    /// record.
    #[arg(long, alias = "sobject")]
    pub entity_type: Option<String>,
    /// Share newly created folders with this address.
    #[arg(long)]
    pub email: Option<String>,
}

impl Command {
    pub fn config(&self) -> &ConfigArgs {
        match self {
            Self::Serve(args) => &args.config,
            Self::Migrate(args) => &args.config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve() {
        let cli = Cli::try_parse_from(["crosscloud", "serve", "--config", "crosscloud.toml", "--bind", "127.0.0.1:9000"]).unwrap();
        let Command::Serve(args) = &cli.command else {
            panic!("expected serve, got {:?}", cli.command);
        };
        assert_eq!(args.bind, Some(SocketAddr::from(([127, 0, 0, 1], 9000))));
        assert_eq!(cli.command.config().config, Some(PathBuf::from("crosscloud.toml")));
    }

    #[rstest]
    #[case(&["crosscloud", "migrate"], None, None)]
    #[case(&["crosscloud", "migrate", "--entity-type", "Account"], Some("Account"), None)]
    #[case(&["crosscloud", "migrate", "--sobject", "Account", "--email", "user@x.com"], Some("Account"), Some("user@x.com"))]
    fn test_migrate(#[case] argv: &[&str], #[case] entity_type: Option<&str>, #[case] email: Option<&str>) {
        let cli = Cli::try_parse_from(argv).unwrap();
        let Command::Migrate(args) = cli.command else {
            panic!("expected migrate");
        };
        assert_eq!(args.entity_type.as_deref(), entity_type);
        assert_eq!(args.email.as_deref(), email);
    }

    #[test]
    fn test_invalid_bind() {
        assert!(Cli::try_parse_from(["crosscloud", "serve", "--bind", "nowhere"]).is_err());
    }
}
