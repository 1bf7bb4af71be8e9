//! Defines the `mc` command tree and routes each command to its handler.
//!
//! ## Structure
//! - **alias**
//!   - `set ALIAS URL [ACCESSKEY [SECRETKEY]]` (`s`)
//!   - `remove ALIAS` (`rm`)
//!   - `list [ALIAS]` (`ls`)
//!   - `import ALIAS [FILE]` (`i`)
//! - **config host** (deprecated spellings)
//!   - `add ALIAS URL [ACCESSKEY [SECRETKEY]] --lookup` (`a`)
//!   - `list [ALIAS]` (`ls`)

use crate::{
    config::AppConfig,
    errors::AppError,
    handlers::{
        alias_handlers::{self, SetAliasRequest},
        output::AliasMessage,
    },
    services::{alias_store::AliasStore, signature_probe::HttpBucketStat},
};
use clap::{Args, Subcommand};
use std::{io::IsTerminal, path::PathBuf};
use tokio::io::{self, BufReader};
use tracing::warn;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage server credentials in the configuration file
    #[command(subcommand)]
    Alias(AliasCommand),

    /// Configure the mc client (deprecated, use `alias`)
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
pub enum AliasCommand {
    /// Set a new alias to configuration file
    #[command(visible_alias = "s")]
    Set(SetArgs),

    /// Remove an alias from configuration file
    #[command(visible_alias = "rm")]
    Remove { alias: String },

    /// List aliases in configuration file
    #[command(visible_alias = "ls")]
    List { alias: Option<String> },

    /// Import configuration info to configuration file from a JSON formatted string
    #[command(visible_alias = "i")]
    Import {
        alias: String,
        /// Credentials file; standard input when omitted
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Add, list hosts in configuration file
    #[command(subcommand)]
    Host(HostCommand),
}

#[derive(Subcommand, Debug)]
pub enum HostCommand {
    /// Add a new host to configuration file
    #[command(visible_alias = "a")]
    Add(HostAddArgs),

    /// List hosts in configuration file
    #[command(visible_alias = "ls")]
    List { alias: Option<String> },
}

/// Positional endpoint arguments shared by `alias set` and `config host add`.
#[derive(Args, Debug)]
pub struct EndpointArgs {
    pub alias: String,
    pub url: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,

    /// API signature. Valid options are '[S3v4, S3v2]'
    #[arg(long, default_value = "")]
    pub api: String,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    #[command(flatten)]
    pub endpoint: EndpointArgs,

    /// Bucket path lookup supported by the server. Valid options are '[auto, on, off]'
    #[arg(long, default_value = "auto")]
    pub path: String,
}

#[derive(Args, Debug)]
pub struct HostAddArgs {
    #[command(flatten)]
    pub endpoint: EndpointArgs,

    /// Bucket lookup supported by the server. Valid options are '[dns, path, auto]'
    #[arg(long, default_value = "auto")]
    pub lookup: String,
}

impl EndpointArgs {
    fn into_request(self, path: String, deprecated: bool) -> SetAliasRequest {
        SetAliasRequest {
            alias: self.alias,
            url: self.url,
            access_key: self.access_key,
            secret_key: self.secret_key,
            api: self.api,
            path,
            deprecated,
        }
    }
}

/// Run `command` against `store` and return the messages to print.
pub async fn dispatch(
    command: Command,
    store: &AliasStore,
    cfg: &AppConfig,
) -> Result<Vec<AliasMessage>, AppError> {
    match command {
        Command::Alias(AliasCommand::Set(args)) => {
            let req = args.endpoint.into_request(args.path, false);
            set(store, cfg, req).await.map(|msg| vec![msg])
        }
        Command::Alias(AliasCommand::Remove { alias }) => {
            alias_handlers::remove_alias(store, &alias)
                .await
                .map(|msg| vec![msg])
        }
        Command::Alias(AliasCommand::List { alias }) => {
            alias_handlers::list_aliases(store, alias.as_deref(), false).await
        }
        Command::Alias(AliasCommand::Import { alias, file }) => {
            let mut stdin = io::stdin();
            alias_handlers::import_alias(store, &alias, file, &mut stdin)
                .await
                .map(|msg| vec![msg])
        }
        Command::Config(ConfigCommand::Host(HostCommand::Add(args))) => {
            warn!("`config host add` is deprecated, please use `alias set` instead");
            let req = args.endpoint.into_request(args.lookup, true);
            set(store, cfg, req).await.map(|msg| vec![msg])
        }
        Command::Config(ConfigCommand::Host(HostCommand::List { alias })) => {
            warn!("`config host list` is deprecated, please use `alias list` instead");
            alias_handlers::list_aliases(store, alias.as_deref(), true).await
        }
    }
}

async fn set(
    store: &AliasStore,
    cfg: &AppConfig,
    req: SetAliasRequest,
) -> Result<AliasMessage, AppError> {
    let stat = HttpBucketStat::new(cfg.insecure)?;
    let interactive = std::io::stdin().is_terminal();
    let mut stdin = BufReader::new(io::stdin());
    alias_handlers::set_alias(store, &stat, req, &mut stdin, interactive).await
}
