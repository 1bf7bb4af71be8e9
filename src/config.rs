use crate::commands::commands::Command;
use anyhow::{Context, Result};
use clap::Parser;
use std::{env, path::PathBuf};

/// Environment variable that overrides the config directory.
pub const CONFIG_DIR_ENV: &str = "MC_CONFIG_DIR";

const CONFIG_FILE_NAME: &str = "config.json";

/// Process-wide settings resolved from flags and environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub config_dir: PathBuf,
    pub json: bool,
    pub insecure: bool,
    pub debug: bool,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(name = "mc", author, version, about = "MinIO Client alias management")]
pub struct Args {
    /// Path to configuration folder (overrides MC_CONFIG_DIR)
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// Enable JSON lines formatted output
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable SSL certificate verification
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl AppConfig {
    /// Merge parsed CLI args with the environment into AppConfig and the
    /// command to run.
    pub fn from_args(args: Args) -> Result<(Self, Command)> {
        let config_dir = match args.config_dir {
            Some(dir) => dir,
            None => match env::var(CONFIG_DIR_ENV) {
                Ok(value) if !value.trim().is_empty() => PathBuf::from(value),
                Ok(_) | Err(env::VarError::NotPresent) => default_config_dir()?,
                Err(err) => return Err(err).context(format!("reading {}", CONFIG_DIR_ENV)),
            },
        };

        let cfg = Self {
            config_dir,
            json: args.json,
            insecure: args.insecure,
            debug: args.debug,
        };
        Ok((cfg, args.command))
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }
}

/// `~/.mc`, or `~/mc` on windows.
pub fn default_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("unable to determine home directory")?;
    let name = if cfg!(windows) { "mc" } else { ".mc" };
    Ok(home.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::commands::AliasCommand;

    #[test]
    fn explicit_config_dir_wins() {
        let args = Args::try_parse_from([
            "mc",
            "--config-dir",
            "/tmp/mc-test",
            "--json",
            "alias",
            "list",
        ])
        .unwrap();
        let (cfg, command) = AppConfig::from_args(args).unwrap();
        assert_eq!(cfg.config_path(), PathBuf::from("/tmp/mc-test/config.json"));
        assert!(cfg.json);
        assert!(!cfg.insecure);
        assert!(matches!(
            command,
            Command::Alias(AliasCommand::List { alias: None })
        ));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "mc",
            "alias",
            "rm",
            "myminio",
            "--insecure",
            "--config-dir",
            "/tmp/x",
        ])
        .unwrap();
        let (cfg, _) = AppConfig::from_args(args).unwrap();
        assert!(cfg.insecure);
        assert_eq!(cfg.config_dir, PathBuf::from("/tmp/x"));
    }

    #[test]
    fn default_dir_is_under_home() {
        let dir = default_config_dir().unwrap();
        assert!(dir.ends_with(if cfg!(windows) { "mc" } else { ".mc" }));
    }
}
