use clap::Parser;
use mc::{
    commands::commands,
    config::{AppConfig, Args},
    errors::{AppError, USAGE_EXIT_STATUS},
    handlers::output::{print_error, print_messages},
    services::{alias_store::AliasStore, migration::migrate_config_file},
};
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // --- Parse config ---
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // --help and --version land here too.
            let code = if err.use_stderr() { USAGE_EXIT_STATUS } else { 0 };
            let _ = err.print();
            process::exit(code);
        }
    };
    let (cfg, command) = match AppConfig::from_args(args) {
        Ok(parsed) => parsed,
        Err(err) => {
            let err = AppError::from(err);
            print_error(&err, false);
            process::exit(err.exit_code());
        }
    };

    // --- Logging setup ---
    let filter = if cfg.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting mc with config: {:?}", cfg);

    if let Err(err) = run(&cfg, command).await {
        print_error(&err, cfg.json);
        process::exit(err.exit_code());
    }
}

async fn run(cfg: &AppConfig, command: commands::Command) -> Result<(), AppError> {
    let path = cfg.config_path();

    // --- Bring legacy config files up to date ---
    migrate_config_file(&path)
        .await
        .map_err(|err| AppError::from(err).context(format!("unable to migrate `{}`", path.display())))?;

    // --- First run writes the default aliases ---
    let store = AliasStore::new(&path);
    store.load_or_init().await.map_err(|err| {
        AppError::from(err).context(format!("unable to load config `{}`", path.display()))
    })?;

    let messages = commands::dispatch(command, &store, cfg).await?;
    print_messages(messages, cfg.json)
}
