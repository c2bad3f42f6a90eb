//! CLI entry point - the composition root.
//!
//! Command dispatch routes to handlers, which receive the composed
//! `CliContext` and never open stores themselves.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use qsync_cli::{
    BankCommand, CategoryCommand, Cli, CliConfig, CliError, Commands, SheetCommand, bootstrap,
    handlers,
};
use qsync_core::paths::env_file_path;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();
}

#[tokio::main]
async fn main() {
    // `.env` in the working directory first, then the one in the data root
    dotenvy::dotenv().ok();
    if let Ok(path) = env_file_path() {
        dotenvy::from_path(path).ok();
    }

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        std::process::exit(CliError::exit_code_of(&err));
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command.as_ref() else {
        Cli::command().print_help()?;
        return Ok(());
    };

    if matches!(command, Commands::Paths) {
        handlers::paths::execute()?;
        return Ok(());
    }

    let config = CliConfig::from_cli(&cli)?;
    let ctx = bootstrap(config).await?;

    match cli.command {
        None | Some(Commands::Paths) => {}
        Some(Commands::Bank {
            command: BankCommand::List { refresh },
        }) => handlers::catalog::list_banks(&ctx, refresh).await?,
        Some(Commands::Category {
            command: CategoryCommand::List { bank, refresh },
        }) => handlers::catalog::list_categories(&ctx, &bank, refresh).await?,
        Some(Commands::Sheet {
            command:
                SheetCommand::List {
                    bank,
                    category,
                    refresh,
                },
        }) => handlers::catalog::list_sheets(&ctx, &bank, &category, refresh).await?,
        Some(Commands::Login { password }) => {
            handlers::login::execute(&ctx, password.as_deref()).await?;
        }
        Some(Commands::Fetch { target, refetch }) => {
            handlers::pipeline::fetch(&ctx, &target, refetch).await?;
        }
        Some(Commands::Convert {
            target,
            output,
            reconvert,
        }) => handlers::pipeline::convert(&ctx, &target, &output, reconvert).await?,
        Some(Commands::Upload {
            target,
            output,
            reupload,
        }) => handlers::pipeline::upload(&ctx, &target, &output, reupload).await?,
        Some(Commands::Sync {
            target,
            output,
            refetch,
            reconvert,
            reupload,
        }) => {
            let flags = handlers::pipeline::SyncFlags {
                refetch,
                reconvert,
                reupload,
            };
            handlers::pipeline::sync(&ctx, &target, &output, flags).await?;
        }
        Some(Commands::Cache { command }) => handlers::cache::execute(&ctx, command).await?,
        Some(Commands::Config { command }) => handlers::config::execute(&ctx, command).await?,
    }

    Ok(())
}
