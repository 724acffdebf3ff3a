use anyhow::Result;
use clap::Parser;

use powder_dispenser::cli::commands::catalog::CatalogCommand;
use powder_dispenser::cli::commands::run::RunCommand;
use powder_dispenser::cli::commands::shell::ShellCommand;
use powder_dispenser::cli::commands::show_config::ShowConfigCommand;
use powder_dispenser::cli::commands::{show_how_to_start, Command};
use powder_dispenser::cli::{Cli, Commands};
use powder_dispenser::{
    config, create_session_span, init_config, init_telemetry, shutdown_telemetry, DispenserConfig,
};

fn effective_config(cli: &Cli) -> Result<DispenserConfig> {
    let mut effective = config()?.clone();
    if let Some(seed) = cli.seed {
        effective.catalog.seed = Some(seed);
    }
    if let Some(tick_ms) = cli.tick_ms {
        effective.dispensing.tick_interval_ms = tick_ms;
    }
    effective.validate()?;
    Ok(effective)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = effective_config(&cli)?;
    init_telemetry(&config.observability)?;
    init_config()?;

    let session_id = powder_dispenser::generate_session_id();
    let span = create_session_span(&session_id, config.catalog.seed);
    let _entered = span.enter();

    let result = match cli.command {
        None => tokio::runtime::Runtime::new()?.block_on(async { show_how_to_start().await }),
        Some(Commands::Catalog { json }) => tokio::runtime::Runtime::new()?.block_on(async {
            CatalogCommand::new(config).with_json(json).execute().await
        }),
        Some(Commands::Run { ndc, json }) => tokio::runtime::Runtime::new()?.block_on(async {
            RunCommand::new(config, ndc).with_json(json).execute().await
        }),
        Some(Commands::Shell) => tokio::runtime::Runtime::new()?
            .block_on(async { ShellCommand::new(config).execute().await }),
        Some(Commands::Config { write }) => tokio::runtime::Runtime::new()?.block_on(async {
            ShowConfigCommand::new(config).with_write(write).execute().await
        }),
    };

    shutdown_telemetry();
    result
}
