mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use vigilo::config;
use vigilo::errors::VigiloError;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .init();

    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!("Error: {e}");
        let exit_code = match &e {
            VigiloError::Config(_) => 2,
            VigiloError::InvalidInput(_) => 3,
            VigiloError::NotFound(_) => 4,
            _ => 1,
        };
        std::process::exit(exit_code);
    }
}

async fn run(cli: cli::Cli) -> Result<(), VigiloError> {
    if matches!(cli.command, cli::Commands::Validate) {
        let config = config::load_config()?;
        cli::validate::handle_validate(&config);
        return Ok(());
    }

    let config = config::load_config()?;

    match cli.command {
        cli::Commands::Serve(args) => cli::serve::handle_serve(config, args).await,
        cli::Commands::Collect(args) => cli::collect::handle_collect(config, args).await,
        cli::Commands::MitreSync => cli::mitresync::handle_mitre_sync(config).await,
        cli::Commands::ScanActor(args) => cli::scan::handle_scan_actor(config, args).await,
        cli::Commands::Validate => unreachable!("handled above"),
    }
}
