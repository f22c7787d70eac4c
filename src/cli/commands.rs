use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "vigilo", version, about = "Threat-intelligence tracking engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server and both background schedulers
    Serve(ServeArgs),
    /// Run one collection pass over all active actors
    Collect(CollectArgs),
    /// Sync the technique catalog from the MITRE STIX bundle
    MitreSync,
    /// Reconcile a single actor by name
    ScanActor(ScanActorArgs),
    /// Validate the environment configuration
    Validate,
}

#[derive(Args, Clone)]
pub struct ServeArgs {
    /// Listen port
    #[arg(long, default_value = "8080")]
    pub port: u16,

    /// Listen address
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,
}

#[derive(Args, Clone)]
pub struct CollectArgs {
    /// Print per-actor progress events to stdout
    #[arg(long)]
    pub verbose_progress: bool,
}

#[derive(Args, Clone)]
pub struct ScanActorArgs {
    /// Actor name, matched exactly
    pub name: String,
}
