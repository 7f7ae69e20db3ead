mod commands;
mod opts;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::parse::ParseArgs;
use opts::SidecarOpts;

#[derive(Parser, Debug)]
#[command(name = "sidecar", version, about = "Notebook sidecar comm bridge")]
struct Cli {
    #[command(flatten)]
    opts: SidecarOpts,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dispatch newline-delimited JSON messages from stdin; replies go to stdout
    Serve,

    /// Validate a form cell payload and print its normalized record
    Parse(ParseArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    setup_logging();
    let cli = Cli::parse();
    let opts = &cli.opts;

    match cli.command {
        Command::Serve => commands::serve::cmd_serve(opts).await,
        Command::Parse(args) => commands::parse::cmd_parse(&args),
    }
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .init();
}
