use clap::{Parser, Subcommand};

use crate::{plan::PlanArgs, simulate::SimulateArgs};

mod parsers;
mod plan;
mod setup;
mod simulate;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, enrich and rank route alternatives once
    Plan {
        #[command(flatten)]
        args: PlanArgs,
    },
    /// Run the dynamic trip simulation with continuous re-routing
    #[command(visible_alias = "sim")]
    Simulate {
        #[command(flatten)]
        args: SimulateArgs,
    },
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    match cli.command {
        Commands::Plan { args } => plan::run(args).await?,
        Commands::Simulate { args } => simulate::run(args).await?,
    }

    Ok(())
}
