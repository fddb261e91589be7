use crate::demo::{run_demo, DemoArgs};
use crate::recommend::{run_recommend, run_stats, RecommendArgs, StatsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use profguide::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Profession Guidance Expert System",
    about = "Serve and query the certainty-factor profession recommender",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Rank professions for a stored knowledge base and an answers file
    Recommend(RecommendArgs),
    /// Print question, profession, and rule counts for a knowledge base
    Stats(StatsArgs),
    /// Run the recommender against the built-in sample knowledge base
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the configured knowledge base JSON file
    #[arg(long)]
    pub(crate) knowledge_base: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Recommend(args) => run_recommend(args),
        Command::Stats(args) => run_stats(args),
        Command::Demo(args) => run_demo(args),
    }
}
