use crate::report::{run_history, run_score, run_summary, HistoryArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use ecoscore::config::AppConfig;
use ecoscore::error::AppError;
use ecoscore::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "EcoScore",
    about = "Score product sustainability and browse scoring history",
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
    /// Validate and score a product payload from a JSON file
    Score(ScoreArgs),
    /// List the most recent scoring records
    History(HistoryArgs),
    /// Print averages, rating distribution, and top issues
    Summary,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match command {
        Command::Serve(args) => server::run(config, args).await,
        Command::Score(args) => run_score(&config, args),
        Command::History(args) => run_history(&config, args),
        Command::Summary => run_summary(&config),
    }
}
