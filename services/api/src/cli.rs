use crate::lookup::{run_category, run_fetch, run_postcode, CategoryArgs, FetchArgs, PostcodeArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use survey_bridge::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Survey Bridge",
    about = "Enrich survey responses with UK postcode and category reference data",
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
    /// Print the form-encoded enrichment for a postcode
    Postcode(PostcodeArgs),
    /// Print the form-encoded meta categories for a report category
    Category(CategoryArgs),
    /// Download the reference files into the resources directory
    FetchResources(FetchArgs),
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

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Postcode(args) => run_postcode(args).await,
        Command::Category(args) => run_category(args),
        Command::FetchResources(args) => run_fetch(args).await,
    }
}
