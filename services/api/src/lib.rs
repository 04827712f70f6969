mod cli;
mod infra;
mod lookup;
mod routes;
mod server;

use survey_bridge::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
