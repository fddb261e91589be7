mod cli;
mod demo;
mod infra;
mod recommend;
mod routes;
mod server;

use profguide::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
