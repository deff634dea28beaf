mod cli;
mod infra;
mod routes;
mod server;

use kredit_docs::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
