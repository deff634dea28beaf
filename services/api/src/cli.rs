use crate::server;
use clap::{Args, Parser, Subcommand};
use kredit_docs::config::AppConfig;
use kredit_docs::error::AppError;
use kredit_docs::workflows::credit::{build_document_context, ApplicationRecord};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Kredit Docs",
    about = "Intake loan applicants and generate formatted credit documents",
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
    /// Print the formatted document context for a record exported as JSON
    Context(ContextArgs),
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

#[derive(Args, Debug)]
pub(crate) struct ContextArgs {
    /// JSON object of form fields (field name to raw value)
    #[arg(long)]
    pub(crate) record: PathBuf,
    /// Pretty-print the output
    #[arg(long, default_value_t = false)]
    pub(crate) pretty: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Context(args) => print_context(args),
    }
}

fn print_context(args: ContextArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let raw = std::fs::read_to_string(&args.record)?;
    let record: ApplicationRecord = serde_json::from_str(&raw)?;

    let context = build_document_context(&record, &config.derivation.context_settings())?;
    let output = if args.pretty {
        serde_json::to_string_pretty(&context)?
    } else {
        serde_json::to_string(&context)?
    };
    println!("{output}");
    Ok(())
}
