//! Todow CLI Binary
//!
//! `todow ls | add <text...> | rm <id> | c <id>`

use std::process::ExitCode;

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use todow::client::DEFAULT_HOST;
use todow::render::items_table;
use todow::{ClientConfig, ClientError, Listing, TodowClient};
use todow_core::{Credentials, ItemId, DEFAULT_PASSWORD, DEFAULT_USER};

#[derive(Debug, Parser)]
#[command(
    name = "todow",
    version,
    about = "Command-line client for the todow server",
    disable_help_flag = true
)]
struct Cli {
    /// Server address without API path
    #[arg(short = 'h', long, default_value = DEFAULT_HOST)]
    host: String,

    /// HTTP Basic username
    #[arg(short, long, default_value = DEFAULT_USER)]
    user: String,

    /// HTTP Basic password
    #[arg(short, long, default_value = DEFAULT_PASSWORD)]
    password: String,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List all items
    Ls,
    /// Add item
    Add {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Remove item
    Rm { id: ItemId },
    /// Mark item complete
    C { id: ItemId },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        eprintln!("{}", Cli::command().render_help());
        return ExitCode::SUCCESS;
    };

    let config = ClientConfig {
        host: cli.host,
        credentials: Credentials::new(cli.user, cli.password),
        ..Default::default()
    };

    match run(config, command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ClientConfig, command: Command) -> Result<(), ClientError> {
    let client = TodowClient::new(config)?;

    match command {
        Command::Ls => match client.list().await? {
            Listing::Items(items) => println!("{}", items_table(&items)),
            Listing::Message(text) => print!("{text}"),
        },
        Command::Add { text } => print!("{}", client.add(&text.join(" ")).await?),
        Command::Rm { id } => print!("{}", client.remove(id).await?),
        Command::C { id } => print!("{}", client.complete(id).await?),
    }
    Ok(())
}
