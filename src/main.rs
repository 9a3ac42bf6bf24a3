//! User board entry point: backend server and terminal client.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tracing::{error, info};

use userboard::api::{create_router, AppState};
use userboard::client::{BoardCommand, HttpUsersApi, SubmitOutcome, UserBoard};
use userboard::config::{ClientConfig, Config};
use userboard::db::{ConnectionManager, PgUserStore};
use userboard::error::AppError;
use userboard::metrics;
use userboard::utils::{init_tracing, shutdown_signal};

/// Three-tier user board.
#[derive(Parser, Debug)]
#[command(name = "userboard")]
#[command(about = "List and create user records through a REST backend")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log output format.
    #[arg(long, global = true, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Backend base URL for client commands (overrides API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the backend server (default).
    Serve {
        /// HTTP listening port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Print the user list.
    List,

    /// Create a user, then print the refreshed list.
    Add {
        /// User name.
        #[arg(long)]
        name: String,

        /// User email.
        #[arg(long)]
        email: String,
    },

    /// Interactive board: edit the form, submit, refresh.
    Board,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_tracing(args.verbose, args.log_format == LogFormat::Json);

    match args.command {
        Some(Command::Serve { port }) => cmd_serve(port).await,
        Some(Command::CheckConfig) => cmd_check_config(),
        Some(Command::List) => cmd_list(args.api_url).await,
        Some(Command::Add { name, email }) => cmd_add(args.api_url, name, email).await,
        Some(Command::Board) => cmd_board(args.api_url).await,
        None => cmd_serve(None).await,
    }
}

/// Load and validate backend configuration.
fn load_config(port_override: Option<u16>) -> Result<Config, AppError> {
    let mut config = Config::load()?;

    if let Some(port) = port_override {
        config.port = port;
    }

    config.validate().map_err(AppError::InvalidConfig)?;
    Ok(config)
}

/// Build the backend client from environment and CLI override.
fn load_client(api_url_override: Option<String>) -> Result<HttpUsersApi, AppError> {
    let mut config = ClientConfig::load()?;

    if let Some(api_url) = api_url_override {
        config.api_url = api_url;
    }

    let base_url = config.base_url()?;
    Ok(HttpUsersApi::new(&base_url)?)
}

/// Run the backend server.
async fn cmd_serve(port_override: Option<u16>) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let config = load_config(port_override).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    let prometheus = metrics::install_recorder().map_err(AppError::from)?;
    metrics::init_metrics();

    info!(
        host = %config.db_host,
        port = config.db_port,
        database = %config.db_name,
        "Database target"
    );

    // The server comes up before the database; the retry loop runs alongside.
    let manager = Arc::new(ConnectionManager::new(
        config.connect_options(),
        config.retry_delay(),
    ));
    let connect_task = manager.spawn_connect();

    let store = PgUserStore::new(Arc::clone(&manager));
    let state = AppState::new(Arc::new(store)).with_metrics(prometheus);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("Backend listening on {}", addr);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    connect_task.abort();
    manager.close().await;
    info!("Backend stopped");

    Ok(())
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("USERBOARD - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading backend configuration... ");
    let config = match load_config(None) {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration check failed"));
        }
    };

    print!("Loading client configuration... ");
    let client = match ClientConfig::load() {
        Ok(c) => c,
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration check failed"));
        }
    };
    match client.base_url() {
        Ok(_) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration check failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Port: {}", config.port);
    println!("  Database: {}@{}:{}/{}", config.db_user, config.db_host, config.db_port, config.db_name);
    println!("  Retry Delay: {}s", config.db_retry_secs);
    println!("  API URL: {}", client.api_url);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Print the user list.
async fn cmd_list(api_url: Option<String>) -> anyhow::Result<()> {
    let mut board = UserBoard::new(load_client(api_url)?);
    board.mount().await;
    print!("{}", board.render());

    match board.error() {
        Some(e) => Err(anyhow::anyhow!("{}", e)),
        None => Ok(()),
    }
}

/// Create a user, then print the refreshed list.
async fn cmd_add(api_url: Option<String>, name: String, email: String) -> anyhow::Result<()> {
    let mut board = UserBoard::new(load_client(api_url)?);
    board.set_name(name);
    board.set_email(email);

    let outcome = board.submit().await;
    print!("{}", board.render());

    match outcome {
        SubmitOutcome::Created(user) => {
            info!(id = user.id, "User created");
            Ok(())
        }
        SubmitOutcome::Rejected | SubmitOutcome::Failed => Err(anyhow::anyhow!(
            "{}",
            board.error().unwrap_or("submission failed")
        )),
    }
}

/// Interactive board on stdin/stdout.
async fn cmd_board(api_url: Option<String>) -> anyhow::Result<()> {
    let mut board = UserBoard::new(load_client(api_url)?);
    board.mount().await;
    print!("{}", board.render());
    println!("{}", BoardCommand::usage());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match BoardCommand::parse(&line) {
            Some(BoardCommand::Name(name)) => board.set_name(name),
            Some(BoardCommand::Email(email)) => board.set_email(email),
            Some(BoardCommand::Submit) => {
                board.submit().await;
            }
            Some(BoardCommand::Refresh) => board.fetch_users().await,
            Some(BoardCommand::Quit) => break,
            Some(BoardCommand::Help) | None => {
                println!("{}", BoardCommand::usage());
                continue;
            }
        }
        print!("{}", board.render());
    }

    Ok(())
}
