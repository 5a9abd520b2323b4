use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use taskboard_client::authority::{ClientError, HttpAuthority};
use taskboard_client::config::{default_config_path, load_config};
use taskboard_client::log_bridge;
use taskboard_client::session::{BoardSession, SessionError};
use taskboard_core::{AuthorityError, Board, GestureTracker, MoveCommitter, MovePolicy, Task};

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(version, about = "Kanban view of a project's tasks")]
struct Cli {
    /// Path to client.json (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true, env = "TASKBOARD_API_URL")]
    api_url: Option<String>,

    #[arg(long, global = true)]
    project: Option<String>,

    #[arg(long, global = true, env = "TASKBOARD_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every column with its tasks
    Show,
    /// Move a task to another column (todo, doing, done)
    Move { task_id: String, column: String },
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Authority(#[from] AuthorityError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = log_bridge::init() {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!(target: "taskboard.cli", "{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), RunError> {
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = load_config(&config_path).with_overrides(cli.api_url, cli.project, cli.token);
    log::info!(
        target: "taskboard.cli",
        "Using API {} (config {}, log {})",
        config.api_url,
        config_path.display(),
        log_bridge::log_file_path()
    );

    let mut committer = MoveCommitter::new(HttpAuthority::new(&config)?);
    if let Some(timeout) = config.commit_timeout() {
        committer = committer.with_timeout(timeout);
    }
    let mut session = BoardSession::new(
        Board::empty(),
        GestureTracker::new(MovePolicy::Authorized),
        committer,
    );
    session.refresh().await?;

    match cli.command {
        Commands::Show => print_board(session.board()),
        Commands::Move { task_id, column } => {
            if session.move_item(&task_id, &column).await? {
                println!("Moved {} to {}", task_id, column);
            } else {
                println!("{} is already in {}", task_id, column);
            }
        }
    }
    Ok(())
}

fn print_board(board: &Board<Task>) {
    for (id, column) in board.columns() {
        println!("{} ({}) [{}]", column.title, id, column.items.len());
        for task in &column.items {
            println!("  {}  {}", task.id, task.title);
        }
    }
}
