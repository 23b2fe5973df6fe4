//! Command-line client for the todo API.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::process::ExitCode;
use todo_store::client::{TodoClient, DEFAULT_BASE_URL};
use todo_store::todos::TodoPatch;
use uuid::Uuid;

/// Manage todos on a running todo server.
#[derive(Parser, Debug)]
#[command(name = "todo")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Server base URL
    #[arg(long, env = "TODO_API_URL", default_value = DEFAULT_BASE_URL)]
    url: String,

    /// The command to execute
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every todo.
    List,
    /// Show one todo.
    Get {
        /// Todo ID
        id: Uuid,
    },
    /// Add a todo.
    Add {
        /// Title (3 to 200 characters)
        title: String,
    },
    /// Mark a todo as completed.
    Done {
        /// Todo ID
        id: Uuid,
    },
    /// Mark a todo as not completed.
    Undo {
        /// Todo ID
        id: Uuid,
    },
    /// Change a todo's title.
    Rename {
        /// Todo ID
        id: Uuid,
        /// New title
        title: String,
    },
    /// Delete one or more todos.
    Rm {
        /// Todo IDs
        #[arg(required = true)]
        ids: Vec<Uuid>,
    },
    /// Delete every todo.
    Clear,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let client = TodoClient::new(cli.url);
    match run(&client, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(client: &TodoClient, command: Command) -> todo_store::Result<()> {
    match command {
        Command::List => print(&client.list().await?),
        Command::Get { id } => match client.get(id).await? {
            Some(todo) => print(&todo),
            None => Err(todo_store::Error::Api { status: 404, message: format!("no todo {id}") }),
        },
        Command::Add { title } => print(&client.create(&title).await?),
        Command::Done { id } => print(&client.update(id, &TodoPatch::completed(true)).await?),
        Command::Undo { id } => print(&client.update(id, &TodoPatch::completed(false)).await?),
        Command::Rename { id, title } => {
            let patch = TodoPatch { title: Some(title), completed: None };
            print(&client.update(id, &patch).await?)
        }
        Command::Rm { ids } => match ids.as_slice() {
            [id] => print(&serde_json::json!({ "deleted": client.delete(*id).await? })),
            _ => print(&serde_json::json!({ "deleted": client.delete_many(&ids).await? })),
        },
        Command::Clear => print(&serde_json::json!({ "deleted": client.clear_all().await? })),
    }
}

fn print(value: &impl Serialize) -> todo_store::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
