use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use eyre::Result;
use std::path::PathBuf;
use tracing::debug;
use todostore::{Config, FileSlot, Submitted, TaskId, TaskListStore, parse_date, render};

#[derive(Parser)]
#[command(name = "todostore")]
#[command(about = "Task list manager: add, edit, complete and delete tasks")]
#[command(version)]
struct Cli {
    /// Path to a YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the task list (overrides the config file)
    #[arg(short, long)]
    store_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Entry {
    /// Task text
    #[arg(required = true)]
    text: Vec<String>,

    /// Due date (YYYY-MM-DD or RFC 3339)
    #[arg(short, long, value_parser = parse_due)]
    due: Option<NaiveDate>,

    /// Remove the due date of the task being edited
    #[arg(long, conflicts_with = "due")]
    clear_due: bool,
}

impl Entry {
    fn text(&self) -> String {
        self.text.join(" ")
    }

    /// Due date to save: the given one, none if cleared, else the current one
    fn due_or(&self, current: Option<NaiveDate>) -> Option<NaiveDate> {
        if self.clear_due { None } else { self.due.or(current) }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add(Entry),

    /// Start editing a task and print its current text
    Edit { id: TaskId },

    /// Save new text and date for the task being edited
    Save(Entry),

    /// Save the task being edited, or add a new task if none is
    Submit(Entry),

    /// Leave editing mode without saving
    Cancel,

    /// Mark a task completed
    Complete { id: TaskId },

    /// Delete a task
    Delete { id: TaskId },

    /// Show all tasks
    List,
}

fn parse_due(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.store_dir {
        config.store_dir = dir;
    }

    // Setup tracing
    let level = match cli.verbose {
        0 => config.level(),
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    debug!(store_dir = ?config.store_dir, key = %config.key, "Using configuration");

    let slot = FileSlot::open(&config.store_dir)?;
    let mut store = TaskListStore::load_with_key(slot, &config.key);

    match cli.command {
        Commands::Add(entry) => {
            let id = store.add(&entry.text(), entry.due)?;
            println!("Added task {}", id);
        }
        Commands::Edit { id } => {
            let draft = store.begin_edit(id)?;
            println!("Editing task {}: {}", id, render::render_draft(&draft));
            println!("Run `todostore save <text> [--due DATE | --clear-due]` to save, or `todostore cancel`");
        }
        Commands::Save(entry) => {
            let id = store.editing().ok_or(todostore::TaskError::NotEditing)?;
            store.commit_edit(id, &entry.text(), entry.due_or(store.editing_due()))?;
            println!("Saved task {}", id);
        }
        Commands::Submit(entry) => match store.submit(&entry.text(), entry.due_or(store.editing_due()))? {
            Submitted::Added(id) => println!("Added task {}", id),
            Submitted::Updated(id) => println!("Saved task {}", id),
        },
        Commands::Cancel => {
            if store.cancel_edit()? {
                println!("Editing cancelled");
            } else {
                println!("No task is being edited");
            }
        }
        Commands::Complete { id } => {
            store.complete(id)?;
            if let Some(message) = store.get(id).and_then(|t| t.completion_message.as_deref()) {
                println!("{}", message.green());
            }
        }
        Commands::Delete { id } => {
            if store.delete(id)? {
                println!("Deleted task {}", id);
            } else {
                println!("No task {}", id);
            }
        }
        Commands::List => {
            println!("{}", render::render_list(&store));
        }
    }

    Ok(())
}
