use chrono::Utc;
use clap::Subcommand;
use coniunctis_core::{tasks, Config, NewTask, Priority, TaskFilter};

use crate::app::App;

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        /// Task title
        title: String,
        /// Estimated pomodoros (at least 1)
        #[arg(long, short = 'e', default_value = "1")]
        estimate: u32,
        /// Priority: low, medium, high
        #[arg(long, short = 'p', default_value = "medium")]
        priority: Priority,
        /// Category shown in the analytics breakdown
        #[arg(long, short = 'c', default_value = "")]
        category: String,
    },
    /// List tasks as JSON
    List {
        /// Only completed tasks
        #[arg(long, conflicts_with = "open")]
        done: bool,
        /// Only open tasks
        #[arg(long)]
        open: bool,
    },
    /// Show one task
    Get {
        /// Task ID
        id: String,
    },
    /// Flip a task between open and completed
    Toggle {
        /// Task ID
        id: String,
    },
    /// Mark a task completed
    Done {
        /// Task ID
        id: String,
    },
    /// Mark a task open again
    Reopen {
        /// Task ID
        id: String,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
}

pub fn run(action: TaskAction, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let app = App::open(config)?;
    let user = app.user_id();

    match action {
        TaskAction::Add {
            title,
            estimate,
            priority,
            category,
        } => {
            let new = NewTask::new(title, estimate)
                .with_priority(priority)
                .with_category(category);
            let task = tasks::create_task(&app.db, user, new, Utc::now())?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::List { done, open } => {
            let filter = match (done, open) {
                (true, _) => TaskFilter::completed(true),
                (_, true) => TaskFilter::completed(false),
                _ => TaskFilter::all(),
            };
            let list = tasks::list_tasks(&app.db, user, filter)?;
            println!("{}", serde_json::to_string_pretty(&list)?);
        }
        TaskAction::Get { id } => {
            let task = tasks::get_task(&app.db, user, &id)?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Toggle { id } => {
            let task = tasks::toggle_task(&app.db, user, &id, Utc::now())?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Done { id } => {
            let task = tasks::set_completed(&app.db, user, &id, true, Utc::now())?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Reopen { id } => {
            let task = tasks::set_completed(&app.db, user, &id, false, Utc::now())?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Delete { id } => {
            tasks::delete_task(&app.db, user, &id)?;
            let checkpoint = app.load_checkpoint();
            if checkpoint.active_task_id.as_deref() == Some(id.as_str()) {
                app.save_checkpoint(&coniunctis_core::EngineCheckpoint {
                    active_task_id: None,
                    ..checkpoint
                })?;
            }
            println!("Task deleted: {id}");
        }
    }
    Ok(())
}
