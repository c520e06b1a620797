use std::time::Duration;

use clap::Subcommand;
use coniunctis_core::timer::TICK_PERIOD;
use coniunctis_core::{tasks, Config, Event, TickDriver};

use crate::app::App;
use crate::notify::TerminalNotifier;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run the countdown in the foreground until the session ends
    Run {
        /// Link focus sessions to this task
        #[arg(long)]
        task: Option<String>,
        /// Keep going for this many sessions, starting each one
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        cycles: Option<u32>,
        /// Tick period in milliseconds
        #[arg(long, default_value_t = TICK_PERIOD.as_millis() as u64, hide = true)]
        tick_ms: u64,
    },
    /// Print current timer state as JSON
    Status,
    /// Move to the next position without recording a session
    Skip,
    /// Restart the current position from its full duration
    Reset,
    /// Set or clear the task linked to focus sessions
    Task {
        /// Task ID; omit to clear
        id: Option<String>,
    },
    /// Retry writes that failed while the store was unavailable
    Flush,
    /// List writes still waiting in the outbox
    Pending,
}

/// One JSON line per event. Output trouble is logged, never fatal.
fn print_event(event: &Event) {
    match serde_json::to_string(event) {
        Ok(line) => println!("{line}"),
        Err(e) => tracing::warn!("could not serialize event: {e}"),
    }
}

pub fn run(action: TimerAction, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let app = App::open(config)?;

    match action {
        TimerAction::Run {
            task,
            cycles,
            tick_ms,
        } => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(run_live(&app, task, cycles, Duration::from_millis(tick_ms.max(1))))?;
        }
        TimerAction::Status => {
            let controller = app.controller(TerminalNotifier)?;
            println!("{}", serde_json::to_string_pretty(&controller.snapshot())?);
        }
        TimerAction::Skip => {
            let mut controller = app.controller(TerminalNotifier)?;
            print_event(&controller.skip());
            app.save_checkpoint(&controller.checkpoint())?;
        }
        TimerAction::Reset => {
            let mut controller = app.controller(TerminalNotifier)?;
            print_event(&controller.reset());
            app.save_checkpoint(&controller.checkpoint())?;
        }
        TimerAction::Task { id } => {
            if let Some(id) = &id {
                tasks::get_task(&app.db, app.user_id(), id)?;
            }
            let mut controller = app.controller(TerminalNotifier)?;
            print_event(&controller.set_active_task(id));
            app.save_checkpoint(&controller.checkpoint())?;
        }
        TimerAction::Flush => {
            let mut controller = app.controller(TerminalNotifier)?;
            let report = controller.flush_outbox();
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        TimerAction::Pending => {
            let controller = app.controller(TerminalNotifier)?;
            let pending: Vec<_> = controller.outbox().entries().collect();
            println!("{}", serde_json::to_string_pretty(&pending)?);
        }
    }
    Ok(())
}

async fn run_live(
    app: &App,
    task: Option<String>,
    cycles: Option<u32>,
    period: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut controller = app.controller(TerminalNotifier)?;
    if let Some(id) = task {
        tasks::get_task(&app.db, app.user_id(), &id)?;
        print_event(&controller.set_active_task(Some(id)));
    }
    controller.flush_outbox();
    if let Some(event) = controller.start() {
        print_event(&event);
    }

    let (mut driver, mut ticks) = TickDriver::new();
    driver.start(period);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut completed = 0u32;

    loop {
        tokio::select! {
            tick = ticks.recv() => {
                let Some(tick) = tick else { break };
                if !driver.is_current(tick) {
                    continue;
                }
                let Some(event) = controller.tick() else { continue };
                print_event(&event);
                controller.persist_checkpoint(|cp| app.save_checkpoint(cp));
                completed += 1;

                let wanted_more = cycles.is_some_and(|n| completed < n);
                if cycles.is_some() && !wanted_more {
                    break;
                }
                if !controller.engine().is_running() {
                    if !wanted_more {
                        break;
                    }
                    if let Some(event) = controller.start() {
                        print_event(&event);
                    }
                    driver.start(period);
                }
            }
            _ = &mut ctrl_c => {
                if let Some(event) = controller.pause() {
                    print_event(&event);
                }
                break;
            }
        }
    }

    driver.stop();
    controller.persist_checkpoint(|cp| app.save_checkpoint(cp));
    if !controller.outbox().is_empty() {
        eprintln!(
            "{} write(s) queued; run `coniunctis timer flush` once the store is back",
            controller.outbox().len()
        );
    }
    Ok(())
}
