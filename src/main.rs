//! # taskclock
//!
//! A terminal task board with a built-in stopwatch and rest timer.
//!
//! ## Features
//!
//! *   **Three columns**: Backlog, Today and Completed.
//! *   **Per-task timing**: start and pause tasks in Today; every run is kept
//!     as a session. Only one task runs at a time.
//! *   **Rest breaks**: a countdown (5 minutes by default) that pauses task timing.
//! *   **Scripting**: drive the same board from a file of commands.
//!
//! Nothing is saved between runs. When the board closes, a summary table of
//! the day's tasks is printed.
//!
//! ## Usage
//!
//! ### Interactive Mode (TUI)
//!
//! ```bash
//! taskclock
//! # or explicitly, with a 10 minute rest
//! taskclock ui --rest-minutes 10
//! ```
//!
//! #### TUI Key Bindings
//!
//! *   `q`: Quit
//! *   `h`/`l`, `←`/`→`: Focus column
//! *   `j`/`k`, `↓`/`↑`: Select task
//! *   `a`: Add task to Backlog
//! *   `Enter`/`>`: Move task one column right, `<`: left
//! *   `Space`: Start/pause the selected Today task
//! *   `x`: Toggle done
//! *   `e`: Edit name, time spent and start/end times
//! *   `d`: Delete
//! *   `J`/`K`: Move task down/up within its column
//! *   `r`: Start/stop rest, `+`/`-`: rest length
//!
//! ### Scripts
//!
//! ```bash
//! printf 'add Write report\nmove 1 today\nstart 1\ntick 90\npause 1\n' | taskclock run
//! ```
//!
//! Edits: `rename <id> <name>`, `duration <id> <h> <m> <s>`,
//! `times <id> <start> - <end>` (`--:--` clears a bound), or several fields at
//! once with `edit <id> name=...; duration=h:m:s; start=...; end=...`.
//!
//! ## Configuration
//!
//! `~/.config/taskclock/config.json` (or `$TASKCLOCK_CONFIG`):
//!
//! ```json
//! { "rest_minutes": 5 }
//! ```
//!
//! Set `TASKCLOCK_DEBUG=1` to log state changes to stderr (`RUST_LOG`
//! overrides the default `taskclock=debug` filter).

use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use taskclock::commands::cmd_run;
use taskclock::config;
use taskclock::tui::run_tui;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "taskclock")]
#[command(about = "Task board with a stopwatch and rest timer", long_about = None)]
struct Cli {
    /// Rest length in minutes (overrides the config file)
    #[arg(short, long, global = true)]
    rest_minutes: Option<u32>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive board
    Ui,
    /// Run board commands from a file (or stdin) and print the result
    Run {
        /// Script file; reads stdin when omitted
        file: Option<PathBuf>,
        /// Print the final board as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// `RUST_LOG` when set, otherwise debug output for this crate only.
fn debug_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| "taskclock=debug".into())
}

fn main() {
    if std::env::var("TASKCLOCK_DEBUG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(debug_filter())
            .with_writer(io::stderr)
            .init();
    }

    let cli = Cli::parse();
    let rest_minutes = cli.rest_minutes.unwrap_or_else(|| config::load().rest_minutes);

    match cli.command {
        Some(Commands::Run { file, json }) => {
            if let Err(e) = cmd_run(file, rest_minutes, json) {
                eprintln!("Failed to run script: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "taskclock", &mut io::stdout());
        }
        Some(Commands::Ui) | None => {
            if let Err(e) = run_tui(rest_minutes) {
                eprintln!("Error running TUI: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_log_overrides_the_default_filter() {
        let shown = || debug_filter().to_string().to_lowercase();
        std::env::remove_var("RUST_LOG");
        assert_eq!(shown(), "taskclock=debug");
        std::env::set_var("RUST_LOG", "taskclock=trace");
        assert_eq!(shown(), "taskclock=trace");
        std::env::remove_var("RUST_LOG");
    }
}
