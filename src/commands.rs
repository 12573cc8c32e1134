use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use thiserror::Error;

use crate::board::Board;
use crate::clock::Clock;
use crate::format;
use crate::models::{DurationInput, Task, TaskEdit, TaskId, TaskState, TimeRangeInput};
use crate::timer::TimerEvent;

/// A script line that could not be carried out.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("'{0}' is not a number")]
    BadNumber(String),

    #[error("{0}")]
    BadColumn(String),

    #[error(transparent)]
    Board(#[from] crate::Error),

    #[error("failed to encode board: {0}")]
    Json(#[from] serde_json::Error),
}

fn parse_num<T: std::str::FromStr>(s: &str) -> Result<T, ScriptError> {
    s.trim().parse().map_err(|_| ScriptError::BadNumber(s.to_string()))
}

fn parse_id(s: Option<&str>, usage: &'static str) -> Result<TaskId, ScriptError> {
    s.ok_or(ScriptError::Usage(usage)).and_then(|s| parse_num(s)).map(TaskId)
}

fn parse_column(s: Option<&str>, usage: &'static str) -> Result<TaskState, ScriptError> {
    s.ok_or(ScriptError::Usage(usage))?.parse().map_err(ScriptError::BadColumn)
}

/// Splits `head rest...` once on whitespace.
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim();
    match s.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (s, ""),
    }
}

/// Parses `key=value; key=value` edit fields. Keys: `name`, `duration`
/// (`H:M:S`), `start`, `end`. A missing bound keeps the task's current one.
fn parse_edit(task: &Task, fields: &str) -> Result<TaskEdit, ScriptError> {
    const USAGE: &str = "edit <id> name=<text>; duration=<h:m:s>; start=<time>; end=<time>";
    let mut edit = TaskEdit::default();
    let mut start = None;
    let mut end = None;

    for field in fields.split(';').map(str::trim).filter(|f| !f.is_empty()) {
        let (key, value) = field.split_once('=').ok_or(ScriptError::Usage(USAGE))?;
        let value = value.trim();
        match key.trim() {
            "name" => edit.name = Some(value.to_string()),
            "duration" => {
                let parts: Vec<&str> = value.split(':').collect();
                let [h, m, s] = parts.as_slice() else {
                    return Err(ScriptError::Usage(USAGE));
                };
                edit.duration = Some(DurationInput::new(parse_num(h)?, parse_num(m)?, parse_num(s)?));
            }
            "start" => start = Some(value.to_string()),
            "end" => end = Some(value.to_string()),
            _ => return Err(ScriptError::Usage(USAGE)),
        }
    }

    if start.is_some() || end.is_some() {
        let current = task.time_range_input();
        edit.time_range = Some(TimeRangeInput::new(
            start.unwrap_or(current.start),
            end.unwrap_or(current.end),
        ));
    }
    Ok(edit)
}

/// Splits `<start> - <end>`. The separator needs surrounding whitespace so
/// the `--:--` placeholder survives.
fn split_range(s: &str) -> Option<(&str, &str)> {
    let (start, end) = s.split_once(" - ")?;
    Some((start.trim(), end.trim()))
}

/// Runs one script line against the board and returns what to print.
///
/// Blank lines and `#` comments produce an empty string.
pub fn execute_line<C: Clock>(board: &mut Board<C>, line: &str) -> Result<String, ScriptError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(String::new());
    }
    let (cmd, rest) = split_word(line);
    let (first, tail) = split_word(rest);

    let msg = match cmd {
        "add" => {
            let id = board.add(rest)?;
            format!("Task added (id = {})", id)
        }
        "move" => {
            const USAGE: &str = "move <id> <backlog|today|completed>";
            let id = parse_id(Some(first), USAGE)?;
            let state = parse_column(Some(tail).filter(|t| !t.is_empty()), USAGE)?;
            board.move_to(id, state)?;
            format!("Task {} moved to {}.", id, state)
        }
        "start" | "pause" | "toggle" | "complete" | "delete" => {
            let id = parse_id(Some(first).filter(|f| !f.is_empty()), "<start|pause|toggle|complete|delete> <id>")?;
            match cmd {
                "start" => board.start(id)?,
                "pause" => board.pause(id)?,
                "toggle" => board.toggle(id)?,
                "complete" => board.toggle_completion(id)?,
                _ => board.delete(id)?,
            }
            match (cmd, board.task(id)) {
                ("delete", _) => format!("Task {} removed.", id),
                (_, Some(t)) if t.is_running => format!("Task {} running.", id),
                (_, Some(t)) if t.is_completed => format!("Task {} marked as complete.", id),
                _ => format!("Task {} paused.", id),
            }
        }
        "edit" => {
            const USAGE: &str = "edit <id> name=<text>; duration=<h:m:s>; start=<time>; end=<time>";
            let id = parse_id(Some(first).filter(|f| !f.is_empty()), USAGE)?;
            let task = board.task(id).ok_or(crate::Error::UnknownTask(id))?;
            let edit = parse_edit(task, tail)?;
            board.edit(id, &edit)?;
            format!("Task {} updated.", id)
        }
        "rename" => {
            const USAGE: &str = "rename <id> <name>";
            let id = parse_id(Some(first).filter(|f| !f.is_empty()), USAGE)?;
            if tail.is_empty() {
                return Err(ScriptError::Usage(USAGE));
            }
            board.edit(id, &TaskEdit { name: Some(tail.to_string()), ..Default::default() })?;
            format!("Task {} renamed.", id)
        }
        "duration" => {
            const USAGE: &str = "duration <id> <h> <m> <s>";
            let id = parse_id(Some(first).filter(|f| !f.is_empty()), USAGE)?;
            let parts: Vec<&str> = tail.split_whitespace().collect();
            let [h, m, s] = parts.as_slice() else {
                return Err(ScriptError::Usage(USAGE));
            };
            let duration = DurationInput::new(parse_num(h)?, parse_num(m)?, parse_num(s)?);
            board.edit(id, &TaskEdit { duration: Some(duration), ..Default::default() })?;
            format!("Task {} updated.", id)
        }
        "times" => {
            const USAGE: &str = "times <id> <start> - <end>";
            let id = parse_id(Some(first).filter(|f| !f.is_empty()), USAGE)?;
            let (start, end) = split_range(tail).ok_or(ScriptError::Usage(USAGE))?;
            let range = TimeRangeInput::new(start, end);
            board.edit(id, &TaskEdit { time_range: Some(range), ..Default::default() })?;
            let label = board.task(id).map(Task::window_label).unwrap_or_default();
            format!("Task {} window {}.", id, label)
        }
        "reorder" => {
            const USAGE: &str = "reorder <column> <id>...";
            let state = parse_column(Some(first).filter(|f| !f.is_empty()), USAGE)?;
            let ids = tail
                .split_whitespace()
                .map(|s| parse_num(s).map(TaskId))
                .collect::<Result<Vec<_>, _>>()?;
            board.reorder(&ids, state);
            format!("{} reordered.", state)
        }
        "tick" => {
            let n: u64 = if first.is_empty() { 1 } else { parse_num(first)? };
            let mut out = Vec::new();
            for _ in 0..n {
                if !board.is_ticking() {
                    break;
                }
                if let Some(TimerEvent::RestComplete) = board.tick() {
                    out.push("Rest time complete!".to_string());
                }
            }
            out.join("\n")
        }
        "rest" => match first {
            "start" => {
                board.start_rest();
                format!("Resting for {}.", format::countdown(board.rest_time()))
            }
            "stop" => {
                board.stop_rest();
                "Rest stopped.".to_string()
            }
            "toggle" => {
                board.toggle_rest();
                if board.is_rest_mode() { "Resting.".to_string() } else { "Rest stopped.".to_string() }
            }
            "minutes" => {
                board.set_rest_duration_minutes(parse_num(tail)?);
                format!("Rest length set to {} min.", board.timer().rest_minutes())
            }
            _ => return Err(ScriptError::Usage("rest <start|stop|toggle|minutes <n>>")),
        },
        "list" => board_table(board).to_string(),
        "json" => serde_json::to_string_pretty(board.tasks())?,
        other => return Err(ScriptError::UnknownCommand(other.to_string())),
    };
    Ok(msg)
}

/// Renders every task as a table, column by column.
pub fn board_table<C: Clock>(board: &Board<C>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Column").add_attribute(Attribute::Bold),
            Cell::new("Time").add_attribute(Attribute::Bold),
            Cell::new("Window").add_attribute(Attribute::Bold),
            Cell::new("Sessions").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    for state in TaskState::ALL {
        for t in board.store().tasks_in(state) {
            let (status, color) = if t.is_running {
                ("Running", Color::Yellow)
            } else if t.is_completed {
                ("Done", Color::Green)
            } else {
                ("Idle", Color::Reset)
            };
            let time = if t.is_completed { format::friendly(t.time_spent) } else { format::clock(t.time_spent) };

            table.add_row(vec![
                Cell::new(t.id),
                Cell::new(&t.name),
                Cell::new(t.state),
                Cell::new(time),
                Cell::new(t.window_label()),
                Cell::new(t.sessions.len()),
                Cell::new(status).fg(color),
            ]);
        }
    }
    table
}

/// Executes a board script from `path`, or stdin when `None`, then prints
/// the final board as a table or JSON.
///
/// Errors on individual lines are reported and skipped.
pub fn cmd_run(path: Option<PathBuf>, rest_minutes: u32, json: bool) -> io::Result<()> {
    let script = match path {
        Some(p) => fs::read_to_string(p)?,
        None => {
            let mut s = String::new();
            io::stdin().read_to_string(&mut s)?;
            s
        }
    };

    let mut board = Board::new(crate::clock::SystemClock, rest_minutes);
    for (n, line) in script.lines().enumerate() {
        match execute_line(&mut board, line) {
            Ok(msg) if msg.is_empty() => {}
            Ok(msg) => println!("{}", msg),
            Err(e) => eprintln!("line {}: {}", n + 1, e),
        }
    }

    if json {
        let s = serde_json::to_string_pretty(board.tasks()).map_err(io::Error::other)?;
        println!("{}", s);
    } else if board.tasks().is_empty() {
        println!("No tasks found.");
    } else {
        println!("{}", board_table(&board));
    }
    Ok(())
}
