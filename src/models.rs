use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::time_of_day;

/// Opaque task identifier. Assigned once by the store and never reused.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The board column a task lives in.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Backlog,
    Today,
    Completed,
}

impl TaskState {
    /// All columns, left to right.
    pub const ALL: [TaskState; 3] = [TaskState::Backlog, TaskState::Today, TaskState::Completed];

    pub fn label(self) -> &'static str {
        match self {
            TaskState::Backlog => "Backlog",
            TaskState::Today => "Today",
            TaskState::Completed => "Completed",
        }
    }

    pub fn next(self) -> Option<TaskState> {
        match self {
            TaskState::Backlog => Some(TaskState::Today),
            TaskState::Today => Some(TaskState::Completed),
            TaskState::Completed => None,
        }
    }

    pub fn previous(self) -> Option<TaskState> {
        match self {
            TaskState::Backlog => None,
            TaskState::Today => Some(TaskState::Backlog),
            TaskState::Completed => Some(TaskState::Today),
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "backlog" => Ok(TaskState::Backlog),
            "today" => Ok(TaskState::Today),
            "completed" | "done" => Ok(TaskState::Completed),
            other => Err(format!("unknown column '{}'. Use backlog, today or completed.", other)),
        }
    }
}

/// One contiguous start-to-pause run of a task.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// Seconds credited to the task during this run.
    pub duration: u64,
}

/// Represents a single task on the board.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    /// Unique identifier for the task.
    pub id: TaskId,
    /// Display name, never empty.
    pub name: String,
    /// Column the task currently sits in.
    pub state: TaskState,
    /// Total seconds accumulated.
    pub time_spent: u64,
    /// Whether the timer is currently running for this task.
    pub is_running: bool,
    /// Whether the task has been checked off.
    pub is_completed: bool,
    /// Start of the most recent run window.
    pub start_time: Option<NaiveDateTime>,
    /// End of the most recent run window.
    pub end_time: Option<NaiveDateTime>,
    /// Set while a run is in progress.
    pub current_session_start_time: Option<NaiveDateTime>,
    /// Completed runs, oldest first.
    pub sessions: Vec<Session>,
}

impl Task {
    pub(crate) fn new(id: TaskId, name: String) -> Self {
        Task {
            id,
            name,
            state: TaskState::Backlog,
            time_spent: 0,
            is_running: false,
            is_completed: false,
            start_time: None,
            end_time: None,
            current_session_start_time: None,
            sessions: Vec::new(),
        }
    }

    /// Sum of all recorded session durations.
    pub fn session_total(&self) -> u64 {
        self.sessions.iter().map(|s| s.duration).sum()
    }

    /// The run window as editable text, blank where unset.
    pub fn time_range_input(&self) -> TimeRangeInput {
        let text = |t: Option<NaiveDateTime>| t.map(|t| time_of_day::format(&t)).unwrap_or_default();
        TimeRangeInput::new(text(self.start_time), text(self.end_time))
    }

    /// `11:55 PM - 12:30 PM`; an open or missing bound shows as `--:--`.
    pub fn window_label(&self) -> String {
        match self.start_time {
            Some(start) => format!(
                "{} - {}",
                time_of_day::format(&start),
                time_of_day::format_optional(self.end_time.as_ref())
            ),
            None => format!("{} - {}", time_of_day::UNSET, time_of_day::UNSET),
        }
    }
}

/// Hours, minutes and seconds as entered by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DurationInput {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl DurationInput {
    pub fn new(hours: u32, minutes: u32, seconds: u32) -> Self {
        DurationInput { hours, minutes, seconds }
    }

    /// Total seconds, or `None` if any component is out of range
    /// (hours 0-23, minutes and seconds 0-59).
    pub fn to_seconds(self) -> Option<u64> {
        if self.hours > 23 || self.minutes > 59 || self.seconds > 59 {
            return None;
        }
        Some(self.hours as u64 * 3600 + self.minutes as u64 * 60 + self.seconds as u64)
    }
}

/// Start/end time-of-day text pair. Empty text clears the bound.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimeRangeInput {
    pub start: String,
    pub end: String,
}

impl TimeRangeInput {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        TimeRangeInput { start: start.into(), end: end.into() }
    }
}

/// Fields submitted by an edit. `None` leaves the field alone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskEdit {
    pub name: Option<String>,
    pub duration: Option<DurationInput>,
    pub time_range: Option<TimeRangeInput>,
}
