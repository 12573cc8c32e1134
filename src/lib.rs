//! Library surface of taskclock: the task board and its timer, plus the
//! terminal front end and script runner built on top of them.

pub mod board;
pub mod clock;
pub mod commands;
pub mod config;
pub mod error;
pub mod format;
pub mod models;
pub mod store;
pub mod time_of_day;
pub mod timer;
pub mod tui;

pub use board::Board;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use models::{DurationInput, Session, Task, TaskEdit, TaskId, TaskState, TimeRangeInput};
pub use store::TaskStore;
pub use timer::{TimerEvent, TimerLoop};
