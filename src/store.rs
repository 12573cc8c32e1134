use chrono::NaiveDateTime;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::models::{Session, Task, TaskEdit, TaskId, TaskState};
use crate::time_of_day;

/// Owns the tasks and the pointer to the one that is running, if any.
///
/// Every mutation goes through a method here; callers only ever get shared
/// references to tasks. At most one task has `is_running` set, which is
/// maintained by pausing the previous runner inside [`TaskStore::start`].
pub struct TaskStore<C: Clock = SystemClock> {
    tasks: Vec<Task>,
    running: Option<TaskId>,
    next_id: u64,
    clock: C,
}

impl Default for TaskStore<SystemClock> {
    fn default() -> Self {
        TaskStore::new(SystemClock)
    }
}

impl<C: Clock> TaskStore<C> {
    pub fn new(clock: C) -> Self {
        TaskStore { tasks: Vec::new(), running: None, next_id: 1, clock }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// All tasks, in board order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Tasks of one column, in board order.
    pub fn tasks_in(&self, state: TaskState) -> impl Iterator<Item = &Task> + '_ {
        self.tasks.iter().filter(move |t| t.state == state)
    }

    pub fn count(&self, state: TaskState) -> usize {
        self.tasks_in(state).count()
    }

    pub fn running_task_id(&self) -> Option<TaskId> {
        self.running
    }

    pub fn running_task(&self) -> Option<&Task> {
        self.running.and_then(|id| self.get(id))
    }

    fn task_mut(&mut self, id: TaskId) -> Result<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id).ok_or(Error::UnknownTask(id))
    }

    /// Adds a new Backlog task and returns its id.
    pub fn add(&mut self, name: &str) -> Result<TaskId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::EmptyName);
        }
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push(Task::new(id, name.to_string()));
        debug!(%id, name, "task added");
        Ok(id)
    }

    /// Moves a task to another column. Moving into Today clears the
    /// completion checkmark; moving a running task out of Today pauses it.
    pub fn move_to(&mut self, id: TaskId, state: TaskState) -> Result<()> {
        let is_running = self.task_mut(id)?.is_running;
        if is_running && state != TaskState::Today {
            self.pause(id)?;
        }
        let task = self.task_mut(id)?;
        task.state = state;
        if state == TaskState::Today {
            task.is_completed = false;
        }
        debug!(%id, %state, "task moved");
        Ok(())
    }

    /// Starts timing a Today task, pausing whichever task was running.
    pub fn start(&mut self, id: TaskId) -> Result<()> {
        let task = self.get(id).ok_or(Error::UnknownTask(id))?;
        if task.state != TaskState::Today {
            return Err(Error::NotScheduledToday(id));
        }
        if task.is_running {
            return Ok(());
        }
        if let Some(prev) = self.running {
            self.pause(prev)?;
        }

        let now = self.clock.now();
        let task = self.task_mut(id)?;
        task.is_running = true;
        task.is_completed = false;
        task.current_session_start_time = Some(now);
        task.start_time = Some(now);
        task.end_time = None;
        self.running = Some(id);
        debug!(%id, "task started");
        Ok(())
    }

    /// Stops timing a task and records the run as a session if it credited
    /// any time. Pausing a task that is not running only closes an open run
    /// window; it never appends a session.
    pub fn pause(&mut self, id: TaskId) -> Result<()> {
        let now = self.clock.now();
        let task = self.task_mut(id)?;
        if !task.is_running {
            if task.start_time.is_some() && task.end_time.is_none() {
                task.end_time = Some(now);
            }
            return Ok(());
        }
        task.is_running = false;
        task.end_time = Some(now);

        let session_start = task.current_session_start_time.take();
        let delta = task.time_spent.saturating_sub(task.session_total());
        if delta > 0 {
            task.sessions.push(Session {
                start_time: session_start.unwrap_or(now),
                end_time: now,
                duration: delta,
            });
            debug!(%id, duration = delta, "session recorded");
        }

        if self.running == Some(id) {
            self.running = None;
        }
        debug!(%id, "task paused");
        Ok(())
    }

    /// Play/pause: pauses a running task, starts any other.
    pub fn toggle(&mut self, id: TaskId) -> Result<()> {
        if self.get(id).ok_or(Error::UnknownTask(id))?.is_running {
            self.pause(id)
        } else {
            self.start(id)
        }
    }

    /// Flips the completion checkmark. Completing moves the task to the
    /// Completed column and closes its run window.
    pub fn toggle_completion(&mut self, id: TaskId) -> Result<()> {
        self.pause(id)?;
        let now = self.clock.now();
        let task = self.task_mut(id)?;
        task.is_completed = !task.is_completed;
        if task.is_completed {
            task.state = TaskState::Completed;
            if task.start_time.is_some() && task.end_time.is_none() {
                task.end_time = Some(now);
            }
        }
        debug!(%id, completed = task.is_completed, "completion toggled");
        Ok(())
    }

    /// Applies an edit. All fields are validated first; on error nothing
    /// changes.
    ///
    /// Duration and time range only apply outside the Backlog. A duration
    /// with an out-of-range component, or one entered while the task runs or
    /// below the time already recorded in sessions, is skipped without
    /// failing the edit.
    pub fn edit(&mut self, id: TaskId, edit: &TaskEdit) -> Result<()> {
        let today = self.clock.now().date();
        let task = self.get(id).ok_or(Error::UnknownTask(id))?;
        let timed = task.state != TaskState::Backlog;

        let name = edit
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        let time_spent = match edit.duration.filter(|_| timed) {
            Some(d) => match d.to_seconds() {
                Some(secs) if !task.is_running && secs >= task.session_total() => Some(secs),
                _ => {
                    debug!(%id, ?d, "duration ignored");
                    None
                }
            },
            None => None,
        };

        let window = match edit.time_range.as_ref().filter(|_| timed) {
            Some(range) => {
                let start = time_of_day::parse_optional(&range.start)
                    .map_err(|_| Error::InvalidStartTime(range.start.trim().to_string()))?;
                let end = time_of_day::parse_optional(&range.end)
                    .map_err(|_| Error::InvalidEndTime(range.end.trim().to_string()))?;
                if let (Some(s), Some(e)) = (start, end) {
                    if s > e {
                        return Err(Error::StartAfterEnd);
                    }
                }
                Some((start.map(|t| today.and_time(t)), end.map(|t| today.and_time(t))))
            }
            None => None,
        };

        let task = self.task_mut(id)?;
        if let Some(name) = name {
            task.name = name;
        }
        if let Some(secs) = time_spent {
            task.time_spent = secs;
        }
        if let Some((start, end)) = window {
            task.start_time = start;
            task.end_time = end;
        }
        debug!(%id, "task edited");
        Ok(())
    }

    pub fn delete(&mut self, id: TaskId) -> Result<()> {
        let len_before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == len_before {
            return Err(Error::UnknownTask(id));
        }
        if self.running == Some(id) {
            self.running = None;
        }
        debug!(%id, "task deleted");
        Ok(())
    }

    /// Reorders one column. Listed tasks take the given order, unlisted
    /// tasks of the column follow in their previous order. Other columns
    /// keep their relative order and come first.
    pub fn reorder(&mut self, ids: &[TaskId], state: TaskState) {
        let (mut column, others): (Vec<Task>, Vec<Task>) =
            std::mem::take(&mut self.tasks).into_iter().partition(|t| t.state == state);

        let mut ordered = Vec::with_capacity(column.len());
        for id in ids {
            if let Some(pos) = column.iter().position(|t| t.id == *id) {
                ordered.push(column.remove(pos));
            }
        }
        ordered.extend(column);

        self.tasks = others;
        self.tasks.extend(ordered);
    }

    /// Credits one second to the running task. Returns the task and its new
    /// total, or `None` when nothing runs.
    pub fn tick_running(&mut self) -> Option<(TaskId, u64)> {
        let id = self.running?;
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        task.time_spent += 1;
        Some((id, task.time_spent))
    }
}
