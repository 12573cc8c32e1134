use std::time::{Duration, Instant};

use ratatui::widgets::TableState;
use tracing::debug;

use crate::board::Board;
use crate::models::{DurationInput, Task, TaskEdit, TaskId, TaskState, TimeRangeInput};
use crate::timer::TimerEvent;

const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

#[derive(PartialEq)]
pub enum InputMode {
    Normal,
    Adding,
    Editing,
}

#[derive(PartialEq, Clone, Copy)]
pub enum InputField {
    Name,
    Duration,
    StartTime,
    EndTime,
}

/// Values collected by the edit prompts before they are submitted together.
#[derive(Default)]
pub struct EditState {
    pub name: String,
    pub duration: Option<DurationInput>,
    pub start: String,
    pub end: String,
}

pub struct App {
    pub board: Board,
    pub focus: TaskState,
    /// Selection per column, indexed like `TaskState::ALL`.
    pub states: [TableState; 3],
    pub input_mode: InputMode,
    pub input_field: InputField,
    pub input_buffer: String,
    /// Task whose edit prompts are open.
    pub target_id: Option<TaskId>,
    pub edit_state: EditState,
    pub notification: Option<(String, Instant)>,
    pub should_quit: bool,
}

fn column_index(state: TaskState) -> usize {
    match state {
        TaskState::Backlog => 0,
        TaskState::Today => 1,
        TaskState::Completed => 2,
    }
}

/// `1:02:03` for the duration prompt.
fn duration_text(seconds: u64) -> String {
    format!("{}:{:02}:{:02}", seconds / 3600, (seconds % 3600) / 60, seconds % 60)
}

fn parse_duration(text: &str) -> Option<DurationInput> {
    let parts: Vec<u32> = text
        .trim()
        .split(':')
        .map(|p| p.trim().parse().ok())
        .collect::<Option<Vec<_>>>()?;
    match parts[..] {
        [h, m, s] => Some(DurationInput::new(h, m, s)),
        [m, s] => Some(DurationInput::new(0, m, s)),
        _ => None,
    }
}

impl App {
    /// Creates an empty board with the given rest length.
    pub fn new(rest_minutes: u32) -> App {
        App {
            board: Board::new(crate::clock::SystemClock, rest_minutes),
            focus: TaskState::Backlog,
            states: Default::default(),
            input_mode: InputMode::Normal,
            input_field: InputField::Name,
            input_buffer: String::new(),
            target_id: None,
            edit_state: EditState::default(),
            notification: None,
            should_quit: false,
        }
    }

    pub fn column(&self, state: TaskState) -> Vec<&Task> {
        self.board.store().tasks_in(state).collect()
    }

    pub fn selected_id(&self) -> Option<TaskId> {
        let i = self.states[column_index(self.focus)].selected()?;
        self.column(self.focus).get(i).map(|t| t.id)
    }

    fn select_id(&mut self, state: TaskState, id: TaskId) {
        let pos = self.column(state).iter().position(|t| t.id == id);
        self.states[column_index(state)].select(pos);
    }

    /// Keeps each column's selection inside its bounds.
    pub fn clamp_selection(&mut self) {
        for state in TaskState::ALL {
            let len = self.column(state).len();
            let table = &mut self.states[column_index(state)];
            match table.selected() {
                _ if len == 0 => table.select(None),
                Some(i) if i >= len => table.select(Some(len - 1)),
                None => table.select(Some(0)),
                _ => {}
            }
        }
    }

    pub fn notify(&mut self, msg: impl Into<String>) {
        self.notification = Some((msg.into(), Instant::now()));
    }

    /// Drops the notification once it has been shown long enough.
    pub fn expire_notification(&mut self) {
        if let Some((_, at)) = &self.notification {
            if at.elapsed() >= NOTIFICATION_TTL {
                self.notification = None;
            }
        }
    }

    /// Selects the next task in the focused column.
    pub fn next(&mut self) {
        let len = self.column(self.focus).len();
        if len == 0 {
            return;
        }
        let table = &mut self.states[column_index(self.focus)];
        let i = match table.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        table.select(Some(i));
    }

    /// Selects the previous task in the focused column.
    pub fn previous(&mut self) {
        let len = self.column(self.focus).len();
        if len == 0 {
            return;
        }
        let table = &mut self.states[column_index(self.focus)];
        let i = match table.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        table.select(Some(i));
    }

    pub fn focus_left(&mut self) {
        if let Some(s) = self.focus.previous() {
            self.focus = s;
        }
    }

    pub fn focus_right(&mut self) {
        if let Some(s) = self.focus.next() {
            self.focus = s;
        }
    }

    /// Moves the selected task one column right (`forward`) or left, and
    /// follows it.
    pub fn move_selected(&mut self, forward: bool) {
        let Some(id) = self.selected_id() else { return };
        let target = if forward { self.focus.next() } else { self.focus.previous() };
        let Some(target) = target else { return };
        if let Err(e) = self.board.move_to(id, target) {
            debug!(error = %e, "move ignored");
            return;
        }
        self.focus = target;
        self.select_id(target, id);
        self.clamp_selection();
    }

    /// Play/pause for the selected task.
    pub fn toggle_selected(&mut self) {
        let Some(id) = self.selected_id() else { return };
        if let Err(e) = self.board.toggle(id) {
            debug!(error = %e, "toggle ignored");
        }
    }

    /// Checks or unchecks the selected task.
    pub fn complete_selected(&mut self) {
        let Some(id) = self.selected_id() else { return };
        if self.board.toggle_completion(id).is_ok() {
            self.clamp_selection();
        }
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected_id() else { return };
        if self.board.delete(id).is_ok() {
            self.clamp_selection();
        }
    }

    /// Swaps the selected task with its neighbour in the focused column.
    pub fn shift_selected(&mut self, down: bool) {
        let Some(i) = self.states[column_index(self.focus)].selected() else { return };
        let mut ids: Vec<TaskId> = self.column(self.focus).iter().map(|t| t.id).collect();
        let j = if down { i + 1 } else { i.wrapping_sub(1) };
        if i >= ids.len() || j >= ids.len() {
            return;
        }
        ids.swap(i, j);
        self.board.reorder(&ids, self.focus);
        self.states[column_index(self.focus)].select(Some(j));
    }

    pub fn toggle_rest(&mut self) {
        self.board.toggle_rest();
    }

    pub fn adjust_rest(&mut self, delta: i32) {
        self.board.adjust_rest_minutes(delta);
        self.notify(format!("Rest length: {} min", self.board.timer().rest_minutes()));
    }

    /// One second of wall time passed while the ticker is active.
    pub fn on_tick(&mut self) {
        if let Some(TimerEvent::RestComplete) = self.board.tick() {
            self.notify("Rest time complete!");
        }
    }

    /// Opens the "Add Task" prompt.
    pub fn start_add(&mut self) {
        self.input_mode = InputMode::Adding;
        self.input_field = InputField::Name;
        self.input_buffer.clear();
    }

    /// Opens the edit prompts for the selected task, starting with its name.
    pub fn start_edit(&mut self) {
        let Some(id) = self.selected_id() else { return };
        let Some(task) = self.board.task(id) else { return };
        let range = task.time_range_input();
        self.edit_state = EditState {
            name: task.name.clone(),
            duration: None,
            start: range.start,
            end: range.end,
        };
        self.input_buffer = task.name.clone();
        self.target_id = Some(id);
        self.input_mode = InputMode::Editing;
        self.input_field = InputField::Name;
    }

    /// Closes any prompt without applying it.
    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
        self.target_id = None;
    }

    /// Handles Enter in a prompt.
    pub fn handle_input(&mut self) {
        match self.input_mode {
            InputMode::Adding => self.handle_adding_input(),
            InputMode::Editing => self.handle_editing_input(),
            InputMode::Normal => {}
        }
    }

    fn handle_adding_input(&mut self) {
        match self.board.add(&self.input_buffer) {
            Ok(id) => {
                self.focus = TaskState::Backlog;
                self.select_id(TaskState::Backlog, id);
            }
            Err(e) => debug!(error = %e, "add ignored"),
        }
        self.cancel_input();
    }

    fn handle_editing_input(&mut self) {
        let Some(id) = self.target_id else {
            self.cancel_input();
            return;
        };
        let Some(task) = self.board.task(id) else {
            self.cancel_input();
            return;
        };
        let timed = task.state != TaskState::Backlog;
        let time_spent = task.time_spent;
        let value = std::mem::take(&mut self.input_buffer);

        match self.input_field {
            InputField::Name => {
                self.edit_state.name = value;
                if !timed {
                    self.submit_edit(id);
                    return;
                }
                self.input_field = InputField::Duration;
                self.input_buffer = duration_text(time_spent);
            }
            InputField::Duration => {
                self.edit_state.duration = parse_duration(&value);
                if self.edit_state.duration.is_none() && !value.trim().is_empty() {
                    self.notify("Invalid duration. Use H:MM:SS");
                }
                self.input_field = InputField::StartTime;
                self.input_buffer = self.edit_state.start.clone();
            }
            InputField::StartTime => {
                self.edit_state.start = value;
                self.input_field = InputField::EndTime;
                self.input_buffer = self.edit_state.end.clone();
            }
            InputField::EndTime => {
                self.edit_state.end = value;
                self.submit_edit(id);
            }
        }
    }

    fn submit_edit(&mut self, id: TaskId) {
        let timed = self.board.task(id).is_some_and(|t| t.state != TaskState::Backlog);
        let edit = TaskEdit {
            name: Some(self.edit_state.name.clone()),
            duration: self.edit_state.duration,
            time_range: timed
                .then(|| TimeRangeInput::new(self.edit_state.start.clone(), self.edit_state.end.clone())),
        };
        match self.board.edit(id, &edit) {
            Ok(()) => self.cancel_input(),
            Err(e) if e.is_edit_rejection() => {
                // stay in the prompts so the times can be corrected
                self.notify(e.to_string());
                self.input_field = InputField::StartTime;
                self.input_buffer = self.edit_state.start.clone();
            }
            Err(e) => {
                debug!(error = %e, "edit ignored");
                self.cancel_input();
            }
        }
    }
}
