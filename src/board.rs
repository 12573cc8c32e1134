use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::models::{Task, TaskEdit, TaskId, TaskState};
use crate::store::TaskStore;
use crate::timer::{TimerEvent, TimerLoop};

/// The task store and timer loop wired together.
///
/// This is what a front end talks to. Besides forwarding to the store it
/// keeps the ticker honest: restarted when a task run or a rest begins,
/// stopped once neither is active.
pub struct Board<C: Clock = SystemClock> {
    store: TaskStore<C>,
    timer: TimerLoop,
}

impl Default for Board<SystemClock> {
    fn default() -> Self {
        Board::new(SystemClock, crate::timer::DEFAULT_REST_MINUTES)
    }
}

impl<C: Clock> Board<C> {
    pub fn new(clock: C, rest_minutes: u32) -> Self {
        Board { store: TaskStore::new(clock), timer: TimerLoop::new(rest_minutes) }
    }

    pub fn store(&self) -> &TaskStore<C> {
        &self.store
    }

    pub fn timer(&self) -> &TimerLoop {
        &self.timer
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.store.get(id)
    }

    pub fn running_task_id(&self) -> Option<TaskId> {
        self.store.running_task_id()
    }

    pub fn is_rest_mode(&self) -> bool {
        self.timer.is_rest_mode()
    }

    pub fn rest_time(&self) -> u64 {
        self.timer.rest_time()
    }

    pub fn is_ticking(&self) -> bool {
        self.timer.is_ticking()
    }

    pub fn tick_generation(&self) -> u64 {
        self.timer.generation()
    }

    fn settle_ticker(&mut self) {
        if !self.timer.is_rest_mode() && self.store.running_task_id().is_none() {
            self.timer.stop();
        }
    }

    pub fn add(&mut self, name: &str) -> Result<TaskId> {
        self.store.add(name)
    }

    pub fn move_to(&mut self, id: TaskId, state: TaskState) -> Result<()> {
        let res = self.store.move_to(id, state);
        self.settle_ticker();
        res
    }

    /// Starts a task run. Ends rest mode if it was on.
    pub fn start(&mut self, id: TaskId) -> Result<()> {
        let was_running = self.store.running_task_id() == Some(id);
        self.store.start(id)?;
        if was_running {
            return Ok(());
        }
        if self.timer.is_rest_mode() {
            self.timer.stop_rest();
        }
        self.timer.restart();
        Ok(())
    }

    pub fn pause(&mut self, id: TaskId) -> Result<()> {
        let res = self.store.pause(id);
        self.settle_ticker();
        res
    }

    pub fn toggle(&mut self, id: TaskId) -> Result<()> {
        let running = self.task(id).map(|t| t.is_running).unwrap_or(false);
        if running {
            self.pause(id)
        } else {
            self.start(id)
        }
    }

    pub fn toggle_completion(&mut self, id: TaskId) -> Result<()> {
        let res = self.store.toggle_completion(id);
        self.settle_ticker();
        res
    }

    pub fn edit(&mut self, id: TaskId, edit: &TaskEdit) -> Result<()> {
        self.store.edit(id, edit)
    }

    pub fn delete(&mut self, id: TaskId) -> Result<()> {
        let res = self.store.delete(id);
        self.settle_ticker();
        res
    }

    pub fn reorder(&mut self, ids: &[TaskId], state: TaskState) {
        self.store.reorder(ids, state);
    }

    pub fn start_rest(&mut self) {
        self.timer.start_rest(&mut self.store);
    }

    /// Ends rest mode. Does nothing when not resting, so a running task keeps
    /// its ticker.
    pub fn stop_rest(&mut self) {
        if !self.timer.is_rest_mode() {
            return;
        }
        self.timer.stop_rest();
        self.settle_ticker();
    }

    pub fn toggle_rest(&mut self) {
        self.timer.toggle_rest(&mut self.store);
        self.settle_ticker();
    }

    pub fn set_rest_duration_minutes(&mut self, minutes: u32) {
        self.timer.set_rest_duration_minutes(minutes);
    }

    pub fn adjust_rest_minutes(&mut self, delta: i32) {
        self.timer.adjust_rest_minutes(delta);
    }

    /// Advances the board by one second.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        self.timer.tick(&mut self.store)
    }
}
