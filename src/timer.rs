use tracing::{debug, info};

use crate::clock::Clock;
use crate::models::TaskId;
use crate::store::TaskStore;

pub const DEFAULT_REST_MINUTES: u32 = 5;
pub const MIN_REST_MINUTES: u32 = 1;
pub const MAX_REST_MINUTES: u32 = 60;

/// What a tick did, for the presentation layer to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// The rest countdown reached zero and rest mode ended.
    RestComplete,
    /// The running task was credited a second.
    TaskTick { id: TaskId, time_spent: u64 },
}

/// The single 1 Hz tick source and the rest countdown.
///
/// The loop does not own a thread: whoever drives the board calls
/// [`TimerLoop::tick`] once per second while [`TimerLoop::is_ticking`] holds.
/// Every (re)start bumps the generation so the driver can re-phase instead
/// of stacking a second ticker.
#[derive(Debug, Clone)]
pub struct TimerLoop {
    rest_mode: bool,
    rest_time: u64,
    rest_minutes: u32,
    ticking: bool,
    generation: u64,
}

impl Default for TimerLoop {
    fn default() -> Self {
        TimerLoop::new(DEFAULT_REST_MINUTES)
    }
}

impl TimerLoop {
    pub fn new(rest_minutes: u32) -> Self {
        let rest_minutes = rest_minutes.clamp(MIN_REST_MINUTES, MAX_REST_MINUTES);
        TimerLoop {
            rest_mode: false,
            rest_time: rest_minutes as u64 * 60,
            rest_minutes,
            ticking: false,
            generation: 0,
        }
    }

    pub fn is_rest_mode(&self) -> bool {
        self.rest_mode
    }

    /// Remaining rest seconds.
    pub fn rest_time(&self) -> u64 {
        self.rest_time
    }

    pub fn rest_minutes(&self) -> u32 {
        self.rest_minutes
    }

    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Stops any current ticker and starts a fresh one.
    pub fn restart(&mut self) {
        self.stop();
        self.ticking = true;
        self.generation += 1;
        debug!(generation = self.generation, "ticker started");
    }

    pub fn stop(&mut self) {
        if self.ticking {
            debug!(generation = self.generation, "ticker stopped");
        }
        self.ticking = false;
    }

    /// Enters rest mode, pausing whichever task was running.
    pub fn start_rest<C: Clock>(&mut self, store: &mut TaskStore<C>) {
        if let Some(id) = store.running_task_id() {
            if let Err(e) = store.pause(id) {
                debug!(error = %e, "pause before rest ignored");
            }
        }
        self.rest_mode = true;
        self.restart();
        debug!(remaining = self.rest_time, "rest started");
    }

    /// Leaves rest mode and rearms the countdown from the configured minutes.
    pub fn stop_rest(&mut self) {
        self.stop();
        self.rest_mode = false;
        self.reset_rest_time();
        debug!("rest stopped");
    }

    pub fn toggle_rest<C: Clock>(&mut self, store: &mut TaskStore<C>) {
        if self.rest_mode {
            self.stop_rest();
        } else {
            self.start_rest(store);
        }
    }

    /// Sets the rest length, clamped to 1..=60 minutes. An ongoing rest keeps
    /// counting down; the new length applies from the next reset.
    pub fn set_rest_duration_minutes(&mut self, minutes: u32) {
        self.rest_minutes = minutes.clamp(MIN_REST_MINUTES, MAX_REST_MINUTES);
        if !self.rest_mode {
            self.reset_rest_time();
        }
    }

    /// Nudges the rest length by `delta` minutes.
    pub fn adjust_rest_minutes(&mut self, delta: i32) {
        let minutes = (self.rest_minutes as i64 + delta as i64)
            .clamp(MIN_REST_MINUTES as i64, MAX_REST_MINUTES as i64);
        self.set_rest_duration_minutes(minutes as u32);
    }

    fn reset_rest_time(&mut self) {
        self.rest_time = self.rest_minutes as u64 * 60;
    }

    /// One second elapsed.
    pub fn tick<C: Clock>(&mut self, store: &mut TaskStore<C>) -> Option<TimerEvent> {
        if self.rest_mode {
            self.rest_time = self.rest_time.saturating_sub(1);
            if self.rest_time == 0 {
                self.stop_rest();
                info!("rest complete");
                return Some(TimerEvent::RestComplete);
            }
            return None;
        }
        store
            .tick_running()
            .map(|(id, time_spent)| TimerEvent::TaskTick { id, time_spent })
    }
}
