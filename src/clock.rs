use std::cell::Cell;
use std::rc::Rc;

use chrono::{Duration, Local, NaiveDateTime};

/// Source of "now" for every timestamp the board records.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Hand-driven clock. Clones share the same instant, so a test can keep one
/// handle and give another to the board.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<NaiveDateTime>>,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        ManualClock { now: Rc::new(Cell::new(start)) }
    }

    pub fn set(&self, at: NaiveDateTime) {
        self.now.set(at);
    }

    pub fn advance_secs(&self, secs: i64) {
        self.now.set(self.now.get() + Duration::seconds(secs));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }
}
