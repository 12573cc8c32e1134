use chrono::{NaiveDate, NaiveDateTime, Timelike};
use taskclock::{DurationInput, Error, ManualClock, TaskEdit, TaskId, TaskState, TaskStore, TimeRangeInput};

fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 14).unwrap().and_hms_opt(h, m, s).unwrap()
}

fn store() -> (TaskStore<ManualClock>, ManualClock) {
    let clock = ManualClock::new(at(9, 0, 0));
    (TaskStore::new(clock.clone()), clock)
}

/// Adds a task and moves it to Today.
fn today(store: &mut TaskStore<ManualClock>, name: &str) -> TaskId {
    let id = store.add(name).unwrap();
    store.move_to(id, TaskState::Today).unwrap();
    id
}

fn run_for(store: &mut TaskStore<ManualClock>, clock: &ManualClock, secs: u64) {
    for _ in 0..secs {
        clock.advance_secs(1);
        store.tick_running();
    }
}

fn assert_invariants(store: &TaskStore<ManualClock>) {
    let running = store.tasks().iter().filter(|t| t.is_running).count();
    assert!(running <= 1, "{running} tasks running");
    assert_eq!(
        store.running_task_id(),
        store.tasks().iter().find(|t| t.is_running).map(|t| t.id)
    );
    for t in store.tasks() {
        assert!(t.session_total() <= t.time_spent, "task {} sessions exceed time spent", t.id);
    }
}

#[test]
fn test_add_creates_backlog_task() {
    let (mut s, _) = store();
    let id = s.add("  Write report ").unwrap();
    let t = s.get(id).unwrap();
    assert_eq!(t.name, "Write report");
    assert_eq!(t.state, TaskState::Backlog);
    assert_eq!(t.time_spent, 0);
    assert!(!t.is_running && !t.is_completed);
    assert!(t.sessions.is_empty());
}

#[test]
fn test_add_rejects_blank_names() {
    let (mut s, _) = store();
    assert_eq!(s.add(""), Err(Error::EmptyName));
    assert_eq!(s.add("   \t"), Err(Error::EmptyName));
    assert!(s.tasks().is_empty());
}

#[test]
fn test_ids_are_unique_and_not_reused() {
    let (mut s, _) = store();
    let a = s.add("A").unwrap();
    let b = s.add("B").unwrap();
    s.delete(b).unwrap();
    let c = s.add("C").unwrap();
    assert_ne!(a, b);
    assert_ne!(b, c);
    assert_ne!(a, c);
}

#[test]
fn test_unknown_ids_are_reported_and_change_nothing() {
    let (mut s, _) = store();
    let id = s.add("A").unwrap();
    let ghost = TaskId(99);
    assert_eq!(s.move_to(ghost, TaskState::Today), Err(Error::UnknownTask(ghost)));
    assert_eq!(s.start(ghost), Err(Error::UnknownTask(ghost)));
    assert_eq!(s.pause(ghost), Err(Error::UnknownTask(ghost)));
    assert_eq!(s.toggle_completion(ghost), Err(Error::UnknownTask(ghost)));
    assert_eq!(s.edit(ghost, &TaskEdit::default()), Err(Error::UnknownTask(ghost)));
    assert_eq!(s.delete(ghost), Err(Error::UnknownTask(ghost)));
    assert_eq!(s.tasks().len(), 1);
    assert_eq!(s.get(id).unwrap().state, TaskState::Backlog);
}

#[test]
fn test_moving_into_today_clears_completion() {
    let (mut s, _) = store();
    let id = today(&mut s, "A");
    s.toggle_completion(id).unwrap();
    assert!(s.get(id).unwrap().is_completed);
    assert_eq!(s.get(id).unwrap().state, TaskState::Completed);

    s.move_to(id, TaskState::Today).unwrap();
    let t = s.get(id).unwrap();
    assert!(!t.is_completed);
    assert_eq!(t.state, TaskState::Today);
}

#[test]
fn test_start_requires_today() {
    let (mut s, _) = store();
    let id = s.add("A").unwrap();
    assert_eq!(s.start(id), Err(Error::NotScheduledToday(id)));
    assert!(!s.get(id).unwrap().is_running);
    assert_eq!(s.running_task_id(), None);
}

#[test]
fn test_start_stamps_run_window() {
    let (mut s, clock) = store();
    let id = today(&mut s, "A");
    s.start(id).unwrap();
    let t = s.get(id).unwrap();
    assert!(t.is_running);
    assert_eq!(t.current_session_start_time, Some(at(9, 0, 0)));
    assert_eq!(t.start_time, Some(at(9, 0, 0)));
    assert_eq!(t.end_time, None);
    assert_eq!(s.running_task_id(), Some(id));

    // starting again does not restart the session
    clock.advance_secs(10);
    s.start(id).unwrap();
    assert_eq!(s.get(id).unwrap().current_session_start_time, Some(at(9, 0, 0)));
}

#[test]
fn test_pause_records_session() {
    let (mut s, clock) = store();
    let id = today(&mut s, "A");
    s.start(id).unwrap();
    run_for(&mut s, &clock, 5);
    s.pause(id).unwrap();

    let t = s.get(id).unwrap();
    assert!(!t.is_running);
    assert_eq!(t.end_time, Some(at(9, 0, 5)));
    assert_eq!(t.current_session_start_time, None);
    assert_eq!(t.sessions.len(), 1);
    assert_eq!(t.sessions[0].duration, 5);
    assert_eq!(t.sessions[0].start_time, at(9, 0, 0));
    assert_eq!(t.sessions[0].end_time, at(9, 0, 5));
    assert_eq!(s.running_task_id(), None);
}

#[test]
fn test_double_pause_appends_once() {
    let (mut s, clock) = store();
    let id = today(&mut s, "A");
    s.start(id).unwrap();
    run_for(&mut s, &clock, 3);
    s.pause(id).unwrap();
    clock.advance_secs(60);
    s.pause(id).unwrap();
    let t = s.get(id).unwrap();
    assert_eq!(t.sessions.len(), 1);
    assert_eq!(t.end_time, Some(at(9, 0, 3)));
}

#[test]
fn test_pause_closes_an_open_window() {
    let (mut s, clock) = store();
    let id = today(&mut s, "A");
    let edit = TaskEdit {
        time_range: Some(TimeRangeInput::new("8:30 AM", "--:--")),
        ..Default::default()
    };
    s.edit(id, &edit).unwrap();
    assert_eq!(s.get(id).unwrap().end_time, None);

    clock.advance_secs(60);
    s.pause(id).unwrap();
    let t = s.get(id).unwrap();
    assert_eq!(t.start_time, Some(at(8, 30, 0)));
    assert_eq!(t.end_time, Some(at(9, 1, 0)));
    assert!(t.sessions.is_empty());
}

#[test]
fn test_pause_without_elapsed_time_records_nothing() {
    let (mut s, _) = store();
    let id = today(&mut s, "A");
    s.start(id).unwrap();
    s.pause(id).unwrap();
    assert!(s.get(id).unwrap().sessions.is_empty());
}

#[test]
fn test_sessions_accumulate_per_run() {
    let (mut s, clock) = store();
    let id = today(&mut s, "A");
    for secs in [4, 7, 2] {
        s.start(id).unwrap();
        run_for(&mut s, &clock, secs);
        s.pause(id).unwrap();
        clock.advance_secs(30);
    }
    let t = s.get(id).unwrap();
    let durations: Vec<u64> = t.sessions.iter().map(|x| x.duration).collect();
    assert_eq!(durations, [4, 7, 2]);
    assert_eq!(t.time_spent, 13);
    assert_eq!(t.session_total(), 13);
}

#[test]
fn test_starting_another_task_pauses_the_first() {
    let (mut s, clock) = store();
    let a = today(&mut s, "A");
    let b = today(&mut s, "B");
    s.start(a).unwrap();
    run_for(&mut s, &clock, 4);
    s.start(b).unwrap();

    let ta = s.get(a).unwrap();
    assert!(!ta.is_running);
    assert_eq!(ta.sessions.len(), 1);
    assert_eq!(ta.sessions[0].duration, 4);
    assert!(s.get(b).unwrap().is_running);
    assert_eq!(s.running_task_id(), Some(b));
    assert_invariants(&s);
}

#[test]
fn test_toggle_flips_between_start_and_pause() {
    let (mut s, clock) = store();
    let id = today(&mut s, "A");
    s.toggle(id).unwrap();
    assert!(s.get(id).unwrap().is_running);
    run_for(&mut s, &clock, 2);
    s.toggle(id).unwrap();
    assert!(!s.get(id).unwrap().is_running);
    assert_eq!(s.get(id).unwrap().sessions.len(), 1);
}

#[test]
fn test_completion_pauses_and_backfills_end_time() {
    let (mut s, clock) = store();
    let id = today(&mut s, "A");
    s.start(id).unwrap();
    run_for(&mut s, &clock, 6);
    s.toggle_completion(id).unwrap();

    let t = s.get(id).unwrap();
    assert!(!t.is_running);
    assert!(t.is_completed);
    assert_eq!(t.state, TaskState::Completed);
    assert_eq!(t.end_time, Some(at(9, 0, 6)));
    assert_eq!(t.sessions.len(), 1);
    assert_eq!(s.running_task_id(), None);

    // unchecking leaves it in the Completed column
    s.toggle_completion(id).unwrap();
    let t = s.get(id).unwrap();
    assert!(!t.is_completed);
    assert_eq!(t.state, TaskState::Completed);
}

#[test]
fn test_completion_backfills_end_time_for_open_window() {
    let (mut s, clock) = store();
    let id = s.add("A").unwrap();
    s.move_to(id, TaskState::Completed).unwrap();
    s.edit(id, &TaskEdit { time_range: Some(TimeRangeInput::new("8:00 AM", "")), ..Default::default() })
        .unwrap();
    clock.set(at(10, 30, 0));
    s.toggle_completion(id).unwrap();
    assert_eq!(s.get(id).unwrap().end_time, Some(at(10, 30, 0)));
}

#[test]
fn test_moving_running_task_out_of_today_pauses_it() {
    let (mut s, clock) = store();
    let id = today(&mut s, "A");
    s.start(id).unwrap();
    run_for(&mut s, &clock, 3);
    s.move_to(id, TaskState::Backlog).unwrap();
    let t = s.get(id).unwrap();
    assert!(!t.is_running);
    assert_eq!(t.sessions.len(), 1);
    assert_eq!(s.running_task_id(), None);
    assert_eq!(s.tick_running(), None);
}

#[test]
fn test_delete_clears_running_pointer() {
    let (mut s, clock) = store();
    let id = today(&mut s, "A");
    s.start(id).unwrap();
    run_for(&mut s, &clock, 2);
    s.delete(id).unwrap();
    assert!(s.get(id).is_none());
    assert_eq!(s.running_task_id(), None);
    assert_eq!(s.tick_running(), None);
}

#[test]
fn test_reorder_within_column() {
    let (mut s, _) = store();
    let a = s.add("A").unwrap();
    let t1 = today(&mut s, "T1");
    let b = s.add("B").unwrap();
    let c = s.add("C").unwrap();
    let t2 = today(&mut s, "T2");

    s.reorder(&[c, a, TaskId(404), t1], TaskState::Backlog);

    let backlog: Vec<TaskId> = s.tasks_in(TaskState::Backlog).map(|t| t.id).collect();
    assert_eq!(backlog, [c, a, b]);
    let today: Vec<TaskId> = s.tasks_in(TaskState::Today).map(|t| t.id).collect();
    assert_eq!(today, [t1, t2]);
    // other columns come first, in their previous order
    let all: Vec<TaskId> = s.tasks().iter().map(|t| t.id).collect();
    assert_eq!(all, [t1, t2, c, a, b]);
}

#[test]
fn test_edit_duration_boundaries() {
    let (mut s, _) = store();
    let id = today(&mut s, "A");

    let max = TaskEdit { duration: Some(DurationInput::new(23, 59, 59)), ..Default::default() };
    s.edit(id, &max).unwrap();
    assert_eq!(s.get(id).unwrap().time_spent, 86_399);

    for bad in [DurationInput::new(24, 0, 0), DurationInput::new(1, 60, 0), DurationInput::new(1, 0, 60)] {
        let edit = TaskEdit { duration: Some(bad), ..Default::default() };
        assert_eq!(s.edit(id, &edit), Ok(()));
        assert_eq!(s.get(id).unwrap().time_spent, 86_399);
    }
}

#[test]
fn test_edit_ignores_duration_in_backlog_and_while_running() {
    let (mut s, clock) = store();
    let id = s.add("A").unwrap();
    let edit = TaskEdit { duration: Some(DurationInput::new(1, 0, 0)), ..Default::default() };
    s.edit(id, &edit).unwrap();
    assert_eq!(s.get(id).unwrap().time_spent, 0);

    s.move_to(id, TaskState::Today).unwrap();
    s.start(id).unwrap();
    run_for(&mut s, &clock, 3);
    s.edit(id, &edit).unwrap();
    assert_eq!(s.get(id).unwrap().time_spent, 3);
}

#[test]
fn test_edit_cannot_drop_below_recorded_sessions() {
    let (mut s, clock) = store();
    let id = today(&mut s, "A");
    s.start(id).unwrap();
    run_for(&mut s, &clock, 90);
    s.pause(id).unwrap();

    let edit = TaskEdit { duration: Some(DurationInput::new(0, 1, 0)), ..Default::default() };
    s.edit(id, &edit).unwrap();
    assert_eq!(s.get(id).unwrap().time_spent, 90);

    let edit = TaskEdit { duration: Some(DurationInput::new(0, 2, 0)), ..Default::default() };
    s.edit(id, &edit).unwrap();
    assert_eq!(s.get(id).unwrap().time_spent, 120);
    assert_invariants(&s);
}

#[test]
fn test_edit_name_and_times() {
    let (mut s, _) = store();
    let id = today(&mut s, "A");
    let edit = TaskEdit {
        name: Some("  Renamed  ".into()),
        duration: None,
        time_range: Some(TimeRangeInput::new("9:15 am", "13:45")),
    };
    s.edit(id, &edit).unwrap();
    let t = s.get(id).unwrap();
    assert_eq!(t.name, "Renamed");
    assert_eq!(t.start_time, Some(at(9, 15, 0)));
    assert_eq!(t.end_time, Some(at(13, 45, 0)));
    assert_eq!(t.window_label(), "9:15 AM - 1:45 PM");
}

#[test]
fn test_edit_blank_name_keeps_old_one() {
    let (mut s, _) = store();
    let id = s.add("Keep").unwrap();
    s.edit(id, &TaskEdit { name: Some("   ".into()), ..Default::default() }).unwrap();
    assert_eq!(s.get(id).unwrap().name, "Keep");
}

#[test]
fn test_edit_blank_times_clear_window() {
    let (mut s, clock) = store();
    let id = today(&mut s, "A");
    s.start(id).unwrap();
    run_for(&mut s, &clock, 1);
    s.pause(id).unwrap();
    s.edit(id, &TaskEdit { time_range: Some(TimeRangeInput::new("", "--:--")), ..Default::default() })
        .unwrap();
    let t = s.get(id).unwrap();
    assert_eq!(t.start_time, None);
    assert_eq!(t.end_time, None);
    assert_eq!(t.window_label(), "--:-- - --:--");
}

#[test]
fn test_edit_rejections_are_atomic() {
    let (mut s, _) = store();
    let id = today(&mut s, "Original");
    let before = s.get(id).unwrap().clone();

    let cases = [
        (TimeRangeInput::new("25:00", "1:00 PM"), "invalid-start-time"),
        (TimeRangeInput::new("1:00 PM", "half past"), "invalid-end-time"),
        (TimeRangeInput::new("11:55 PM", "12:30 PM"), "start-after-end"),
    ];
    for (range, reason) in cases {
        let edit = TaskEdit {
            name: Some("Changed".into()),
            duration: Some(DurationInput::new(1, 2, 3)),
            time_range: Some(range),
        };
        let err = s.edit(id, &edit).unwrap_err();
        assert_eq!(err.reason(), reason);
        assert!(err.is_edit_rejection());
        assert_eq!(s.get(id).unwrap(), &before);
    }
}

#[test]
fn test_edit_equal_start_and_end_is_allowed() {
    let (mut s, _) = store();
    let id = today(&mut s, "A");
    let edit = TaskEdit { time_range: Some(TimeRangeInput::new("12:00 PM", "12:00")), ..Default::default() };
    s.edit(id, &edit).unwrap();
    let t = s.get(id).unwrap();
    assert_eq!(t.start_time.map(|x| x.hour()), Some(12));
    assert_eq!(t.start_time, t.end_time);
}

#[test]
fn test_invariants_hold_over_mixed_operations() {
    let (mut s, clock) = store();
    let ids: Vec<TaskId> = (0..4).map(|i| today(&mut s, &format!("T{i}"))).collect();
    for round in 0..12usize {
        let id = ids[round % ids.len()];
        match round % 4 {
            0 | 1 => {
                s.start(id).unwrap();
            }
            2 => {
                s.pause(id).unwrap();
            }
            _ => {
                s.toggle(id).unwrap();
            }
        }
        run_for(&mut s, &clock, (round as u64 % 3) + 1);
        assert_invariants(&s);
    }
    s.toggle_completion(ids[0]).unwrap();
    s.delete(ids[1]).unwrap();
    assert_invariants(&s);
}
