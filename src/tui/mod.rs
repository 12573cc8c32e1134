pub mod app;
pub mod ui;

use std::time::{Duration, Instant};
use std::{error::Error, io};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use app::{App, InputMode};
use ui::ui;

use crate::commands::board_table;

const TICK_RATE: Duration = Duration::from_secs(1);
const IDLE_POLL: Duration = Duration::from_millis(250);

pub fn run_tui(rest_minutes: u32) -> Result<(), Box<dyn Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(rest_minutes);
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{:?}", err)
    }

    // Nothing is kept between runs, so leave a record of the day on screen.
    if !app.board.tasks().is_empty() {
        println!("{}", board_table(&app.board));
    }

    Ok(())
}

/// Drives the board: input is polled until the next second is due, then the
/// board ticks. A new ticker generation re-phases the second boundary.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let mut generation = app.board.tick_generation();
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        if app.board.tick_generation() != generation {
            generation = app.board.tick_generation();
            last_tick = Instant::now();
        }
        let timeout = if app.board.is_ticking() {
            TICK_RATE.saturating_sub(last_tick.elapsed())
        } else {
            IDLE_POLL
        };

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, key.code);
                }
            }
        }

        if app.board.is_ticking()
            && app.board.tick_generation() == generation
            && last_tick.elapsed() >= TICK_RATE
        {
            last_tick += TICK_RATE;
            app.on_tick();
        }
        app.expire_notification();

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, code: KeyCode) {
    match app.input_mode {
        InputMode::Normal => match code {
            KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Down | KeyCode::Char('j') => app.next(),
            KeyCode::Up | KeyCode::Char('k') => app.previous(),
            KeyCode::Left | KeyCode::Char('h') => app.focus_left(),
            KeyCode::Right | KeyCode::Char('l') => app.focus_right(),
            KeyCode::Char('J') => app.shift_selected(true),
            KeyCode::Char('K') => app.shift_selected(false),
            KeyCode::Enter | KeyCode::Char('>') => app.move_selected(true),
            KeyCode::Char('<') => app.move_selected(false),
            KeyCode::Char(' ') => app.toggle_selected(),
            KeyCode::Char('x') => app.complete_selected(),
            KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
            KeyCode::Char('a') => app.start_add(),
            KeyCode::Char('e') => app.start_edit(),
            KeyCode::Char('r') => app.toggle_rest(),
            KeyCode::Char('+') | KeyCode::Char('=') => app.adjust_rest(1),
            KeyCode::Char('-') => app.adjust_rest(-1),
            _ => {}
        },
        InputMode::Editing | InputMode::Adding => match code {
            KeyCode::Enter => app.handle_input(),
            KeyCode::Esc => app.cancel_input(),
            KeyCode::Char(c) => app.input_buffer.push(c),
            KeyCode::Backspace => {
                app.input_buffer.pop();
            }
            _ => {}
        },
    }
}
