// TUI event loop and terminal management
use crate::app::{App, InputMode, FIELD_CATEGORY};
use chrono::Local;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use larder_core::{check_expiry, Exporter, Notifier};
use larder_notify::DesktopNotifier;
use larder_store::Store;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::{Duration, Instant};

/// Default target for the `x` export key, written to the working directory.
const EXPORT_FILE: &str = "food_inventory.csv";

/// Runs the interactive session until the user quits.
///
/// `startup_check_delay` schedules the one-shot expiry check that fires
/// shortly after launch; `None` disables it.
pub fn run_tui(
    mut app: App,
    mut store: Store,
    startup_check_delay: Option<Duration>,
) -> anyhow::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let notifier = DesktopNotifier::new();
    refresh(&mut app, &store);

    let started = Instant::now();
    let mut startup_check_pending = startup_check_delay.is_some();

    // Main loop
    loop {
        terminal.draw(|f| crate::ui::render(f, &mut app))?;

        // One-shot reminder pass shortly after startup.
        if startup_check_pending {
            if let Some(delay) = startup_check_delay {
                if started.elapsed() >= delay {
                    startup_check_pending = false;
                    run_expiry_check(&mut app, &store, &notifier);
                    continue;
                }
            }
        }

        // Poll so the startup check can fire without waiting for a key.
        if !event::poll(Duration::from_millis(200))? {
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match app.input_mode {
                InputMode::Searching => match key.code {
                    KeyCode::Enter | KeyCode::Esc => {
                        app.enter_normal_mode();
                    }
                    KeyCode::Char(c) => {
                        app.search_input.push(c);
                        refresh(&mut app, &store);
                    }
                    KeyCode::Backspace => {
                        app.search_input.pop();
                        refresh(&mut app, &store);
                    }
                    _ => {}
                },
                InputMode::Form => match key.code {
                    KeyCode::Esc => {
                        app.close_form();
                    }
                    KeyCode::Enter => {
                        submit_form(&mut app, &mut store);
                    }
                    KeyCode::Tab | KeyCode::Down => {
                        app.form.next_field();
                    }
                    KeyCode::BackTab | KeyCode::Up => {
                        app.form.previous_field();
                    }
                    KeyCode::Left | KeyCode::Right if app.form.cursor == FIELD_CATEGORY => {
                        app.form.cycle_category();
                    }
                    KeyCode::Char(c) => {
                        app.form.push_char(c);
                    }
                    KeyCode::Backspace => {
                        app.form.backspace();
                    }
                    _ => {}
                },
                InputMode::ConfirmDelete => match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                        confirm_delete(&mut app, &mut store);
                    }
                    _ => {
                        app.cancel_delete();
                    }
                },
                InputMode::Normal => match key.code {
                    KeyCode::Char('q') => {
                        app.quit();
                    }
                    KeyCode::Esc => {
                        app.close_popups();
                    }
                    KeyCode::Char('/') => {
                        app.enter_search_mode();
                    }
                    KeyCode::Char('a') => {
                        app.open_add_form();
                    }
                    KeyCode::Char('e') => {
                        app.open_edit_form();
                    }
                    KeyCode::Char('d') => {
                        app.request_delete();
                    }
                    KeyCode::Char('c') => {
                        app.cycle_category_filter();
                        refresh(&mut app, &store);
                    }
                    KeyCode::Char('s') => {
                        app.cycle_sort();
                        refresh(&mut app, &store);
                    }
                    KeyCode::Char('t') => {
                        app.toggle_theme();
                    }
                    KeyCode::Char('x') => {
                        export_csv(&mut app, &store);
                    }
                    KeyCode::Char('r') => {
                        run_expiry_check(&mut app, &store, &notifier);
                    }
                    KeyCode::Char('i') => {
                        show_statistics(&mut app, &store);
                    }
                    KeyCode::Char('j') | KeyCode::Down => {
                        app.next_item();
                    }
                    KeyCode::Char('k') | KeyCode::Up => {
                        app.previous_item();
                    }
                    _ => {}
                },
            }
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}

/// Re-reads the listing with the current filters. A failed read is the one
/// place the app cannot limp along, so the message says to restart.
fn refresh(app: &mut App, store: &Store) {
    match store.query_items(&app.query()) {
        Ok(items) => app.set_items(items),
        Err(e) => {
            tracing::error!("listing query failed: {e}");
            app.set_error(format!(
                "Error loading data: {e}. Please restart the application."
            ));
        }
    }
}

fn submit_form(app: &mut App, store: &mut Store) {
    let draft = app.form.draft();
    let result = match app.form.editing_id {
        Some(id) => store.update_item(id, &draft).map(|item| (item, "Updated")),
        None => store.add_item(&draft).map(|item| (item, "Added")),
    };
    match result {
        Ok((item, verb)) => {
            app.close_form();
            app.set_status(format!("{verb} {}", item.name));
            refresh(app, store);
        }
        // Validation problems keep the form open for correction.
        Err(e) => app.set_error(e.to_string()),
    }
}

fn confirm_delete(app: &mut App, store: &mut Store) {
    let Some(pending) = app.pending_delete.take() else {
        app.enter_normal_mode();
        return;
    };
    app.enter_normal_mode();
    match store.delete_item(pending.id) {
        Ok(removed) => {
            app.set_status(format!("Deleted '{}'", removed.name));
            refresh(app, store);
        }
        Err(e) => app.set_error(format!("Failed to delete item: {e}")),
    }
}

fn export_csv(app: &mut App, store: &Store) {
    match store.all_items() {
        Ok(items) => match Exporter::export_to_file(&items, EXPORT_FILE) {
            Ok(()) => app.set_status(format!("Exported {} items to {EXPORT_FILE}", items.len())),
            Err(e) => app.set_error(format!("Failed to export data: {e}")),
        },
        Err(e) => app.set_error(format!(
            "Error loading data: {e}. Please restart the application."
        )),
    }
}

fn run_expiry_check(app: &mut App, store: &Store, notifier: &dyn Notifier) {
    let today = Local::now().date_naive();
    match check_expiry(store, notifier, today) {
        Ok(report) if report.is_empty() => {
            app.expiry_report = None;
            app.set_status("No items are expiring soon.");
        }
        Ok(report) => {
            if let Some(warning) = report.warnings.first() {
                app.set_error(format!("Warning: {warning}"));
            }
            app.expiry_report = Some(report);
        }
        Err(e) => app.set_error(format!("Expiry check failed: {e}")),
    }
}

fn show_statistics(app: &mut App, store: &Store) {
    let today = Local::now().date_naive();
    match store.statistics(today) {
        Ok(stats) => app.stats = Some(stats),
        Err(e) => app.set_error(format!(
            "Error loading data: {e}. Please restart the application."
        )),
    }
}
