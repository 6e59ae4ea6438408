use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, Focus};

/// Apply one terminal event to the page. Returns true if a redraw is needed.
pub fn handle_event(event: Event, app: &mut App) -> bool {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(key, app),
        Event::Resize(_, _) => true,
        _ => false,
    }
}

fn handle_key(key: KeyEvent, app: &mut App) -> bool {
    // Global keybindings
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
            return false;
        }
        KeyCode::Esc => {
            app.should_quit = true;
            return false;
        }
        KeyCode::Tab | KeyCode::BackTab => {
            app.toggle_focus();
            return true;
        }
        _ => {}
    }

    match app.focus {
        Focus::Search => handle_search_key(key.code, app),
        Focus::Entries => handle_entries_key(key.code, app),
    }
}

fn handle_search_key(code: KeyCode, app: &mut App) -> bool {
    match code {
        KeyCode::Char(c) => {
            app.push_query_char(c);
            true
        }
        KeyCode::Backspace => {
            app.pop_query_char();
            true
        }
        KeyCode::Enter => {
            app.submit_search();
            true
        }
        KeyCode::Down => {
            app.focus = Focus::Entries;
            true
        }
        _ => false,
    }
}

fn handle_entries_key(code: KeyCode, app: &mut App) -> bool {
    match code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            false
        }
        KeyCode::Char('/') => {
            app.focus = Focus::Search;
            true
        }
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Enter | KeyCode::Right => app.open_selected(),
        KeyCode::Backspace | KeyCode::Left => {
            app.navigate_to_parent();
            true
        }
        _ => false,
    }
}
