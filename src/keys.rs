use crate::app::{App, MenuItem};
use crate::state::app_state::Overlay;
use crate::state::load_match::LoadFocus;
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;

    if let (Char('c'), KeyModifiers::CONTROL) = (key_event.code, key_event.modifiers) {
        crate::cleanup_terminal();
        std::process::exit(0);
    }

    let app_ref: &mut App = &mut guard;
    let request = if app_ref.state.login.is_some() {
        handle_form_keys(app_ref, key_event, true)
    } else {
        match app_ref.state.overlay {
            Some(Overlay::Form(_)) => handle_form_keys(app_ref, key_event, false),
            Some(Overlay::Confirm(_)) => handle_confirm_keys(app_ref, key_event),
            Some(Overlay::Picker(_)) => handle_picker_keys(app_ref, key_event),
            None if app_ref.state.active_tab == MenuItem::LoadMatch => {
                handle_load_match_keys(app_ref, key_event)
            }
            None => handle_screen_keys(app_ref, key_event),
        }
    };

    drop(guard);
    if let Some(request) = request {
        let _ = network_requests.send(request).await;
    }
}

fn handle_form_keys(app: &mut App, key_event: KeyEvent, login: bool) -> Option<NetworkRequest> {
    if key_event.code == KeyCode::Enter {
        return app.submit_form();
    }
    if key_event.code == KeyCode::Esc {
        if login {
            crate::cleanup_terminal();
            std::process::exit(0);
        }
        app.close_overlay();
        return None;
    }
    let form = app.active_form()?;
    match (key_event.code, key_event.modifiers) {
        (KeyCode::Tab | KeyCode::Down, _) => form.focus_next(),
        (KeyCode::BackTab | KeyCode::Up, _) => form.focus_prev(),
        (KeyCode::Backspace, _) => form.backspace(),
        (KeyCode::Left, _) => form.cycle(false),
        (KeyCode::Right, _) => form.cycle(true),
        (Char(' '), _) if !form.accepts_text() => form.cycle(true),
        (Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) if form.accepts_text() => {
            form.push_char(c)
        }
        _ => {}
    }
    None
}

fn handle_confirm_keys(app: &mut App, key_event: KeyEvent) -> Option<NetworkRequest> {
    match key_event.code {
        Char('y') | Char('Y') | KeyCode::Enter => app.confirm(),
        Char('n') | Char('N') | KeyCode::Esc => {
            app.close_overlay();
            None
        }
        _ => None,
    }
}

fn handle_picker_keys(app: &mut App, key_event: KeyEvent) -> Option<NetworkRequest> {
    match key_event.code {
        Char('j') | KeyCode::Down => app.move_picker(true),
        Char('k') | KeyCode::Up => app.move_picker(false),
        KeyCode::Enter => return app.accept_pick(),
        KeyCode::Esc => app.close_overlay(),
        _ => {}
    }
    None
}

fn handle_load_match_keys(app: &mut App, key_event: KeyEvent) -> Option<NetworkRequest> {
    let lm = &mut app.state.load_match;
    match (lm.focus, key_event.code, key_event.modifiers) {
        (_, Char('s'), KeyModifiers::CONTROL) => return app.load_match_submit(),
        (_, Char('n'), KeyModifiers::CONTROL) => {
            app.load_match_reset();
            return None;
        }
        (_, KeyCode::Tab, _) => lm.focus_next(),
        (_, KeyCode::BackTab, _) => lm.focus_prev(),
        (_, KeyCode::Backspace, _) => lm.backspace(),
        (_, Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) if lm.captures_text() => {
            lm.push_char(c)
        }
        (_, Char(c), _) if c.is_ascii_digit() && lm.captures_digits() => lm.push_char(c),
        (LoadFocus::Type, KeyCode::Enter | Char(' ') | KeyCode::Left | KeyCode::Right, _) => {
            lm.cycle_type()
        }
        (LoadFocus::Team(_) | LoadFocus::Map, KeyCode::Enter, _) => app.load_match_pick(false),
        (LoadFocus::Score(_) | LoadFocus::Lineup(_), Char('+') | Char('='), _) => lm.bump(true),
        (LoadFocus::Score(_) | LoadFocus::Lineup(_), Char('-'), _) => lm.bump(false),
        (LoadFocus::Lineup(_), Char('a') | KeyCode::Enter, _) => app.load_match_pick(false),
        (LoadFocus::Lineup(_), Char('r'), _) => app.load_match_pick(true),
        (LoadFocus::Lineup(_), Char('x') | KeyCode::Delete, _) => lm.remove_selected(),
        (LoadFocus::Lineup(_), Char('h'), _) => lm.toggle_half(),
        (LoadFocus::Lineup(_), KeyCode::Left, _) => lm.column = lm.column.prev(),
        (LoadFocus::Lineup(_), KeyCode::Right, _) => lm.column = lm.column.next(),
        (LoadFocus::Lineup(_), Char('j') | KeyCode::Down, _) => lm.move_row(true),
        (LoadFocus::Lineup(_), Char('k') | KeyCode::Up, _) => lm.move_row(false),
        _ => return handle_screen_keys(app, key_event),
    }
    None
}

fn handle_screen_keys(app: &mut App, key_event: KeyEvent) -> Option<NetworkRequest> {
    match (app.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char('1'), _) => return app.update_tab(MenuItem::Dashboard),
        (_, Char('2'), _) => return app.update_tab(MenuItem::Teams),
        (_, Char('3'), _) => return app.update_tab(MenuItem::Players),
        (_, Char('4'), _) => return app.update_tab(MenuItem::Matches),
        (_, Char('5'), _) => return app.update_tab(MenuItem::Stats),
        (_, Char('6'), _) => return app.update_tab(MenuItem::LoadMatch),
        (_, Char('7'), _) => return app.update_tab(MenuItem::Users),
        (_, Char('?'), _) => return app.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => app.exit_help(),

        // Lists
        (_, Char('j') | KeyCode::Down, _) => app.move_selection(true),
        (_, Char('k') | KeyCode::Up, _) => app.move_selection(false),
        (_, KeyCode::Enter, _) => return app.open_selected(),
        (_, KeyCode::Esc, _) => return app.go_back(),
        (_, Char('r'), _) => return app.reload_request(),

        // Admin
        (_, Char('n'), _) => app.new_item(),
        (_, Char('e'), _) => app.edit_item(),
        (_, Char('d'), _) => app.delete_item(),
        (MenuItem::TeamDetail, Char('a'), _) => app.recruit_player(),
        (MenuItem::TeamDetail, Char('x'), _) => app.remove_from_team(),
        (MenuItem::MatchDetail, Char('s'), _) => app.add_stat(),
        (MenuItem::Matches, Char('t'), _) => return app.cycle_match_filter(),

        // Stats
        (MenuItem::Stats, Char('v'), _) => app.stats_next_view(),
        (MenuItem::Stats, Char('s'), _) => app.stats_cycle_sort(),
        (MenuItem::Stats, Char('o'), _) => app.stats_toggle_order(),

        // Global
        (_, Char('L'), _) => return Some(app.logout()),
        (_, Char('f'), _) => app.toggle_full_screen(),
        (_, Char('"'), _) => app.toggle_show_logs(),

        _ => {}
    }
    None
}
