mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::AppSettings;
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crossterm::event::{self as crossterm_event, Event, KeyEventKind};
use crossterm::{cursor, execute, terminal};
use league_api::client::LeagueApi;
use log::{error, info};
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if handle_cli_args() {
        return Ok(());
    }

    better_panic::install();

    let settings = AppSettings::load();
    let client = LeagueApi::new(&settings.api_url).with_token(settings.token.clone());

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(log::LevelFilter::Error)?;
    tui_logger::set_default_level(log::LevelFilter::Error);

    info!("backend at {}", settings.api_url);
    let app = Arc::new(Mutex::new(App::new(settings)));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(client, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, network_req_tx, network_resp_rx).await;

    input_handler.abort();
    network_task.abort();

    Ok(())
}

fn handle_cli_args() -> bool {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return false;
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            true
        }
        "-V" | "--version" => {
            println!("dodleague {}", env!("CARGO_PKG_VERSION"));
            true
        }
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

fn usage_text() -> &'static str {
    "dodleague - admin console for a Day of Defeat league

Usage:
  dodleague
  dodleague --help
  dodleague --version

Environment:
  LEAGUE_API_URL   Backend base URL (default http://127.0.0.1:8000)
  LEAGUE_TOKEN     Bearer token to use instead of signing in
  LEAGUE_LOG       Log level for the log pane: error|warn|info|debug|trace (default error)

The token from the last sign-in is kept in $XDG_CONFIG_HOME/dodleague/session.json
(or ~/.config/dodleague/session.json)."
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &network_requests).await;
                if should_redraw && !loading.is_loading {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw =
                    handle_network_response(response, &app, &network_requests, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            else => break,
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            let requests = app.lock().await.startup_requests();
            for request in requests {
                let _ = network_requests.send(request).await;
            }
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
            true
        }
        UiEvent::Resize => true,
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    loading: &mut LoadingState,
) -> bool {
    if let NetworkResponse::LoadingStateChanged { loading_state } = response {
        *loading = loading_state;
        return true;
    }

    let mut guard = app.lock().await;
    let follow_up = match response {
        NetworkResponse::LoadingStateChanged { .. } => None,
        NetworkResponse::LoggedIn { token, user } => guard.on_logged_in(token, user),
        NetworkResponse::LoggedOut => {
            guard.on_logged_out();
            None
        }
        NetworkResponse::SessionLoaded { user } => {
            guard.on_session_loaded(user);
            None
        }
        NetworkResponse::DashboardLoaded { summary } => {
            guard.on_dashboard_loaded(summary);
            None
        }
        NetworkResponse::TeamsLoaded { teams } => {
            guard.on_teams_loaded(teams);
            None
        }
        NetworkResponse::TeamLoaded { detail, stats, matches, players } => {
            guard.on_team_loaded(detail, stats, matches, players);
            None
        }
        NetworkResponse::PlayersLoaded { players, teams } => {
            guard.on_players_loaded(players, teams);
            None
        }
        NetworkResponse::PlayerLoaded { detail, history } => {
            guard.on_player_loaded(detail, history);
            None
        }
        NetworkResponse::MatchesLoaded { matches, teams } => {
            guard.on_matches_loaded(matches, teams);
            None
        }
        NetworkResponse::MatchLoaded { detail, players } => {
            guard.on_match_loaded(detail, players);
            None
        }
        NetworkResponse::StatsLoaded { leaderboard, maps, teams, matches } => {
            guard.on_stats_loaded(leaderboard, maps, teams, matches);
            None
        }
        NetworkResponse::MatchSetupLoaded { teams, players } => {
            guard.on_match_setup_loaded(teams, players);
            None
        }
        NetworkResponse::UsersLoaded { users } => {
            guard.on_users_loaded(users);
            None
        }
        NetworkResponse::Saved { message, then, created_match } => {
            guard.on_saved(message, then, created_match)
        }
        NetworkResponse::Unauthorized => {
            guard.on_unauthorized();
            None
        }
        NetworkResponse::Error { message } => {
            error!("Network error: {message}");
            guard.on_error(message);
            None
        }
    };
    drop(guard);

    if let Some(request) = follow_up {
        let _ = network_requests.send(request).await;
    }
    !loading.is_loading
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                    Some(UiEvent::KeyPressed(key_event))
                }
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
