use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, Confirm, Overlay, PickPurpose, Picker, StatsView};
use crate::state::form::{Form, FormAction};
use crate::state::load_match::{DraftPick, LoadFocus};
use crate::state::messages::{AfterSave, Mutation, NetworkRequest};
use chrono::Local;
use league_api::aggregate::PlayerMatchHistoryRow;
use league_api::{
    DashboardSummary, LeaderboardEntry, MapPlayCount, Match, MatchDetail, Player, PlayerDetail,
    Team, TeamDetail, TeamRecordStats, User,
};
use log::{debug, info};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum MenuItem {
    #[default]
    Dashboard,
    Teams,
    TeamDetail,
    Players,
    PlayerDetail,
    Matches,
    MatchDetail,
    Stats,
    LoadMatch,
    Users,
    Help,
}

impl MenuItem {
    /// The list screen a detail screen returns to.
    pub fn parent(self) -> Self {
        match self {
            MenuItem::TeamDetail => MenuItem::Teams,
            MenuItem::PlayerDetail => MenuItem::Players,
            MenuItem::MatchDetail => MenuItem::Matches,
            other => other,
        }
    }
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        let app = Self {
            state: AppState::new(settings.token.is_some()),
            settings,
        };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    /// Requests issued once the UI is up. Nothing is fetched before login.
    pub fn startup_requests(&self) -> Vec<NetworkRequest> {
        if self.state.login.is_some() {
            return Vec::new();
        }
        vec![NetworkRequest::LoadSession, NetworkRequest::LoadDashboard]
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_logged_in(&mut self, token: String, user: User) -> Option<NetworkRequest> {
        info!("signed in as {}", user.username);
        self.settings.save_session(&token, &user.username);
        self.state.login = None;
        self.state.user = Some(user);
        self.state.last_error = None;
        self.state.active_tab = MenuItem::Dashboard;
        self.reload_request()
    }

    pub fn on_logged_out(&mut self) {
        self.settings.clear_session();
        self.state.user = None;
        self.state.overlay = None;
        self.state.status = None;
        self.state.login = Some(Form::login());
    }

    pub fn on_session_loaded(&mut self, user: User) {
        debug!("session belongs to {}", user.username);
        self.state.user = Some(user);
    }

    pub fn on_unauthorized(&mut self) {
        self.on_logged_out();
        if let Some(login) = self.state.login.as_mut() {
            login.error = Some("Session expired, please sign in again".to_string());
        }
    }

    pub fn on_dashboard_loaded(&mut self, summary: DashboardSummary) {
        self.state.last_error = None;
        self.state.dashboard.summary = Some(summary);
    }

    pub fn on_teams_loaded(&mut self, teams: Vec<Team>) {
        self.state.last_error = None;
        self.state.teams.load(teams);
    }

    pub fn on_team_loaded(
        &mut self,
        detail: TeamDetail,
        stats: TeamRecordStats,
        matches: Vec<Match>,
        players: Vec<Player>,
    ) {
        self.state.last_error = None;
        self.state.team_detail.load(detail, stats, matches, players);
    }

    pub fn on_players_loaded(&mut self, players: Vec<Player>, teams: Vec<Team>) {
        self.state.last_error = None;
        self.state.players.load(players, teams);
    }

    pub fn on_player_loaded(&mut self, detail: PlayerDetail, history: Vec<PlayerMatchHistoryRow>) {
        self.state.last_error = None;
        self.state.player_detail.load(detail, history);
    }

    pub fn on_matches_loaded(&mut self, matches: Vec<Match>, teams: Vec<Team>) {
        self.state.last_error = None;
        self.state.matches.load(matches, teams);
    }

    pub fn on_match_loaded(&mut self, detail: MatchDetail, players: Vec<Player>) {
        self.state.last_error = None;
        self.state.match_detail.load(detail, players);
    }

    pub fn on_stats_loaded(
        &mut self,
        leaderboard: Vec<LeaderboardEntry>,
        maps: Vec<MapPlayCount>,
        teams: Vec<Team>,
        matches: Vec<Match>,
    ) {
        self.state.last_error = None;
        self.state.stats.load(leaderboard, maps, &teams, &matches);
    }

    pub fn on_match_setup_loaded(&mut self, teams: Vec<Team>, players: Vec<Player>) {
        self.state.last_error = None;
        self.state.load_match.load(teams, players);
    }

    pub fn on_users_loaded(&mut self, users: Vec<User>) {
        self.state.last_error = None;
        self.state.users.load(users);
    }

    pub fn on_saved(
        &mut self,
        message: String,
        then: AfterSave,
        created_match: Option<i64>,
    ) -> Option<NetworkRequest> {
        info!("{message}");
        self.state.overlay = None;
        self.state.last_error = None;
        let request = match (then, created_match) {
            (AfterSave::OpenCreatedMatch, Some(id)) => {
                self.state.load_match.reset(Local::now().date_naive());
                self.open(MenuItem::MatchDetail);
                self.state.match_detail.match_id = Some(id);
                Some(NetworkRequest::LoadMatch { id })
            }
            (AfterSave::Back(tab), _) => {
                self.open(tab);
                self.reload_request()
            }
            _ => self.reload_request(),
        };
        self.state.status = Some(message);
        request
    }

    /// Routes an error to whatever the user is looking at: the open form, or the screen.
    pub fn on_error(&mut self, message: String) {
        if let Some(login) = self.state.login.as_mut() {
            login.error = Some(message);
            return;
        }
        match self.state.overlay.as_mut() {
            Some(Overlay::Form(form)) => form.error = Some(message),
            _ => {
                self.state.overlay = None;
                if self.state.active_tab == MenuItem::LoadMatch {
                    self.state.load_match.error = Some(message.clone());
                }
                self.state.last_error = Some(message);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) -> Option<NetworkRequest> {
        if self.state.active_tab == next {
            return None;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
        self.state.status = None;
        self.state.last_error = None;
        if next == MenuItem::LoadMatch && self.state.load_match.date_text.is_empty() {
            self.state.load_match.reset(Local::now().date_naive());
        }
        self.reload_request()
    }

    fn open(&mut self, next: MenuItem) {
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
        self.state.status = None;
        self.state.last_error = None;
    }

    /// The fetch that refreshes the active screen.
    pub fn reload_request(&self) -> Option<NetworkRequest> {
        let s = &self.state;
        match s.active_tab {
            MenuItem::Dashboard => Some(NetworkRequest::LoadDashboard),
            MenuItem::Teams => Some(NetworkRequest::LoadTeams),
            MenuItem::TeamDetail => s.team_detail.team_id.map(|id| NetworkRequest::LoadTeam { id }),
            MenuItem::Players => Some(NetworkRequest::LoadPlayers),
            MenuItem::PlayerDetail => {
                s.player_detail.player_id.map(|id| NetworkRequest::LoadPlayer { id })
            }
            MenuItem::Matches => Some(NetworkRequest::LoadMatches { filter: s.matches.filter }),
            MenuItem::MatchDetail => s.match_detail.match_id.map(|id| NetworkRequest::LoadMatch { id }),
            MenuItem::Stats => Some(NetworkRequest::LoadStats { sort: s.stats.sort, order: s.stats.order }),
            MenuItem::LoadMatch => Some(NetworkRequest::LoadMatchSetup),
            MenuItem::Users => Some(NetworkRequest::LoadUsers),
            MenuItem::Help => None,
        }
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn go_back(&mut self) -> Option<NetworkRequest> {
        let parent = self.state.active_tab.parent();
        if parent == self.state.active_tab {
            return None;
        }
        self.open(parent);
        self.reload_request()
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    pub fn logout(&mut self) -> NetworkRequest {
        info!("signing out");
        NetworkRequest::Logout
    }

    // -----------------------------------------------------------------------
    // List navigation
    // -----------------------------------------------------------------------

    pub fn move_selection(&mut self, down: bool) {
        let s = &mut self.state;
        let (cursor, len) = match s.active_tab {
            MenuItem::Teams => (&mut s.teams.cursor, s.teams.teams.len()),
            MenuItem::TeamDetail => {
                let len = s.team_detail.roster().len();
                (&mut s.team_detail.cursor, len)
            }
            MenuItem::Players => (&mut s.players.cursor, s.players.players.len()),
            MenuItem::PlayerDetail => (&mut s.player_detail.cursor, s.player_detail.history.len()),
            MenuItem::Matches => (&mut s.matches.cursor, s.matches.matches.len()),
            MenuItem::Stats => {
                let len = s.stats.rows();
                (&mut s.stats.cursor, len)
            }
            MenuItem::Users => (&mut s.users.cursor, s.users.users.len()),
            MenuItem::LoadMatch => {
                s.load_match.move_row(down);
                return;
            }
            _ => return,
        };
        if down {
            cursor.down(len);
        } else {
            cursor.up();
        }
    }

    /// Opens the detail screen for the highlighted row.
    pub fn open_selected(&mut self) -> Option<NetworkRequest> {
        let s = &self.state;
        let (tab, request) = match s.active_tab {
            MenuItem::Teams => {
                let id = s.teams.selected()?.id;
                (MenuItem::TeamDetail, NetworkRequest::LoadTeam { id })
            }
            MenuItem::TeamDetail => {
                let id = s.team_detail.selected_player()?.id;
                (MenuItem::PlayerDetail, NetworkRequest::LoadPlayer { id })
            }
            MenuItem::Players => {
                let id = s.players.selected()?.id;
                (MenuItem::PlayerDetail, NetworkRequest::LoadPlayer { id })
            }
            MenuItem::PlayerDetail => {
                let id = s.player_detail.selected_match()?;
                (MenuItem::MatchDetail, NetworkRequest::LoadMatch { id })
            }
            MenuItem::Matches => {
                let id = s.matches.selected()?.id;
                (MenuItem::MatchDetail, NetworkRequest::LoadMatch { id })
            }
            MenuItem::Stats => match s.stats.view {
                StatsView::Leaderboard => {
                    let id = s.stats.leaderboard.get(s.stats.cursor.selected)?.id;
                    (MenuItem::PlayerDetail, NetworkRequest::LoadPlayer { id })
                }
                StatsView::Standings => {
                    let id = s.stats.standings.get(s.stats.cursor.selected)?.team.id;
                    (MenuItem::TeamDetail, NetworkRequest::LoadTeam { id })
                }
                StatsView::Maps => return None,
            },
            _ => return None,
        };
        self.open(tab);
        match &request {
            NetworkRequest::LoadTeam { id } => {
                self.state.team_detail.team_id = Some(*id);
                self.state.team_detail.cursor = Default::default();
            }
            NetworkRequest::LoadPlayer { id } => {
                self.state.player_detail.player_id = Some(*id);
                self.state.player_detail.cursor = Default::default();
            }
            NetworkRequest::LoadMatch { id } => self.state.match_detail.match_id = Some(*id),
            _ => {}
        }
        Some(request)
    }

    pub fn cycle_match_filter(&mut self) -> Option<NetworkRequest> {
        self.state.matches.filter.cycle_type();
        self.state.matches.cursor = Default::default();
        self.reload_request()
    }

    // -----------------------------------------------------------------------
    // Admin actions: forms and confirmations
    // -----------------------------------------------------------------------

    fn show_form(&mut self, form: Form) {
        self.state.status = None;
        self.state.overlay = Some(Overlay::Form(form));
    }

    pub fn new_item(&mut self) {
        let s = &self.state;
        let form = match s.active_tab {
            MenuItem::Teams => Form::new_team(),
            MenuItem::Players => Form::new_player(&s.players.teams),
            MenuItem::Matches => Form::new_match(&s.matches.teams),
            MenuItem::Users => Form::new_user(),
            _ => return,
        };
        self.show_form(form);
    }

    pub fn edit_item(&mut self) {
        let s = &self.state;
        let form = match s.active_tab {
            MenuItem::Teams => s.teams.selected().map(Form::edit_team),
            MenuItem::TeamDetail => s.team_detail.detail.as_ref().map(|d| Form::edit_team(&d.team)),
            MenuItem::Players => s.players.selected().map(|p| Form::edit_player(p, &s.players.teams)),
            MenuItem::Matches => s.matches.selected().map(Form::edit_match),
            MenuItem::MatchDetail => s.match_detail.detail.as_ref().map(|d| Form::edit_match(&d.summary)),
            MenuItem::Users => s.users.selected().map(Form::edit_user),
            _ => None,
        };
        if let Some(form) = form {
            self.show_form(form);
        }
    }

    pub fn delete_item(&mut self) {
        let s = &self.state;
        let confirm = match s.active_tab {
            MenuItem::Teams => s.teams.selected().map(|t| delete_team(t, AfterSave::Reload)),
            MenuItem::TeamDetail => s
                .team_detail
                .detail
                .as_ref()
                .map(|d| delete_team(&d.team, AfterSave::Back(MenuItem::Teams))),
            MenuItem::Players => s.players.selected().map(|p| delete_player(p, AfterSave::Reload)),
            MenuItem::PlayerDetail => s
                .player_detail
                .detail
                .as_ref()
                .map(|d| delete_player(&d.player, AfterSave::Back(MenuItem::Players))),
            MenuItem::Matches => s.matches.selected().map(|m| delete_match(m, AfterSave::Reload)),
            MenuItem::MatchDetail => s
                .match_detail
                .detail
                .as_ref()
                .map(|d| delete_match(&d.summary, AfterSave::Back(MenuItem::Matches))),
            MenuItem::Users => s.users.selected().map(|u| Confirm {
                prompt: format!("Delete user {}?", u.username),
                mutation: Mutation::DeleteUser { id: u.id },
                then: AfterSave::Reload,
            }),
            _ => None,
        };
        if let Some(confirm) = confirm {
            self.state.overlay = Some(Overlay::Confirm(confirm));
        }
    }

    pub fn recruit_player(&mut self) {
        let Some(team_id) = self.state.team_detail.team_id else {
            return;
        };
        match self.state.team_detail.recruit_options() {
            Ok(options) if options.is_empty() => {
                self.state.last_error = Some("No players available to add".to_string());
            }
            Ok(options) => {
                self.state.overlay =
                    Some(Overlay::Picker(Picker::new(" Add Player ", options, PickPurpose::Recruit { team_id })));
            }
            Err(message) => self.state.last_error = Some(message),
        }
    }

    pub fn remove_from_team(&mut self) {
        let td = &self.state.team_detail;
        let (Some(team_id), Some(player)) = (td.team_id, td.selected_player()) else {
            return;
        };
        let confirm = Confirm {
            prompt: format!("Remove {} from the team?", player.nickname),
            mutation: Mutation::RemoveTeamPlayer { team_id, player_id: player.id },
            then: AfterSave::Reload,
        };
        self.state.overlay = Some(Overlay::Confirm(confirm));
    }

    pub fn add_stat(&mut self) {
        let md = &self.state.match_detail;
        if let Some(detail) = md.detail.as_ref() {
            let form = Form::add_stat(detail, &md.players);
            self.show_form(form);
        }
    }

    pub fn close_overlay(&mut self) {
        self.state.overlay = None;
    }

    /// The form receiving keystrokes: the login screen first, then any modal form.
    pub fn active_form(&mut self) -> Option<&mut Form> {
        if let Some(login) = self.state.login.as_mut() {
            return Some(login);
        }
        match self.state.overlay.as_mut() {
            Some(Overlay::Form(form)) => Some(form),
            _ => None,
        }
    }

    pub fn submit_form(&mut self) -> Option<NetworkRequest> {
        let form = self.active_form()?;
        match form.submit() {
            Ok(FormAction::Login { username, password }) => {
                form.error = None;
                Some(NetworkRequest::Login { username, password })
            }
            Ok(FormAction::Mutate { mutation, then }) => {
                form.error = None;
                Some(NetworkRequest::Mutate { mutation, then })
            }
            Err(message) => {
                form.error = Some(message);
                None
            }
        }
    }

    pub fn confirm(&mut self) -> Option<NetworkRequest> {
        let Some(Overlay::Confirm(confirm)) = self.state.overlay.take() else {
            return None;
        };
        Some(NetworkRequest::Mutate { mutation: confirm.mutation, then: confirm.then })
    }

    pub fn move_picker(&mut self, down: bool) {
        if let Some(Overlay::Picker(picker)) = self.state.overlay.as_mut() {
            if down {
                picker.cursor.down(picker.options.len());
            } else {
                picker.cursor.up();
            }
        }
    }

    pub fn accept_pick(&mut self) -> Option<NetworkRequest> {
        let Some(Overlay::Picker(picker)) = self.state.overlay.take() else {
            return None;
        };
        let id = picker.selected()?;
        match picker.purpose {
            PickPurpose::Recruit { team_id } => Some(NetworkRequest::Mutate {
                mutation: Mutation::AddTeamPlayer { team_id, player_id: id },
                then: AfterSave::Reload,
            }),
            PickPurpose::Draft(pick) => {
                let lm = &mut self.state.load_match;
                lm.error = lm.apply_pick(pick, id).err().map(|e| e.to_string());
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Stats
    // -----------------------------------------------------------------------

    pub fn stats_next_view(&mut self) {
        self.state.stats.next_view();
    }

    pub fn stats_cycle_sort(&mut self) {
        self.state.stats.cycle_sort();
    }

    pub fn stats_toggle_order(&mut self) {
        self.state.stats.toggle_order();
    }

    // -----------------------------------------------------------------------
    // Load match
    // -----------------------------------------------------------------------

    /// Opens the picker that fits the focused field.
    pub fn load_match_pick(&mut self, ringer: bool) {
        let lm = &self.state.load_match;
        let pick = match lm.focus {
            LoadFocus::Team(side) => DraftPick::Team(side),
            LoadFocus::Map => DraftPick::Map,
            LoadFocus::Lineup(side) if ringer => DraftPick::Ringer(side),
            LoadFocus::Lineup(side) => DraftPick::Player(side),
            _ => return,
        };
        if let DraftPick::Ringer(_) = pick
            && !lm.draft.match_type.permits_ringers()
        {
            self.state.load_match.error =
                Some("Ringers are only allowed in SCRIM matches".to_string());
            return;
        }
        if let DraftPick::Player(side) | DraftPick::Ringer(side) = pick
            && lm.draft.team(side).is_none()
        {
            self.state.load_match.error = Some(format!("Select {} first", side.label()));
            return;
        }
        let options = lm.pick_options(pick);
        if options.is_empty() {
            self.state.load_match.error = Some("Nothing to pick".to_string());
            return;
        }
        let title = match pick {
            DraftPick::Team(side) => format!(" {} ", side.label()),
            DraftPick::Player(side) => format!(" Add player to {} ", side.label()),
            DraftPick::Ringer(side) => format!(" Add ringer to {} ", side.label()),
            DraftPick::Map => " Map ".to_string(),
        };
        self.state.load_match.error = None;
        self.state.overlay = Some(Overlay::Picker(Picker::new(title, options, PickPurpose::Draft(pick))));
    }

    pub fn load_match_submit(&mut self) -> Option<NetworkRequest> {
        match self.state.load_match.submit() {
            Ok(body) => {
                self.state.load_match.error = None;
                Some(NetworkRequest::Mutate {
                    mutation: Mutation::SubmitMatch(body),
                    then: AfterSave::OpenCreatedMatch,
                })
            }
            Err(message) => {
                self.state.load_match.error = Some(message);
                None
            }
        }
    }

    pub fn load_match_reset(&mut self) {
        self.state.load_match.reset(Local::now().date_naive());
    }
}

fn delete_team(team: &Team, then: AfterSave) -> Confirm {
    Confirm {
        prompt: format!("Delete team {} [{}]?", team.name, team.tag),
        mutation: Mutation::DeleteTeam { id: team.id },
        then,
    }
}

fn delete_player(player: &Player, then: AfterSave) -> Confirm {
    Confirm {
        prompt: format!("Delete player {}?", player.nickname),
        mutation: Mutation::DeletePlayer { id: player.id },
        then,
    }
}

fn delete_match(m: &Match, then: AfterSave) -> Confirm {
    Confirm {
        prompt: format!("Delete match #{} {} vs {}?", m.id, m.team1_label(), m.team2_label()),
        mutation: Mutation::DeleteMatch { id: m.id },
        then,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use league_api::lineup::Side;

    fn app() -> App {
        App::new(AppSettings { token: Some("t".into()), ..Default::default() })
    }

    #[test]
    fn login_required_without_token() {
        let app = App::new(AppSettings::default());
        assert!(app.state.login.is_some());
        assert!(app.startup_requests().is_empty());
        assert_eq!(self::app().startup_requests().len(), 2);
    }

    #[test]
    fn opening_a_team_and_going_back() {
        let mut app = app();
        app.on_teams_loaded(vec![Team { id: 4, name: "Alpha".into(), tag: "ALP".into(), ..Default::default() }]);
        app.state.active_tab = MenuItem::Teams;
        let req = app.open_selected();
        assert!(matches!(req, Some(NetworkRequest::LoadTeam { id: 4 })));
        assert_eq!(app.state.active_tab, MenuItem::TeamDetail);
        let req = app.go_back();
        assert_eq!(app.state.active_tab, MenuItem::Teams);
        assert!(matches!(req, Some(NetworkRequest::LoadTeams)));
    }

    #[test]
    fn delete_asks_before_sending() {
        let mut app = app();
        app.state.active_tab = MenuItem::Users;
        app.on_users_loaded(vec![User { id: 2, username: "ref".into(), ..Default::default() }]);
        app.delete_item();
        assert!(matches!(app.state.overlay, Some(Overlay::Confirm(_))));
        let req = app.confirm();
        assert!(app.state.overlay.is_none());
        assert!(matches!(
            req,
            Some(NetworkRequest::Mutate { mutation: Mutation::DeleteUser { id: 2 }, then: AfterSave::Reload })
        ));
    }

    #[test]
    fn errors_land_in_the_open_form() {
        let mut app = app();
        app.state.active_tab = MenuItem::Teams;
        app.new_item();
        app.on_error("Team name already exists".into());
        match &app.state.overlay {
            Some(Overlay::Form(form)) => assert_eq!(form.error.as_deref(), Some("Team name already exists")),
            other => panic!("expected form, got {other:?}"),
        }
        assert!(app.state.last_error.is_none());

        app.close_overlay();
        app.on_error("boom".into());
        assert_eq!(app.state.last_error.as_deref(), Some("boom"));
    }

    #[test]
    fn empty_form_is_not_submitted() {
        let mut app = app();
        app.state.active_tab = MenuItem::Teams;
        app.new_item();
        assert!(app.submit_form().is_none());
        let Some(Overlay::Form(form)) = &app.state.overlay else {
            panic!("form closed");
        };
        assert!(form.error.is_some());
    }

    #[test]
    fn unauthorized_returns_to_login() {
        let mut app = app();
        app.state.active_tab = MenuItem::Players;
        app.new_item();
        app.on_unauthorized();
        assert!(app.state.overlay.is_none());
        assert!(app.settings.token.is_none());
        let login = app.state.login.as_ref().unwrap();
        assert!(login.error.is_some());
    }

    #[test]
    fn saved_match_opens_detail() {
        let mut app = app();
        app.state.active_tab = MenuItem::LoadMatch;
        let req = app.on_saved("Match loaded".into(), AfterSave::OpenCreatedMatch, Some(12));
        assert_eq!(app.state.active_tab, MenuItem::MatchDetail);
        assert!(matches!(req, Some(NetworkRequest::LoadMatch { id: 12 })));
        assert_eq!(app.state.status.as_deref(), Some("Match loaded"));
    }

    #[test]
    fn ringer_picker_needs_scrim() {
        let mut app = app();
        app.update_tab(MenuItem::LoadMatch);
        app.state.load_match.focus = LoadFocus::Lineup(Side::Team1);
        app.load_match_pick(true);
        assert!(app.state.overlay.is_none());
        assert!(app.state.load_match.error.as_deref().unwrap().contains("SCRIM"));
    }
}
