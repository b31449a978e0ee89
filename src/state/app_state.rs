use crate::app::MenuItem;
use crate::state::form::Form;
use crate::state::load_match::{DraftPick, LoadMatchState};
use crate::state::messages::{AfterSave, Mutation};
use league_api::aggregate::{PlayerMatchHistoryRow, TeamMatchTable, aggregate_match};
use league_api::lineup::Side;
use league_api::ranking::{
    self, SortOrder, StatKey, TeamRecord, TeamStanding, kd_ratio, per_match, sort_ranked,
    team_record, team_standings,
};
use league_api::{
    DashboardSummary, LeaderboardEntry, MapPlayCount, MapRecord, Match, MatchDetail, MatchFilter,
    Player, PlayerDetail, Team, TeamDetail, TeamRecordStats, User,
};

// ---------------------------------------------------------------------------
// List selection
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub selected: usize,
}

impl Cursor {
    pub fn down(&mut self, len: usize) {
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}

fn team_tag(teams: &[Team], team_id: Option<i64>) -> String {
    match team_id {
        None => "FA".to_string(),
        Some(id) => teams
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.tag.clone())
            .unwrap_or_else(|| format!("#{id}")),
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct DashboardState {
    pub summary: Option<DashboardSummary>,
}

impl DashboardState {
    pub fn most_played_map(&self) -> String {
        let Some(summary) = self.summary.as_ref() else {
            return "N/A".to_string();
        };
        match summary.most_played_map.as_deref() {
            Some(map) => format!("{map} ({} matches)", summary.most_played_map_count),
            None => "N/A".to_string(),
        }
    }

    /// Leader's K/D recomputed from totals, not the backend's rounded value.
    pub fn top_kd(&self) -> String {
        self.summary
            .as_ref()
            .and_then(|s| s.top_kd_player.as_ref())
            .map(|p| format!("{} ({})", p.nickname, kd_ratio(p.total_kills, p.total_deaths)))
            .unwrap_or_else(|| "N/A".to_string())
    }

    pub fn top_flags(&self) -> String {
        self.summary
            .as_ref()
            .and_then(|s| s.top_flags_player.as_ref())
            .map(|p| format!("{} ({} flags)", p.nickname, p.total_flags.max(0)))
            .unwrap_or_else(|| "N/A".to_string())
    }
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct TeamsState {
    pub teams: Vec<Team>,
    pub cursor: Cursor,
}

impl TeamsState {
    pub fn load(&mut self, teams: Vec<Team>) {
        self.teams = teams;
        self.cursor.clamp(self.teams.len());
    }

    pub fn selected(&self) -> Option<&Team> {
        self.teams.get(self.cursor.selected)
    }
}

#[derive(Debug, Default)]
pub struct TeamDetailState {
    pub team_id: Option<i64>,
    pub detail: Option<TeamDetail>,
    pub stats: Option<TeamRecordStats>,
    /// Matches involving this team.
    pub matches: Vec<Match>,
    /// Every player, for the recruit picker.
    pub players: Vec<Player>,
    pub cursor: Cursor,
}

impl TeamDetailState {
    pub fn load(&mut self, detail: TeamDetail, stats: TeamRecordStats, matches: Vec<Match>, players: Vec<Player>) {
        self.team_id = Some(detail.team.id);
        self.detail = Some(detail);
        self.stats = Some(stats);
        self.matches = matches;
        self.players = players;
        self.cursor.clamp(self.roster().len());
    }

    pub fn roster(&self) -> &[Player] {
        self.detail.as_ref().map(|d| d.players.as_slice()).unwrap_or(&[])
    }

    pub fn selected_player(&self) -> Option<&Player> {
        self.roster().get(self.cursor.selected)
    }

    /// Win/loss/draw over the team's played matches.
    pub fn record(&self) -> TeamRecord {
        match self.team_id {
            Some(id) => team_record(id, &self.matches),
            None => TeamRecord::default(),
        }
    }

    pub fn map_records(&self) -> Vec<(&str, MapRecord)> {
        self.stats
            .iter()
            .flat_map(|s| s.map_record.iter().map(|(map, rec)| (map.as_str(), *rec)))
            .collect()
    }

    /// Played matches, newest first, with the result from this team's side.
    pub fn results(&self) -> Vec<(&Match, ranking::Outcome)> {
        let Some(id) = self.team_id else {
            return Vec::new();
        };
        let mut played: Vec<_> = self
            .matches
            .iter()
            .filter_map(|m| m.outcome_for(id).map(|o| (m, o)))
            .collect();
        played.sort_by(|a, b| b.0.played_date.cmp(&a.0.played_date));
        played
    }

    pub fn recruit_options(&self) -> Result<Vec<(i64, String)>, String> {
        let detail = self.detail.as_ref().ok_or("Team not loaded")?;
        if detail.team.roster_full(detail.players.len()) {
            return Err(format!("{} already has {} players", detail.team.name, Team::MAX_ROSTER));
        }
        Ok(self
            .players
            .iter()
            .filter(|p| p.team_id != Some(detail.team.id))
            .map(|p| {
                let from = if p.is_free_agent() { "free agent".to_string() } else { format!("team #{}", p.team_id.unwrap_or_default()) };
                (p.id, format!("{} ({from})", p.nickname))
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct PlayersState {
    pub players: Vec<Player>,
    pub teams: Vec<Team>,
    pub cursor: Cursor,
}

impl PlayersState {
    pub fn load(&mut self, players: Vec<Player>, teams: Vec<Team>) {
        self.players = players;
        self.teams = teams;
        self.cursor.clamp(self.players.len());
    }

    pub fn selected(&self) -> Option<&Player> {
        self.players.get(self.cursor.selected)
    }

    pub fn team_tag(&self, player: &Player) -> String {
        team_tag(&self.teams, player.team_id)
    }
}

#[derive(Debug, Default)]
pub struct PlayerDetailState {
    pub player_id: Option<i64>,
    pub detail: Option<PlayerDetail>,
    pub history: Vec<PlayerMatchHistoryRow>,
    pub cursor: Cursor,
}

impl PlayerDetailState {
    pub fn load(&mut self, detail: PlayerDetail, history: Vec<PlayerMatchHistoryRow>) {
        self.player_id = Some(detail.player.id);
        self.detail = Some(detail);
        self.history = history;
        self.cursor.clamp(self.history.len());
    }

    pub fn kd(&self) -> String {
        self.detail
            .as_ref()
            .map(|d| kd_ratio(d.player.total_kills, d.player.total_deaths))
            .unwrap_or_else(|| "0.00".to_string())
    }

    /// Kills, deaths and flags per match to one decimal.
    pub fn averages(&self) -> [String; 3] {
        let Some(d) = self.detail.as_ref() else {
            return ["0.0".to_string(), "0.0".to_string(), "0.0".to_string()];
        };
        let p = &d.player;
        [
            per_match(p.total_kills, p.matches_played),
            per_match(p.total_deaths, p.matches_played),
            per_match(p.total_flags, p.matches_played),
        ]
    }

    pub fn selected_match(&self) -> Option<i64> {
        self.history.get(self.cursor.selected).map(|r| r.match_id)
    }
}

// ---------------------------------------------------------------------------
// Matches
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MatchesState {
    pub filter: MatchFilter,
    pub matches: Vec<Match>,
    pub teams: Vec<Team>,
    pub cursor: Cursor,
}

impl MatchesState {
    pub fn load(&mut self, matches: Vec<Match>, teams: Vec<Team>) {
        self.matches = matches;
        self.teams = teams;
        self.cursor.clamp(self.matches.len());
    }

    /// Played matches, newest first.
    pub fn played(&self) -> Vec<&Match> {
        let mut played: Vec<&Match> = self.matches.iter().filter(|m| m.is_played()).collect();
        played.sort_by(|a, b| b.played_date.cmp(&a.played_date));
        played
    }

    /// Unplayed matches, soonest first; unscheduled ones last.
    pub fn upcoming(&self) -> Vec<&Match> {
        let mut upcoming: Vec<&Match> = self.matches.iter().filter(|m| !m.is_played()).collect();
        upcoming.sort_by_key(|m| (m.scheduled_date.is_none(), m.scheduled_date));
        upcoming
    }

    /// Selection order: played block, then upcoming block.
    pub fn visible(&self) -> Vec<&Match> {
        let mut all = self.played();
        all.extend(self.upcoming());
        all
    }

    pub fn selected(&self) -> Option<&Match> {
        self.visible().get(self.cursor.selected).copied()
    }
}

#[derive(Debug, Default)]
pub struct MatchDetailState {
    pub match_id: Option<i64>,
    pub detail: Option<MatchDetail>,
    pub tables: Option<(TeamMatchTable, TeamMatchTable)>,
    pub players: Vec<Player>,
}

impl MatchDetailState {
    pub fn load(&mut self, detail: MatchDetail, players: Vec<Player>) {
        self.match_id = Some(detail.summary.id);
        self.tables = Some(aggregate_match(&detail));
        self.detail = Some(detail);
        self.players = players;
    }

    pub fn winner(&self) -> Option<Side> {
        let m = &self.detail.as_ref()?.summary;
        match m.winner_id()? {
            id if id == m.team1_id => Some(Side::Team1),
            _ => Some(Side::Team2),
        }
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StatsView {
    #[default]
    Leaderboard,
    Maps,
    Standings,
}

impl StatsView {
    pub fn next(self) -> Self {
        match self {
            StatsView::Leaderboard => StatsView::Maps,
            StatsView::Maps => StatsView::Standings,
            StatsView::Standings => StatsView::Leaderboard,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatsView::Leaderboard => "Leaderboard",
            StatsView::Maps => "Map Plays",
            StatsView::Standings => "Team Standings",
        }
    }
}

#[derive(Debug, Default)]
pub struct StatsState {
    pub view: StatsView,
    pub sort: StatKey,
    pub order: SortOrder,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub maps: Vec<MapPlayCount>,
    pub standings: Vec<TeamStanding>,
    pub cursor: Cursor,
}

impl StatsState {
    pub fn load(
        &mut self,
        mut leaderboard: Vec<LeaderboardEntry>,
        maps: Vec<MapPlayCount>,
        teams: &[Team],
        matches: &[Match],
    ) {
        sort_ranked(&mut leaderboard, self.sort, self.order);
        self.leaderboard = leaderboard;
        self.maps = maps;
        self.standings = team_standings(teams, matches);
        self.cursor.clamp(self.rows());
    }

    pub fn rows(&self) -> usize {
        match self.view {
            StatsView::Leaderboard => self.leaderboard.len(),
            StatsView::Maps => self.maps.len(),
            StatsView::Standings => self.standings.len(),
        }
    }

    pub fn next_view(&mut self) {
        self.view = self.view.next();
        self.cursor = Cursor::default();
    }

    pub fn cycle_sort(&mut self) {
        self.sort = self.sort.next_leaderboard();
        sort_ranked(&mut self.leaderboard, self.sort, self.order);
    }

    pub fn toggle_order(&mut self) {
        self.order = self.order.toggle();
        sort_ranked(&mut self.leaderboard, self.sort, self.order);
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct UsersState {
    pub users: Vec<User>,
    pub cursor: Cursor,
}

impl UsersState {
    pub fn load(&mut self, users: Vec<User>) {
        self.users = users;
        self.cursor.clamp(self.users.len());
    }

    pub fn selected(&self) -> Option<&User> {
        self.users.get(self.cursor.selected)
    }
}

// ---------------------------------------------------------------------------
// Modal overlays
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Confirm {
    pub prompt: String,
    pub mutation: Mutation,
    pub then: AfterSave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickPurpose {
    Recruit { team_id: i64 },
    Draft(DraftPick),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Picker {
    pub title: String,
    pub options: Vec<(i64, String)>,
    pub cursor: Cursor,
    pub purpose: PickPurpose,
}

impl Picker {
    pub fn new(title: impl Into<String>, options: Vec<(i64, String)>, purpose: PickPurpose) -> Self {
        Self { title: title.into(), options, cursor: Cursor::default(), purpose }
    }

    pub fn selected(&self) -> Option<i64> {
        self.options.get(self.cursor.selected).map(|(id, _)| *id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    Form(Form),
    Confirm(Confirm),
    Picker(Picker),
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub last_error: Option<String>,
    pub status: Option<String>,
    pub user: Option<User>,
    /// Shown instead of every screen until a token is accepted.
    pub login: Option<Form>,
    pub overlay: Option<Overlay>,
    pub dashboard: DashboardState,
    pub teams: TeamsState,
    pub team_detail: TeamDetailState,
    pub players: PlayersState,
    pub player_detail: PlayerDetailState,
    pub matches: MatchesState,
    pub match_detail: MatchDetailState,
    pub stats: StatsState,
    pub load_match: LoadMatchState,
    pub users: UsersState,
}

impl AppState {
    pub fn new(logged_in: bool) -> Self {
        Self {
            login: (!logged_in).then(Form::login),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use league_api::ranking::Outcome;

    fn at(day: u32) -> Option<chrono::DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(2025, 3, day, 20, 0, 0).unwrap())
    }

    fn played(id: i64, day: u32, t1: i64, t2: i64, s1: i64, s2: i64) -> Match {
        Match { id, team1_id: t1, team2_id: t2, team1_score: s1, team2_score: s2, played_date: at(day), ..Default::default() }
    }

    fn upcoming(id: i64, day: Option<u32>) -> Match {
        Match { id, team1_id: 1, team2_id: 2, scheduled_date: day.and_then(at), ..Default::default() }
    }

    #[test]
    fn matches_split_into_played_and_upcoming() {
        let mut state = MatchesState::default();
        state.load(
            vec![
                played(1, 1, 1, 2, 2, 1),
                upcoming(2, None),
                played(3, 5, 1, 2, 0, 0),
                upcoming(4, Some(20)),
                upcoming(5, Some(10)),
                upcoming(6, Some(10)),
            ],
            vec![],
        );
        let ids = |ms: Vec<&Match>| ms.iter().map(|m| m.id).collect::<Vec<_>>();
        assert_eq!(ids(state.played()), vec![3, 1]);
        assert_eq!(ids(state.upcoming()), vec![5, 6, 4, 2]);
        state.cursor.selected = 2;
        assert_eq!(state.selected().map(|m| m.id), Some(5));
    }

    #[test]
    fn team_detail_record_and_recruiting() {
        let team = Team { id: 1, name: "Alpha".into(), tag: "ALP".into(), ..Default::default() };
        let roster: Vec<Player> = (0..10)
            .map(|i| Player { id: i, nickname: format!("p{i}"), team_id: Some(1), ..Default::default() })
            .collect();
        let mut state = TeamDetailState::default();
        state.load(
            TeamDetail { team: team.clone(), players: roster[..9].to_vec(), ..Default::default() },
            TeamRecordStats::default(),
            vec![played(1, 1, 1, 2, 2, 1), played(2, 3, 2, 1, 1, 1), played(3, 2, 3, 1, 5, 0), upcoming(4, Some(9))],
            vec![roster[0].clone(), Player { id: 50, nickname: "Drifter".into(), ..Default::default() }],
        );
        assert_eq!(state.record().summary(), "1W-1L-1D");
        let results: Vec<(i64, Outcome)> = state.results().iter().map(|(m, o)| (m.id, *o)).collect();
        assert_eq!(results, vec![(2, Outcome::Draw), (3, Outcome::Loss), (1, Outcome::Win)]);
        assert_eq!(state.recruit_options().unwrap(), vec![(50, "Drifter (free agent)".to_string())]);

        state.detail = Some(TeamDetail { team, players: roster, ..Default::default() });
        assert_eq!(state.recruit_options(), Err("Alpha already has 10 players".to_string()));
    }

    #[test]
    fn dashboard_recomputes_leader_kd() {
        let state = DashboardState {
            summary: Some(DashboardSummary {
                most_played_map: Some("dod_anzio".into()),
                most_played_map_count: 4,
                top_kd_player: Some(LeaderboardEntry {
                    nickname: "Fragger".into(),
                    total_kills: 18,
                    total_deaths: 0,
                    kd_ratio: 99.0,
                    ..Default::default()
                }),
                ..Default::default()
            }),
        };
        assert_eq!(state.top_kd(), "Fragger (18.00)");
        assert_eq!(state.top_flags(), "N/A");
        assert_eq!(state.most_played_map(), "dod_anzio (4 matches)");
    }

    #[test]
    fn player_averages_default_to_zero() {
        let mut state = PlayerDetailState::default();
        assert_eq!(state.averages()[0], "0.0");
        state.load(
            PlayerDetail {
                player: Player { id: 5, total_kills: 18, total_deaths: 8, total_flags: 1, matches_played: 4, ..Default::default() },
                ..Default::default()
            },
            vec![],
        );
        assert_eq!(state.kd(), "2.25");
        assert_eq!(state.averages(), ["4.5".to_string(), "2.0".to_string(), "0.3".to_string()]);
    }

    #[test]
    fn stats_resort_client_side_and_build_standings() {
        let mut state = StatsState::default();
        let entry = |id: i64, kills: i64| LeaderboardEntry { id, nickname: format!("p{id}"), total_kills: kills, total_deaths: 10, ..Default::default() };
        let teams = vec![
            Team { id: 1, name: "Alpha".into(), tag: "ALP".into(), ..Default::default() },
            Team { id: 2, name: "Beta".into(), tag: "BET".into(), ..Default::default() },
            Team { id: 3, name: "FA".into(), tag: "FA".into(), is_free_agents: true, ..Default::default() },
        ];
        state.load(vec![entry(1, 5), entry(2, 30), entry(3, 12)], vec![], &teams, &[played(1, 1, 1, 2, 0, 3)]);
        let ids: Vec<i64> = state.leaderboard.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert_eq!(state.standings.len(), 2);
        assert_eq!(state.standings[0].team.id, 2);

        state.toggle_order();
        assert_eq!(state.leaderboard[0].id, 1);
        state.next_view();
        assert_eq!(state.view, StatsView::Maps);
        assert_eq!(state.rows(), 0);
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut c = Cursor::default();
        c.up();
        c.down(2);
        c.down(2);
        assert_eq!(c.selected, 1);
        c.clamp(0);
        assert_eq!(c.selected, 0);
    }
}
