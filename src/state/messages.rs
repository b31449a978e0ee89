use crate::app::MenuItem;
use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use league_api::aggregate::PlayerMatchHistoryRow;
use league_api::ranking::{SortOrder, StatKey};
use league_api::wire::{
    MatchCreate, MatchLoadRequest, MatchUpdate, PlayerCreate, PlayerUpdate, StatCreate, TeamCreate,
    TeamUpdate, UserCreate, UserUpdate,
};
use league_api::{
    DashboardSummary, LeaderboardEntry, MapPlayCount, Match, MatchDetail, MatchFilter, Player,
    PlayerDetail, Team, TeamDetail, TeamRecordStats, User,
};

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    Login { username: String, password: String },
    Logout,
    LoadSession,
    LoadDashboard,
    LoadTeams,
    LoadTeam { id: i64 },
    LoadPlayers,
    LoadPlayer { id: i64 },
    LoadMatches { filter: MatchFilter },
    LoadMatch { id: i64 },
    LoadStats { sort: StatKey, order: SortOrder },
    LoadMatchSetup,
    LoadUsers,
    Mutate { mutation: Mutation, then: AfterSave },
}

/// Every write the console can make against the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    CreateTeam(TeamCreate),
    UpdateTeam { id: i64, body: TeamUpdate },
    DeleteTeam { id: i64 },
    AddTeamPlayer { team_id: i64, player_id: i64 },
    RemoveTeamPlayer { team_id: i64, player_id: i64 },
    CreatePlayer(PlayerCreate),
    UpdatePlayer { id: i64, body: PlayerUpdate },
    DeletePlayer { id: i64 },
    CreateMatch(MatchCreate),
    UpdateMatch { id: i64, body: MatchUpdate },
    DeleteMatch { id: i64 },
    AddMatchStat { match_id: i64, body: StatCreate },
    SubmitMatch(MatchLoadRequest),
    CreateUser(UserCreate),
    UpdateUser { id: i64, body: UserUpdate },
    DeleteUser { id: i64 },
}

impl Mutation {
    pub fn success_message(&self) -> &'static str {
        match self {
            Mutation::CreateTeam(_) => "Team created",
            Mutation::UpdateTeam { .. } => "Team updated",
            Mutation::DeleteTeam { .. } => "Team deleted",
            Mutation::AddTeamPlayer { .. } => "Player added to team",
            Mutation::RemoveTeamPlayer { .. } => "Player removed from team",
            Mutation::CreatePlayer(_) => "Player created",
            Mutation::UpdatePlayer { .. } => "Player updated",
            Mutation::DeletePlayer { .. } => "Player deleted",
            Mutation::CreateMatch(_) => "Match scheduled",
            Mutation::UpdateMatch { .. } => "Match updated",
            Mutation::DeleteMatch { .. } => "Match deleted",
            Mutation::AddMatchStat { .. } => "Stat added",
            Mutation::SubmitMatch(_) => "Match loaded",
            Mutation::CreateUser(_) => "User created",
            Mutation::UpdateUser { .. } => "User updated",
            Mutation::DeleteUser { .. } => "User deleted",
        }
    }
}

/// Where the console goes once a mutation succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterSave {
    Reload,
    Back(MenuItem),
    /// Open the match the backend just created.
    OpenCreatedMatch,
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    LoggedIn { token: String, user: User },
    LoggedOut,
    SessionLoaded { user: User },
    DashboardLoaded { summary: DashboardSummary },
    TeamsLoaded { teams: Vec<Team> },
    TeamLoaded {
        detail: TeamDetail,
        stats: TeamRecordStats,
        matches: Vec<Match>,
        players: Vec<Player>,
    },
    PlayersLoaded { players: Vec<Player>, teams: Vec<Team> },
    PlayerLoaded { detail: PlayerDetail, history: Vec<PlayerMatchHistoryRow> },
    MatchesLoaded { matches: Vec<Match>, teams: Vec<Team> },
    MatchLoaded { detail: MatchDetail, players: Vec<Player> },
    StatsLoaded {
        leaderboard: Vec<LeaderboardEntry>,
        maps: Vec<MapPlayCount>,
        teams: Vec<Team>,
        matches: Vec<Match>,
    },
    MatchSetupLoaded { teams: Vec<Team>, players: Vec<Player> },
    UsersLoaded { users: Vec<User> },
    Saved { message: String, then: AfterSave, created_match: Option<i64> },
    Unauthorized,
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
}
