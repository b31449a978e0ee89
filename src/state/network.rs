use crate::state::messages::{Mutation, NetworkRequest, NetworkResponse};
use futures_util::future::{try_join, try_join_all, try_join4};
use league_api::aggregate::player_history;
use league_api::client::{ApiResult, LeagueApi};
use league_api::{MatchFilter, Team};
use log::{debug, error, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';
const LEADERBOARD_LIMIT: u32 = 50;

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

pub struct NetworkWorker {
    client: LeagueApi,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl NetworkWorker {
    pub fn new(
        client: LeagueApi,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.start_loading_animation().await;

            let result = self.handle_request(request).await;

            debug!("network request complete");
            self.stop_loading_animation(result.is_ok()).await;

            let response = match result {
                Ok(response) => response,
                Err(err) if err.is_unauthorized() => {
                    warn!("session rejected by backend: {err}");
                    self.client.clear_token();
                    NetworkResponse::Unauthorized
                }
                Err(err) => {
                    error!("{err}");
                    NetworkResponse::Error { message: err.to_string() }
                }
            };

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn handle_request(&mut self, request: NetworkRequest) -> ApiResult<NetworkResponse> {
        let client = &self.client;
        match request {
            NetworkRequest::Login { username, password } => {
                debug!("logging in as {username}");
                let token = client.login(&username, &password).await?;
                self.client.set_token(token.access_token.clone());
                let user = self.client.me().await?;
                Ok(NetworkResponse::LoggedIn { token: token.access_token, user })
            }
            NetworkRequest::Logout => {
                self.client.clear_token();
                Ok(NetworkResponse::LoggedOut)
            }
            NetworkRequest::LoadSession => {
                let user = client.me().await?;
                Ok(NetworkResponse::SessionLoaded { user })
            }
            NetworkRequest::LoadDashboard => {
                let summary = client.dashboard().await?;
                Ok(NetworkResponse::DashboardLoaded { summary })
            }
            NetworkRequest::LoadTeams => {
                let teams = client.teams().await?;
                Ok(NetworkResponse::TeamsLoaded { teams })
            }
            NetworkRequest::LoadTeam { id } => {
                debug!("loading team {id}");
                let (detail, stats, matches, players) = try_join4(
                    client.team(id),
                    client.team_stats(id),
                    client.matches(MatchFilter::default()),
                    client.players(),
                )
                .await?;
                let matches = matches.into_iter().filter(|m| m.involves(id)).collect();
                Ok(NetworkResponse::TeamLoaded { detail, stats, matches, players })
            }
            NetworkRequest::LoadPlayers => {
                let (players, teams) = try_join(client.players(), client.teams()).await?;
                Ok(NetworkResponse::PlayersLoaded { players, teams })
            }
            NetworkRequest::LoadPlayer { id } => {
                debug!("loading player {id}");
                let detail = client.player(id).await?;
                let details = try_join_all(
                    detail.match_history.iter().map(|entry| client.match_detail(entry.match_id)),
                )
                .await?;
                let history = player_history(id, &details);
                Ok(NetworkResponse::PlayerLoaded { detail, history })
            }
            NetworkRequest::LoadMatches { filter } => {
                debug!("loading matches ({})", filter.label());
                let (matches, teams) = try_join(client.matches(filter), client.teams()).await?;
                Ok(NetworkResponse::MatchesLoaded { matches, teams })
            }
            NetworkRequest::LoadMatch { id } => {
                debug!("loading match {id}");
                let (detail, players) = try_join(client.match_detail(id), client.players()).await?;
                Ok(NetworkResponse::MatchLoaded { detail, players })
            }
            NetworkRequest::LoadStats { sort, order } => {
                let (leaderboard, maps, teams, matches) = try_join4(
                    client.leaderboard(sort, order, LEADERBOARD_LIMIT),
                    client.map_stats(),
                    client.teams(),
                    client.matches(MatchFilter::default()),
                )
                .await?;
                Ok(NetworkResponse::StatsLoaded { leaderboard, maps, teams, matches })
            }
            NetworkRequest::LoadMatchSetup => {
                let (teams, players) = try_join(client.teams(), client.players()).await?;
                Ok(NetworkResponse::MatchSetupLoaded { teams, players })
            }
            NetworkRequest::LoadUsers => {
                let users = client.users().await?;
                Ok(NetworkResponse::UsersLoaded { users })
            }
            NetworkRequest::Mutate { mutation, then } => {
                let message = mutation.success_message().to_string();
                let created_match = self.apply(mutation).await?;
                Ok(NetworkResponse::Saved { message, then, created_match })
            }
        }
    }

    /// Runs a write. Returns the id of a newly created match, if any.
    async fn apply(&self, mutation: Mutation) -> ApiResult<Option<i64>> {
        debug!("applying {mutation:?}");
        let client = &self.client;
        match mutation {
            Mutation::CreateTeam(body) => client.create_team(&body).await.map(ignore::<Team>),
            Mutation::UpdateTeam { id, body } => client.update_team(id, &body).await.map(ignore),
            Mutation::DeleteTeam { id } => client.delete_team(id).await.map(ignore),
            Mutation::AddTeamPlayer { team_id, player_id } => {
                client.add_team_player(team_id, player_id).await.map(ignore)
            }
            Mutation::RemoveTeamPlayer { team_id, player_id } => {
                client.remove_team_player(team_id, player_id).await.map(ignore)
            }
            Mutation::CreatePlayer(body) => client.create_player(&body).await.map(ignore),
            Mutation::UpdatePlayer { id, body } => client.update_player(id, &body).await.map(ignore),
            Mutation::DeletePlayer { id } => client.delete_player(id).await.map(ignore),
            Mutation::CreateMatch(body) => Ok(Some(client.create_match(&body).await?.id)),
            Mutation::UpdateMatch { id, body } => client.update_match(id, &body).await.map(ignore),
            Mutation::DeleteMatch { id } => client.delete_match(id).await.map(ignore),
            Mutation::AddMatchStat { match_id, body } => {
                client.add_match_stat(match_id, &body).await.map(ignore)
            }
            Mutation::SubmitMatch(body) => Ok(Some(client.load_match(&body).await?.summary.id)),
            Mutation::CreateUser(body) => client.create_user(&body).await.map(ignore),
            Mutation::UpdateUser { id, body } => client.update_user(id, &body).await.map(ignore),
            Mutation::DeleteUser { id } => client.delete_user(id).await.map(ignore),
        }
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}

fn ignore<T>(_: T) -> Option<i64> {
    None
}
