use crate::ranking::{SortOrder, StatKey};
use crate::wire::{
    ErrorBody, MatchCreate, MatchLoadRequest, MatchUpdate, PlayerCreate, PlayerUpdate, StatCreate,
    TeamCreate, TeamUpdate, TokenResponse, UserCreate, UserUpdate,
};
use crate::{
    DashboardSummary, LeaderboardEntry, MapPlayCount, Match, MatchDetail, MatchFilter, Player,
    PlayerDetail, PlayerMatchStat, Team, TeamDetail, TeamRecordStats, User,
};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Client for the league backend's REST API.
#[derive(Debug, Clone)]
pub struct LeagueApi {
    client: Client,
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl Default for LeagueApi {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(StatusCode, String),
    Parsing(reqwest::Error, String),
    Unauthorized(String),
    Rejected { status: StatusCode, message: String },
    NotFound(String),
    Other(String),
}

impl ApiError {
    /// The session is no longer valid and the user has to log in again.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(status, url) => write!(f, "Server error {status} for {url}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            ApiError::Rejected { message, .. } => f.write_str(message),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl LeagueApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("dodleague/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -- auth ---------------------------------------------------------------

    /// Exchanges credentials for a bearer token. The token is not stored.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<TokenResponse> {
        let (req, url) = self.request(Method::POST, "/api/auth/login");
        let req = req.form(&[("username", username), ("password", password)]);
        match self.send(req, url).await {
            // a 401 here means bad credentials, not an expired session
            Err(ApiError::Unauthorized(message)) => Err(ApiError::Rejected {
                status: StatusCode::UNAUTHORIZED,
                message,
            }),
            other => other,
        }
    }

    pub async fn me(&self) -> ApiResult<User> {
        self.get("/api/auth/me").await
    }

    pub async fn users(&self) -> ApiResult<Vec<User>> {
        self.get("/api/auth/users").await
    }

    pub async fn create_user(&self, body: &UserCreate) -> ApiResult<User> {
        self.send_json(Method::POST, "/api/auth/users", body).await
    }

    pub async fn update_user(&self, id: i64, body: &UserUpdate) -> ApiResult<User> {
        self.send_json(Method::PUT, &format!("/api/auth/users/{id}"), body).await
    }

    pub async fn delete_user(&self, id: i64) -> ApiResult<()> {
        self.delete(&format!("/api/auth/users/{id}")).await
    }

    // -- teams --------------------------------------------------------------

    pub async fn teams(&self) -> ApiResult<Vec<Team>> {
        self.get("/api/teams").await
    }

    pub async fn team(&self, id: i64) -> ApiResult<TeamDetail> {
        self.get(&format!("/api/teams/{id}")).await
    }

    pub async fn create_team(&self, body: &TeamCreate) -> ApiResult<Team> {
        self.send_json(Method::POST, "/api/teams", body).await
    }

    pub async fn update_team(&self, id: i64, body: &TeamUpdate) -> ApiResult<Team> {
        self.send_json(Method::PUT, &format!("/api/teams/{id}"), body).await
    }

    pub async fn delete_team(&self, id: i64) -> ApiResult<()> {
        self.delete(&format!("/api/teams/{id}")).await
    }

    pub async fn add_team_player(&self, team_id: i64, player_id: i64) -> ApiResult<()> {
        let (req, url) =
            self.request(Method::POST, &format!("/api/teams/{team_id}/players/{player_id}"));
        self.send_empty(req, url).await
    }

    pub async fn remove_team_player(&self, team_id: i64, player_id: i64) -> ApiResult<()> {
        self.delete(&format!("/api/teams/{team_id}/players/{player_id}")).await
    }

    // -- players ------------------------------------------------------------

    pub async fn players(&self) -> ApiResult<Vec<Player>> {
        self.get("/api/players").await
    }

    pub async fn player(&self, id: i64) -> ApiResult<PlayerDetail> {
        self.get(&format!("/api/players/{id}")).await
    }

    pub async fn create_player(&self, body: &PlayerCreate) -> ApiResult<Player> {
        self.send_json(Method::POST, "/api/players", body).await
    }

    pub async fn update_player(&self, id: i64, body: &PlayerUpdate) -> ApiResult<Player> {
        self.send_json(Method::PUT, &format!("/api/players/{id}"), body).await
    }

    pub async fn delete_player(&self, id: i64) -> ApiResult<()> {
        self.delete(&format!("/api/players/{id}")).await
    }

    // -- matches ------------------------------------------------------------

    pub async fn matches(&self, filter: MatchFilter) -> ApiResult<Vec<Match>> {
        let (req, url) = self.request(Method::GET, "/api/matches");
        self.send(req.query(&filter.query_pairs()), url).await
    }

    pub async fn match_detail(&self, id: i64) -> ApiResult<MatchDetail> {
        self.get(&format!("/api/matches/{id}")).await
    }

    pub async fn upcoming_matches(&self) -> ApiResult<Vec<Match>> {
        self.get("/api/matches/upcoming").await
    }

    pub async fn recent_matches(&self, limit: u32) -> ApiResult<Vec<Match>> {
        let (req, url) = self.request(Method::GET, "/api/matches/recent");
        self.send(req.query(&[("limit", limit)]), url).await
    }

    pub async fn create_match(&self, body: &MatchCreate) -> ApiResult<Match> {
        self.send_json(Method::POST, "/api/matches", body).await
    }

    /// Creates a completed match and all of its stat records in one request.
    pub async fn load_match(&self, body: &MatchLoadRequest) -> ApiResult<MatchDetail> {
        self.send_json(Method::POST, "/api/matches/load", body).await
    }

    pub async fn update_match(&self, id: i64, body: &MatchUpdate) -> ApiResult<Match> {
        self.send_json(Method::PUT, &format!("/api/matches/{id}"), body).await
    }

    pub async fn delete_match(&self, id: i64) -> ApiResult<()> {
        self.delete(&format!("/api/matches/{id}")).await
    }

    pub async fn add_match_stat(&self, match_id: i64, body: &StatCreate) -> ApiResult<PlayerMatchStat> {
        self.send_json(Method::POST, &format!("/api/matches/{match_id}/stats"), body).await
    }

    // -- stats --------------------------------------------------------------

    pub async fn leaderboard(
        &self,
        sort: StatKey,
        order: SortOrder,
        limit: u32,
    ) -> ApiResult<Vec<LeaderboardEntry>> {
        let (req, url) = self.request(Method::GET, "/api/stats/leaderboard");
        let query = [
            ("sort_by", sort.as_query().to_string()),
            ("order", order.as_query().to_string()),
            ("limit", limit.to_string()),
        ];
        self.send(req.query(&query), url).await
    }

    pub async fn dashboard(&self) -> ApiResult<DashboardSummary> {
        self.get("/api/stats/dashboard").await
    }

    pub async fn map_stats(&self) -> ApiResult<Vec<MapPlayCount>> {
        self.get("/api/stats/maps").await
    }

    pub async fn team_stats(&self, team_id: i64) -> ApiResult<TeamRecordStats> {
        self.get(&format!("/api/stats/team/{team_id}")).await
    }

    // -- plumbing -----------------------------------------------------------

    fn request(&self, method: Method, path: &str) -> (RequestBuilder, String) {
        let url = format!("{}{path}", self.base_url);
        let mut req = self.client.request(method, &url).timeout(self.timeout);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        (req, url)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let (req, url) = self.request(Method::GET, path);
        self.send(req, url).await
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        let (req, url) = self.request(Method::DELETE, path);
        self.send_empty(req, url).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let (req, url) = self.request(method, path);
        self.send(req.json(body), url).await
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder, url: String) -> ApiResult<T> {
        let response = self.checked(req, &url).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parsing(e, url))
    }

    async fn send_empty(&self, req: RequestBuilder, url: String) -> ApiResult<()> {
        self.checked(req, &url).await.map(|_| ())
    }

    /// Sends the request and maps non-2xx statuses onto `ApiError`.
    async fn checked(&self, req: RequestBuilder, url: &str) -> ApiResult<reqwest::Response> {
        let response = req
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status.is_server_error() {
            return Err(ApiError::Api(status, url.to_owned()));
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());

        Err(match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            _ if status.is_client_error() => ApiError::Rejected { status, message },
            _ => ApiError::Other(format!("unexpected status {status} for {url}")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{StatLine, aggregate_match};
    use crate::lineup::{MatchDraft, Side};
    use crate::{MatchType, Team};
    use chrono::NaiveDate;
    use mockito::Matcher;
    use serde_json::json;

    fn api(server: &mockito::Server) -> LeagueApi {
        LeagueApi::new(server.url()).with_token(Some("tok".into()))
    }

    #[tokio::test]
    async fn attaches_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/teams")
            .match_header("authorization", "Bearer tok")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!([{"id": 1, "name": "Alpha", "tag": "ALP", "is_free_agents": false, "player_count": 3}])
                    .to_string(),
            )
            .create_async()
            .await;

        let teams = api(&server).teams().await.unwrap();
        mock.assert_async().await;
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].player_count, Some(3));
    }

    #[tokio::test]
    async fn expired_session_is_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/auth/me")
            .with_status(401)
            .with_body(r#"{"detail":"Could not validate credentials"}"#)
            .create_async()
            .await;

        let err = api(&server).me().await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "Unauthorized: Could not validate credentials");
    }

    #[tokio::test]
    async fn bad_credentials_are_rejected_not_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/auth/login")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::Regex("username=admin".into()))
            .with_status(401)
            .with_body(r#"{"detail":"Incorrect username or password"}"#)
            .create_async()
            .await;

        let err = LeagueApi::new(server.url()).login("admin", "nope").await.unwrap_err();
        mock.assert_async().await;
        assert!(!err.is_unauthorized());
        assert_eq!(err.to_string(), "Incorrect username or password");
    }

    #[tokio::test]
    async fn login_returns_token() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/auth/login")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"abc","token_type":"bearer"}"#)
            .create_async()
            .await;

        let token = LeagueApi::new(server.url()).login("admin", "pw").await.unwrap();
        assert_eq!(token.access_token, "abc");
    }

    #[tokio::test]
    async fn validation_detail_becomes_rejection_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/teams")
            .with_status(400)
            .with_body(r#"{"detail":"Team name already exists"}"#)
            .create_async()
            .await;

        let body = TeamCreate::new("Alpha", "alp", false).unwrap();
        match api(&server).create_team(&body).await {
            Err(ApiError::Rejected { status, message }) => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(message, "Team name already exists");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_resource_and_server_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/matches/99")
            .with_status(404)
            .with_body(r#"{"detail":"Match not found"}"#)
            .create_async()
            .await;
        server.mock("GET", "/api/stats/maps").with_status(500).create_async().await;

        let client = api(&server);
        assert!(matches!(client.match_detail(99).await, Err(ApiError::NotFound(m)) if m == "Match not found"));
        assert!(matches!(client.map_stats().await, Err(ApiError::Api(s, _)) if s == StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[tokio::test]
    async fn leaderboard_sends_sort_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/stats/leaderboard")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("sort_by".into(), "kills".into()),
                Matcher::UrlEncoded("order".into(), "asc".into()),
                Matcher::UrlEncoded("limit".into(), "50".into()),
            ]))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let board = api(&server).leaderboard(StatKey::Kills, SortOrder::Asc, 50).await.unwrap();
        mock.assert_async().await;
        assert!(board.is_empty());
    }

    #[tokio::test]
    async fn match_filter_becomes_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/matches")
            .match_query(Matcher::UrlEncoded("match_type".into(), "SCRIM".into()))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        api(&server).matches(MatchFilter::of_type(Some(MatchType::Scrim))).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn loaded_match_aggregates_like_the_draft() {
        let mut draft = MatchDraft::new(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        draft.select_team(Side::Team1, &Team { id: 1, ..Default::default() }).unwrap();
        draft.select_team(Side::Team2, &Team { id: 2, ..Default::default() }).unwrap();
        draft.map_name = "dod_anzio".into();
        draft.team1_score = 2;
        draft.team2_score = 1;
        let fragger = Player { id: 5, nickname: "Fragger".into(), team_id: Some(1), ..Default::default() };
        let anchor = Player { id: 6, nickname: "Anchor".into(), team_id: Some(2), ..Default::default() };
        draft.add_player(Side::Team1, &fragger).unwrap();
        draft.add_player(Side::Team2, &anchor).unwrap();
        draft.set_stat(Side::Team1, 5, crate::aggregate::Half::First, StatLine::new(10, 3, 1));
        draft.set_stat(Side::Team1, 5, crate::aggregate::Half::Second, StatLine::new(8, 5, 0));
        let request = draft.build_request().unwrap();

        let echoed: Vec<_> = request
            .player_stats
            .iter()
            .map(|s| {
                let nickname = if s.player_id == 5 { "Fragger" } else { "Anchor" };
                json!({
                    "player_id": s.player_id, "team_id": s.team_id, "half": s.half,
                    "kills": s.kills, "deaths": s.deaths, "flags": s.flags,
                    "is_ringer": s.is_ringer, "player_nickname": nickname
                })
            })
            .collect();
        let response = json!({
            "id": 42, "match_type": "LEAGUE", "team1_id": 1, "team2_id": 2,
            "team1_score": 2, "team2_score": 1, "map_name": "dod_anzio",
            "played_date": "2025-03-01T00:00:00", "is_completed": true,
            "player_stats": echoed
        });

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/matches/load")
            .match_body(Matcher::PartialJson(json!({
                "match_type": "LEAGUE",
                "map_name": "dod_anzio",
                "played_date": "2025-03-01",
                "team1_score": 2
            })))
            .with_status(200)
            .with_body(response.to_string())
            .create_async()
            .await;

        let detail = api(&server).load_match(&request).await.unwrap();
        mock.assert_async().await;
        let (team1, team2) = aggregate_match(&detail);
        assert_eq!(team1.player(5).unwrap().total, StatLine::new(18, 8, 1));
        assert_eq!(team1.player(5).unwrap().total.kd(), "2.25");
        assert_eq!(team2.total, StatLine::default());
        assert_eq!(detail.summary.winner_id(), Some(1));
    }
}
