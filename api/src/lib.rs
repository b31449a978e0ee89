pub mod aggregate;
pub mod client;
pub mod lineup;
pub mod ranking;
pub mod wire;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::ranking::Outcome;
use crate::wire::lenient_datetime;

// ---------------------------------------------------------------------------
// Domain types mirroring the backend JSON bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchType {
    Draft,
    #[default]
    League,
    Scrim,
}

impl MatchType {
    pub const ALL: [MatchType; 3] = [MatchType::Draft, MatchType::League, MatchType::Scrim];

    pub fn label(&self) -> &'static str {
        match self {
            MatchType::Draft => "DRAFT",
            MatchType::League => "LEAGUE",
            MatchType::Scrim => "SCRIM",
        }
    }

    /// Ringers may only be added to SCRIM lineups.
    pub fn permits_ringers(&self) -> bool {
        matches!(self, MatchType::Scrim)
    }

    pub fn next(self) -> Self {
        match self {
            MatchType::Draft => MatchType::League,
            MatchType::League => MatchType::Scrim,
            MatchType::Scrim => MatchType::Draft,
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub tag: String,
    #[serde(default)]
    pub is_free_agents: bool,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub player_count: Option<i64>,
}

impl Team {
    /// Competitive rosters hold at most this many players. Free agents are exempt.
    pub const MAX_ROSTER: usize = 10;

    pub fn roster_full(&self, roster_size: usize) -> bool {
        !self.is_free_agents && roster_size >= Self::MAX_ROSTER
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamDetail {
    #[serde(flatten)]
    pub team: Team,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub matches_played: i64,
    #[serde(default)]
    pub wins: i64,
    #[serde(default)]
    pub losses: i64,
    #[serde(default)]
    pub draws: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    pub nickname: String,
    #[serde(default)]
    pub team_id: Option<i64>,
    #[serde(default)]
    pub total_kills: i64,
    #[serde(default)]
    pub total_deaths: i64,
    #[serde(default)]
    pub total_flags: i64,
    #[serde(default)]
    pub matches_played: i64,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Player {
    pub fn is_free_agent(&self) -> bool {
        self.team_id.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerDetail {
    #[serde(flatten)]
    pub player: Player,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub kd_ratio: f64,
    #[serde(default)]
    pub match_history: Vec<MatchHistoryEntry>,
}

/// A match the player has stat records in, as listed on the player endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchHistoryEntry {
    pub match_id: i64,
    #[serde(default)]
    pub match_type: MatchType,
    #[serde(default)]
    pub player_kills: i64,
    #[serde(default)]
    pub player_deaths: i64,
    #[serde(default)]
    pub player_flags: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: i64,
    pub match_type: MatchType,
    pub team1_id: i64,
    pub team2_id: i64,
    #[serde(default)]
    pub team1_score: i64,
    #[serde(default)]
    pub team2_score: i64,
    #[serde(default)]
    pub map_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub scheduled_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub played_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub team1_name: Option<String>,
    #[serde(default)]
    pub team2_name: Option<String>,
    #[serde(default)]
    pub team1_tag: Option<String>,
    #[serde(default)]
    pub team2_tag: Option<String>,
}

/// Where a match sits in its lifecycle, derived from which date is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    Played,
    Upcoming,
    Unscheduled,
}

impl Match {
    /// A match with a `played_date` is complete, regardless of `scheduled_date`.
    pub fn status(&self) -> MatchStatus {
        match (self.played_date, self.scheduled_date) {
            (Some(_), _) => MatchStatus::Played,
            (None, Some(_)) => MatchStatus::Upcoming,
            (None, None) => MatchStatus::Unscheduled,
        }
    }

    pub fn is_played(&self) -> bool {
        self.status() == MatchStatus::Played
    }

    pub fn involves(&self, team_id: i64) -> bool {
        self.team1_id == team_id || self.team2_id == team_id
    }

    /// `(score_for, score_against)` from `team_id`'s side, if it played in this match.
    pub fn scores_for(&self, team_id: i64) -> Option<(i64, i64)> {
        if self.team1_id == team_id {
            Some((self.team1_score, self.team2_score))
        } else if self.team2_id == team_id {
            Some((self.team2_score, self.team1_score))
        } else {
            None
        }
    }

    /// Only played matches produce an outcome.
    pub fn outcome_for(&self, team_id: i64) -> Option<Outcome> {
        if !self.is_played() {
            return None;
        }
        self.scores_for(team_id)
            .map(|(ours, theirs)| ranking::outcome(ours, theirs))
    }

    pub fn winner_id(&self) -> Option<i64> {
        if !self.is_played() {
            return None;
        }
        match self.team1_score.cmp(&self.team2_score) {
            std::cmp::Ordering::Greater => Some(self.team1_id),
            std::cmp::Ordering::Less => Some(self.team2_id),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn team1_label(&self) -> String {
        team_label(self.team1_tag.as_deref(), self.team1_name.as_deref(), self.team1_id)
    }

    pub fn team2_label(&self) -> String {
        team_label(self.team2_tag.as_deref(), self.team2_name.as_deref(), self.team2_id)
    }

    pub fn map_label(&self) -> &str {
        self.map_name.as_deref().filter(|m| !m.is_empty()).unwrap_or("Unknown")
    }
}

fn team_label(tag: Option<&str>, name: Option<&str>, id: i64) -> String {
    match (tag, name) {
        (Some(tag), _) if !tag.is_empty() => tag.to_string(),
        (_, Some(name)) if !name.is_empty() => name.to_string(),
        _ => format!("#{id}"),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchDetail {
    #[serde(flatten)]
    pub summary: Match,
    #[serde(default)]
    pub player_stats: Vec<PlayerMatchStat>,
}

/// One player's numbers for one half of one match.
///
/// `team_id` is the side the player represented in this match, which need not be
/// the player's current team (ringers, or players who transferred since).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerMatchStat {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub match_id: Option<i64>,
    pub player_id: i64,
    pub team_id: i64,
    pub half: i64,
    #[serde(default)]
    pub kills: i64,
    #[serde(default)]
    pub deaths: i64,
    #[serde(default)]
    pub flags: i64,
    #[serde(default)]
    pub is_ringer: bool,
    #[serde(default)]
    pub player_nickname: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: i64,
    pub nickname: String,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub total_kills: i64,
    #[serde(default)]
    pub total_deaths: i64,
    #[serde(default)]
    pub total_flags: i64,
    #[serde(default)]
    pub matches_played: i64,
    #[serde(default)]
    pub kd_ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    #[serde(default)]
    pub total_matches: i64,
    #[serde(default)]
    pub total_teams: i64,
    #[serde(default)]
    pub total_players: i64,
    #[serde(default)]
    pub most_played_map: Option<String>,
    #[serde(default)]
    pub most_played_map_count: i64,
    #[serde(default)]
    pub top_kd_player: Option<LeaderboardEntry>,
    #[serde(default)]
    pub top_flags_player: Option<LeaderboardEntry>,
    #[serde(default)]
    pub recent_matches: Vec<Match>,
    #[serde(default)]
    pub upcoming_matches: Vec<Match>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapPlayCount {
    pub map_name: String,
    #[serde(alias = "play_count")]
    pub times_played: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MapRecord {
    #[serde(default)]
    pub wins: i64,
    #[serde(default)]
    pub losses: i64,
}

/// Per-team numbers from the stats endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamRecordStats {
    pub team_id: i64,
    #[serde(default)]
    pub team_name: String,
    #[serde(default)]
    pub team_tag: String,
    #[serde(default)]
    pub total_matches: i64,
    #[serde(default)]
    pub wins: i64,
    #[serde(default)]
    pub losses: i64,
    #[serde(default)]
    pub draws: i64,
    #[serde(default)]
    pub win_rate: f64,
    #[serde(default)]
    pub total_score_for: i64,
    #[serde(default)]
    pub total_score_against: i64,
    #[serde(default)]
    pub score_difference: i64,
    #[serde(default)]
    pub map_record: BTreeMap<String, MapRecord>,
}

/// Query parameters accepted by the match list endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchFilter {
    pub match_type: Option<MatchType>,
    pub is_completed: Option<bool>,
}

impl MatchFilter {
    pub fn of_type(match_type: Option<MatchType>) -> Self {
        Self { match_type, is_completed: None }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(t) = self.match_type {
            pairs.push(("match_type", t.label().to_string()));
        }
        if let Some(done) = self.is_completed {
            pairs.push(("is_completed", done.to_string()));
        }
        pairs
    }

    /// Steps All → DRAFT → LEAGUE → SCRIM → All.
    pub fn cycle_type(&mut self) {
        self.match_type = match self.match_type {
            None => Some(MatchType::Draft),
            Some(MatchType::Scrim) => None,
            Some(t) => Some(t.next()),
        };
    }

    pub fn label(&self) -> &'static str {
        self.match_type.map(|t| t.label()).unwrap_or("All Types")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn played(team1_score: i64, team2_score: i64) -> Match {
        Match {
            id: 1,
            team1_id: 10,
            team2_id: 20,
            team1_score,
            team2_score,
            played_date: Some(Utc.with_ymd_and_hms(2025, 3, 1, 20, 0, 0).unwrap()),
            ..Default::default()
        }
    }

    #[test]
    fn match_status_prefers_played_date() {
        let mut m = played(2, 1);
        m.scheduled_date = m.played_date;
        assert_eq!(m.status(), MatchStatus::Played);
        m.played_date = None;
        assert_eq!(m.status(), MatchStatus::Upcoming);
        m.scheduled_date = None;
        assert_eq!(m.status(), MatchStatus::Unscheduled);
    }

    #[test]
    fn outcome_is_seen_from_each_side() {
        let m = played(2, 1);
        assert_eq!(m.outcome_for(10), Some(Outcome::Win));
        assert_eq!(m.outcome_for(20), Some(Outcome::Loss));
        assert_eq!(m.outcome_for(30), None);
        assert_eq!(m.winner_id(), Some(10));
        assert_eq!(played(1, 1).winner_id(), None);
    }

    #[test]
    fn upcoming_match_has_no_outcome() {
        let mut m = played(3, 0);
        m.played_date = None;
        assert_eq!(m.outcome_for(10), None);
        assert_eq!(m.winner_id(), None);
    }

    #[test]
    fn match_type_uses_uppercase_wire_names() {
        assert_eq!(serde_json::to_string(&MatchType::Scrim).unwrap(), "\"SCRIM\"");
        let t: MatchType = serde_json::from_str("\"DRAFT\"").unwrap();
        assert_eq!(t, MatchType::Draft);
        assert!(MatchType::Scrim.permits_ringers());
        assert!(!MatchType::League.permits_ringers());
    }

    #[test]
    fn filter_cycles_through_all_types() {
        let mut f = MatchFilter::default();
        assert!(f.query_pairs().is_empty());
        f.cycle_type();
        assert_eq!(f.query_pairs(), vec![("match_type", "DRAFT".to_string())]);
        f.cycle_type();
        f.cycle_type();
        assert_eq!(f.label(), "SCRIM");
        f.cycle_type();
        assert_eq!(f.match_type, None);
    }

    #[test]
    fn free_agents_are_exempt_from_roster_cap() {
        let mut team = Team { id: 1, name: "Alpha".into(), tag: "ALP".into(), ..Default::default() };
        assert!(!team.roster_full(9));
        assert!(team.roster_full(10));
        team.is_free_agents = true;
        assert!(!team.roster_full(40));
    }

    #[test]
    fn match_detail_decodes_backend_body() {
        let body = serde_json::json!({
            "id": 7,
            "match_type": "LEAGUE",
            "team1_id": 1,
            "team2_id": 2,
            "team1_score": 2,
            "team2_score": 1,
            "map_name": "dod_anzio",
            "scheduled_date": null,
            "played_date": "2025-03-01T00:00:00",
            "is_completed": true,
            "created_at": "2025-03-01T12:30:00.123456Z",
            "team1_tag": "ALP",
            "team2_tag": "BET",
            "player_stats": [
                {"id": 1, "match_id": 7, "player_id": 5, "team_id": 1, "half": 1,
                 "kills": 10, "deaths": 3, "flags": 1, "is_ringer": false,
                 "player_nickname": "Fragger"}
            ]
        });
        let detail: MatchDetail = serde_json::from_value(body).unwrap();
        assert_eq!(detail.summary.match_type, MatchType::League);
        assert!(detail.summary.is_played());
        assert_eq!(detail.summary.team1_label(), "ALP");
        assert_eq!(detail.player_stats.len(), 1);
        assert_eq!(detail.player_stats[0].player_nickname.as_deref(), Some("Fragger"));
    }
}
