//! K/D, win/draw/loss and ranking helpers shared by every leaderboard view.
use crate::{LeaderboardEntry, Match, Player, Team};
use std::cmp::Ordering;

// ---------------------------------------------------------------------------
// K/D
// ---------------------------------------------------------------------------

/// Formats `value` with `digits` decimals, breaking an exact tie upward.
///
/// `{:.N}` already prints the exact binary value correctly rounded, but it
/// settles exact halves to even. Only a value whose binary expansion sits
/// exactly on the half needs nudging: `0.125` prints as `0.13`, while `1.005`
/// (stored as `1.00499...`) stays `1.00`.
fn to_fixed(value: f64, digits: usize) -> String {
    let scale = 2.0 * 10f64.powi(digits as i32);
    let doubled = (value * scale).round();
    let exact_half = doubled % 2.0 == 1.0 && value.mul_add(scale, -doubled) == 0.0;
    if exact_half {
        let up = (doubled + 1.0) / scale;
        return format!("{up:.digits$}");
    }
    format!("{value:.digits$}")
}

fn quotient(numerator: i64, denominator: i64) -> f64 {
    numerator.max(0) as f64 / denominator as f64
}

/// Raw K/D. With zero deaths the ratio is the kill count.
pub fn kd_value(kills: i64, deaths: i64) -> f64 {
    let deaths = deaths.max(0);
    if deaths == 0 {
        return kills.max(0) as f64;
    }
    quotient(kills, deaths)
}

/// K/D formatted to two decimals: `kd_ratio(3, 4) == "0.75"`, `kd_ratio(5, 0) == "5.00"`.
pub fn kd_ratio(kills: i64, deaths: i64) -> String {
    to_fixed(kd_value(kills, deaths), 2)
}

/// `total / matches` to one decimal; `"0.0"` when nothing was played.
pub fn per_match(total: i64, matches: i64) -> String {
    if matches <= 0 {
        return "0.0".to_string();
    }
    to_fixed(quotient(total, matches), 1)
}

// ---------------------------------------------------------------------------
// Win / draw / loss
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl Outcome {
    pub fn letter(&self) -> char {
        match self {
            Outcome::Win => 'W',
            Outcome::Loss => 'L',
            Outcome::Draw => 'D',
        }
    }
}

pub fn outcome(score_for: i64, score_against: i64) -> Outcome {
    match score_for.cmp(&score_against) {
        Ordering::Greater => Outcome::Win,
        Ordering::Less => Outcome::Loss,
        Ordering::Equal => Outcome::Draw,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeamRecord {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl TeamRecord {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Draw => self.draws += 1,
        }
    }

    pub fn matches(&self) -> u32 {
        self.wins + self.losses + self.draws
    }

    /// `wins / (wins + losses + draws)`, with an empty record rated 0.
    pub fn win_rate(&self) -> f64 {
        f64::from(self.wins) / f64::from(self.matches().max(1))
    }

    /// Whole-number percentage, rounded half-up.
    pub fn win_rate_percent(&self) -> u32 {
        let total = self.matches();
        if total == 0 {
            return 0;
        }
        (self.wins * 200 + total) / (total * 2)
    }

    /// `"3W-1L"`, with draws appended only when there are any.
    pub fn summary(&self) -> String {
        if self.draws > 0 {
            format!("{}W-{}L-{}D", self.wins, self.losses, self.draws)
        } else {
            format!("{}W-{}L", self.wins, self.losses)
        }
    }
}

/// Record of `team_id` over the played matches it took part in.
pub fn team_record<'a>(team_id: i64, matches: impl IntoIterator<Item = &'a Match>) -> TeamRecord {
    let mut record = TeamRecord::default();
    for m in matches {
        if let Some(outcome) = m.outcome_for(team_id) {
            record.record(outcome);
        }
    }
    record
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamStanding {
    pub team: Team,
    pub record: TeamRecord,
}

/// Competitive teams ordered by win rate, best first. Free agents are left out.
pub fn team_standings(teams: &[Team], matches: &[Match]) -> Vec<TeamStanding> {
    let mut standings: Vec<TeamStanding> = teams
        .iter()
        .filter(|t| !t.is_free_agents)
        .map(|team| TeamStanding { team: team.clone(), record: team_record(team.id, matches) })
        .collect();
    sort_ranked(&mut standings, StatKey::WinRate, SortOrder::Desc);
    standings
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_query(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    pub fn arrow(&self) -> char {
        match self {
            SortOrder::Asc => '↑',
            SortOrder::Desc => '↓',
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatKey {
    #[default]
    KdRatio,
    Kills,
    Deaths,
    Flags,
    MatchesPlayed,
    WinRate,
}

impl StatKey {
    /// Keys the player leaderboard can be sorted by.
    pub const LEADERBOARD: [StatKey; 5] = [
        StatKey::KdRatio,
        StatKey::Kills,
        StatKey::Deaths,
        StatKey::Flags,
        StatKey::MatchesPlayed,
    ];

    /// Value of the backend's `sort_by` parameter.
    pub fn as_query(&self) -> &'static str {
        match self {
            StatKey::KdRatio => "kd_ratio",
            StatKey::Kills => "kills",
            StatKey::Deaths => "deaths",
            StatKey::Flags => "flags",
            StatKey::MatchesPlayed => "matches",
            StatKey::WinRate => "win_rate",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatKey::KdRatio => "K/D Ratio",
            StatKey::Kills => "Total Kills",
            StatKey::Deaths => "Total Deaths",
            StatKey::Flags => "Total Flags",
            StatKey::MatchesPlayed => "Matches Played",
            StatKey::WinRate => "Win Rate",
        }
    }

    /// Next leaderboard key, wrapping around.
    pub fn next_leaderboard(self) -> Self {
        let idx = Self::LEADERBOARD.iter().position(|k| *k == self).unwrap_or(0);
        Self::LEADERBOARD[(idx + 1) % Self::LEADERBOARD.len()]
    }
}

/// Anything that can be placed on a leaderboard.
pub trait Ranked {
    fn stat(&self, key: StatKey) -> f64;
}

impl Ranked for Player {
    fn stat(&self, key: StatKey) -> f64 {
        match key {
            StatKey::KdRatio => kd_value(self.total_kills, self.total_deaths),
            StatKey::Kills => self.total_kills.max(0) as f64,
            StatKey::Deaths => self.total_deaths.max(0) as f64,
            StatKey::Flags => self.total_flags.max(0) as f64,
            StatKey::MatchesPlayed => self.matches_played.max(0) as f64,
            StatKey::WinRate => 0.0,
        }
    }
}

impl Ranked for LeaderboardEntry {
    fn stat(&self, key: StatKey) -> f64 {
        match key {
            StatKey::KdRatio => kd_value(self.total_kills, self.total_deaths),
            StatKey::Kills => self.total_kills.max(0) as f64,
            StatKey::Deaths => self.total_deaths.max(0) as f64,
            StatKey::Flags => self.total_flags.max(0) as f64,
            StatKey::MatchesPlayed => self.matches_played.max(0) as f64,
            StatKey::WinRate => 0.0,
        }
    }
}

impl Ranked for TeamStanding {
    fn stat(&self, key: StatKey) -> f64 {
        match key {
            StatKey::WinRate => self.record.win_rate(),
            StatKey::MatchesPlayed => f64::from(self.record.matches()),
            _ => 0.0,
        }
    }
}

/// Stable sort by `key`. Entries with equal keys keep the order they arrived in.
pub fn sort_ranked<T: Ranked>(items: &mut [T], key: StatKey, order: SortOrder) {
    items.sort_by(|a, b| {
        let ord = a.stat(key).partial_cmp(&b.stat(key)).unwrap_or(Ordering::Equal);
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn entry(id: i64, nickname: &str, kills: i64, deaths: i64) -> LeaderboardEntry {
        LeaderboardEntry {
            id,
            nickname: nickname.into(),
            total_kills: kills,
            total_deaths: deaths,
            matches_played: 1,
            ..Default::default()
        }
    }

    fn played(id: i64, team1_id: i64, team2_id: i64, s1: i64, s2: i64) -> Match {
        Match {
            id,
            team1_id,
            team2_id,
            team1_score: s1,
            team2_score: s2,
            played_date: Some(Utc.with_ymd_and_hms(2025, 3, id as u32, 20, 0, 0).unwrap()),
            ..Default::default()
        }
    }

    #[test]
    fn kd_follows_display_convention() {
        assert_eq!(kd_ratio(0, 0), "0.00");
        assert_eq!(kd_ratio(5, 0), "5.00");
        assert_eq!(kd_ratio(4, 2), "2.00");
        assert_eq!(kd_ratio(3, 4), "0.75");
        assert_eq!(kd_ratio(18, 8), "2.25");
    }

    #[test]
    fn kd_rounds_half_up() {
        // 1/8 = 0.125 exactly
        assert_eq!(kd_ratio(1, 8), "0.13");
        assert_eq!(kd_ratio(2, 3), "0.67");
        assert_eq!(kd_ratio(1, 3), "0.33");
        assert_eq!(kd_value(1, 8), 0.125);
    }

    #[test]
    fn kd_rounds_the_float_quotient() {
        // 201/200 and 3/200 are stored just below their halfway points
        assert_eq!(kd_ratio(201, 200), "1.00");
        assert_eq!(kd_ratio(3, 200), "0.01");
        assert_eq!(per_match(3, 20), "0.1");
        assert_eq!(per_match(1, 4), "0.3");
    }

    #[test]
    fn kd_survives_huge_counts() {
        assert!(kd_ratio(i64::MAX / 150, 3).ends_with(".00"));
        assert_eq!(kd_ratio(i64::MAX, 0), format!("{:.2}", i64::MAX as f64));
        assert!(per_match(i64::MAX, 1).ends_with(".0"));
        let mut board = vec![entry(1, "huge", i64::MAX, 1), entry(2, "small", 3, 4)];
        sort_ranked(&mut board, StatKey::KdRatio, SortOrder::Desc);
        assert_eq!(board[0].id, 1);
    }

    #[test]
    fn kd_clamps_negative_counts() {
        assert_eq!(kd_ratio(-3, 2), "0.00");
        assert_eq!(kd_ratio(4, -1), "4.00");
    }

    #[test]
    fn per_match_average_has_one_decimal() {
        assert_eq!(per_match(18, 4), "4.5");
        assert_eq!(per_match(10, 3), "3.3");
        assert_eq!(per_match(5, 0), "0.0");
    }

    #[test]
    fn outcomes_cover_win_loss_draw() {
        assert_eq!(outcome(2, 1), Outcome::Win);
        assert_eq!(outcome(1, 2), Outcome::Loss);
        assert_eq!(outcome(1, 1), Outcome::Draw);
    }

    #[test]
    fn empty_record_has_zero_win_rate() {
        let record = TeamRecord::default();
        assert_eq!(record.win_rate(), 0.0);
        assert_eq!(record.win_rate_percent(), 0);
        assert_eq!(record.summary(), "0W-0L");
    }

    #[test]
    fn record_counts_draws_separately() {
        let matches = vec![
            played(1, 1, 2, 2, 1),
            played(2, 2, 1, 3, 3),
            played(3, 1, 3, 0, 1),
            Match { id: 4, team1_id: 1, team2_id: 2, ..Default::default() },
        ];
        let record = team_record(1, &matches);
        assert_eq!(record, TeamRecord { wins: 1, losses: 1, draws: 1 });
        assert_eq!(record.summary(), "1W-1L-1D");
        assert_eq!(record.win_rate_percent(), 33);
    }

    #[test]
    fn tied_leaderboard_entries_keep_backend_order() {
        let mut board = vec![entry(1, "Second", 30, 10), entry(2, "Third", 10, 2), entry(3, "First", 30, 5)];
        sort_ranked(&mut board, StatKey::Kills, SortOrder::Desc);
        let names: Vec<&str> = board.iter().map(|e| e.nickname.as_str()).collect();
        assert_eq!(names, vec!["Second", "First", "Third"]);

        sort_ranked(&mut board, StatKey::Kills, SortOrder::Asc);
        let names: Vec<&str> = board.iter().map(|e| e.nickname.as_str()).collect();
        assert_eq!(names, vec!["Third", "Second", "First"]);
    }

    #[test]
    fn kd_sort_uses_zero_death_convention() {
        let mut board = vec![entry(1, "a", 3, 4), entry(2, "b", 5, 0), entry(3, "c", 0, 0)];
        sort_ranked(&mut board, StatKey::KdRatio, SortOrder::Desc);
        let ids: Vec<i64> = board.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn standings_skip_free_agents_and_rank_by_win_rate() {
        let teams = vec![
            Team { id: 1, name: "Alpha".into(), tag: "ALP".into(), ..Default::default() },
            Team { id: 2, name: "Beta".into(), tag: "BET".into(), ..Default::default() },
            Team { id: 3, name: "Free Agents".into(), tag: "FA".into(), is_free_agents: true, ..Default::default() },
            Team { id: 4, name: "Idle".into(), tag: "IDL".into(), ..Default::default() },
        ];
        let matches = vec![played(1, 1, 2, 1, 2), played(2, 2, 1, 2, 0)];
        let standings = team_standings(&teams, &matches);
        let ids: Vec<i64> = standings.iter().map(|s| s.team.id).collect();
        assert_eq!(ids, vec![2, 1, 4]);
        assert_eq!(standings[2].record.win_rate(), 0.0);
    }

    #[test]
    fn leaderboard_keys_cycle() {
        assert_eq!(StatKey::KdRatio.next_leaderboard(), StatKey::Kills);
        assert_eq!(StatKey::MatchesPlayed.next_leaderboard(), StatKey::KdRatio);
        assert_eq!(StatKey::MatchesPlayed.as_query(), "matches");
    }
}
