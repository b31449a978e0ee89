//! Match statistics aggregation.
//!
//! Stat records arrive flat: one row per player per half. These functions fold
//! them into per-player rows (half 1, half 2, total) and a team footer. Inputs are
//! never rejected; negative counts become zero and a missing half reads as zeros.
use crate::ranking::{self, Outcome};
use crate::{MatchDetail, PlayerMatchStat};
use std::collections::HashMap;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatLine {
    pub kills: u32,
    pub deaths: u32,
    pub flags: u32,
}

impl StatLine {
    pub fn new(kills: u32, deaths: u32, flags: u32) -> Self {
        Self { kills, deaths, flags }
    }

    /// Builds a line from raw backend numbers, clamping each to `0..=u32::MAX`.
    pub fn clamped(kills: i64, deaths: i64, flags: i64) -> Self {
        let clamp = |n: i64| n.clamp(0, i64::from(u32::MAX)) as u32;
        Self { kills: clamp(kills), deaths: clamp(deaths), flags: clamp(flags) }
    }

    pub fn kd(&self) -> String {
        ranking::kd_ratio(i64::from(self.kills), i64::from(self.deaths))
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl From<&PlayerMatchStat> for StatLine {
    fn from(stat: &PlayerMatchStat) -> Self {
        StatLine::clamped(stat.kills, stat.deaths, stat.flags)
    }
}

impl Add for StatLine {
    type Output = StatLine;

    fn add(self, rhs: StatLine) -> StatLine {
        StatLine {
            kills: self.kills.saturating_add(rhs.kills),
            deaths: self.deaths.saturating_add(rhs.deaths),
            flags: self.flags.saturating_add(rhs.flags),
        }
    }
}

impl AddAssign for StatLine {
    fn add_assign(&mut self, rhs: StatLine) {
        *self = *self + rhs;
    }
}

impl Sum for StatLine {
    fn sum<I: Iterator<Item = StatLine>>(iter: I) -> StatLine {
        iter.fold(StatLine::default(), Add::add)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Half {
    First,
    Second,
}

impl Half {
    /// `1` or `2`; anything else is not a half.
    pub fn from_number(n: i64) -> Option<Self> {
        match n {
            1 => Some(Half::First),
            2 => Some(Half::Second),
            _ => None,
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            Half::First => 1,
            Half::Second => 2,
        }
    }

    pub fn other(&self) -> Self {
        match self {
            Half::First => Half::Second,
            Half::Second => Half::First,
        }
    }
}

/// One player's row in a match table.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerMatchLine {
    pub player_id: i64,
    pub nickname: String,
    pub is_ringer: bool,
    pub half1: StatLine,
    pub half2: StatLine,
    pub total: StatLine,
}

impl PlayerMatchLine {
    fn empty(stat: &PlayerMatchStat) -> Self {
        Self {
            player_id: stat.player_id,
            nickname: stat
                .player_nickname
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            is_ringer: false,
            half1: StatLine::default(),
            half2: StatLine::default(),
            total: StatLine::default(),
        }
    }

    pub fn half(&self, half: Half) -> StatLine {
        match half {
            Half::First => self.half1,
            Half::Second => self.half2,
        }
    }
}

/// One side of a match: player rows plus the footer sums.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamMatchTable {
    pub team_id: i64,
    pub players: Vec<PlayerMatchLine>,
    pub half1: StatLine,
    pub half2: StatLine,
    pub total: StatLine,
}

impl TeamMatchTable {
    pub fn player(&self, player_id: i64) -> Option<&PlayerMatchLine> {
        self.players.iter().find(|p| p.player_id == player_id)
    }
}

/// Aggregates the records filed under `team_id`.
///
/// Rows keep the order in which players first appear. A half record replaces
/// (never adds to) whatever was stored for that half, so a duplicated record
/// does not double count. Records for a half other than 1 or 2 are skipped.
pub fn aggregate_team(stats: &[PlayerMatchStat], team_id: i64) -> TeamMatchTable {
    let mut rows: Vec<PlayerMatchLine> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for stat in stats.iter().filter(|s| s.team_id == team_id) {
        let idx = *index.entry(stat.player_id).or_insert_with(|| {
            rows.push(PlayerMatchLine::empty(stat));
            rows.len() - 1
        });
        let row = &mut rows[idx];
        row.is_ringer |= stat.is_ringer;
        match Half::from_number(stat.half) {
            Some(Half::First) => row.half1 = stat.into(),
            Some(Half::Second) => row.half2 = stat.into(),
            None => {}
        }
    }

    for row in &mut rows {
        row.total = row.half1 + row.half2;
    }

    TeamMatchTable {
        team_id,
        half1: rows.iter().map(|r| r.half1).sum(),
        half2: rows.iter().map(|r| r.half2).sum(),
        total: rows.iter().map(|r| r.total).sum(),
        players: rows,
    }
}

/// Both sides of a match, team 1 first.
pub fn aggregate_match(detail: &MatchDetail) -> (TeamMatchTable, TeamMatchTable) {
    (
        aggregate_team(&detail.player_stats, detail.summary.team1_id),
        aggregate_team(&detail.player_stats, detail.summary.team2_id),
    )
}

/// Sum of every record filed for `player_id`, whichever side it was filed under.
pub fn player_totals<'a>(
    stats: impl IntoIterator<Item = &'a PlayerMatchStat>,
    player_id: i64,
) -> StatLine {
    stats
        .into_iter()
        .filter(|s| s.player_id == player_id)
        .map(StatLine::from)
        .sum()
}

/// One match in a player's history.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerMatchHistoryRow {
    pub match_id: i64,
    pub played_on: Option<chrono::NaiveDate>,
    pub map_name: String,
    pub team_id: i64,
    pub opponent_label: String,
    pub is_ringer: bool,
    pub line: PlayerMatchLine,
    pub outcome: Option<Outcome>,
}

/// Matches `player_id` took part in, newest first, with their per-match line
/// and the result for the side they played on.
pub fn player_history(player_id: i64, details: &[MatchDetail]) -> Vec<PlayerMatchHistoryRow> {
    let mut rows: Vec<PlayerMatchHistoryRow> = details
        .iter()
        .filter_map(|detail| {
            let side = detail
                .player_stats
                .iter()
                .find(|s| s.player_id == player_id)?
                .team_id;
            let table = aggregate_team(&detail.player_stats, side);
            let line = table.player(player_id)?.clone();
            let summary = &detail.summary;
            let opponent_label = if side == summary.team1_id {
                summary.team2_label()
            } else {
                summary.team1_label()
            };
            Some(PlayerMatchHistoryRow {
                match_id: summary.id,
                played_on: summary.played_date.map(|d| d.date_naive()),
                map_name: summary.map_label().to_string(),
                team_id: side,
                opponent_label,
                is_ringer: line.is_ringer,
                outcome: summary.outcome_for(side),
                line,
            })
        })
        .collect();
    rows.sort_by(|a, b| b.played_on.cmp(&a.played_on));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Match;
    use chrono::{TimeZone, Utc};

    fn stat(player_id: i64, team_id: i64, half: i64, k: i64, d: i64, f: i64) -> PlayerMatchStat {
        PlayerMatchStat {
            player_id,
            team_id,
            half,
            kills: k,
            deaths: d,
            flags: f,
            player_nickname: Some(format!("p{player_id}")),
            ..Default::default()
        }
    }

    fn detail(id: i64, day: u32, s1: i64, s2: i64, stats: Vec<PlayerMatchStat>) -> MatchDetail {
        MatchDetail {
            summary: Match {
                id,
                team1_id: 1,
                team2_id: 2,
                team1_score: s1,
                team2_score: s2,
                map_name: Some("dod_anzio".into()),
                played_date: Some(Utc.with_ymd_and_hms(2025, 3, day, 20, 0, 0).unwrap()),
                team1_tag: Some("ALP".into()),
                team2_tag: Some("BET".into()),
                ..Default::default()
            },
            player_stats: stats,
        }
    }

    #[test]
    fn fragger_scenario_sums_both_halves() {
        let mut first = stat(5, 1, 1, 10, 3, 1);
        first.player_nickname = Some("Fragger".into());
        let mut second = stat(5, 1, 2, 8, 5, 0);
        second.player_nickname = Some("Fragger".into());
        let m = detail(1, 1, 2, 1, vec![first, second, stat(6, 2, 1, 4, 9, 0), stat(6, 2, 2, 3, 9, 0)]);

        let (alpha, beta) = aggregate_match(&m);
        let fragger = alpha.player(5).unwrap();
        assert_eq!(fragger.nickname, "Fragger");
        assert_eq!(fragger.half1, StatLine::new(10, 3, 1));
        assert_eq!(fragger.half2, StatLine::new(8, 5, 0));
        assert_eq!(fragger.total, StatLine::new(18, 8, 1));
        assert_eq!(fragger.total.kd(), "2.25");
        assert_eq!(beta.players.len(), 1);
        assert_eq!(beta.total, StatLine::new(7, 18, 0));
    }

    #[test]
    fn totals_agree_across_levels() {
        let stats = vec![
            stat(1, 1, 1, 5, 2, 0),
            stat(2, 1, 1, 7, 1, 2),
            stat(1, 1, 2, 3, 3, 1),
            stat(2, 1, 2, 0, 4, 0),
            stat(3, 1, 2, 9, 0, 0),
        ];
        let table = aggregate_team(&stats, 1);
        let row_sum: StatLine = table.players.iter().map(|p| p.total).sum();
        assert_eq!(row_sum, table.total);
        assert_eq!(table.half1 + table.half2, table.total);
        let raw: StatLine = stats.iter().map(StatLine::from).sum();
        assert_eq!(raw, table.total);
    }

    #[test]
    fn out_of_range_half_is_skipped() {
        let stats = vec![stat(1, 1, 2, 6, 2, 1), stat(1, 1, 3, 40, 0, 0), stat(1, 1, 0, 9, 9, 9)];
        let table = aggregate_team(&stats, 1);
        let row = table.player(1).unwrap();
        assert!(row.half1.is_zero());
        assert_eq!(row.half2, StatLine::new(6, 2, 1));
        assert_eq!(table.total, StatLine::new(6, 2, 1));
    }

    #[test]
    fn missing_half_reads_as_zero() {
        let table = aggregate_team(&[stat(1, 1, 2, 4, 1, 0)], 1);
        let row = &table.players[0];
        assert!(row.half1.is_zero());
        assert_eq!(row.total, StatLine::new(4, 1, 0));
    }

    #[test]
    fn players_without_records_for_the_team_are_absent() {
        let stats = vec![stat(1, 1, 1, 1, 1, 1), stat(1, 1, 2, 1, 1, 1), stat(2, 2, 1, 0, 0, 0)];
        let table = aggregate_team(&stats, 1);
        assert_eq!(table.players.len(), 1);
        assert!(table.player(2).is_none());
        assert!(aggregate_team(&stats, 99).players.is_empty());
    }

    #[test]
    fn negative_counts_are_clamped() {
        let table = aggregate_team(&[stat(1, 1, 1, -3, 2, -1)], 1);
        assert_eq!(table.players[0].half1, StatLine::new(0, 2, 0));
    }

    #[test]
    fn ringer_flag_carries_from_either_record() {
        let mut second = stat(4, 2, 2, 1, 1, 0);
        second.is_ringer = true;
        let table = aggregate_team(&[stat(4, 2, 1, 1, 1, 0), second], 2);
        assert!(table.players[0].is_ringer);
    }

    #[test]
    fn rows_keep_first_appearance_order() {
        let stats = vec![stat(9, 1, 1, 0, 0, 0), stat(3, 1, 1, 0, 0, 0), stat(9, 1, 2, 0, 0, 0)];
        let ids: Vec<i64> = aggregate_team(&stats, 1).players.iter().map(|p| p.player_id).collect();
        assert_eq!(ids, vec![9, 3]);
    }

    #[test]
    fn player_totals_span_sides_and_matches() {
        let a = detail(1, 1, 2, 1, vec![stat(5, 1, 1, 2, 1, 0), stat(5, 1, 2, 3, 1, 0)]);
        let b = detail(2, 2, 0, 1, vec![stat(5, 2, 1, 1, 0, 1), stat(5, 2, 2, 1, 0, 0)]);
        let all = a.player_stats.iter().chain(b.player_stats.iter());
        assert_eq!(player_totals(all, 5), StatLine::new(7, 2, 1));
    }

    #[test]
    fn history_is_newest_first_with_side_outcome() {
        let older = detail(1, 1, 2, 1, vec![stat(5, 1, 1, 2, 1, 0), stat(5, 1, 2, 3, 1, 0)]);
        let newer = detail(2, 5, 2, 1, vec![stat(5, 2, 1, 1, 0, 1), stat(5, 2, 2, 1, 0, 0)]);
        let other = detail(3, 9, 1, 1, vec![stat(8, 1, 1, 1, 1, 1)]);
        let history = player_history(5, &[older, newer, other]);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].match_id, 2);
        assert_eq!(history[0].outcome, Some(Outcome::Loss));
        assert_eq!(history[0].opponent_label, "ALP");
        assert_eq!(history[1].outcome, Some(Outcome::Win));
        assert_eq!(history[1].line.total, StatLine::new(5, 2, 0));
    }
}
