//! Match-load workflow: two lineups with per-half stat entry, flattened into a
//! single `MatchLoadRequest`.
use crate::aggregate::{Half, StatLine};
use crate::wire::{MatchLoadRequest, StatCreate};
use crate::{MatchType, Player, Team};
use chrono::NaiveDate;
use std::fmt;

/// Starters per side in a single match. Unrelated to `Team::MAX_ROSTER`.
pub const MAX_STARTERS: usize = 6;

pub const COMMON_MAPS: [&str; 19] = [
    "dod_anzio",
    "dod_avalanche",
    "dod_caen",
    "dod_charlie",
    "dod_chemille",
    "dod_donner",
    "dod_escape",
    "dod_flash",
    "dod_forest",
    "dod_glider",
    "dod_jagd",
    "dod_kalt",
    "dod_kraftstoff",
    "dod_merderet",
    "dod_saints",
    "dod_sturm",
    "dod_switch",
    "dod_vicenza",
    "dod_zalec",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Team1,
    Team2,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Team1, Side::Team2];

    fn index(self) -> usize {
        match self {
            Side::Team1 => 0,
            Side::Team2 => 1,
        }
    }

    pub fn other(self) -> Self {
        match self {
            Side::Team1 => Side::Team2,
            Side::Team2 => Side::Team1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::Team1 => "Team 1",
            Side::Team2 => "Team 2",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineupEntry {
    pub player_id: i64,
    pub nickname: String,
    pub is_ringer: bool,
    halves: [StatLine; 2],
}

impl LineupEntry {
    fn new(player: &Player, is_ringer: bool) -> Self {
        Self {
            player_id: player.id,
            nickname: player.nickname.clone(),
            is_ringer,
            halves: [StatLine::default(); 2],
        }
    }

    pub fn half(&self, half: Half) -> StatLine {
        self.halves[usize::from(half.number() - 1)]
    }

    pub fn total(&self) -> StatLine {
        self.halves[0] + self.halves[1]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    MissingTeams,
    SameTeams,
    MissingMap,
    EmptyLineup,
    FreeAgentsTeam,
    NoTeamSelected(Side),
    LineupFull(Side),
    NotOnTeam,
    AlreadySelected,
    RingersNotAllowed(MatchType),
    NotARinger,
}

impl fmt::Display for DraftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftError::MissingTeams => f.write_str("Please select both teams"),
            DraftError::SameTeams => f.write_str("Teams must be different"),
            DraftError::MissingMap => f.write_str("Please select or enter a map name"),
            DraftError::EmptyLineup => f.write_str("Each team must have at least one player"),
            DraftError::FreeAgentsTeam => f.write_str("Free agents cannot play matches"),
            DraftError::NoTeamSelected(side) => write!(f, "Select {} first", side.label()),
            DraftError::LineupFull(side) => {
                write!(f, "{} already has {MAX_STARTERS} players", side.label())
            }
            DraftError::NotOnTeam => f.write_str("Player is not on that team"),
            DraftError::AlreadySelected => f.write_str("Player is already in a lineup"),
            DraftError::RingersNotAllowed(t) => write!(f, "Ringers are not allowed in {t} matches"),
            DraftError::NotARinger => f.write_str("Player belongs to a selected team"),
        }
    }
}

impl std::error::Error for DraftError {}

/// An in-progress match before submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchDraft {
    pub match_type: MatchType,
    pub map_name: String,
    pub played_date: Option<NaiveDate>,
    pub team1_score: u32,
    pub team2_score: u32,
    teams: [Option<i64>; 2],
    lineups: [Vec<LineupEntry>; 2],
}

impl MatchDraft {
    pub fn new(played_date: NaiveDate) -> Self {
        Self { played_date: Some(played_date), ..Default::default() }
    }

    pub fn team(&self, side: Side) -> Option<i64> {
        self.teams[side.index()]
    }

    pub fn lineup(&self, side: Side) -> &[LineupEntry] {
        &self.lineups[side.index()]
    }

    /// Teams that may be picked for either side.
    pub fn eligible_teams(teams: &[Team]) -> Vec<&Team> {
        teams.iter().filter(|t| !t.is_free_agents).collect()
    }

    /// Picks the team for `side`. The side's lineup is cleared.
    pub fn select_team(&mut self, side: Side, team: &Team) -> Result<(), DraftError> {
        if team.is_free_agents {
            return Err(DraftError::FreeAgentsTeam);
        }
        self.teams[side.index()] = Some(team.id);
        self.lineups[side.index()].clear();
        Ok(())
    }

    /// Changing the type away from SCRIM drops every ringer.
    pub fn set_match_type(&mut self, match_type: MatchType) {
        self.match_type = match_type;
        if !match_type.permits_ringers() {
            for lineup in &mut self.lineups {
                lineup.retain(|e| !e.is_ringer);
            }
        }
    }

    pub fn set_score(&mut self, side: Side, score: u32) {
        match side {
            Side::Team1 => self.team1_score = score,
            Side::Team2 => self.team2_score = score,
        }
    }

    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::Team1 => self.team1_score,
            Side::Team2 => self.team2_score,
        }
    }

    fn is_selected(&self, player_id: i64) -> bool {
        self.lineups.iter().flatten().any(|e| e.player_id == player_id)
    }

    fn check_room(&self, side: Side, player: &Player) -> Result<(), DraftError> {
        if self.team(side).is_none() {
            return Err(DraftError::NoTeamSelected(side));
        }
        if self.is_selected(player.id) {
            return Err(DraftError::AlreadySelected);
        }
        if self.lineup(side).len() >= MAX_STARTERS {
            return Err(DraftError::LineupFull(side));
        }
        Ok(())
    }

    pub fn add_player(&mut self, side: Side, player: &Player) -> Result<(), DraftError> {
        self.check_room(side, player)?;
        if player.team_id != self.team(side) {
            return Err(DraftError::NotOnTeam);
        }
        self.lineups[side.index()].push(LineupEntry::new(player, false));
        Ok(())
    }

    /// Loans a player rostered to neither selected team onto `side`. SCRIM only.
    pub fn add_ringer(&mut self, side: Side, player: &Player) -> Result<(), DraftError> {
        if !self.match_type.permits_ringers() {
            return Err(DraftError::RingersNotAllowed(self.match_type));
        }
        self.check_room(side, player)?;
        if player.team_id.is_some() && self.teams.contains(&player.team_id) {
            return Err(DraftError::NotARinger);
        }
        self.lineups[side.index()].push(LineupEntry::new(player, true));
        Ok(())
    }

    pub fn remove_player(&mut self, side: Side, player_id: i64) -> bool {
        let lineup = &mut self.lineups[side.index()];
        let before = lineup.len();
        lineup.retain(|e| e.player_id != player_id);
        lineup.len() != before
    }

    pub fn set_stat(&mut self, side: Side, player_id: i64, half: Half, line: StatLine) -> bool {
        match self.lineups[side.index()].iter_mut().find(|e| e.player_id == player_id) {
            Some(entry) => {
                entry.halves[usize::from(half.number() - 1)] = line;
                true
            }
            None => false,
        }
    }

    /// Roster players of the side's team not yet in either lineup.
    pub fn available_players<'a>(&self, side: Side, players: &'a [Player]) -> Vec<&'a Player> {
        let Some(team_id) = self.team(side) else {
            return Vec::new();
        };
        players
            .iter()
            .filter(|p| p.team_id == Some(team_id) && !self.is_selected(p.id))
            .collect()
    }

    pub fn available_ringers<'a>(&self, players: &'a [Player]) -> Vec<&'a Player> {
        if !self.match_type.permits_ringers() {
            return Vec::new();
        }
        players
            .iter()
            .filter(|p| p.team_id.is_none() || !self.teams.contains(&p.team_id))
            .filter(|p| !self.is_selected(p.id))
            .collect()
    }

    /// Checks run in the order the user sees them reported.
    pub fn validate(&self) -> Result<(i64, i64), DraftError> {
        let (Some(team1), Some(team2)) = (self.teams[0], self.teams[1]) else {
            return Err(DraftError::MissingTeams);
        };
        if team1 == team2 {
            return Err(DraftError::SameTeams);
        }
        if self.map_name.trim().is_empty() {
            return Err(DraftError::MissingMap);
        }
        if self.lineups.iter().any(Vec::is_empty) {
            return Err(DraftError::EmptyLineup);
        }
        if let Some(side) = Side::BOTH.into_iter().find(|s| self.lineup(*s).len() > MAX_STARTERS) {
            return Err(DraftError::LineupFull(side));
        }
        Ok((team1, team2))
    }

    /// Two stat records per lineup entry, team 1 first, each filed under the
    /// side the player was drafted onto.
    pub fn build_request(&self) -> Result<MatchLoadRequest, DraftError> {
        let (team1_id, team2_id) = self.validate()?;
        let mut player_stats = Vec::new();
        for (side, team_id) in [(Side::Team1, team1_id), (Side::Team2, team2_id)] {
            for entry in self.lineup(side) {
                for half in [Half::First, Half::Second] {
                    let line = entry.half(half);
                    player_stats.push(StatCreate {
                        player_id: entry.player_id,
                        team_id,
                        half: half.number(),
                        kills: line.kills,
                        deaths: line.deaths,
                        flags: line.flags,
                        is_ringer: entry.is_ringer,
                    });
                }
            }
        }
        Ok(MatchLoadRequest {
            match_type: self.match_type,
            team1_id,
            team2_id,
            map_name: self.map_name.trim().to_string(),
            team1_score: self.team1_score,
            team2_score: self.team2_score,
            player_stats,
            played_date: self.played_date,
        })
    }
}
