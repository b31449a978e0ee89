use chrono::NaiveDate;
use league_api::aggregate::{Half, StatLine};
use league_api::lineup::{COMMON_MAPS, DraftError, MatchDraft, Side};
use league_api::wire::MatchLoadRequest;
use league_api::{MatchType, Player, Team};

/// Which part of the load-match screen receives input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadFocus {
    Type,
    Map,
    Date,
    Team(Side),
    Score(Side),
    Lineup(Side),
}

const FOCUS_ORDER: [LoadFocus; 9] = [
    LoadFocus::Type,
    LoadFocus::Map,
    LoadFocus::Date,
    LoadFocus::Team(Side::Team1),
    LoadFocus::Team(Side::Team2),
    LoadFocus::Score(Side::Team1),
    LoadFocus::Score(Side::Team2),
    LoadFocus::Lineup(Side::Team1),
    LoadFocus::Lineup(Side::Team2),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatColumn {
    #[default]
    Kills,
    Deaths,
    Flags,
}

impl StatColumn {
    pub fn next(self) -> Self {
        match self {
            StatColumn::Kills => StatColumn::Deaths,
            StatColumn::Deaths => StatColumn::Flags,
            StatColumn::Flags => StatColumn::Kills,
        }
    }

    pub fn prev(self) -> Self {
        self.next().next()
    }

    fn get(self, line: &StatLine) -> u32 {
        match self {
            StatColumn::Kills => line.kills,
            StatColumn::Deaths => line.deaths,
            StatColumn::Flags => line.flags,
        }
    }

    fn set(self, line: &mut StatLine, value: u32) {
        match self {
            StatColumn::Kills => line.kills = value,
            StatColumn::Deaths => line.deaths = value,
            StatColumn::Flags => line.flags = value,
        }
    }
}

/// What a picker selection on this screen does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftPick {
    Team(Side),
    Player(Side),
    Ringer(Side),
    Map,
}

#[derive(Debug, Clone)]
pub struct LoadMatchState {
    pub draft: MatchDraft,
    pub teams: Vec<Team>,
    pub players: Vec<Player>,
    pub focus: LoadFocus,
    pub half: Half,
    pub column: StatColumn,
    pub rows: [usize; 2],
    pub date_text: String,
    pub error: Option<String>,
}

impl Default for LoadMatchState {
    fn default() -> Self {
        Self {
            draft: MatchDraft::default(),
            teams: Vec::new(),
            players: Vec::new(),
            focus: LoadFocus::Type,
            half: Half::First,
            column: StatColumn::Kills,
            rows: [0; 2],
            date_text: String::new(),
            error: None,
        }
    }
}

fn side_index(side: Side) -> usize {
    match side {
        Side::Team1 => 0,
        Side::Team2 => 1,
    }
}

/// Appends a typed digit to a counter, keeping the old value on overflow.
fn push_digit(value: u32, digit: u32) -> u32 {
    value.checked_mul(10).and_then(|v| v.checked_add(digit)).unwrap_or(value)
}

impl LoadMatchState {
    /// Starts a fresh draft dated `today`.
    pub fn reset(&mut self, today: NaiveDate) {
        let teams = std::mem::take(&mut self.teams);
        let players = std::mem::take(&mut self.players);
        *self = Self {
            draft: MatchDraft::new(today),
            date_text: today.format("%Y-%m-%d").to_string(),
            teams,
            players,
            ..Self::default()
        };
    }

    pub fn load(&mut self, teams: Vec<Team>, players: Vec<Player>) {
        self.teams = teams;
        self.players = players;
    }

    /// Letters typed here edit the focused field instead of triggering shortcuts.
    pub fn captures_text(&self) -> bool {
        matches!(self.focus, LoadFocus::Map | LoadFocus::Date)
    }

    pub fn captures_digits(&self) -> bool {
        matches!(
            self.focus,
            LoadFocus::Map | LoadFocus::Date | LoadFocus::Score(_) | LoadFocus::Lineup(_)
        )
    }

    pub fn focus_next(&mut self) {
        let idx = FOCUS_ORDER.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = FOCUS_ORDER[(idx + 1) % FOCUS_ORDER.len()];
    }

    pub fn focus_prev(&mut self) {
        let idx = FOCUS_ORDER.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = FOCUS_ORDER[(idx + FOCUS_ORDER.len() - 1) % FOCUS_ORDER.len()];
    }

    pub fn cycle_type(&mut self) {
        self.draft.set_match_type(self.draft.match_type.next());
        self.clamp_rows();
    }

    pub fn toggle_half(&mut self) {
        self.half = self.half.other();
    }

    pub fn team_label(&self, side: Side) -> String {
        self.draft
            .team(side)
            .and_then(|id| self.teams.iter().find(|t| t.id == id))
            .map(|t| format!("{} [{}]", t.name, t.tag))
            .unwrap_or_else(|| "(select)".to_string())
    }

    pub fn scrim_warning(&self) -> Option<&'static str> {
        (self.draft.match_type == MatchType::Scrim).then_some(
            "SCRIM match: stats are recorded but do not count toward player totals. Ringers must come from outside both selected teams.",
        )
    }

    pub fn selected_row(&self, side: Side) -> usize {
        self.rows[side_index(side)]
    }

    pub fn move_row(&mut self, down: bool) {
        let LoadFocus::Lineup(side) = self.focus else {
            return;
        };
        let len = self.draft.lineup(side).len();
        let row = &mut self.rows[side_index(side)];
        *row = if down { (*row + 1).min(len.saturating_sub(1)) } else { row.saturating_sub(1) };
    }

    fn clamp_rows(&mut self) {
        for side in Side::BOTH {
            let len = self.draft.lineup(side).len();
            let row = &mut self.rows[side_index(side)];
            *row = (*row).min(len.saturating_sub(1));
        }
    }

    pub fn push_char(&mut self, c: char) {
        match self.focus {
            LoadFocus::Map => self.draft.map_name.push(c),
            LoadFocus::Date => self.date_text.push(c),
            _ => {
                if let Some(digit) = c.to_digit(10) {
                    self.push_digit(digit);
                }
            }
        }
    }

    fn push_digit(&mut self, digit: u32) {
        match self.focus {
            LoadFocus::Score(side) => self.draft.set_score(side, push_digit(self.draft.score(side), digit)),
            LoadFocus::Lineup(side) => self.edit_selected(side, |v| push_digit(v, digit)),
            _ => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            LoadFocus::Map => {
                self.draft.map_name.pop();
            }
            LoadFocus::Date => {
                self.date_text.pop();
            }
            LoadFocus::Score(side) => self.draft.set_score(side, self.draft.score(side) / 10),
            LoadFocus::Lineup(side) => self.edit_selected(side, |v| v / 10),
            _ => {}
        }
    }

    /// Steps the focused counter by one, never below zero.
    pub fn bump(&mut self, up: bool) {
        let step = |v: u32| if up { v.saturating_add(1) } else { v.saturating_sub(1) };
        match self.focus {
            LoadFocus::Score(side) => self.draft.set_score(side, step(self.draft.score(side))),
            LoadFocus::Lineup(side) => self.edit_selected(side, step),
            _ => {}
        }
    }

    fn edit_selected(&mut self, side: Side, f: impl Fn(u32) -> u32) {
        let Some(entry) = self.draft.lineup(side).get(self.selected_row(side)) else {
            return;
        };
        let player_id = entry.player_id;
        let mut line = entry.half(self.half);
        let value = f(self.column.get(&line));
        self.column.set(&mut line, value);
        self.draft.set_stat(side, player_id, self.half, line);
    }

    pub fn remove_selected(&mut self) {
        let LoadFocus::Lineup(side) = self.focus else {
            return;
        };
        if let Some(entry) = self.draft.lineup(side).get(self.selected_row(side)) {
            let player_id = entry.player_id;
            self.draft.remove_player(side, player_id);
            self.clamp_rows();
        }
    }

    /// Options for a picker, as `(id, label)`. Map ids index `COMMON_MAPS`.
    pub fn pick_options(&self, pick: DraftPick) -> Vec<(i64, String)> {
        match pick {
            DraftPick::Team(_) => MatchDraft::eligible_teams(&self.teams)
                .into_iter()
                .map(|t| (t.id, format!("{} [{}]", t.name, t.tag)))
                .collect(),
            DraftPick::Player(side) => self
                .draft
                .available_players(side, &self.players)
                .into_iter()
                .map(|p| (p.id, p.nickname.clone()))
                .collect(),
            DraftPick::Ringer(_) => self
                .draft
                .available_ringers(&self.players)
                .into_iter()
                .map(|p| (p.id, format!("{} ({})", p.nickname, self.team_tag(p.team_id))))
                .collect(),
            DraftPick::Map => COMMON_MAPS
                .iter()
                .enumerate()
                .map(|(i, m)| (i as i64, m.to_string()))
                .collect(),
        }
    }

    fn team_tag(&self, team_id: Option<i64>) -> String {
        team_id
            .and_then(|id| self.teams.iter().find(|t| t.id == id))
            .map(|t| t.tag.clone())
            .unwrap_or_else(|| "FA".to_string())
    }

    pub fn apply_pick(&mut self, pick: DraftPick, id: i64) -> Result<(), DraftError> {
        let player = |id: i64| self.players.iter().find(|p| p.id == id).cloned();
        match pick {
            DraftPick::Team(side) => {
                if let Some(team) = self.teams.iter().find(|t| t.id == id).cloned() {
                    self.draft.select_team(side, &team)?;
                    self.rows[side_index(side)] = 0;
                }
            }
            DraftPick::Player(side) => {
                if let Some(p) = player(id) {
                    self.draft.add_player(side, &p)?;
                }
            }
            DraftPick::Ringer(side) => {
                if let Some(p) = player(id) {
                    self.draft.add_ringer(side, &p)?;
                }
            }
            DraftPick::Map => {
                if let Some(map) = usize::try_from(id).ok().and_then(|i| COMMON_MAPS.get(i)) {
                    self.draft.map_name = map.to_string();
                }
            }
        }
        Ok(())
    }

    pub fn submit(&mut self) -> Result<MatchLoadRequest, String> {
        let raw = self.date_text.trim();
        self.draft.played_date = if raw.is_empty() {
            None
        } else {
            Some(
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|_| format!("'{raw}' is not a date (YYYY-MM-DD)"))?,
            )
        };
        self.draft.build_request().map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> LoadMatchState {
        let mut s = LoadMatchState::default();
        s.load(
            vec![
                Team { id: 1, name: "Alpha".into(), tag: "ALP".into(), ..Default::default() },
                Team { id: 2, name: "Beta".into(), tag: "BET".into(), ..Default::default() },
                Team { id: 9, name: "Free Agents".into(), tag: "FA".into(), is_free_agents: true, ..Default::default() },
            ],
            vec![
                Player { id: 10, nickname: "Fragger".into(), team_id: Some(1), ..Default::default() },
                Player { id: 20, nickname: "Anchor".into(), team_id: Some(2), ..Default::default() },
                Player { id: 30, nickname: "Drifter".into(), team_id: None, ..Default::default() },
            ],
        );
        s.reset(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        s
    }

    #[test]
    fn reset_keeps_loaded_rosters_and_dates_today() {
        let s = state();
        assert_eq!(s.date_text, "2025-03-01");
        assert_eq!(s.teams.len(), 3);
        assert_eq!(s.pick_options(DraftPick::Team(Side::Team1)).len(), 2);
    }

    #[test]
    fn typed_digits_fill_the_focused_stat() {
        let mut s = state();
        s.apply_pick(DraftPick::Team(Side::Team1), 1).unwrap();
        s.apply_pick(DraftPick::Player(Side::Team1), 10).unwrap();
        s.focus = LoadFocus::Lineup(Side::Team1);
        s.push_char('1');
        s.push_char('2');
        s.column = s.column.next();
        s.bump(true);
        s.toggle_half();
        s.push_char('8');
        s.backspace();
        s.push_char('7');

        let entry = &s.draft.lineup(Side::Team1)[0];
        assert_eq!(entry.half(Half::First), StatLine::new(12, 1, 0));
        assert_eq!(entry.half(Half::Second), StatLine::new(0, 7, 0));
    }

    #[test]
    fn lineup_bump_edits_the_selected_cell_and_stops_at_zero() {
        let mut s = state();
        s.apply_pick(DraftPick::Team(Side::Team1), 1).unwrap();
        s.apply_pick(DraftPick::Player(Side::Team1), 10).unwrap();
        s.focus = LoadFocus::Lineup(Side::Team1);
        s.column = StatColumn::Flags;
        s.bump(true);
        s.bump(true);
        s.bump(false);
        assert_eq!(s.draft.lineup(Side::Team1)[0].half(Half::First), StatLine::new(0, 0, 1));
        s.bump(false);
        s.bump(false);
        assert!(s.draft.lineup(Side::Team1)[0].half(Half::First).is_zero());
    }

    #[test]
    fn scores_ignore_overflowing_digits() {
        let mut s = state();
        s.focus = LoadFocus::Score(Side::Team2);
        for c in "4294967295".chars() {
            s.push_char(c);
        }
        s.push_char('9');
        assert_eq!(s.draft.team2_score, u32::MAX);
        s.bump(false);
        assert_eq!(s.draft.team2_score, u32::MAX - 1);
    }

    #[test]
    fn submit_reports_draft_errors_and_bad_dates() {
        let mut s = state();
        assert_eq!(s.submit(), Err("Please select both teams".to_string()));
        s.apply_pick(DraftPick::Team(Side::Team1), 1).unwrap();
        s.apply_pick(DraftPick::Team(Side::Team2), 2).unwrap();
        s.apply_pick(DraftPick::Map, 0).unwrap();
        s.apply_pick(DraftPick::Player(Side::Team1), 10).unwrap();
        s.apply_pick(DraftPick::Player(Side::Team2), 20).unwrap();
        s.date_text = "03/01/2025".into();
        assert_eq!(s.submit(), Err("'03/01/2025' is not a date (YYYY-MM-DD)".to_string()));
        s.date_text = "2025-03-02".into();
        let req = s.submit().unwrap();
        assert_eq!(req.map_name, "dod_anzio");
        assert_eq!(req.played_date, NaiveDate::from_ymd_opt(2025, 3, 2));
        assert_eq!(req.player_stats.len(), 4);
    }

    #[test]
    fn ringer_picker_only_offers_unaffiliated_players_in_scrims() {
        let mut s = state();
        s.apply_pick(DraftPick::Team(Side::Team1), 1).unwrap();
        s.apply_pick(DraftPick::Team(Side::Team2), 2).unwrap();
        assert!(s.pick_options(DraftPick::Ringer(Side::Team1)).is_empty());
        s.cycle_type();
        assert!(s.scrim_warning().is_some_and(|w| w.contains("outside both selected teams")));
        assert_eq!(s.pick_options(DraftPick::Ringer(Side::Team1)), vec![(30, "Drifter (FA)".to_string())]);
        s.apply_pick(DraftPick::Ringer(Side::Team2), 30).unwrap();
        s.cycle_type();
        assert!(s.draft.lineup(Side::Team2).is_empty());
    }

    #[test]
    fn focus_cycles_both_ways() {
        let mut s = state();
        s.focus_prev();
        assert_eq!(s.focus, LoadFocus::Lineup(Side::Team2));
        s.focus_next();
        s.focus_next();
        assert_eq!(s.focus, LoadFocus::Map);
        assert!(s.captures_text());
    }
}
