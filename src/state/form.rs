//! Modal admin forms: a list of fields with one focused, validated on submit.

use crate::state::messages::{AfterSave, Mutation};
use league_api::aggregate::Half;
use league_api::wire::{
    self, MatchCreate, MatchUpdate, PlayerCreate, PlayerUpdate, StatCreate, TeamCreate, TeamUpdate,
    UserCreate, UserUpdate,
};
use league_api::{Match, MatchDetail, MatchType, Player, Team, User};

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Text { value: String, secret: bool },
    Toggle(bool),
    /// Labels with the id each one stands for.
    Choice { options: Vec<(Option<i64>, String)>, index: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub label: &'static str,
    pub input: Input,
}

impl Field {
    fn text(label: &'static str, value: impl Into<String>) -> Self {
        Self { label, input: Input::Text { value: value.into(), secret: false } }
    }

    fn secret(label: &'static str) -> Self {
        Self { label, input: Input::Text { value: String::new(), secret: true } }
    }

    fn toggle(label: &'static str, on: bool) -> Self {
        Self { label, input: Input::Toggle(on) }
    }

    fn choice(label: &'static str, options: Vec<(Option<i64>, String)>, selected: Option<i64>) -> Self {
        let index = options.iter().position(|(id, _)| *id == selected).unwrap_or(0);
        Self { label, input: Input::Choice { options, index } }
    }

    pub fn value(&self) -> &str {
        match &self.input {
            Input::Text { value, .. } => value,
            Input::Toggle(_) => "",
            Input::Choice { options, index } => options.get(*index).map(|(_, l)| l.as_str()).unwrap_or(""),
        }
    }

    pub fn display(&self) -> String {
        match &self.input {
            Input::Text { value, secret: true } => "*".repeat(value.chars().count()),
            Input::Text { value, .. } => value.clone(),
            Input::Toggle(on) => (if *on { "[x]" } else { "[ ]" }).to_string(),
            Input::Choice { .. } => format!("< {} >", self.value()),
        }
    }

    pub fn flag(&self) -> bool {
        matches!(self.input, Input::Toggle(true))
    }

    pub fn choice_id(&self) -> Option<i64> {
        match &self.input {
            Input::Choice { options, index } => options.get(*index).and_then(|(id, _)| *id),
            _ => None,
        }
    }

    pub fn choice_index(&self) -> usize {
        match &self.input {
            Input::Choice { index, .. } => *index,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Login,
    NewTeam,
    EditTeam { id: i64 },
    NewPlayer,
    EditPlayer { id: i64 },
    NewUser,
    EditUser { id: i64 },
    NewMatch,
    EditMatch { id: i64 },
    AddStat { match_id: i64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormAction {
    Login { username: String, password: String },
    Mutate { mutation: Mutation, then: AfterSave },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    pub kind: FormKind,
    pub fields: Vec<Field>,
    pub focus: usize,
    pub error: Option<String>,
    pub then: AfterSave,
}

impl Form {
    fn new(kind: FormKind, fields: Vec<Field>) -> Self {
        Self { kind, fields, focus: 0, error: None, then: AfterSave::Reload }
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            FormKind::Login => " Sign in ",
            FormKind::NewTeam => " New Team ",
            FormKind::EditTeam { .. } => " Edit Team ",
            FormKind::NewPlayer => " New Player ",
            FormKind::EditPlayer { .. } => " Edit Player ",
            FormKind::NewUser => " New User ",
            FormKind::EditUser { .. } => " Edit User ",
            FormKind::NewMatch => " Schedule Match ",
            FormKind::EditMatch { .. } => " Edit Match ",
            FormKind::AddStat { .. } => " Add Stat ",
        }
    }

    pub fn login() -> Self {
        Self::new(FormKind::Login, vec![Field::text("Username", ""), Field::secret("Password")])
    }

    pub fn new_team() -> Self {
        Self::new(
            FormKind::NewTeam,
            vec![Field::text("Name", ""), Field::text("Tag", ""), Field::toggle("Free agents", false)],
        )
    }

    pub fn edit_team(team: &Team) -> Self {
        Self::new(
            FormKind::EditTeam { id: team.id },
            vec![Field::text("Name", &team.name), Field::text("Tag", &team.tag)],
        )
    }

    pub fn new_player(teams: &[Team]) -> Self {
        Self::new(
            FormKind::NewPlayer,
            vec![Field::text("Nickname", ""), Field::choice("Team", team_options(teams), None)],
        )
    }

    pub fn edit_player(player: &Player, teams: &[Team]) -> Self {
        Self::new(
            FormKind::EditPlayer { id: player.id },
            vec![
                Field::text("Nickname", &player.nickname),
                Field::choice("Team", team_options(teams), player.team_id),
            ],
        )
    }

    pub fn new_user() -> Self {
        Self::new(
            FormKind::NewUser,
            vec![Field::text("Username", ""), Field::secret("Password"), Field::toggle("Admin", false)],
        )
    }

    pub fn edit_user(user: &User) -> Self {
        Self::new(
            FormKind::EditUser { id: user.id },
            vec![
                Field::text("Username", &user.username),
                Field::secret("New password"),
                Field::toggle("Admin", user.is_admin),
            ],
        )
    }

    pub fn new_match(teams: &[Team]) -> Self {
        let eligible: Vec<(Option<i64>, String)> = teams
            .iter()
            .filter(|t| !t.is_free_agents)
            .map(|t| (Some(t.id), format!("{} [{}]", t.name, t.tag)))
            .collect();
        Self::new(
            FormKind::NewMatch,
            vec![
                Field::choice("Type", match_type_options(), Some(1)),
                Field::choice("Team 1", eligible.clone(), None),
                Field::choice("Team 2", eligible, None),
                Field::text("Map", ""),
                Field::text("Scheduled (YYYY-MM-DD HH:MM)", ""),
            ],
        )
    }

    pub fn edit_match(m: &Match) -> Self {
        Self::new(
            FormKind::EditMatch { id: m.id },
            vec![
                Field::text("Team 1 score", m.team1_score.max(0).to_string()),
                Field::text("Team 2 score", m.team2_score.max(0).to_string()),
                Field::text("Map", m.map_name.clone().unwrap_or_default()),
                Field::toggle("Completed", m.is_completed),
            ],
        )
    }

    pub fn add_stat(detail: &MatchDetail, players: &[Player]) -> Self {
        let m = &detail.summary;
        let player_options = players
            .iter()
            .map(|p| (Some(p.id), p.nickname.clone()))
            .collect();
        Self::new(
            FormKind::AddStat { match_id: m.id },
            vec![
                Field::choice("Player", player_options, None),
                Field::choice(
                    "Side",
                    vec![(Some(m.team1_id), m.team1_label()), (Some(m.team2_id), m.team2_label())],
                    None,
                ),
                Field::choice("Half", vec![(Some(1), "1".into()), (Some(2), "2".into())], None),
                Field::text("Kills", "0"),
                Field::text("Deaths", "0"),
                Field::text("Flags", "0"),
                Field::toggle("Ringer", false),
            ],
        )
    }

    pub fn focused(&self) -> Option<&Field> {
        self.fields.get(self.focus)
    }

    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(Field { input: Input::Text { value, .. }, .. }) = self.fields.get_mut(self.focus) {
            value.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(Field { input: Input::Text { value, .. }, .. }) = self.fields.get_mut(self.focus) {
            value.pop();
        }
    }

    /// Flips a toggle or steps a choice. Text fields are untouched.
    pub fn cycle(&mut self, forward: bool) {
        let Some(field) = self.fields.get_mut(self.focus) else {
            return;
        };
        match &mut field.input {
            Input::Toggle(on) => *on = !*on,
            Input::Choice { options, index } if !options.is_empty() => {
                let len = options.len();
                *index = if forward { (*index + 1) % len } else { (*index + len - 1) % len };
            }
            _ => {}
        }
    }

    pub fn accepts_text(&self) -> bool {
        matches!(self.focused().map(|f| &f.input), Some(Input::Text { .. }))
    }

    fn field(&self, idx: usize) -> &Field {
        &self.fields[idx]
    }

    /// Validates the fields and turns them into the request they describe.
    pub fn submit(&self) -> Result<FormAction, String> {
        let text = |idx: usize| self.field(idx).value().to_string();
        let mutation = match self.kind {
            FormKind::Login => {
                let username = wire::username_field(&text(0)).map_err(|e| e.to_string())?;
                let password = wire::password_field(&text(1)).map_err(|e| e.to_string())?;
                return Ok(FormAction::Login { username, password });
            }
            FormKind::NewTeam => Mutation::CreateTeam(
                TeamCreate::new(&text(0), &text(1), self.field(2).flag()).map_err(|e| e.to_string())?,
            ),
            FormKind::EditTeam { id } => Mutation::UpdateTeam {
                id,
                body: TeamUpdate {
                    name: Some(wire::team_name_field(&text(0)).map_err(|e| e.to_string())?),
                    tag: Some(wire::team_tag_field(&text(1)).map_err(|e| e.to_string())?),
                },
            },
            FormKind::NewPlayer => Mutation::CreatePlayer(
                PlayerCreate::new(&text(0), self.field(1).choice_id()).map_err(|e| e.to_string())?,
            ),
            FormKind::EditPlayer { id } => Mutation::UpdatePlayer {
                id,
                body: PlayerUpdate {
                    nickname: Some(wire::nickname_field(&text(0)).map_err(|e| e.to_string())?),
                    team_id: Some(self.field(1).choice_id()),
                },
            },
            FormKind::NewUser => Mutation::CreateUser(
                UserCreate::new(&text(0), &text(1), self.field(2).flag()).map_err(|e| e.to_string())?,
            ),
            FormKind::EditUser { id } => {
                let password = text(1);
                Mutation::UpdateUser {
                    id,
                    body: UserUpdate {
                        username: Some(wire::username_field(&text(0)).map_err(|e| e.to_string())?),
                        password: (!password.is_empty()).then_some(password),
                        is_admin: Some(self.field(2).flag()),
                    },
                }
            }
            FormKind::NewMatch => {
                let match_type = MatchType::ALL[self.field(0).choice_index().min(2)];
                let (Some(team1_id), Some(team2_id)) =
                    (self.field(1).choice_id(), self.field(2).choice_id())
                else {
                    return Err("Please select both teams".into());
                };
                if team1_id == team2_id {
                    return Err("Teams must be different".into());
                }
                let raw_date = text(4);
                let scheduled_date = match raw_date.trim() {
                    "" => None,
                    raw => Some(
                        wire::parse_datetime(raw).ok_or_else(|| format!("'{raw}' is not a date"))?,
                    ),
                };
                let map = text(3).trim().to_string();
                Mutation::CreateMatch(MatchCreate {
                    match_type,
                    team1_id,
                    team2_id,
                    map_name: (!map.is_empty()).then_some(map),
                    scheduled_date,
                })
            }
            FormKind::EditMatch { id } => {
                let map = text(2).trim().to_string();
                Mutation::UpdateMatch {
                    id,
                    body: MatchUpdate {
                        team1_score: Some(wire::count_field(&text(0), "Team 1 score").map_err(|e| e.to_string())?),
                        team2_score: Some(wire::count_field(&text(1), "Team 2 score").map_err(|e| e.to_string())?),
                        map_name: (!map.is_empty()).then_some(map),
                        is_completed: Some(self.field(3).flag()),
                        ..Default::default()
                    },
                }
            }
            FormKind::AddStat { match_id } => {
                let player_id = self.field(0).choice_id().ok_or("Please select a player")?;
                let half = self.field(2).choice_id().and_then(Half::from_number).unwrap_or(Half::First);
                Mutation::AddMatchStat {
                    match_id,
                    body: StatCreate {
                        player_id,
                        team_id: self.field(1).choice_id().ok_or("Please select a side")?,
                        half: half.number(),
                        kills: wire::count_field(&text(3), "Kills").map_err(|e| e.to_string())?,
                        deaths: wire::count_field(&text(4), "Deaths").map_err(|e| e.to_string())?,
                        flags: wire::count_field(&text(5), "Flags").map_err(|e| e.to_string())?,
                        is_ringer: self.field(6).flag(),
                    },
                }
            }
        };
        Ok(FormAction::Mutate { mutation, then: self.then })
    }
}

fn team_options(teams: &[Team]) -> Vec<(Option<i64>, String)> {
    std::iter::once((None, "Free agent".to_string()))
        .chain(teams.iter().filter(|t| !t.is_free_agents).map(|t| (Some(t.id), format!("{} [{}]", t.name, t.tag))))
        .collect()
}

fn match_type_options() -> Vec<(Option<i64>, String)> {
    MatchType::ALL
        .iter()
        .enumerate()
        .map(|(i, t)| (Some(i as i64), t.label().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_into(form: &mut Form, text: &str) {
        for c in text.chars() {
            form.push_char(c);
        }
    }

    #[test]
    fn login_requires_both_fields() {
        let mut form = Form::login();
        assert_eq!(form.submit(), Err("Username is required".to_string()));
        type_into(&mut form, "admin");
        assert_eq!(form.submit(), Err("Password is required".to_string()));
        form.focus_next();
        type_into(&mut form, "pw");
        assert_eq!(form.fields[1].display(), "**");
        assert_eq!(
            form.submit(),
            Ok(FormAction::Login { username: "admin".into(), password: "pw".into() })
        );
    }

    #[test]
    fn new_team_uppercases_tag() {
        let mut form = Form::new_team();
        type_into(&mut form, "Alpha Squad");
        form.focus_next();
        type_into(&mut form, " alp ");
        form.focus_next();
        form.cycle(true);
        match form.submit().unwrap() {
            FormAction::Mutate { mutation: Mutation::CreateTeam(body), then } => {
                assert_eq!(body.tag, "ALP");
                assert!(body.is_free_agents);
                assert_eq!(then, AfterSave::Reload);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn edit_player_can_release_to_free_agency() {
        let teams = vec![Team { id: 3, name: "Gamma".into(), tag: "GAM".into(), ..Default::default() }];
        let player = Player { id: 9, nickname: "Sniper".into(), team_id: Some(3), ..Default::default() };
        let mut form = Form::edit_player(&player, &teams);
        assert_eq!(form.fields[1].choice_id(), Some(3));
        form.focus = 1;
        form.cycle(false);
        match form.submit().unwrap() {
            FormAction::Mutate { mutation: Mutation::UpdatePlayer { id, body }, .. } => {
                assert_eq!(id, 9);
                assert_eq!(body.team_id, Some(None));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn new_match_rejects_same_team_and_bad_date() {
        let teams = vec![
            Team { id: 1, name: "Alpha".into(), tag: "ALP".into(), ..Default::default() },
            Team { id: 2, name: "Beta".into(), tag: "BET".into(), ..Default::default() },
            Team { id: 3, name: "Free Agents".into(), tag: "FA".into(), is_free_agents: true, ..Default::default() },
        ];
        let mut form = Form::new_match(&teams);
        assert_eq!(form.submit(), Err("Teams must be different".to_string()));
        form.focus = 2;
        form.cycle(true);
        form.focus = 4;
        type_into(&mut form, "next week");
        assert_eq!(form.submit(), Err("'next week' is not a date".to_string()));
        form.fields[4] = Field::text("Scheduled", "2025-04-01 20:00");
        match form.submit().unwrap() {
            FormAction::Mutate { mutation: Mutation::CreateMatch(body), .. } => {
                assert_eq!(body.match_type, MatchType::League);
                assert_eq!((body.team1_id, body.team2_id), (1, 2));
                assert!(body.scheduled_date.is_some());
                assert_eq!(body.map_name, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn edit_user_leaves_blank_password_alone() {
        let user = User { id: 4, username: "ref".into(), ..Default::default() };
        let form = Form::edit_user(&user);
        match form.submit().unwrap() {
            FormAction::Mutate { mutation: Mutation::UpdateUser { body, .. }, .. } => {
                assert_eq!(body.password, None);
                assert_eq!(body.is_admin, Some(false));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn add_stat_clamps_negative_counts() {
        let detail = MatchDetail {
            summary: Match { id: 7, team1_id: 1, team2_id: 2, ..Default::default() },
            player_stats: vec![],
        };
        let players = vec![Player { id: 5, nickname: "Fragger".into(), ..Default::default() }];
        let mut form = Form::add_stat(&detail, &players);
        form.fields[3] = Field::text("Kills", "-4");
        form.focus = 2;
        form.cycle(true);
        match form.submit().unwrap() {
            FormAction::Mutate { mutation: Mutation::AddMatchStat { match_id, body }, .. } => {
                assert_eq!(match_id, 7);
                assert_eq!((body.player_id, body.team_id, body.half, body.kills), (5, 1, 2, 0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
