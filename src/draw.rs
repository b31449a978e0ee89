use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs, Wrap};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::stat_table::{CellCursor, StatTable};
use crate::state::app_state::{Confirm, Overlay, Picker, StatsView};
use crate::state::form::Form;
use crate::state::load_match::{LoadFocus, LoadMatchState};
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::{LayoutAreas, centered};
use league_api::lineup::Side;
use league_api::ranking::{Outcome, kd_ratio};
use league_api::{Match, MatchStatus};

static TABS: &[&str; 7] = &["Dashboard", "Teams", "Players", "Matches", "Stats", "Load Match", "Users"];

const HELP_TEXT: &str = "\
Navigation
  1-7        switch screen            ?      this help
  j/k ↑/↓    move selection           Enter  open selected row
  Esc        back to the list         r      reload
  f          full screen              \"      toggle log pane
  L          sign out                 q      quit

Admin (on list and detail screens)
  n new   e edit   d delete (asks y/n)
  Team detail:  a add player   x remove player
  Match detail: s add a stat record
  Matches:      t cycle type filter
  Stats:        v switch view   s sort column   o sort order

Load Match
  Tab/Shift-Tab  move between fields     Enter  pick team / map / player
  a add player   r add ringer (SCRIM)    x remove player
  h switch half  ←/→ stat column         0-9 type value   +/- adjust
  Ctrl-S submit  Ctrl-N start over";

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if let Some(login) = app.state.login.as_ref() {
            draw_login(f, layout.main, app, login);
        } else {
            if !app.settings.full_screen {
                draw_tabs(f, layout.tab_bar, app);
            }

            match app.state.active_tab {
                MenuItem::Dashboard => draw_dashboard(f, layout.main, app),
                MenuItem::Teams => draw_teams(f, layout.main, app),
                MenuItem::TeamDetail => draw_team_detail(f, layout.main, app),
                MenuItem::Players => draw_players(f, layout.main, app),
                MenuItem::PlayerDetail => draw_player_detail(f, layout.main, app),
                MenuItem::Matches => draw_matches(f, layout.main, app),
                MenuItem::MatchDetail => draw_match_detail(f, layout.main, app),
                MenuItem::Stats => draw_stats(f, layout.main, app),
                MenuItem::LoadMatch => draw_load_match(f, layout.main, &app.state.load_match),
                MenuItem::Users => draw_users(f, layout.main, app),
                MenuItem::Help => draw_help(f, layout.main),
            }

            match app.state.overlay.as_ref() {
                Some(Overlay::Form(form)) => draw_form(f, layout.main, form),
                Some(Overlay::Confirm(confirm)) => draw_confirm(f, layout.main, confirm),
                Some(Overlay::Picker(picker)) => draw_picker(f, layout.main, picker),
                None => {}
            }
        }

        draw_status(f, layout.status, app);
        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }
        draw_loading_spinner(f, f.area(), app, loading);
    });
    if let Err(e) = result {
        log::error!("draw failed: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab = match app.state.active_tab {
        MenuItem::Help => app.state.previous_tab,
        tab => tab,
    };
    let tab_index = match tab.parent() {
        MenuItem::Teams => 1,
        MenuItem::Players => 2,
        MenuItem::Matches => 3,
        MenuItem::Stats => 4,
        MenuItem::LoadMatch => 5,
        MenuItem::Users => 6,
        _ => 0,
    };

    let titles: Vec<Line> = TABS
        .iter()
        .enumerate()
        .map(|(i, t)| Line::from(format!("{} {t}", i + 1)))
        .collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let who = app.state.user.as_ref().map(|u| u.username.as_str()).unwrap_or("-");
    let help = Paragraph::new(format!("{who}  ? "))
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn heading() -> Style {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
}

fn outcome_style(outcome: Outcome) -> Style {
    match outcome {
        Outcome::Win => Style::default().fg(Color::Green),
        Outcome::Loss => Style::default().fg(Color::Red),
        Outcome::Draw => Style::default().fg(Color::Yellow),
    }
}

/// First row to show so that `selected` stays inside a window of `height` rows.
fn window_start(selected: usize, height: usize) -> usize {
    if height == 0 { 0 } else { selected.saturating_sub(height - 1) }
}

/// Rows of a selectable list, scrolled to keep the cursor visible.
fn list_lines(rows: Vec<Line<'static>>, selected: Option<usize>, height: usize) -> Vec<Line<'static>> {
    let start = selected.map(|s| window_start(s, height)).unwrap_or(0);
    rows.into_iter()
        .enumerate()
        .skip(start)
        .take(height)
        .map(|(i, line)| {
            if Some(i) == selected {
                let mut spans = vec![Span::styled("> ", Style::default().fg(Color::Yellow))];
                spans.extend(line.spans);
                Line::from(spans).style(Style::default().add_modifier(Modifier::BOLD))
            } else {
                let mut spans = vec![Span::raw("  ")];
                spans.extend(line.spans);
                Line::from(spans)
            }
        })
        .collect()
}

/// A bordered screen with a key legend line and a body area below it.
fn screen(f: &mut Frame, area: Rect, title: &str, legend: &str) -> Rect {
    let block = default_border(Color::White).title(format!(" {title} "));
    let inner = block.inner(area);
    f.render_widget(block, area);
    let [legend_area, body] = Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(inner);
    f.render_widget(Paragraph::new(legend).style(dim()), legend_area);
    body
}

fn draw_empty(f: &mut Frame, area: Rect, app: &App, what: &str) {
    let msg = match app.state.last_error.as_deref() {
        Some(err) => format!("Load failed:\n{err}"),
        None => format!("Loading {what}..."),
    };
    f.render_widget(
        Paragraph::new(msg).style(dim()).alignment(Alignment::Center),
        area,
    );
}

fn date(m: &Match) -> String {
    match m.status() {
        MatchStatus::Played => m.played_date.map(|d| d.format("%Y-%m-%d").to_string()),
        MatchStatus::Upcoming => m.scheduled_date.map(|d| d.format("%Y-%m-%d %H:%M").to_string()),
        MatchStatus::Unscheduled => None,
    }
    .unwrap_or_else(|| "TBD".to_string())
}

fn match_line(m: &Match) -> Line<'static> {
    let score = if m.is_played() {
        format!("{:>3} - {:<3}", m.team1_score.max(0), m.team2_score.max(0))
    } else {
        "   vs    ".to_string()
    };
    let winner = m.winner_id();
    let side = |id: i64, label: String| {
        if winner == Some(id) {
            Span::styled(label, Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        } else {
            Span::raw(label)
        }
    };
    Line::from(vec![
        Span::styled(format!("{:<16} ", date(m)), dim()),
        Span::styled(format!("{:<7}", m.match_type.label()), Style::default().fg(Color::Cyan)),
        side(m.team1_id, format!("{:>8} ", m.team1_label())),
        Span::raw(score),
        side(m.team2_id, format!(" {:<8}", m.team2_label())),
        Span::styled(format!("  {}", m.map_label()), dim()),
    ])
}

// ---------------------------------------------------------------------------
// Screens
// ---------------------------------------------------------------------------

fn draw_login(f: &mut Frame, area: Rect, app: &App, form: &Form) {
    let block = default_border(Color::DarkGray).title(" DoD League ");
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
        Paragraph::new(format!("Backend: {}", app.settings.api_url))
            .style(dim())
            .alignment(Alignment::Center),
        Rect::new(inner.x, inner.y, inner.width, inner.height.min(1)),
    );
    draw_form(f, inner, form);
}

fn draw_dashboard(f: &mut Frame, area: Rect, app: &App) {
    let body = screen(f, area, "Dashboard", "r=reload  ?=help  q=quit");
    let dash = &app.state.dashboard;
    let Some(summary) = dash.summary.as_ref() else {
        draw_empty(f, body, app, "dashboard");
        return;
    };

    let label = |text: &'static str| Span::styled(format!("{text:<18}"), dim());
    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            label("Matches"),
            Span::raw(format!("{:<8}", summary.total_matches)),
            label("Teams"),
            Span::raw(format!("{:<8}", summary.total_teams)),
            label("Players"),
            Span::raw(summary.total_players.to_string()),
        ]),
        Line::from(vec![label("Most played map"), Span::raw(dash.most_played_map())]),
        Line::from(vec![label("Top K/D"), Span::raw(dash.top_kd())]),
        Line::from(vec![label("Top flag capper"), Span::raw(dash.top_flags())]),
        Line::from(""),
        Line::from(Span::styled("Recent matches", heading())),
    ];
    if summary.recent_matches.is_empty() {
        lines.push(Line::from(Span::styled("  none yet", dim())));
    }
    lines.extend(summary.recent_matches.iter().map(|m| indent(match_line(m))));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Upcoming matches", heading())));
    if summary.upcoming_matches.is_empty() {
        lines.push(Line::from(Span::styled("  nothing scheduled", dim())));
    }
    lines.extend(summary.upcoming_matches.iter().map(|m| indent(match_line(m))));

    f.render_widget(Paragraph::new(lines), body);
}

fn indent(line: Line<'static>) -> Line<'static> {
    let mut spans = vec![Span::raw("  ")];
    spans.extend(line.spans);
    Line::from(spans)
}

fn draw_teams(f: &mut Frame, area: Rect, app: &App) {
    let body = screen(f, area, "Teams", "j/k=move  Enter=open  n=new  e=edit  d=delete  r=reload");
    let teams = &app.state.teams;
    if teams.teams.is_empty() {
        draw_empty(f, body, app, "teams");
        return;
    }

    let mut lines = vec![Line::from(Span::styled(
        format!("  {:<8}{:<30}{:>8}", "Tag", "Name", "Players"),
        dim(),
    ))];
    let rows = teams
        .teams
        .iter()
        .map(|t| {
            let count = t.player_count.map(|c| c.to_string()).unwrap_or_else(|| "-".into());
            let mut spans = vec![Span::raw(format!("{:<8}{:<30}{:>8}", t.tag, t.name, count))];
            if t.is_free_agents {
                spans.push(Span::styled("  free agents", Style::default().fg(Color::Magenta)));
            }
            Line::from(spans)
        })
        .collect();
    lines.extend(list_lines(rows, Some(teams.cursor.selected), body.height.saturating_sub(1) as usize));
    f.render_widget(Paragraph::new(lines), body);
}

fn draw_team_detail(f: &mut Frame, area: Rect, app: &App) {
    let td = &app.state.team_detail;
    let title = td
        .detail
        .as_ref()
        .map(|d| format!("{} [{}]", d.team.name, d.team.tag))
        .unwrap_or_else(|| "Team".to_string());
    let body = screen(
        f,
        area,
        &title,
        "j/k=move  Enter=player  a=add player  x=remove  e=edit  d=delete  Esc=back",
    );
    let Some(detail) = td.detail.as_ref() else {
        draw_empty(f, body, app, "team");
        return;
    };

    let [left, right] =
        Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(body);

    let record = td.record();
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Record ", dim()),
            Span::raw(record.summary()),
            Span::styled("   Win rate ", dim()),
            Span::raw(format!("{}%", record.win_rate_percent())),
        ]),
    ];
    if let Some(stats) = td.stats.as_ref() {
        lines.push(Line::from(vec![
            Span::styled("Score ", dim()),
            Span::raw(format!(
                "{} for / {} against ({:+})",
                stats.total_score_for, stats.total_score_against, stats.score_difference
            )),
        ]));
    }
    let cap = if detail.team.is_free_agents {
        "no cap".to_string()
    } else {
        format!("{}/{}", detail.players.len(), league_api::Team::MAX_ROSTER)
    };
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(format!("Roster ({cap})"), heading())));
    lines.push(Line::from(Span::styled(
        format!("  {:<20}{:>7}{:>7}{:>7}{:>8}", "Nickname", "Kills", "Deaths", "Flags", "K/D"),
        dim(),
    )));
    let rows = detail
        .players
        .iter()
        .map(|p| {
            Line::from(format!(
                "{:<20}{:>7}{:>7}{:>7}{:>8}",
                p.nickname,
                p.total_kills.max(0),
                p.total_deaths.max(0),
                p.total_flags.max(0),
                kd_ratio(p.total_kills, p.total_deaths)
            ))
        })
        .collect();
    let height = left.height.saturating_sub(lines.len() as u16) as usize;
    if detail.players.is_empty() {
        lines.push(Line::from(Span::styled("  no players", dim())));
    }
    lines.extend(list_lines(rows, Some(td.cursor.selected), height));
    f.render_widget(Paragraph::new(lines), left);

    let mut lines = vec![Line::from(Span::styled("Maps", heading()))];
    let maps = td.map_records();
    if maps.is_empty() {
        lines.push(Line::from(Span::styled("  no maps played", dim())));
    }
    for (map, rec) in maps {
        lines.push(Line::from(format!("  {map:<18}{}W-{}L", rec.wins, rec.losses)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Results", heading())));
    for (m, outcome) in td.results() {
        let opponent = if m.team1_id == detail.team.id { m.team2_label() } else { m.team1_label() };
        let (ours, theirs) = m.scores_for(detail.team.id).unwrap_or_default();
        lines.push(Line::from(vec![
            Span::styled(format!("  {} ", outcome.letter()), outcome_style(outcome)),
            Span::raw(format!("{ours}-{theirs} vs {opponent:<8}")),
            Span::styled(format!(" {}", m.map_label()), dim()),
        ]));
    }
    f.render_widget(Paragraph::new(lines), right);
}

fn draw_players(f: &mut Frame, area: Rect, app: &App) {
    let body = screen(f, area, "Players", "j/k=move  Enter=open  n=new  e=edit  d=delete  r=reload");
    let players = &app.state.players;
    if players.players.is_empty() {
        draw_empty(f, body, app, "players");
        return;
    }

    let mut lines = vec![Line::from(Span::styled(
        format!(
            "  {:<20}{:<8}{:>7}{:>7}{:>7}{:>8}{:>9}",
            "Nickname", "Team", "Kills", "Deaths", "Flags", "K/D", "Matches"
        ),
        dim(),
    ))];
    let rows = players
        .players
        .iter()
        .map(|p| {
            Line::from(format!(
                "{:<20}{:<8}{:>7}{:>7}{:>7}{:>8}{:>9}",
                p.nickname,
                players.team_tag(p),
                p.total_kills.max(0),
                p.total_deaths.max(0),
                p.total_flags.max(0),
                kd_ratio(p.total_kills, p.total_deaths),
                p.matches_played.max(0)
            ))
        })
        .collect();
    lines.extend(list_lines(rows, Some(players.cursor.selected), body.height.saturating_sub(1) as usize));
    f.render_widget(Paragraph::new(lines), body);
}

fn draw_player_detail(f: &mut Frame, area: Rect, app: &App) {
    let pd = &app.state.player_detail;
    let title = pd.detail.as_ref().map(|d| d.player.nickname.clone()).unwrap_or_else(|| "Player".into());
    let body = screen(f, area, &title, "j/k=move  Enter=open match  d=delete  Esc=back");
    let Some(detail) = pd.detail.as_ref() else {
        draw_empty(f, body, app, "player");
        return;
    };

    let p = &detail.player;
    let [avg_k, avg_d, avg_f] = pd.averages();
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Team ", dim()),
            Span::raw(detail.team_name.clone().unwrap_or_else(|| "Free agent".into())),
            Span::styled("   Matches ", dim()),
            Span::raw(p.matches_played.max(0).to_string()),
            Span::styled("   K/D ", dim()),
            Span::styled(pd.kd(), Style::default().fg(Color::Yellow)),
        ]),
        Line::from(vec![
            Span::styled("Totals ", dim()),
            Span::raw(format!(
                "{} kills / {} deaths / {} flags",
                p.total_kills.max(0),
                p.total_deaths.max(0),
                p.total_flags.max(0)
            )),
        ]),
        Line::from(vec![
            Span::styled("Per match ", dim()),
            Span::raw(format!("{avg_k} kills / {avg_d} deaths / {avg_f} flags")),
        ]),
        Line::from(""),
        Line::from(Span::styled("Match history", heading())),
        Line::from(Span::styled(
            format!("  {:<12}{:<16}{:<10}{:>5}{:>5}{:>5}{:>7}  ", "Date", "Map", "Opponent", "K", "D", "F", "K/D"),
            dim(),
        )),
    ];
    if pd.history.is_empty() {
        lines.push(Line::from(Span::styled("  no matches recorded", dim())));
    }
    let rows = pd
        .history
        .iter()
        .map(|row| {
            let played = row.played_on.map(|d| d.to_string()).unwrap_or_else(|| "TBD".into());
            let t = row.line.total;
            let mut spans = vec![Span::raw(format!(
                "{:<12}{:<16}{:<10}{:>5}{:>5}{:>5}{:>7}  ",
                played,
                row.map_name,
                row.opponent_label,
                t.kills,
                t.deaths,
                t.flags,
                t.kd()
            ))];
            if let Some(outcome) = row.outcome {
                spans.push(Span::styled(outcome.letter().to_string(), outcome_style(outcome)));
            }
            if row.is_ringer {
                spans.push(Span::styled(" ringer", Style::default().fg(Color::Magenta)));
            }
            Line::from(spans)
        })
        .collect();
    let height = body.height.saturating_sub(lines.len() as u16) as usize;
    lines.extend(list_lines(rows, Some(pd.cursor.selected), height));
    f.render_widget(Paragraph::new(lines), body);
}

fn draw_matches(f: &mut Frame, area: Rect, app: &App) {
    let ms = &app.state.matches;
    let body = screen(
        f,
        area,
        &format!("Matches: {}", ms.filter.label()),
        "j/k=move  Enter=open  t=type filter  n=schedule  e=edit  d=delete  r=reload",
    );
    if ms.matches.is_empty() {
        let msg = match app.state.last_error.as_deref() {
            Some(err) => format!("Load failed:\n{err}"),
            None => "No matches".to_string(),
        };
        f.render_widget(Paragraph::new(msg).style(dim()).alignment(Alignment::Center), body);
        return;
    }

    let played = ms.played();
    let upcoming = ms.upcoming();
    let selected = ms.cursor.selected;
    let mut rows: Vec<Line<'static>> = Vec::new();
    let mut lines = Vec::new();
    // Section headings are not selectable; selection indexes into played ++ upcoming.
    rows.extend(played.iter().copied().map(match_line));
    rows.extend(upcoming.iter().copied().map(match_line));
    let height = body.height.saturating_sub(2) as usize;
    let listed = list_lines(rows, Some(selected), height);
    let start = window_start(selected, height);
    for (offset, line) in listed.into_iter().enumerate() {
        let idx = start + offset;
        if idx == 0 && !played.is_empty() {
            lines.push(Line::from(Span::styled(format!("Played ({})", played.len()), heading())));
        }
        if idx == played.len() {
            lines.push(Line::from(Span::styled(format!("Upcoming ({})", upcoming.len()), heading())));
        }
        lines.push(line);
    }
    f.render_widget(Paragraph::new(lines), body);
}

fn draw_match_detail(f: &mut Frame, area: Rect, app: &App) {
    let md = &app.state.match_detail;
    let title = md
        .detail
        .as_ref()
        .map(|d| format!("Match #{}", d.summary.id))
        .unwrap_or_else(|| "Match".into());
    let body = screen(f, area, &title, "s=add stat  e=edit  d=delete  r=reload  Esc=back");
    let (Some(detail), Some((t1, t2))) = (md.detail.as_ref(), md.tables.as_ref()) else {
        draw_empty(f, body, app, "match");
        return;
    };

    let m = &detail.summary;
    let winner = md.winner();
    let [header, tables] = Layout::vertical([Constraint::Length(3), Constraint::Fill(1)]).areas(body);
    let result = match (m.is_played(), winner) {
        (false, _) => "not played yet".to_string(),
        (true, Some(side)) => format!(
            "winner: {}",
            if side == Side::Team1 { m.team1_label() } else { m.team2_label() }
        ),
        (true, None) => "draw".to_string(),
    };
    let lines = vec![
        Line::from(vec![
            Span::styled(format!("{} ", m.match_type.label()), Style::default().fg(Color::Cyan)),
            Span::raw(format!("{}  ", m.map_label())),
            Span::styled(date(m), dim()),
        ]),
        Line::from(vec![
            Span::styled(m.team1_label(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(" {} - {} ", m.team1_score.max(0), m.team2_score.max(0))),
            Span::styled(m.team2_label(), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(format!("   {result}"), dim()),
        ]),
    ];
    f.render_widget(Paragraph::new(lines), header);

    let [top, bottom] = Layout::vertical([Constraint::Fill(1), Constraint::Fill(1)]).areas(tables);
    for (side, table, rect, label) in [
        (Side::Team1, t1, top, m.team1_label()),
        (Side::Team2, t2, bottom, m.team2_label()),
    ] {
        let color = if winner == Some(side) { Color::Green } else { Color::White };
        let mark = if winner == Some(side) { "  winner" } else { "" };
        let block = default_border(color).title(format!(" {label}{mark} "));
        let inner = block.inner(rect);
        f.render_widget(block, rect);
        if table.players.is_empty() {
            f.render_widget(Paragraph::new("No stats recorded").style(dim()), inner);
        } else {
            f.render_widget(StatTable::from_team(table, color), inner);
        }
    }
}

fn draw_stats(f: &mut Frame, area: Rect, app: &App) {
    let st = &app.state.stats;
    let body = screen(
        f,
        area,
        &format!("Stats: {}", st.view.label()),
        "v=switch view  s=sort column  o=order  j/k=move  Enter=open  r=reload",
    );

    let height = body.height.saturating_sub(2) as usize;
    let mut lines = Vec::new();
    match st.view {
        StatsView::Leaderboard => {
            lines.push(Line::from(Span::styled(
                format!("Sorted by {} {}", st.sort.label(), st.order.arrow()),
                Style::default().fg(Color::Yellow),
            )));
            lines.push(Line::from(Span::styled(
                format!(
                    "  {:>4} {:<20}{:<16}{:>7}{:>7}{:>7}{:>8}{:>9}",
                    "#", "Nickname", "Team", "Kills", "Deaths", "Flags", "K/D", "Matches"
                ),
                dim(),
            )));
            let rows = st
                .leaderboard
                .iter()
                .enumerate()
                .map(|(i, e)| {
                    Line::from(format!(
                        "{:>4} {:<20}{:<16}{:>7}{:>7}{:>7}{:>8}{:>9}",
                        i + 1,
                        e.nickname,
                        e.team_name.clone().unwrap_or_else(|| "Free agent".into()),
                        e.total_kills.max(0),
                        e.total_deaths.max(0),
                        e.total_flags.max(0),
                        kd_ratio(e.total_kills, e.total_deaths),
                        e.matches_played.max(0)
                    ))
                })
                .collect();
            lines.extend(list_lines(rows, Some(st.cursor.selected), height));
        }
        StatsView::Maps => {
            lines.push(Line::from(Span::styled("Times each map was played", Style::default().fg(Color::Yellow))));
            lines.push(Line::from(Span::styled(format!("  {:<24}{:>8}", "Map", "Played"), dim())));
            let rows = st
                .maps
                .iter()
                .map(|m| Line::from(format!("{:<24}{:>8}", m.map_name, m.times_played.max(0))))
                .collect();
            lines.extend(list_lines(rows, Some(st.cursor.selected), height));
        }
        StatsView::Standings => {
            lines.push(Line::from(Span::styled("Ordered by win rate", Style::default().fg(Color::Yellow))));
            lines.push(Line::from(Span::styled(
                format!("  {:>4} {:<8}{:<24}{:>10}{:>8}", "#", "Tag", "Team", "Record", "Win %"),
                dim(),
            )));
            let rows = st
                .standings
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    Line::from(format!(
                        "{:>4} {:<8}{:<24}{:>10}{:>7}%",
                        i + 1,
                        s.team.tag,
                        s.team.name,
                        s.record.summary(),
                        s.record.win_rate_percent()
                    ))
                })
                .collect();
            lines.extend(list_lines(rows, Some(st.cursor.selected), height));
        }
    }
    if st.rows() == 0 {
        lines.push(Line::from(Span::styled("  nothing to show", dim())));
    }
    f.render_widget(Paragraph::new(lines), body);
}

fn draw_load_match(f: &mut Frame, area: Rect, lm: &LoadMatchState) {
    let body = screen(
        f,
        area,
        "Load Match",
        "Tab=next field  Enter=pick  a=player  r=ringer  x=remove  h=half  ←/→=column  Ctrl-S=submit",
    );

    let [form_area, warn_area, lineups] = Layout::vertical([
        Constraint::Length(5),
        Constraint::Length(2),
        Constraint::Fill(1),
    ])
    .areas(body);

    let field = |focus: LoadFocus, label: &str, value: String| {
        let focused = lm.focus == focus;
        let style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        vec![
            Span::styled(format!("{label:>8} "), dim()),
            Span::styled(format!("{:<26}", if focused { format!("{value}_") } else { value }), style),
        ]
    };
    let draft = &lm.draft;
    let map = if draft.map_name.is_empty() { "(type or Enter to pick)".to_string() } else { draft.map_name.clone() };
    let rows = vec![
        Line::from([field(LoadFocus::Type, "Type", draft.match_type.label().to_string()), field(LoadFocus::Map, "Map", map)].concat()),
        Line::from(field(LoadFocus::Date, "Date", lm.date_text.clone())),
        Line::from(
            [
                field(LoadFocus::Team(Side::Team1), "Team 1", lm.team_label(Side::Team1)),
                field(LoadFocus::Team(Side::Team2), "Team 2", lm.team_label(Side::Team2)),
            ]
            .concat(),
        ),
        Line::from(
            [
                field(LoadFocus::Score(Side::Team1), "Score 1", draft.score(Side::Team1).to_string()),
                field(LoadFocus::Score(Side::Team2), "Score 2", draft.score(Side::Team2).to_string()),
            ]
            .concat(),
        ),
        Line::from(Span::styled(format!("Entering {} half", if lm.half == league_api::aggregate::Half::First { "1st" } else { "2nd" }), dim())),
    ];
    f.render_widget(Paragraph::new(rows), form_area);

    let mut notes = Vec::new();
    if let Some(warning) = lm.scrim_warning() {
        notes.push(Line::from(Span::styled(warning, Style::default().fg(Color::Yellow))));
    }
    if let Some(err) = lm.error.as_deref() {
        notes.push(Line::from(Span::styled(err.to_string(), Style::default().fg(Color::Red))));
    }
    f.render_widget(Paragraph::new(notes).wrap(Wrap { trim: true }), warn_area);

    let [top, bottom] = Layout::vertical([Constraint::Fill(1), Constraint::Fill(1)]).areas(lineups);
    for (side, rect) in [(Side::Team1, top), (Side::Team2, bottom)] {
        let focused = lm.focus == LoadFocus::Lineup(side);
        let color = if focused { Color::Yellow } else { Color::White };
        let entries = draft.lineup(side);
        let block = default_border(color).title(format!(
            " {} lineup {}/{} ",
            side.label(),
            entries.len(),
            league_api::lineup::MAX_STARTERS
        ));
        let inner = block.inner(rect);
        f.render_widget(block, rect);
        if entries.is_empty() {
            f.render_widget(Paragraph::new("No players yet (focus here and press a)").style(dim()), inner);
            continue;
        }
        let cursor = focused.then(|| CellCursor { row: lm.selected_row(side), half: lm.half, column: lm.column });
        f.render_widget(StatTable::from_lineup(entries, color, cursor), inner);
    }
}

fn draw_users(f: &mut Frame, area: Rect, app: &App) {
    let body = screen(f, area, "Users", "j/k=move  n=new  e=edit  d=delete  r=reload");
    let users = &app.state.users;
    if users.users.is_empty() {
        draw_empty(f, body, app, "users");
        return;
    }
    let mut lines = vec![Line::from(Span::styled(
        format!("  {:<24}{:<8}{}", "Username", "Role", "Created"),
        dim(),
    ))];
    let rows = users
        .users
        .iter()
        .map(|u| {
            let created = u.created_at.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
            let role = if u.is_admin { "admin" } else { "user" };
            Line::from(format!("{:<24}{role:<8}{created}", u.username))
        })
        .collect();
    lines.extend(list_lines(rows, Some(users.cursor.selected), body.height.saturating_sub(1) as usize));
    f.render_widget(Paragraph::new(lines), body);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::DarkGray).title(" Help (Esc to close) ");
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(Paragraph::new(HELP_TEXT), inner);
}

// ---------------------------------------------------------------------------
// Overlays
// ---------------------------------------------------------------------------

fn draw_form(f: &mut Frame, area: Rect, form: &Form) {
    let height = form.fields.len() as u16 + 6;
    let rect = centered(area, 60, height);
    f.render_widget(Clear, rect);
    let block = default_border(Color::Yellow).title(form.title());
    let inner = block.inner(rect);
    f.render_widget(block, rect);

    let mut lines = Vec::with_capacity(form.fields.len() + 3);
    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        let style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let cursor = if focused && form.accepts_text() { "_" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(format!("{:>30} ", field.label), dim()),
            Span::styled(format!("{}{cursor}", field.display()), style),
        ]));
    }
    lines.push(Line::from(""));
    if let Some(err) = form.error.as_deref() {
        lines.push(Line::from(Span::styled(err.to_string(), Style::default().fg(Color::Red))));
    } else {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        "Enter=save  Esc=cancel  Tab=next  ←/→=change",
        dim(),
    )));
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_confirm(f: &mut Frame, area: Rect, confirm: &Confirm) {
    let rect = centered(area, (confirm.prompt.chars().count() as u16 + 6).max(30), 5);
    f.render_widget(Clear, rect);
    let block = default_border(Color::Red).title(" Confirm ");
    let inner = block.inner(rect);
    f.render_widget(block, rect);
    f.render_widget(
        Paragraph::new(vec![
            Line::from(confirm.prompt.as_str()),
            Line::from(""),
            Line::from(Span::styled("y=yes  n=no", dim())),
        ])
        .alignment(Alignment::Center),
        inner,
    );
}

fn draw_picker(f: &mut Frame, area: Rect, picker: &Picker) {
    let height = (picker.options.len() as u16 + 3).min(area.height.saturating_sub(2)).max(5);
    let rect = centered(area, 50, height);
    f.render_widget(Clear, rect);
    let block = default_border(Color::Yellow).title(picker.title.as_str());
    let inner = block.inner(rect);
    f.render_widget(block, rect);
    let [list, legend] = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(inner);
    let rows = picker.options.iter().map(|(_, label)| Line::from(label.clone())).collect();
    f.render_widget(
        Paragraph::new(list_lines(rows, Some(picker.cursor.selected), list.height as usize)),
        list,
    );
    f.render_widget(Paragraph::new("Enter=choose  Esc=cancel").style(dim()), legend);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let line = if let Some(err) = app.state.last_error.as_deref() {
        Line::from(Span::styled(format!(" {err}"), Style::default().fg(Color::Red)))
    } else if let Some(status) = app.state.status.as_deref() {
        Line::from(Span::styled(format!(" {status}"), Style::default().fg(Color::Green)))
    } else {
        Line::from(Span::styled(format!(" {}", app.settings.api_url), dim()))
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let widget = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Cyan))
        .style_debug(Style::default().fg(Color::DarkGray))
        .output_target(false)
        .output_file(false)
        .output_line(false);
    f.render_widget(widget, area);
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen || app.state.login.is_some() {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_keeps_cursor_visible() {
        assert_eq!(window_start(0, 5), 0);
        assert_eq!(window_start(4, 5), 0);
        assert_eq!(window_start(5, 5), 1);
        assert_eq!(window_start(3, 0), 0);
    }

    #[test]
    fn list_marks_selected_row() {
        let rows = (0..10).map(|i| Line::from(format!("row {i}"))).collect();
        let lines = list_lines(rows, Some(7), 3);
        assert_eq!(lines.len(), 3);
        let text: Vec<String> = lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert_eq!(text, vec!["  row 5", "  row 6", "> row 7"]);
    }
}
