use league_api::aggregate::{Half, PlayerMatchLine, StatLine, TeamMatchTable};
use league_api::lineup::LineupEntry;
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::widgets::Widget;

use crate::state::load_match::StatColumn;

/// Width of one `K D F` group.
const GROUP_W: u16 = 12;
const KD_W: u16 = 7;
/// Everything right of the name column: three groups, their gaps and the K/D column.
const FIXED_W: u16 = 1 + GROUP_W * 3 + 2 + KD_W;
const MIN_NAME_W: u16 = 8;

/// One rendered row: a player, or the team footer.
#[derive(Debug, Clone, PartialEq)]
pub struct StatRow {
    pub label: String,
    pub is_ringer: bool,
    pub half1: StatLine,
    pub half2: StatLine,
}

impl StatRow {
    fn total(&self) -> StatLine {
        self.half1 + self.half2
    }

    fn half(&self, half: Half) -> StatLine {
        match half {
            Half::First => self.half1,
            Half::Second => self.half2,
        }
    }
}

impl From<&PlayerMatchLine> for StatRow {
    fn from(line: &PlayerMatchLine) -> Self {
        Self {
            label: line.nickname.clone(),
            is_ringer: line.is_ringer,
            half1: line.half1,
            half2: line.half2,
        }
    }
}

impl From<&LineupEntry> for StatRow {
    fn from(entry: &LineupEntry) -> Self {
        Self {
            label: entry.nickname.clone(),
            is_ringer: entry.is_ringer,
            half1: entry.half(Half::First),
            half2: entry.half(Half::Second),
        }
    }
}

/// Highlighted cell while stats are being typed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellCursor {
    pub row: usize,
    pub half: Half,
    pub column: StatColumn,
}

/// Per-half kills/deaths/flags table with a footer summing each column.
pub struct StatTable {
    pub rows: Vec<StatRow>,
    pub accent: Color,
    pub cursor: Option<CellCursor>,
}

impl StatTable {
    pub fn from_team(table: &TeamMatchTable, accent: Color) -> Self {
        Self { rows: table.players.iter().map(StatRow::from).collect(), accent, cursor: None }
    }

    pub fn from_lineup(entries: &[LineupEntry], accent: Color, cursor: Option<CellCursor>) -> Self {
        Self { rows: entries.iter().map(StatRow::from).collect(), accent, cursor }
    }

    fn footer(&self) -> StatRow {
        StatRow {
            label: "Team total".to_string(),
            is_ringer: false,
            half1: self.rows.iter().map(|r| r.half1).sum(),
            half2: self.rows.iter().map(|r| r.half2).sum(),
        }
    }
}

fn group(line: StatLine) -> String {
    format!("{:>4}{:>4}{:>4}", line.kills, line.deaths, line.flags)
}

fn fit(label: &str, width: usize) -> String {
    let clipped: String = label.chars().take(width).collect();
    format!("{clipped:<width$}")
}

fn column_offset(column: StatColumn) -> u16 {
    match column {
        StatColumn::Kills => 0,
        StatColumn::Deaths => 4,
        StatColumn::Flags => 8,
    }
}

impl Widget for StatTable {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 3 || area.width < MIN_NAME_W + FIXED_W {
            return;
        }
        let name_w = area.width - FIXED_W;
        let dim = Style::default().fg(Color::DarkGray);
        let header = Style::default().fg(self.accent).add_modifier(Modifier::BOLD);

        let groups_x = area.x + name_w + 1;
        buf.set_string(groups_x, area.y, format!("{:^12}", "1st Half"), header);
        buf.set_string(groups_x + GROUP_W + 1, area.y, format!("{:^12}", "2nd Half"), header);
        buf.set_string(groups_x + (GROUP_W + 1) * 2, area.y, format!("{:^12}", "Total"), header);
        buf.set_string(
            area.x,
            area.y + 1,
            format!("{} {} {} {}{:>7}", fit("Player", name_w as usize), group_header(), group_header(), group_header(), "K/D"),
            dim,
        );

        let body_height = area.height.saturating_sub(3) as usize;
        for (i, row) in self.rows.iter().enumerate().take(body_height) {
            let y = area.y + 2 + i as u16;
            let selected = self.cursor.is_some_and(|c| c.row == i);
            let style = if selected {
                Style::default().fg(Color::Yellow)
            } else if row.is_ringer {
                Style::default().fg(Color::Magenta)
            } else {
                Style::default().fg(Color::White)
            };
            let label = if row.is_ringer { format!("{} (R)", row.label) } else { row.label.clone() };
            buf.set_string(area.x, y, render_row(&label, row, name_w), style);

            if let Some(cursor) = self.cursor.filter(|c| c.row == i) {
                let x = groups_x
                    + if cursor.half == Half::First { 0 } else { GROUP_W + 1 }
                    + column_offset(cursor.column);
                let value = match cursor.column {
                    StatColumn::Kills => row.half(cursor.half).kills,
                    StatColumn::Deaths => row.half(cursor.half).deaths,
                    StatColumn::Flags => row.half(cursor.half).flags,
                };
                buf.set_string(x, y, format!("{value:>4}"), style.add_modifier(Modifier::REVERSED));
            }
        }

        let footer_y = area.y + 2 + self.rows.len().min(body_height) as u16;
        let footer = self.footer();
        buf.set_string(
            area.x,
            footer_y,
            render_row(&footer.label, &footer, name_w),
            Style::default().fg(self.accent).add_modifier(Modifier::BOLD),
        );
    }
}

fn group_header() -> String {
    format!("{:>4}{:>4}{:>4}", "K", "D", "F")
}

fn render_row(label: &str, row: &StatRow, name_w: u16) -> String {
    let total = row.total();
    format!(
        "{} {} {} {}{:>7}",
        fit(label, name_w as usize),
        group(row.half1),
        group(row.half2),
        group(total),
        total.kd()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use league_api::aggregate::aggregate_team;
    use league_api::PlayerMatchStat;

    fn line(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect::<String>()
    }

    fn stat(player_id: i64, half: i64, kills: i64, deaths: i64, flags: i64, nickname: &str) -> PlayerMatchStat {
        PlayerMatchStat {
            player_id,
            team_id: 1,
            half,
            kills,
            deaths,
            flags,
            player_nickname: Some(nickname.into()),
            ..Default::default()
        }
    }

    #[test]
    fn renders_rows_and_footer() {
        let table = aggregate_team(
            &[stat(1, 1, 10, 4, 1, "Fragger"), stat(1, 2, 8, 4, 0, "Fragger"), stat(2, 1, 3, 6, 0, "Anchor")],
            1,
        );
        let area = Rect::new(0, 0, 70, 6);
        let mut buf = Buffer::empty(area);
        StatTable::from_team(&table, Color::Cyan).render(area, &mut buf);

        assert!(line(&buf, 0).contains("1st Half"));
        let fragger = line(&buf, 2);
        assert!(fragger.starts_with("Fragger"));
        assert!(fragger.trim_end().ends_with("18   8   1   2.25"));
        let anchor = line(&buf, 3);
        assert!(anchor.trim_end().ends_with("3   6   0   0.50"));
        let footer = line(&buf, 4);
        assert!(footer.starts_with("Team total"));
        assert!(footer.trim_end().ends_with("21  14   1   1.50"));
    }

    #[test]
    fn marks_ringers_and_cursor() {
        let row = StatRow {
            label: "Drifter".into(),
            is_ringer: true,
            half1: StatLine::new(5, 2, 0),
            half2: StatLine::default(),
        };
        let table = StatTable {
            rows: vec![row],
            accent: Color::Cyan,
            cursor: Some(CellCursor { row: 0, half: Half::First, column: StatColumn::Deaths }),
        };
        let area = Rect::new(0, 0, 70, 4);
        let mut buf = Buffer::empty(area);
        table.render(area, &mut buf);

        assert!(line(&buf, 2).starts_with("Drifter (R)"));
        let name_w = 70 - FIXED_W;
        let x = name_w + 1 + 4 + 3;
        assert_eq!(buf[(x, 2)].symbol(), "2");
        assert!(buf[(x, 2)].modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn too_narrow_renders_nothing() {
        let area = Rect::new(0, 0, 30, 6);
        let mut buf = Buffer::empty(area);
        StatTable { rows: vec![], accent: Color::Cyan, cursor: None }.render(area, &mut buf);
        assert_eq!(line(&buf, 0).trim(), "");
    }
}
