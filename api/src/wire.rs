//! Request bodies and decoding helpers for the league backend.
//!
//! Response bodies deserialize straight into the domain types in `lib.rs`; this
//! module holds what the client *sends*, plus the lenient date decoding the
//! backend needs (it emits naive timestamps without an offset).
use crate::MatchType;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse RFC 3339, a naive timestamp (taken as UTC), or a bare `YYYY-MM-DD`.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Serde adapter for optional timestamps. Garbage decodes to `None` instead of
/// failing the whole response.
pub fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_datetime))
}

// ---------------------------------------------------------------------------
// Responses that have no domain counterpart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

/// Error body. `detail` is a string for handler errors and a list of
/// `{loc, msg}` objects for schema validation failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: serde_json::Value,
}

impl ErrorBody {
    pub fn message(&self) -> Option<String> {
        match &self.detail {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Array(items) => {
                let msgs: Vec<String> = items
                    .iter()
                    .filter_map(|item| {
                        let msg = item.get("msg")?.as_str()?;
                        let field = item
                            .get("loc")
                            .and_then(|loc| loc.as_array())
                            .and_then(|loc| loc.last())
                            .and_then(|f| f.as_str());
                        Some(match field {
                            Some(field) => format!("{field}: {msg}"),
                            None => msg.to_string(),
                        })
                    })
                    .collect();
                if msgs.is_empty() { None } else { Some(msgs.join("; ")) }
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserCreate {
    pub username: String,
    pub password: String,
    pub is_admin: bool,
}

impl UserCreate {
    pub fn new(username: &str, password: &str, is_admin: bool) -> Result<Self, FieldError> {
        Ok(Self {
            username: username_field(username)?,
            password: password_field(password)?,
            is_admin,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamCreate {
    pub name: String,
    pub tag: String,
    pub is_free_agents: bool,
}

impl TeamCreate {
    pub fn new(name: &str, tag: &str, is_free_agents: bool) -> Result<Self, FieldError> {
        Ok(Self { name: team_name_field(name)?, tag: team_tag_field(tag)?, is_free_agents })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerCreate {
    pub nickname: String,
    pub team_id: Option<i64>,
}

impl PlayerCreate {
    pub fn new(nickname: &str, team_id: Option<i64>) -> Result<Self, FieldError> {
        Ok(Self { nickname: nickname_field(nickname)?, team_id })
    }
}

/// `team_id: Some(None)` moves the player to free agency; `None` leaves it alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<Option<i64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchCreate {
    pub match_type: MatchType,
    pub team1_id: i64,
    pub team2_id: i64,
    pub map_name: Option<String>,
    pub scheduled_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_type: Option<MatchType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team1_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team2_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team1_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team2_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatCreate {
    pub player_id: i64,
    pub team_id: i64,
    pub half: u8,
    pub kills: u32,
    pub deaths: u32,
    pub flags: u32,
    pub is_ringer: bool,
}

/// Atomic match + stats creation body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchLoadRequest {
    pub match_type: MatchType,
    pub team1_id: i64,
    pub team2_id: i64,
    pub map_name: String,
    pub team1_score: u32,
    pub team2_score: u32,
    pub player_stats: Vec<StatCreate>,
    pub played_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Field rules for admin forms
// ---------------------------------------------------------------------------

pub const TEAM_NAME_MAX: usize = 100;
pub const TEAM_TAG_MAX: usize = 10;
pub const NICKNAME_MAX: usize = 50;
pub const USERNAME_MAX: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    Required(&'static str),
    TooLong { field: &'static str, max: usize },
    Invalid { field: &'static str, reason: String },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::Required(field) => write!(f, "{field} is required"),
            FieldError::TooLong { field, max } => {
                write!(f, "{field} must be at most {max} characters")
            }
            FieldError::Invalid { field, reason } => write!(f, "{field}: {reason}"),
        }
    }
}

impl std::error::Error for FieldError {}

fn bounded(value: &str, field: &'static str, max: usize) -> Result<String, FieldError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FieldError::Required(field));
    }
    if value.chars().count() > max {
        return Err(FieldError::TooLong { field, max });
    }
    Ok(value.to_string())
}

pub fn team_name_field(value: &str) -> Result<String, FieldError> {
    bounded(value, "Team name", TEAM_NAME_MAX)
}

/// Tags are stored uppercased.
pub fn team_tag_field(value: &str) -> Result<String, FieldError> {
    bounded(value, "Tag", TEAM_TAG_MAX).map(|tag| tag.to_uppercase())
}

pub fn nickname_field(value: &str) -> Result<String, FieldError> {
    bounded(value, "Nickname", NICKNAME_MAX)
}

pub fn username_field(value: &str) -> Result<String, FieldError> {
    bounded(value, "Username", USERNAME_MAX)
}

pub fn password_field(value: &str) -> Result<String, FieldError> {
    if value.is_empty() {
        return Err(FieldError::Required("Password"));
    }
    Ok(value.to_string())
}

/// Parses a non-negative integer, clamping negatives to zero.
pub fn count_field(value: &str, field: &'static str) -> Result<u32, FieldError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(0);
    }
    value
        .parse::<i64>()
        .map(|n| n.clamp(0, i64::from(u32::MAX)) as u32)
        .map_err(|_| FieldError::Invalid { field, reason: format!("'{value}' is not a number") })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_naive_backend_timestamps_as_utc() {
        let dt = parse_datetime("2025-03-01T20:15:00").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day(), dt.hour()), (2025, 3, 1, 20));
        let with_fraction = parse_datetime("2025-03-01T20:15:00.123456").unwrap();
        assert_eq!(with_fraction.minute(), 15);
    }

    #[test]
    fn parses_offsets_and_bare_dates() {
        let dt = parse_datetime("2025-03-01T22:00:00+02:00").unwrap();
        assert_eq!(dt.hour(), 20);
        let day = parse_datetime("2025-03-01").unwrap();
        assert_eq!((day.day(), day.hour()), (1, 0));
        assert!(parse_datetime("not a date").is_none());
        assert!(parse_datetime("  ").is_none());
    }

    #[test]
    fn lenient_datetime_swallows_garbage() {
        #[derive(Deserialize)]
        struct Probe {
            #[serde(default, deserialize_with = "lenient_datetime")]
            at: Option<DateTime<Utc>>,
        }
        let p: Probe = serde_json::from_str(r#"{"at": "yesterday"}"#).unwrap();
        assert!(p.at.is_none());
        let p: Probe = serde_json::from_str(r#"{"at": null}"#).unwrap();
        assert!(p.at.is_none());
        let p: Probe = serde_json::from_str("{}").unwrap();
        assert!(p.at.is_none());
    }

    #[test]
    fn error_body_reads_string_and_validation_details() {
        let plain: ErrorBody = serde_json::from_str(r#"{"detail": "Team tag already exists"}"#).unwrap();
        assert_eq!(plain.message().as_deref(), Some("Team tag already exists"));

        let schema: ErrorBody = serde_json::from_str(
            r#"{"detail": [{"loc": ["body", "half"], "msg": "Input should be less than or equal to 2"}]}"#,
        )
        .unwrap();
        assert_eq!(
            schema.message().as_deref(),
            Some("half: Input should be less than or equal to 2")
        );

        let empty: ErrorBody = serde_json::from_str("{}").unwrap();
        assert!(empty.message().is_none());
    }

    #[test]
    fn team_tag_is_trimmed_and_uppercased() {
        let team = TeamCreate::new("  Alpha Squad ", " alp ", false).unwrap();
        assert_eq!(team.name, "Alpha Squad");
        assert_eq!(team.tag, "ALP");
        assert_eq!(
            TeamCreate::new("Alpha", "ABCDEFGHIJK", false),
            Err(FieldError::TooLong { field: "Tag", max: 10 })
        );
        assert_eq!(TeamCreate::new("", "A", false), Err(FieldError::Required("Team name")));
    }

    #[test]
    fn nickname_limit_counts_characters() {
        assert!(PlayerCreate::new(&"é".repeat(50), None).is_ok());
        assert!(PlayerCreate::new(&"é".repeat(51), None).is_err());
    }

    #[test]
    fn player_update_distinguishes_release_from_untouched() {
        let release = PlayerUpdate { nickname: None, team_id: Some(None) };
        assert_eq!(serde_json::to_value(&release).unwrap(), serde_json::json!({"team_id": null}));
        let untouched = PlayerUpdate { nickname: Some("Ace".into()), team_id: None };
        assert_eq!(serde_json::to_value(&untouched).unwrap(), serde_json::json!({"nickname": "Ace"}));
    }

    #[test]
    fn count_field_clamps_negative_input() {
        assert_eq!(count_field("-4", "Kills"), Ok(0));
        assert_eq!(count_field("", "Kills"), Ok(0));
        assert_eq!(count_field(" 12 ", "Kills"), Ok(12));
        assert!(count_field("ten", "Kills").is_err());
    }

    #[test]
    fn load_request_serializes_played_date_as_plain_date() {
        let req = MatchLoadRequest {
            match_type: MatchType::Scrim,
            team1_id: 1,
            team2_id: 2,
            map_name: "dod_anzio".into(),
            team1_score: 2,
            team2_score: 1,
            player_stats: vec![],
            played_date: NaiveDate::from_ymd_opt(2025, 3, 1),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["played_date"], "2025-03-01");
        assert_eq!(value["match_type"], "SCRIM");
    }
}
