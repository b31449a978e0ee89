use anyhow::Context;
use league_api::client::DEFAULT_BASE_URL;
use log::{LevelFilter, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "dodleague";
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Default, Clone)]
pub struct AppSettings {
    pub api_url: String,
    pub token: Option<String>,
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    pub session_path: Option<PathBuf>,
}

/// Cached bearer token, written after a successful login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub username: Option<String>,
}

impl AppSettings {
    pub fn load() -> Self {
        let env = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        let session_path = session_path(env("XDG_CONFIG_HOME"), env("HOME"));
        let token = env("LEAGUE_TOKEN").or_else(|| {
            session_path.as_deref().and_then(read_session).map(|s| s.token)
        });

        Self {
            api_url: env("LEAGUE_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            token,
            full_screen: false,
            log_level: env("LEAGUE_LOG").and_then(|v| parse_level(&v)),
            session_path,
        }
    }

    pub fn save_session(&mut self, token: &str, username: &str) {
        self.token = Some(token.to_string());
        let Some(path) = self.session_path.as_deref() else {
            return;
        };
        let session = Session { token: token.to_string(), username: Some(username.to_string()) };
        if let Err(e) = write_session(path, &session) {
            warn!("could not store session: {e:#}");
        }
    }

    pub fn clear_session(&mut self) {
        self.token = None;
        if let Some(path) = self.session_path.as_deref()
            && path.exists()
            && let Err(e) = std::fs::remove_file(path)
        {
            warn!("could not remove {}: {e}", path.display());
        }
    }
}

fn session_path(xdg_config_home: Option<String>, home: Option<String>) -> Option<PathBuf> {
    if let Some(config_dir) = xdg_config_home {
        return Some(PathBuf::from(config_dir).join(APP_DIR).join(SESSION_FILE));
    }
    home.map(|home| PathBuf::from(home).join(".config").join(APP_DIR).join(SESSION_FILE))
}

fn read_session(path: &Path) -> Option<Session> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str::<Session>(&content) {
        Ok(session) => Some(session),
        Err(e) => {
            warn!("ignoring unreadable session file {}: {e}", path.display());
            None
        }
    }
}

fn write_session(path: &Path, session: &Session) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let payload = serde_json::to_string_pretty(session).context("serializing session")?;
    std::fs::write(path, payload).with_context(|| format!("writing {}", path.display()))
}

fn parse_level(raw: &str) -> Option<LevelFilter> {
    raw.trim().parse::<LevelFilter>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_path_prefers_xdg_config_home() {
        let path = session_path(Some("/tmp/cfg".into()), Some("/home/u".into())).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/cfg/dodleague/session.json"));
        let path = session_path(None, Some("/home/u".into())).unwrap();
        assert_eq!(path, PathBuf::from("/home/u/.config/dodleague/session.json"));
        assert!(session_path(None, None).is_none());
    }

    #[test]
    fn log_level_names_parse() {
        assert_eq!(parse_level("debug"), Some(LevelFilter::Debug));
        assert_eq!(parse_level(" WARN "), Some(LevelFilter::Warn));
        assert_eq!(parse_level("chatty"), None);
    }

    #[test]
    fn session_file_round_trips_and_clears() {
        let dir = std::env::temp_dir().join(format!("dodleague-test-{}", std::process::id()));
        let path = dir.join(SESSION_FILE);
        let mut settings = AppSettings { session_path: Some(path.clone()), ..Default::default() };

        settings.save_session("abc", "admin");
        let stored = read_session(&path).unwrap();
        assert_eq!(stored.token, "abc");
        assert_eq!(stored.username.as_deref(), Some("admin"));

        settings.clear_session();
        assert!(settings.token.is_none());
        assert!(!path.exists());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn session_write_error_names_the_directory() {
        let blocker = std::env::temp_dir().join(format!("dodleague-blocker-{}", std::process::id()));
        std::fs::write(&blocker, "not a dir").unwrap();
        let path = blocker.join("dodleague").join(SESSION_FILE);
        let session = Session { token: "abc".into(), username: None };

        let err = write_session(&path, &session).unwrap_err();
        assert!(format!("{err:#}").starts_with(&format!("creating {}", blocker.join("dodleague").display())));
        let _ = std::fs::remove_file(blocker);
    }
}
