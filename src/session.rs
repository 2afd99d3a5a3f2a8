use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::app_cache_dir;
use crate::models::{User, UserId};

const SESSION_FILE: &str = "session.json";
const SESSION_VERSION: u32 = 1;

/// The logged-in user, remembered between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub email: String,
    pub logged_in_at: DateTime<Utc>,
}

impl Session {
    pub fn for_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            logged_in_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    version: u32,
    session: Session,
}

pub fn default_session_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(SESSION_FILE))
}

/// Missing, unreadable or outdated files all mean nobody is logged in.
pub fn load_session(path: &Path) -> Option<Session> {
    let raw = fs::read_to_string(path).ok()?;
    let file = serde_json::from_str::<SessionFile>(&raw).ok()?;
    if file.version != SESSION_VERSION {
        return None;
    }
    Some(file.session)
}

pub fn save_session(path: &Path, session: &Session) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let file = SessionFile {
        version: SESSION_VERSION,
        session: session.clone(),
    };
    let json = serde_json::to_string(&file).context("serialize session")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).context("write session")?;
    fs::rename(&tmp, path).context("swap session")?;
    Ok(())
}

pub fn clear_session(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).context("remove session"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("vleague-session-{}-{name}", std::process::id()))
            .join(SESSION_FILE)
    }

    #[test]
    fn save_load_clear() {
        let path = scratch_path("cycle");
        let session = Session {
            user_id: 7,
            email: "ana@example.com".to_string(),
            logged_in_at: Utc::now(),
        };
        save_session(&path, &session).unwrap();
        assert_eq!(load_session(&path), Some(session));
        clear_session(&path).unwrap();
        assert_eq!(load_session(&path), None);
        clear_session(&path).unwrap();
    }

    #[test]
    fn save_reports_unusable_directory() {
        let blocker = scratch_path("blocker");
        fs::create_dir_all(blocker.parent().unwrap()).unwrap();
        fs::write(&blocker, "not a directory").unwrap();
        let path = blocker.join(SESSION_FILE);
        let session = Session {
            user_id: 1,
            email: "ana@example.com".to_string(),
            logged_in_at: Utc::now(),
        };

        let err = save_session(&path, &session).unwrap_err();
        assert!(format!("{err:#}").starts_with("create "), "{err:#}");
        fs::remove_file(&blocker).ok();
    }

    #[test]
    fn corrupt_file_is_logged_out() {
        let path = scratch_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{not json").unwrap();
        assert_eq!(load_session(&path), None);
    }
}
