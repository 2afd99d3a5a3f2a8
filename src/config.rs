use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use log::{LevelFilter, warn};

use crate::top_liked::DEFAULT_TOP_K;

const APP_DIR: &str = "vleague";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub session_path: Option<PathBuf>,
    pub top_k: usize,
    pub today_override: Option<NaiveDate>,
    pub log_level: LevelFilter,
}

impl AppConfig {
    /// Read `VLEAGUE_*` variables. Call `load_dotenv` first to pick up `.env` files.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let db_path = get("VLEAGUE_DB")
            .map(|v| PathBuf::from(v.trim()))
            .unwrap_or_else(crate::store::default_db_path);
        let session_path = get("VLEAGUE_SESSION")
            .map(|v| PathBuf::from(v.trim()))
            .or_else(crate::session::default_session_path);

        let top_k = match get("VLEAGUE_TOP_K") {
            None => DEFAULT_TOP_K,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(k) if k >= 1 => k,
                _ => {
                    warn!("ignoring VLEAGUE_TOP_K={raw:?}, using {DEFAULT_TOP_K}");
                    DEFAULT_TOP_K
                }
            },
        };

        let today_override = get("VLEAGUE_TODAY").and_then(|raw| {
            match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    warn!("ignoring VLEAGUE_TODAY={raw:?}, expected YYYY-MM-DD");
                    None
                }
            }
        });

        let log_level = match get("VLEAGUE_LOG") {
            None => LevelFilter::Info,
            Some(raw) => raw.trim().parse::<LevelFilter>().unwrap_or_else(|_| {
                warn!("ignoring VLEAGUE_LOG={raw:?}, using info");
                LevelFilter::Info
            }),
        };

        Self {
            db_path,
            session_path,
            top_k,
            today_override,
            log_level,
        }
    }

    /// Reference date for "today": the override if set, else the local calendar date.
    pub fn today(&self) -> NaiveDate {
        self.today_override
            .unwrap_or_else(|| Local::now().date_naive())
    }
}

pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

pub fn app_data_dir() -> Option<PathBuf> {
    xdg_dir("XDG_DATA_HOME", &[".local", "share"])
}

pub fn app_cache_dir() -> Option<PathBuf> {
    xdg_dir("XDG_CACHE_HOME", &[".cache"])
}

fn xdg_dir(var: &str, home_fallback: &[&str]) -> Option<PathBuf> {
    if let Ok(base) = std::env::var(var)
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(APP_DIR));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    let mut path = PathBuf::from(home);
    for part in home_fallback {
        path.push(part);
    }
    Some(path.join(APP_DIR))
}
