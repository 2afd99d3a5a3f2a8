use std::collections::{HashMap, HashSet};

use anyhow::Result;
use chrono::NaiveDate;
use log::warn;

use crate::fixtures::Fixture;
use crate::home::{HomePayload, compose_home, compose_schedule};
use crate::models::{Division, Player, Team};
use crate::session::Session;
use crate::store::LeagueDb;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Schedule,
    Teams,
    Players,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRow {
    pub player: Player,
    pub team_name: Option<String>,
    pub likes: u32,
    pub liked_by_me: bool,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub today: NaiveDate,
    pub home: Option<HomePayload>,
    pub schedule: Vec<Fixture>,
    pub teams: Vec<Team>,
    pub roster: Vec<Player>,
    pub players: Vec<PlayerRow>,
    pub selected: usize,
    pub division: Option<Division>,
    pub search: String,
    pub search_active: bool,
    pub session: Option<Session>,
    pub help_overlay: bool,
    pub last_error: Option<String>,
}

impl AppState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            screen: Screen::Home,
            today,
            home: None,
            schedule: Vec::new(),
            teams: Vec::new(),
            roster: Vec::new(),
            players: Vec::new(),
            selected: 0,
            division: None,
            search: String::new(),
            search_active: false,
            session: None,
            help_overlay: false,
            last_error: None,
        }
    }

    pub fn set_screen(&mut self, screen: Screen) {
        if self.screen != screen {
            self.screen = screen;
            self.selected = 0;
            self.search_active = false;
        }
    }

    pub fn cycle_division(&mut self) {
        self.division = match self.division {
            None => Some(Division::Men),
            Some(Division::Men) => Some(Division::Women),
            Some(Division::Women) => None,
        };
        self.selected = 0;
    }

    pub fn visible_teams(&self) -> Vec<&Team> {
        self.teams
            .iter()
            .filter(|t| self.division.is_none_or(|d| t.division == d))
            .collect()
    }

    /// Players matching the search prefix, ignoring case.
    pub fn visible_players(&self) -> Vec<&PlayerRow> {
        let needle = self.search.trim().to_lowercase();
        self.players
            .iter()
            .filter(|row| needle.is_empty() || row.player.name.to_lowercase().starts_with(&needle))
            .collect()
    }

    pub fn selected_team(&self) -> Option<&Team> {
        self.visible_teams().get(self.selected).copied()
    }

    pub fn selected_player(&self) -> Option<&PlayerRow> {
        self.visible_players().get(self.selected).copied()
    }

    fn row_count(&self) -> usize {
        match self.screen {
            Screen::Home => self
                .home
                .as_ref()
                .map(|h| h.top_players.len())
                .unwrap_or(0),
            Screen::Schedule => self.schedule.len(),
            Screen::Teams => self.visible_teams().len(),
            Screen::Players => self.visible_players().len(),
        }
    }

    pub fn select_next(&mut self) {
        let total = self.row_count();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1) % total;
    }

    pub fn select_prev(&mut self) {
        let total = self.row_count();
        if total == 0 {
            self.selected = 0;
            return;
        }
        if self.selected == 0 {
            self.selected = total - 1;
        } else {
            self.selected -= 1;
        }
    }

    /// Keep the selection inside the current list after a reload.
    pub fn clamp_selection(&mut self) {
        let total = self.row_count();
        if self.selected >= total {
            self.selected = total.saturating_sub(1);
        }
    }

    pub fn push_search_char(&mut self, ch: char) {
        self.search.push(ch);
        self.selected = 0;
    }

    pub fn pop_search_char(&mut self) {
        self.search.pop();
        self.selected = 0;
    }

    /// Reload every section from the store. Each section loads on its own, so a
    /// fixture that references a deleted team leaves teams and players usable;
    /// the failures end up in `last_error`.
    pub fn reload(&mut self, db: &LeagueDb, top_k: usize) {
        let mut errors = Vec::new();
        match compose_home(db, self.today, top_k) {
            Ok(home) => self.home = Some(home),
            Err(err) => {
                self.home = None;
                errors.push(format!("home: {err:#}"));
            }
        }
        match compose_schedule(db, self.today, self.division) {
            Ok(schedule) => self.schedule = schedule,
            Err(err) => {
                self.schedule.clear();
                errors.push(format!("schedule: {err:#}"));
            }
        }
        match db.list_teams() {
            Ok(teams) => self.teams = teams,
            Err(err) => errors.push(format!("teams: {err:#}")),
        }
        if let Err(err) = self.reload_players(db) {
            errors.push(format!("players: {err:#}"));
        }
        if let Err(err) = self.reload_roster(db) {
            errors.push(format!("roster: {err:#}"));
        }

        for err in &errors {
            warn!("refresh failed: {err}");
        }
        self.last_error = (!errors.is_empty()).then(|| errors.join("; "));
        self.clamp_selection();
    }

    fn reload_players(&mut self, db: &LeagueDb) -> Result<()> {
        let team_names: HashMap<_, _> = self.teams.iter().map(|t| (t.id, t.name.clone())).collect();
        let counts: HashMap<_, _> = db.like_counts()?.into_iter().collect();
        let mine: HashSet<_> = match &self.session {
            Some(session) => db.liked_player_ids(session.user_id)?.into_iter().collect(),
            None => HashSet::new(),
        };
        self.players = db
            .list_players()?
            .into_iter()
            .map(|player| PlayerRow {
                team_name: player.team_id.and_then(|id| team_names.get(&id).cloned()),
                likes: counts.get(&player.id).copied().unwrap_or(0),
                liked_by_me: mine.contains(&player.id),
                player,
            })
            .collect();
        Ok(())
    }

    pub fn reload_roster(&mut self, db: &LeagueDb) -> Result<()> {
        let team_id = self.selected_team().map(|t| t.id);
        self.roster = match team_id {
            Some(id) => db.players_of_team(id)?,
            None => Vec::new(),
        };
        Ok(())
    }
}

pub fn screen_label(screen: Screen) -> &'static str {
    match screen {
        Screen::Home => "HOME",
        Screen::Schedule => "SCHEDULE",
        Screen::Teams => "TEAMS",
        Screen::Players => "PLAYERS",
    }
}
