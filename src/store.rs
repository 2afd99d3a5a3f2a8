use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use chrono::{NaiveDate, Utc};
use log::{debug, info};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};

use crate::config::app_data_dir;
use crate::home::LeagueSource;
use crate::models::{
    Division, GameId, LikeChange, NewPlayer, NewTeam, NewUser, Player, PlayerId, ScheduledGame,
    Team, TeamId, User, UserId,
};

const DB_FILE: &str = "vleague.sqlite3";

const TEAM_COLUMNS: &str = "id, name, founded, stadium, chairman, division, image";
const PLAYER_COLUMNS: &str = "id, name, height, position, age, jersey_number, birth_date, \
     birth_place, image, team_id";
const GAME_COLUMNS: &str = "id, first_team_id, second_team_id, match_date";
const USER_COLUMNS: &str = "id, name, email, password_hash, created_at";

pub fn default_db_path() -> PathBuf {
    app_data_dir()
        .map(|dir| dir.join(DB_FILE))
        .unwrap_or_else(|| PathBuf::from(DB_FILE))
}

/// SQLite-backed league repository.
#[derive(Debug)]
pub struct LeagueDb {
    conn: Connection,
}

impl LeagueDb {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        let conn =
            Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
        let db = Self { conn };
        db.init_schema()?;
        info!("opened league db {}", path.display());
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                r#"
                PRAGMA foreign_keys = ON;
                CREATE TABLE IF NOT EXISTS teams (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL UNIQUE,
                    founded INTEGER NOT NULL,
                    stadium TEXT NOT NULL,
                    chairman TEXT NOT NULL,
                    division TEXT NOT NULL CHECK (division IN ('M', 'W')),
                    image TEXT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_teams_division ON teams(division);

                CREATE TABLE IF NOT EXISTS players (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    height INTEGER NOT NULL,
                    position TEXT NOT NULL,
                    age INTEGER NOT NULL,
                    jersey_number INTEGER NOT NULL,
                    birth_date TEXT NOT NULL,
                    birth_place TEXT NOT NULL,
                    image TEXT NULL,
                    team_id INTEGER NULL REFERENCES teams(id) ON DELETE SET NULL
                );
                CREATE INDEX IF NOT EXISTS idx_players_team ON players(team_id);
                CREATE INDEX IF NOT EXISTS idx_players_name ON players(name);

                CREATE TABLE IF NOT EXISTS games (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    first_team_id INTEGER NOT NULL,
                    second_team_id INTEGER NOT NULL,
                    match_date TEXT NOT NULL,
                    CHECK (first_team_id <> second_team_id)
                );
                CREATE INDEX IF NOT EXISTS idx_games_date ON games(match_date);

                CREATE TABLE IF NOT EXISTS users (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    email TEXT NOT NULL UNIQUE,
                    password_hash TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS likes (
                    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    player_id INTEGER NOT NULL REFERENCES players(id) ON DELETE CASCADE,
                    PRIMARY KEY (user_id, player_id)
                );
                CREATE INDEX IF NOT EXISTS idx_likes_player ON likes(player_id);
                "#,
            )
            .context("create sqlite schema")?;
        Ok(())
    }

    // Teams

    pub fn add_team(&self, team: &NewTeam) -> Result<Team> {
        let name = team.name.trim();
        if name.is_empty() {
            bail!("team name is required");
        }
        if self.find_team_by_name(name)?.is_some() {
            bail!("a team named {name:?} already exists");
        }
        self.conn
            .execute(
                "INSERT INTO teams (name, founded, stadium, chairman, division, image)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    name,
                    team.founded,
                    team.stadium.trim(),
                    team.chairman.trim(),
                    team.division.code(),
                    team.image
                ],
            )
            .context("insert team")?;
        let id = self.conn.last_insert_rowid();
        info!("added team {id} {name:?}");
        self.find_team_by_id(id)?
            .ok_or_else(|| anyhow!("team {id} vanished after insert"))
    }

    /// Players of the team are detached. Scheduled games keep the stale reference.
    pub fn delete_team(&self, id: TeamId) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM teams WHERE id = ?1", params![id])
            .context("delete team")?;
        if n > 0 {
            info!("deleted team {id}");
        }
        Ok(n > 0)
    }

    pub fn find_team_by_id(&self, id: TeamId) -> Result<Option<Team>> {
        self.conn
            .query_row(
                &format!("SELECT {TEAM_COLUMNS} FROM teams WHERE id = ?1"),
                params![id],
                team_from_row,
            )
            .optional()
            .context("query team by id")
    }

    pub fn find_team_by_name(&self, name: &str) -> Result<Option<Team>> {
        self.conn
            .query_row(
                &format!("SELECT {TEAM_COLUMNS} FROM teams WHERE name = ?1"),
                params![name.trim()],
                team_from_row,
            )
            .optional()
            .context("query team by name")
    }

    pub fn list_teams(&self) -> Result<Vec<Team>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {TEAM_COLUMNS} FROM teams ORDER BY name ASC"))
            .context("prepare list teams")?;
        let rows = stmt.query_map([], team_from_row).context("query teams")?;
        collect_rows(rows, "decode team row")
    }

    pub fn teams_by_division(&self, division: Division) -> Result<Vec<Team>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {TEAM_COLUMNS} FROM teams WHERE division = ?1 ORDER BY name ASC"
            ))
            .context("prepare teams by division")?;
        let rows = stmt
            .query_map(params![division.code()], team_from_row)
            .context("query teams by division")?;
        collect_rows(rows, "decode team row")
    }

    // Players

    pub fn add_player(&self, player: &NewPlayer) -> Result<Player> {
        let name = player.name.trim();
        if name.is_empty() {
            bail!("player name is required");
        }
        if let Some(team_id) = player.team_id
            && self.find_team_by_id(team_id)?.is_none()
        {
            bail!("team {team_id} does not exist");
        }
        self.conn
            .execute(
                "INSERT INTO players (name, height, position, age, jersey_number, birth_date,
                                      birth_place, image, team_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    name,
                    player.height,
                    player.position.trim(),
                    player.age,
                    player.jersey_number,
                    player.birth_date,
                    player.birth_place.trim(),
                    player.image,
                    player.team_id
                ],
            )
            .context("insert player")?;
        let id = self.conn.last_insert_rowid();
        info!("added player {id} {name:?}");
        self.find_player(id)?
            .ok_or_else(|| anyhow!("player {id} vanished after insert"))
    }

    pub fn delete_player(&self, id: PlayerId) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM players WHERE id = ?1", params![id])
            .context("delete player")?;
        if n > 0 {
            info!("deleted player {id}");
        }
        Ok(n > 0)
    }

    pub fn find_player(&self, id: PlayerId) -> Result<Option<Player>> {
        self.conn
            .query_row(
                &format!("SELECT {PLAYER_COLUMNS} FROM players WHERE id = ?1"),
                params![id],
                player_from_row,
            )
            .optional()
            .context("query player by id")
    }

    /// All players in id order.
    pub fn list_players(&self) -> Result<Vec<Player>> {
        self.query_players(
            &format!("SELECT {PLAYER_COLUMNS} FROM players ORDER BY id ASC"),
            params![],
        )
    }

    /// Players whose name starts with `prefix`, ignoring ASCII case.
    pub fn search_players(&self, prefix: &str) -> Result<Vec<Player>> {
        let pattern = format!("{}%", escape_like(prefix.trim()));
        self.query_players(
            &format!(
                "SELECT {PLAYER_COLUMNS} FROM players
                 WHERE name LIKE ?1 ESCAPE '\\'
                 ORDER BY name ASC, id ASC"
            ),
            params![pattern],
        )
    }

    pub fn players_of_team(&self, team_id: TeamId) -> Result<Vec<Player>> {
        self.query_players(
            &format!(
                "SELECT {PLAYER_COLUMNS} FROM players
                 WHERE team_id = ?1
                 ORDER BY jersey_number ASC, id ASC"
            ),
            params![team_id],
        )
    }

    fn query_players(&self, sql: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<Player>> {
        let mut stmt = self.conn.prepare(sql).context("prepare players query")?;
        let rows = stmt
            .query_map(args, player_from_row)
            .context("query players")?;
        collect_rows(rows, "decode player row")
    }

    // Games

    pub fn schedule_game(
        &self,
        first_team_id: TeamId,
        second_team_id: TeamId,
        match_date: NaiveDate,
    ) -> Result<ScheduledGame> {
        if first_team_id == second_team_id {
            bail!("a team cannot be scheduled against itself");
        }
        for id in [first_team_id, second_team_id] {
            if self.find_team_by_id(id)?.is_none() {
                bail!("team {id} does not exist");
            }
        }
        self.conn
            .execute(
                "INSERT INTO games (first_team_id, second_team_id, match_date) VALUES (?1, ?2, ?3)",
                params![first_team_id, second_team_id, match_date],
            )
            .context("insert game")?;
        let id = self.conn.last_insert_rowid();
        info!("scheduled game {id}: {first_team_id} vs {second_team_id} on {match_date}");
        Ok(ScheduledGame {
            id,
            first_team_id,
            second_team_id,
            match_date,
        })
    }

    pub fn delete_game(&self, id: GameId) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM games WHERE id = ?1", params![id])
            .context("delete game")?;
        Ok(n > 0)
    }

    /// All games in insertion order.
    pub fn list_games(&self) -> Result<Vec<ScheduledGame>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {GAME_COLUMNS} FROM games ORDER BY id ASC"))
            .context("prepare list games")?;
        let rows = stmt.query_map([], game_from_row).context("query games")?;
        collect_rows(rows, "decode game row")
    }

    pub fn games_on(&self, date: NaiveDate) -> Result<Vec<ScheduledGame>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {GAME_COLUMNS} FROM games WHERE match_date = ?1 ORDER BY id ASC"
            ))
            .context("prepare games on date")?;
        let rows = stmt
            .query_map(params![date], game_from_row)
            .context("query games on date")?;
        collect_rows(rows, "decode game row")
    }

    // Users

    pub fn add_user(&self, user: &NewUser) -> Result<User> {
        let email = normalize_email(&user.email);
        if self.find_user_by_email(&email)?.is_some() {
            bail!("email {email} is already registered");
        }
        let created_at = Utc::now();
        self.conn
            .execute(
                "INSERT INTO users (name, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![user.name.trim(), email, user.password_hash, created_at],
            )
            .context("insert user")?;
        let id = self.conn.last_insert_rowid();
        info!("registered user {id} {email}");
        self.find_user(id)?
            .ok_or_else(|| anyhow!("user {id} vanished after insert"))
    }

    pub fn find_user(&self, id: UserId) -> Result<Option<User>> {
        self.conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                user_from_row,
            )
            .optional()
            .context("query user by id")
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                params![normalize_email(email)],
                user_from_row,
            )
            .optional()
            .context("query user by email")
    }

    pub fn delete_user(&self, id: UserId) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM users WHERE id = ?1", params![id])
            .context("delete user")?;
        if n > 0 {
            info!("deleted user {id}");
        }
        Ok(n > 0)
    }

    // Likes

    /// Like the player if the user has not yet, otherwise unlike.
    ///
    /// Runs as one immediate transaction so concurrent toggles from the same user serialize.
    pub fn toggle_like(&mut self, user_id: UserId, player_id: PlayerId) -> Result<LikeChange> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .context("begin like transaction")?;
        let user_exists = tx
            .query_row("SELECT 1 FROM users WHERE id = ?1", params![user_id], |_| Ok(()))
            .optional()
            .context("check user")?
            .is_some();
        if !user_exists {
            bail!("user {user_id} does not exist");
        }
        let player_exists = tx
            .query_row("SELECT 1 FROM players WHERE id = ?1", params![player_id], |_| Ok(()))
            .optional()
            .context("check player")?
            .is_some();
        if !player_exists {
            bail!("player {player_id} does not exist");
        }

        let removed = tx
            .execute(
                "DELETE FROM likes WHERE user_id = ?1 AND player_id = ?2",
                params![user_id, player_id],
            )
            .context("remove like")?;
        let change = if removed > 0 {
            LikeChange::Unliked
        } else {
            tx.execute(
                "INSERT INTO likes (user_id, player_id) VALUES (?1, ?2)",
                params![user_id, player_id],
            )
            .context("insert like")?;
            LikeChange::Liked
        };
        tx.commit().context("commit like transaction")?;
        debug!("user {user_id} {change:?} player {player_id}");
        Ok(change)
    }

    pub fn liker_count_of(&self, player_id: PlayerId) -> Result<u32> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM likes WHERE player_id = ?1",
                params![player_id],
                |row| row.get::<_, u32>(0),
            )
            .context("count likers")
    }

    pub fn liked_player_ids(&self, user_id: UserId) -> Result<Vec<PlayerId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT player_id FROM likes WHERE user_id = ?1 ORDER BY player_id ASC")
            .context("prepare liked players")?;
        let rows = stmt
            .query_map(params![user_id], |row| row.get::<_, PlayerId>(0))
            .context("query liked players")?;
        collect_rows(rows, "decode like row")
    }

    /// Like count for every player, zero included, in player id order.
    pub fn like_counts(&self) -> Result<Vec<(PlayerId, u32)>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT p.id, COUNT(l.user_id)
                 FROM players p LEFT JOIN likes l ON l.player_id = p.id
                 GROUP BY p.id
                 ORDER BY p.id ASC",
            )
            .context("prepare like counts")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, PlayerId>(0)?, row.get::<_, u32>(1)?)))
            .context("query like counts")?;
        collect_rows(rows, "decode like count row")
    }
}

impl LeagueSource for LeagueDb {
    fn list_all_games(&self) -> Result<Vec<ScheduledGame>> {
        self.list_games()
    }

    fn list_all_players(&self) -> Result<Vec<Player>> {
        self.list_players()
    }

    fn find_team_by_id(&self, id: TeamId) -> Result<Option<Team>> {
        LeagueDb::find_team_by_id(self, id)
    }

    fn liker_count_of(&self, player_id: PlayerId) -> Result<u32> {
        LeagueDb::liker_count_of(self, player_id)
    }
}

fn team_from_row(row: &Row<'_>) -> rusqlite::Result<Team> {
    let code: String = row.get(5)?;
    let division = code.parse::<Division>().map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, err.into())
    })?;
    Ok(Team {
        id: row.get(0)?,
        name: row.get(1)?,
        founded: row.get(2)?,
        stadium: row.get(3)?,
        chairman: row.get(4)?,
        division,
        image: row.get(6)?,
    })
}

fn player_from_row(row: &Row<'_>) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        name: row.get(1)?,
        height: row.get(2)?,
        position: row.get(3)?,
        age: row.get(4)?,
        jersey_number: row.get(5)?,
        birth_date: row.get(6)?,
        birth_place: row.get(7)?,
        image: row.get(8)?,
        team_id: row.get(9)?,
    })
}

fn game_from_row(row: &Row<'_>) -> rusqlite::Result<ScheduledGame> {
    Ok(ScheduledGame {
        id: row.get(0)?,
        first_team_id: row.get(1)?,
        second_team_id: row.get(2)?,
        match_date: row.get(3)?,
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn collect_rows<T>(
    rows: impl Iterator<Item = rusqlite::Result<T>>,
    what: &'static str,
) -> Result<Vec<T>> {
    let mut out = Vec::new();
    for row in rows {
        out.push(row.context(what)?);
    }
    Ok(out)
}

fn normalize_email(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
