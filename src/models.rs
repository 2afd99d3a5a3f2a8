use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub type TeamId = i64;
pub type PlayerId = i64;
pub type GameId = i64;
pub type UserId = i64;

/// League subgroup a team plays in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Division {
    #[serde(rename = "M")]
    Men,
    #[serde(rename = "W")]
    Women,
}

impl Division {
    pub fn code(self) -> &'static str {
        match self {
            Division::Men => "M",
            Division::Women => "W",
        }
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Division {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "M" | "MEN" => Ok(Division::Men),
            "W" | "WOMEN" => Ok(Division::Women),
            other => Err(anyhow!("unknown division {other:?} (expected M or W)")),
        }
    }
}

pub fn division_label(division: Option<Division>) -> &'static str {
    match division {
        None => "All",
        Some(Division::Men) => "Men",
        Some(Division::Women) => "Women",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub founded: i32,
    pub stadium: String,
    pub chairman: String,
    pub division: Division,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Centimetres.
    pub height: u16,
    pub position: String,
    pub age: u8,
    pub jersey_number: u8,
    pub birth_date: NaiveDate,
    pub birth_place: String,
    pub image: Option<String>,
    pub team_id: Option<TeamId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledGame {
    pub id: GameId,
    pub first_team_id: TeamId,
    pub second_team_id: TeamId,
    pub match_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTeam {
    pub name: String,
    pub founded: i32,
    pub stadium: String,
    pub chairman: String,
    pub division: Division,
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewPlayer {
    pub name: String,
    pub height: u16,
    pub position: String,
    pub age: u8,
    pub jersey_number: u8,
    pub birth_date: NaiveDate,
    pub birth_place: String,
    pub image: Option<String>,
    pub team_id: Option<TeamId>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Outcome of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeChange {
    Liked,
    Unliked,
}
