use anyhow::{Context, Result, bail};
use chrono::{Days, NaiveDate};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::auth::hash_password;
use crate::models::{Division, NewPlayer, NewTeam, NewUser, Team};
use crate::store::LeagueDb;

pub const DEMO_PASSWORD: &str = "volley123";

const DEMO_SEED: u64 = 0x5eed_ba11;

const TEAMS: &[(&str, i32, &str, &str, Division)] = &[
    ("Arkas Spor", 1978, "Atatürk Volleyball Hall", "Lucien Arkas", Division::Men),
    ("Halkbank", 1983, "Ankara Sports Hall", "Osman Arslan", Division::Men),
    ("Fenerbahçe", 1927, "Burhan Felek Hall", "Ali Koç", Division::Men),
    ("Ziraat Bankası", 1981, "Başkent Volleyball Hall", "Hüseyin Aydın", Division::Men),
    ("VakıfBank", 1986, "VakıfBank Sports Hall", "Adnan Bali", Division::Women),
    ("Eczacıbaşı", 1966, "Eczacıbaşı Sports Hall", "Faruk Eczacıbaşı", Division::Women),
    ("Galatasaray", 1922, "Burhan Felek Hall", "Dursun Özbek", Division::Women),
    ("THY", 2011, "Burhan Felek Hall", "Ahmet Bolat", Division::Women),
];

const POSITIONS: &[&str] = &["Setter", "Outside Hitter", "Opposite", "Middle Blocker", "Libero"];
const FIRST_NAMES: &[&str] = &[
    "Ece", "Zehra", "Meliha", "Ebrar", "Hande", "Gizem", "Cansu", "Simge", "Arda", "Burak",
    "Emre", "Mert", "Kaan", "Deniz", "Umut", "Efe",
];
const PLACES: &[&str] = &["Istanbul", "Ankara", "Izmir", "Bursa", "Antalya", "Eskişehir"];

#[derive(Debug, Clone, Default)]
pub struct SeedSummary {
    pub teams: usize,
    pub players: usize,
    pub games: usize,
    pub users: usize,
    pub likes: usize,
}

/// Fill an empty database with a small league centred on `today`.
pub fn seed_demo(db: &mut LeagueDb, today: NaiveDate) -> Result<SeedSummary> {
    if !db.list_teams()?.is_empty() {
        bail!("database already has teams; seed only works on an empty league");
    }
    let mut rng = StdRng::seed_from_u64(DEMO_SEED);
    let mut summary = SeedSummary::default();

    let mut teams: Vec<Team> = Vec::new();
    for (name, founded, stadium, chairman, division) in TEAMS {
        teams.push(db.add_team(&NewTeam {
            name: name.to_string(),
            founded: *founded,
            stadium: stadium.to_string(),
            chairman: chairman.to_string(),
            division: *division,
            image: None,
        })?);
    }
    summary.teams = teams.len();

    let mut player_ids = Vec::new();
    for (t, team) in teams.iter().enumerate() {
        for slot in 0..POSITIONS.len() {
            let age = rng.gen_range(19..34u8);
            let first = FIRST_NAMES[(t * 5 + slot) % FIRST_NAMES.len()];
            let birth_date = today
                .checked_sub_days(Days::new(u64::from(age) * 365 + rng.gen_range(0..365)))
                .context("demo birth date out of range")?;
            let player = db.add_player(&NewPlayer {
                name: format!("{first} {}", team.name.split_whitespace().next().unwrap_or("")),
                height: rng.gen_range(172..206),
                position: POSITIONS[slot].to_string(),
                age,
                jersey_number: (slot as u8) * 3 + 1 + (t as u8 % 3),
                birth_date,
                birth_place: PLACES[rng.gen_range(0..PLACES.len())].to_string(),
                image: None,
                team_id: Some(team.id),
            })?;
            player_ids.push(player.id);
        }
    }
    summary.players = player_ids.len();

    // Same-division pairings spread over yesterday..+6 days.
    for offset in 0..8u64 {
        let Some(date) = today
            .checked_sub_days(Days::new(1))
            .and_then(|d| d.checked_add_days(Days::new(offset)))
        else {
            continue;
        };
        for half in [0usize, 4] {
            let a = half + (offset as usize) % 4;
            let b = half + (offset as usize + 1 + offset as usize / 4) % 4;
            if a == b {
                continue;
            }
            db.schedule_game(teams[a].id, teams[b].id, date)?;
            summary.games += 1;
        }
    }

    let password_hash = hash_password(DEMO_PASSWORD)?;
    for name in ["ayse", "berk", "ceren", "doruk", "elif", "firat"] {
        let user = db.add_user(&NewUser {
            name: name.to_string(),
            email: format!("{name}@vleague.test"),
            password_hash: password_hash.clone(),
        })?;
        summary.users += 1;
        for player_id in &player_ids {
            if rng.gen_bool(0.15) {
                db.toggle_like(user.id, *player_id)?;
                summary.likes += 1;
            }
        }
    }

    info!(
        "seeded demo league: {} teams, {} players, {} games, {} users, {} likes",
        summary.teams, summary.players, summary.games, summary.users, summary.likes
    );
    Ok(summary)
}
