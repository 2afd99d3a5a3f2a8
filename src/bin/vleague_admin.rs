use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;

use vleague::auth::{NewAccount, log_in, sign_up};
use vleague::config::{AppConfig, load_dotenv};
use vleague::demo_data::{DEMO_PASSWORD, seed_demo};
use vleague::fixtures::Fixture;
use vleague::home::{compose_home, compose_schedule};
use vleague::logging;
use vleague::models::{Division, LikeChange, NewPlayer, NewTeam};
use vleague::session::{Session, clear_session, load_session, save_session};
use vleague::store::LeagueDb;

const USAGE: &str = "usage: vleague_admin [--db PATH] <command> [options]

commands:
  init                                   create the database schema
  seed                                   fill an empty database with a demo league
  home [--date YYYY-MM-DD]               today/tomorrow fixtures and most liked players
  schedule-list [--division M|W]         fixtures after today
  teams [--division M|W]                 list teams
  players [--prefix TEXT]                list players, optionally by name prefix
  add-team --name N --founded Y --stadium S --chairman C --division M|W [--image URL]
  add-player --name N --height CM --position P --age A --number J --birth-date D
             --birth-place P [--team ID] [--image URL]
  schedule --first ID --second ID --date YYYY-MM-DD
  sign-up --name N --email E --password P --confirm P
  login --email E --password P
  logout
  whoami
  like --player ID                       like or unlike as the logged-in user
  delete-team ID | delete-player ID | delete-game ID | delete-user ID";

fn main() -> Result<()> {
    load_dotenv();
    let mut config = AppConfig::from_env();
    logging::init_stderr(config.log_level)?;

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if let Some(path) = flag_value(&args, "--db") {
        config.db_path = PathBuf::from(path);
    }
    let Some(command) = command_word(&args) else {
        println!("{USAGE}");
        return Ok(());
    };

    let mut db = LeagueDb::open(&config.db_path).context("open league database")?;
    match command {
        "init" => println!("DB: {}", config.db_path.display()),
        "seed" => {
            let summary = seed_demo(&mut db, config.today())?;
            println!("Seeded demo league");
            println!("Teams: {}", summary.teams);
            println!("Players: {}", summary.players);
            println!("Games: {}", summary.games);
            println!("Users: {} (password {DEMO_PASSWORD})", summary.users);
            println!("Likes: {}", summary.likes);
        }
        "home" => {
            let date = match flag_value(&args, "--date") {
                Some(raw) => parse_date(raw)?,
                None => config.today(),
            };
            let home = compose_home(&db, date, config.top_k)?;
            println!("Today ({}):", home.reference_date);
            print_fixtures(&home.today_fixtures);
            println!("Tomorrow:");
            print_fixtures(&home.tomorrow_fixtures);
            println!("Most liked:");
            if home.top_players.is_empty() {
                println!("  none");
            }
            for entry in &home.top_players {
                println!(
                    "  {:>3}  {} (#{})",
                    entry.likes, entry.player.name, entry.player.jersey_number
                );
            }
        }
        "schedule-list" => {
            let division = optional_division(&args)?;
            let fixtures = compose_schedule(&db, config.today(), division)?;
            print_fixtures(&fixtures);
        }
        "teams" => {
            let teams = match optional_division(&args)? {
                Some(division) => db.teams_by_division(division)?,
                None => db.list_teams()?,
            };
            for t in teams {
                println!(
                    "{:>4}  [{}] {} ({}), {}",
                    t.id, t.division, t.name, t.founded, t.stadium
                );
            }
        }
        "players" => {
            let players = match flag_value(&args, "--prefix") {
                Some(prefix) => db.search_players(prefix)?,
                None => db.list_players()?,
            };
            for p in players {
                let likes = db.liker_count_of(p.id)?;
                println!(
                    "{:>4}  {} #{} {} ({} likes)",
                    p.id, p.name, p.jersey_number, p.position, likes
                );
            }
        }
        "add-team" => {
            let team = db.add_team(&NewTeam {
                name: required(&args, "--name")?.to_string(),
                founded: parse_num(&args, "--founded")?,
                stadium: required(&args, "--stadium")?.to_string(),
                chairman: required(&args, "--chairman")?.to_string(),
                division: required(&args, "--division")?.parse()?,
                image: flag_value(&args, "--image").map(str::to_string),
            })?;
            println!("Added team {} ({})", team.name, team.id);
        }
        "add-player" => {
            let team_id = match flag_value(&args, "--team") {
                Some(raw) => Some(raw.parse().context("--team must be a team id")?),
                None => None,
            };
            let player = db.add_player(&NewPlayer {
                name: required(&args, "--name")?.to_string(),
                height: parse_num(&args, "--height")?,
                position: required(&args, "--position")?.to_string(),
                age: parse_num(&args, "--age")?,
                jersey_number: parse_num(&args, "--number")?,
                birth_date: parse_date(required(&args, "--birth-date")?)?,
                birth_place: required(&args, "--birth-place")?.to_string(),
                image: flag_value(&args, "--image").map(str::to_string),
                team_id,
            })?;
            println!("Added player {} ({})", player.name, player.id);
        }
        "schedule" => {
            let game = db.schedule_game(
                parse_num(&args, "--first")?,
                parse_num(&args, "--second")?,
                parse_date(required(&args, "--date")?)?,
            )?;
            println!("Scheduled game {} on {}", game.id, game.match_date);
        }
        "sign-up" => {
            let user = sign_up(
                &db,
                &NewAccount {
                    name: required(&args, "--name")?.to_string(),
                    email: required(&args, "--email")?.to_string(),
                    password: required(&args, "--password")?.to_string(),
                    confirm: required(&args, "--confirm")?.to_string(),
                },
            )?;
            println!("Registered {} ({})", user.email, user.id);
        }
        "login" => {
            let path = session_path(&config)?;
            let user = log_in(
                &db,
                required(&args, "--email")?,
                required(&args, "--password")?,
            )?;
            save_session(&path, &Session::for_user(&user))?;
            println!("Logged in as {}", user.email);
        }
        "logout" => {
            clear_session(&session_path(&config)?)?;
            println!("Logged out");
        }
        "whoami" => match load_session(&session_path(&config)?) {
            Some(session) => println!("{} (user {})", session.email, session.user_id),
            None => println!("not logged in"),
        },
        "like" => {
            let session = load_session(&session_path(&config)?)
                .ok_or_else(|| anyhow!("log in first"))?;
            let player_id = parse_num(&args, "--player")?;
            match db.toggle_like(session.user_id, player_id)? {
                LikeChange::Liked => println!("Liked player {player_id}"),
                LikeChange::Unliked => println!("Unliked player {player_id}"),
            }
        }
        "delete-team" => report_delete("team", db.delete_team(positional_id(&args)?)?),
        "delete-player" => report_delete("player", db.delete_player(positional_id(&args)?)?),
        "delete-game" => report_delete("game", db.delete_game(positional_id(&args)?)?),
        "delete-user" => report_delete("user", db.delete_user(positional_id(&args)?)?),
        other => {
            println!("{USAGE}");
            bail!("unknown command {other:?}");
        }
    }
    Ok(())
}

fn print_fixtures(fixtures: &[Fixture]) {
    if fixtures.is_empty() {
        println!("  none");
    }
    for f in fixtures {
        println!(
            "  {}  [{}] {} - {}  (game {})",
            f.match_date, f.first.division, f.first.name, f.second.name, f.game_id
        );
    }
}

fn report_delete(what: &str, deleted: bool) {
    if deleted {
        println!("Deleted {what}");
    } else {
        println!("No such {what}");
    }
}

fn session_path(config: &AppConfig) -> Result<PathBuf> {
    config
        .session_path
        .clone()
        .ok_or_else(|| anyhow!("no session path; set VLEAGUE_SESSION"))
}

/// Arguments that are neither flags nor a flag's value, in order.
fn positionals(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg.starts_with("--") {
            skip_next = !arg.contains('=');
            continue;
        }
        out.push(arg.as_str());
    }
    out
}

fn command_word(args: &[String]) -> Option<&str> {
    positionals(args).first().copied()
}

fn positional_id(args: &[String]) -> Result<i64> {
    positionals(args)
        .get(1)
        .ok_or_else(|| anyhow!("missing id"))?
        .parse::<i64>()
        .context("id must be a number")
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg
            .strip_prefix(flag)
            .and_then(|rest| rest.strip_prefix('='))
        {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed);
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.as_str());
        }
    }
    None
}

fn required<'a>(args: &'a [String], flag: &str) -> Result<&'a str> {
    flag_value(args, flag).ok_or_else(|| anyhow!("missing {flag}"))
}

fn parse_num<T: std::str::FromStr>(args: &[String], flag: &str) -> Result<T> {
    required(args, flag)?
        .trim()
        .parse::<T>()
        .map_err(|_| anyhow!("{flag} must be a number"))
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date {raw:?}, expected YYYY-MM-DD"))
}

fn optional_division(args: &[String]) -> Result<Option<Division>> {
    flag_value(args, "--division")
        .map(|raw| raw.parse::<Division>())
        .transpose()
}
