use std::collections::{BTreeSet, HashMap};

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use log::debug;
use serde::Serialize;

use crate::fixtures::{Fixture, TeamIndex, bucketize, schedule_filter};
use crate::models::{Division, Player, PlayerId, ScheduledGame, Team, TeamId};
use crate::top_liked::{LikedPlayer, top_liked};

/// Read access the home and schedule pages need from the data store.
pub trait LeagueSource {
    fn list_all_games(&self) -> Result<Vec<ScheduledGame>>;
    fn list_all_players(&self) -> Result<Vec<Player>>;
    fn find_team_by_id(&self, id: TeamId) -> Result<Option<Team>>;
    fn liker_count_of(&self, player_id: PlayerId) -> Result<u32>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomePayload {
    pub reference_date: NaiveDate,
    pub today_fixtures: Vec<Fixture>,
    pub tomorrow_fixtures: Vec<Fixture>,
    pub top_players: Vec<LikedPlayer>,
}

/// Build the home page from a fresh read of games and players.
pub fn compose_home<S: LeagueSource + ?Sized>(
    source: &S,
    reference_date: NaiveDate,
    k: usize,
) -> Result<HomePayload> {
    let games = source.list_all_games().context("load games")?;
    let tomorrow = reference_date.checked_add_days(Days::new(1));
    let teams = index_referenced_teams(
        source,
        games
            .iter()
            .filter(|g| g.match_date == reference_date || Some(g.match_date) == tomorrow),
    )?;
    let buckets = bucketize(&games, &teams, reference_date)?;

    let players = source.list_all_players().context("load players")?;
    let mut counts: HashMap<PlayerId, u32> = HashMap::with_capacity(players.len());
    for p in &players {
        let likes = source
            .liker_count_of(p.id)
            .with_context(|| format!("count likes for player {}", p.id))?;
        counts.insert(p.id, likes);
    }
    let top_players = top_liked(&players, |p| counts.get(&p.id).copied().unwrap_or(0), k);

    debug!(
        "home {reference_date}: {} today, {} tomorrow ({} teams), {} top players of {}",
        buckets.today.len(),
        buckets.tomorrow.len(),
        teams.len(),
        top_players.len(),
        players.len()
    );

    Ok(HomePayload {
        reference_date,
        today_fixtures: buckets.today,
        tomorrow_fixtures: buckets.tomorrow,
        top_players,
    })
}

/// Fixtures after `today`, ascending by date, optionally restricted to one division.
///
/// A fixture belongs to a division when either of its teams does.
pub fn compose_schedule<S: LeagueSource + ?Sized>(
    source: &S,
    today: NaiveDate,
    division: Option<Division>,
) -> Result<Vec<Fixture>> {
    let games = source.list_all_games().context("load games")?;
    let teams = index_referenced_teams(source, games.iter().filter(|g| g.match_date > today))?;
    let mut fixtures = schedule_filter(&games, &teams, today)?;
    if let Some(division) = division {
        fixtures.retain(|f| f.first.division == division || f.second.division == division);
    }
    debug!(
        "schedule after {today} ({}): {} fixtures",
        crate::models::division_label(division),
        fixtures.len()
    );
    Ok(fixtures)
}

/// Look up each team id the games mention once. Ids with no team are left out of the index.
fn index_referenced_teams<'a, S: LeagueSource + ?Sized>(
    source: &S,
    games: impl Iterator<Item = &'a ScheduledGame>,
) -> Result<TeamIndex> {
    let ids: BTreeSet<TeamId> = games
        .flat_map(|g| [g.first_team_id, g.second_team_id])
        .collect();
    let mut teams = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(team) = source
            .find_team_by_id(id)
            .with_context(|| format!("find team {id}"))?
        {
            teams.push(team);
        }
    }
    Ok(TeamIndex::new(teams))
}
