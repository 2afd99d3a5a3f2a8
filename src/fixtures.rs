use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use thiserror::Error;

use crate::models::{GameId, ScheduledGame, Team, TeamId};

/// A scheduled game references a team that is not in the team collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("game {game_id} references missing team {team_id}")]
pub struct MissingTeamError {
    pub game_id: GameId,
    pub team_id: TeamId,
}

/// One game with both team references resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fixture {
    pub game_id: GameId,
    pub match_date: NaiveDate,
    pub first: Team,
    pub second: Team,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FixtureBuckets {
    pub today: Vec<Fixture>,
    pub tomorrow: Vec<Fixture>,
}

/// Exact-match team lookup by id.
#[derive(Debug, Clone, Default)]
pub struct TeamIndex {
    by_id: HashMap<TeamId, Team>,
}

impl TeamIndex {
    pub fn new(teams: impl IntoIterator<Item = Team>) -> Self {
        Self {
            by_id: teams.into_iter().map(|t| (t.id, t)).collect(),
        }
    }

    pub fn get(&self, id: TeamId) -> Option<&Team> {
        self.by_id.get(&id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn resolve(&self, game: &ScheduledGame) -> Result<Fixture, MissingTeamError> {
        let lookup = |team_id: TeamId| {
            self.get(team_id).cloned().ok_or(MissingTeamError {
                game_id: game.id,
                team_id,
            })
        };
        Ok(Fixture {
            game_id: game.id,
            match_date: game.match_date,
            first: lookup(game.first_team_id)?,
            second: lookup(game.second_team_id)?,
        })
    }
}

/// Split games into the ones played on `reference_date` and on the day after.
///
/// Input order is kept and nothing is deduplicated. Games on any other date are ignored, even
/// when their team references dangle.
pub fn bucketize(
    games: &[ScheduledGame],
    teams: &TeamIndex,
    reference_date: NaiveDate,
) -> Result<FixtureBuckets, MissingTeamError> {
    let tomorrow = next_day(reference_date);
    let mut out = FixtureBuckets::default();
    for game in games {
        if game.match_date == reference_date {
            out.today.push(teams.resolve(game)?);
        } else if Some(game.match_date) == tomorrow {
            out.tomorrow.push(teams.resolve(game)?);
        }
    }
    Ok(out)
}

/// Every game strictly after `after`, ascending by date.
///
/// Games sharing a date keep their input order.
pub fn schedule_filter(
    games: &[ScheduledGame],
    teams: &TeamIndex,
    after: NaiveDate,
) -> Result<Vec<Fixture>, MissingTeamError> {
    let mut upcoming: Vec<&ScheduledGame> =
        games.iter().filter(|g| g.match_date > after).collect();
    upcoming.sort_by_key(|g| g.match_date);
    upcoming.into_iter().map(|g| teams.resolve(g)).collect()
}

fn next_day(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_day_saturates_at_max_date() {
        assert_eq!(next_day(NaiveDate::MAX), None);
        let d = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
        assert_eq!(next_day(d), NaiveDate::from_ymd_opt(2024, 2, 29));
    }
}
