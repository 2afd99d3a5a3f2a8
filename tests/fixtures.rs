use chrono::NaiveDate;

use vleague::fixtures::{MissingTeamError, TeamIndex, bucketize, schedule_filter};
use vleague::models::{Division, ScheduledGame, Team};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn team(id: i64, name: &str) -> Team {
    Team {
        id,
        name: name.to_string(),
        founded: 1990,
        stadium: format!("{name} Arena"),
        chairman: "Chair".to_string(),
        division: Division::Women,
        image: None,
    }
}

fn game(id: i64, first: i64, second: i64, match_date: NaiveDate) -> ScheduledGame {
    ScheduledGame {
        id,
        first_team_id: first,
        second_team_id: second,
        match_date,
    }
}

fn league() -> TeamIndex {
    TeamIndex::new(vec![
        team(1, "VakifBank"),
        team(2, "Eczacibasi"),
        team(3, "Galatasaray"),
        team(4, "Fenerbahce"),
    ])
}

fn pair_ids(f: &vleague::fixtures::Fixture) -> (i64, i64) {
    (f.first.id, f.second.id)
}

#[test]
fn games_land_only_in_their_own_bucket() {
    let today = date(2024, 3, 10);
    let games = vec![
        game(1, 1, 2, date(2024, 3, 9)),
        game(2, 1, 3, today),
        game(3, 2, 4, date(2024, 3, 11)),
        game(4, 3, 4, date(2024, 3, 12)),
    ];
    let buckets = bucketize(&games, &league(), today).unwrap();
    assert_eq!(buckets.today.len(), 1);
    assert_eq!(buckets.today[0].game_id, 2);
    assert_eq!(pair_ids(&buckets.today[0]), (1, 3));
    assert_eq!(buckets.tomorrow.len(), 1);
    assert_eq!(buckets.tomorrow[0].game_id, 3);
    assert_eq!(buckets.tomorrow[0].first.name, "Eczacibasi");
    assert_eq!(buckets.tomorrow[0].second.name, "Fenerbahce");
}

#[test]
fn input_order_is_kept_and_duplicates_survive() {
    let today = date(2024, 3, 10);
    let games = vec![
        game(1, 3, 4, today),
        game(2, 1, 2, today),
        game(3, 3, 4, today),
    ];
    let buckets = bucketize(&games, &league(), today).unwrap();
    let ids: Vec<i64> = buckets.today.iter().map(|f| f.game_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(pair_ids(&buckets.today[0]), pair_ids(&buckets.today[2]));
    assert!(buckets.tomorrow.is_empty());
}

#[test]
fn empty_inputs_give_empty_buckets() {
    let teams = TeamIndex::default();
    assert!(teams.is_empty());
    assert_eq!(league().len(), 4);
    let buckets = bucketize(&[], &teams, date(2024, 1, 1)).unwrap();
    assert!(buckets.today.is_empty());
    assert!(buckets.tomorrow.is_empty());
}

#[test]
fn dangling_team_in_a_bucket_is_an_error() {
    let today = date(2024, 3, 10);
    let games = vec![game(1, 1, 2, today), game(7, 2, 99, date(2024, 3, 11))];
    let err = bucketize(&games, &league(), today).unwrap_err();
    assert_eq!(
        err,
        MissingTeamError {
            game_id: 7,
            team_id: 99
        }
    );
}

#[test]
fn dangling_team_outside_the_window_is_ignored() {
    let today = date(2024, 3, 10);
    let games = vec![game(1, 1, 2, today), game(2, 1, 99, date(2024, 5, 1))];
    let buckets = bucketize(&games, &league(), today).unwrap();
    assert_eq!(buckets.today.len(), 1);
}

#[test]
fn month_end_rolls_over_for_tomorrow() {
    let today = date(2024, 2, 29);
    let games = vec![game(1, 1, 2, date(2024, 3, 1))];
    let buckets = bucketize(&games, &league(), today).unwrap();
    assert_eq!(buckets.tomorrow.len(), 1);
}

#[test]
fn schedule_is_ascending_and_strictly_after() {
    let today = date(2024, 3, 10);
    let games = vec![
        game(1, 1, 2, date(2024, 3, 20)),
        game(2, 3, 4, today),
        game(3, 1, 3, date(2024, 3, 12)),
        game(4, 2, 4, date(2024, 3, 1)),
        game(5, 2, 3, date(2024, 3, 11)),
        game(6, 1, 4, date(2024, 3, 12)),
    ];
    let fixtures = schedule_filter(&games, &league(), today).unwrap();
    let ids: Vec<i64> = fixtures.iter().map(|f| f.game_id).collect();
    assert_eq!(ids, vec![5, 3, 6, 1]);
    assert!(fixtures.windows(2).all(|w| w[0].match_date <= w[1].match_date));
}

#[test]
fn schedule_reports_dangling_team() {
    let today = date(2024, 3, 10);
    let games = vec![game(9, 42, 1, date(2024, 3, 15))];
    let err = schedule_filter(&games, &league(), today).unwrap_err();
    assert_eq!(err.team_id, 42);
    assert_eq!(err.to_string(), "game 9 references missing team 42");
}
