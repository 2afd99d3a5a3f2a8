use chrono::NaiveDate;

use vleague::models::{Division, NewPlayer, NewTeam, Player, Team};
use vleague::state::{AppState, PlayerRow, Screen};
use vleague::store::LeagueDb;

fn state() -> AppState {
    AppState::new(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
}

fn team(id: i64, name: &str, division: Division) -> Team {
    Team {
        id,
        name: name.to_string(),
        founded: 2000,
        stadium: "Hall".to_string(),
        chairman: "Chair".to_string(),
        division,
        image: None,
    }
}

fn row(id: i64, name: &str, likes: u32) -> PlayerRow {
    PlayerRow {
        player: Player {
            id,
            name: name.to_string(),
            height: 180,
            position: "Setter".to_string(),
            age: 30,
            jersey_number: 1,
            birth_date: NaiveDate::from_ymd_opt(1994, 1, 1).unwrap(),
            birth_place: "Izmir".to_string(),
            image: None,
            team_id: None,
        },
        team_name: None,
        likes,
        liked_by_me: false,
    }
}

#[test]
fn division_filter_cycles_and_resets_selection() {
    let mut state = state();
    state.set_screen(Screen::Teams);
    state.teams = vec![
        team(1, "Arkas", Division::Men),
        team(2, "VakifBank", Division::Women),
        team(3, "Halkbank", Division::Men),
    ];
    state.selected = 2;
    assert_eq!(state.visible_teams().len(), 3);

    state.cycle_division();
    assert_eq!(state.selected, 0);
    assert_eq!(state.visible_teams().len(), 2);
    state.cycle_division();
    assert_eq!(state.selected_team().map(|t| t.id), Some(2));
    state.cycle_division();
    assert_eq!(state.division, None);
}

#[test]
fn selection_wraps_both_ways() {
    let mut state = state();
    state.set_screen(Screen::Players);
    state.players = vec![row(1, "Ece", 0), row(2, "Zehra", 3)];
    state.select_prev();
    assert_eq!(state.selected, 1);
    state.select_next();
    assert_eq!(state.selected, 0);
}

#[test]
fn search_narrows_players_case_insensitively() {
    let mut state = state();
    state.set_screen(Screen::Players);
    state.players = vec![row(1, "Ebrar", 1), row(2, "Ece", 2), row(3, "Zehra", 0)];
    for ch in "EB".chars() {
        state.push_search_char(ch);
    }
    let names: Vec<&str> = state
        .visible_players()
        .iter()
        .map(|r| r.player.name.as_str())
        .collect();
    assert_eq!(names, vec!["Ebrar"]);
    state.pop_search_char();
    assert_eq!(state.visible_players().len(), 2);
}

#[test]
fn clamp_keeps_selection_in_range_after_reload() {
    let mut state = state();
    state.set_screen(Screen::Players);
    state.players = vec![row(1, "A", 0), row(2, "B", 0), row(3, "C", 0)];
    state.selected = 2;
    state.players.truncate(1);
    state.clamp_selection();
    assert_eq!(state.selected, 0);
}

fn new_team(name: &str) -> NewTeam {
    NewTeam {
        name: name.to_string(),
        founded: 1980,
        stadium: "Hall".to_string(),
        chairman: "Chair".to_string(),
        division: Division::Women,
        image: None,
    }
}

#[test]
fn dangling_future_game_keeps_teams_and_players_loaded() {
    let db = LeagueDb::open_in_memory().unwrap();
    let a = db.add_team(&new_team("Arkas")).unwrap();
    let b = db.add_team(&new_team("Bursa")).unwrap();
    db.add_player(&NewPlayer {
        name: "Ece".to_string(),
        height: 182,
        position: "Setter".to_string(),
        age: 24,
        jersey_number: 7,
        birth_date: NaiveDate::from_ymd_opt(2000, 3, 3).unwrap(),
        birth_place: "Izmir".to_string(),
        image: None,
        team_id: Some(a.id),
    })
    .unwrap();
    db.schedule_game(a.id, b.id, NaiveDate::from_ymd_opt(2030, 1, 1).unwrap())
        .unwrap();
    assert!(db.delete_team(b.id).unwrap());

    let mut state = state();
    state.reload(&db, 3);

    assert!(state.home.is_some());
    assert!(state.schedule.is_empty());
    let err = state.last_error.clone().unwrap_or_default();
    assert!(err.contains("references missing team"), "{err}");
    assert_eq!(state.teams.len(), 1);
    assert_eq!(state.players.len(), 1);
    assert_eq!(state.players[0].team_name.as_deref(), Some("Arkas"));
    assert_eq!(state.roster.len(), 1);
}

#[test]
fn clean_reload_clears_previous_error() {
    let db = LeagueDb::open_in_memory().unwrap();
    db.add_team(&new_team("Arkas")).unwrap();
    let mut state = state();
    state.last_error = Some("stale".to_string());
    state.reload(&db, 3);
    assert_eq!(state.last_error, None);
    assert_eq!(state.teams.len(), 1);
}
