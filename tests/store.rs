use chrono::NaiveDate;

use vleague::models::{Division, LikeChange, NewPlayer, NewTeam, NewUser, Team};
use vleague::store::LeagueDb;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_team(name: &str, division: Division) -> NewTeam {
    NewTeam {
        name: name.to_string(),
        founded: 1990,
        stadium: "Sports Hall".to_string(),
        chairman: "Chair".to_string(),
        division,
        image: None,
    }
}

fn new_player(name: &str, team: Option<&Team>) -> NewPlayer {
    NewPlayer {
        name: name.to_string(),
        height: 188,
        position: "Libero".to_string(),
        age: 27,
        jersey_number: 4,
        birth_date: date(1997, 4, 12),
        birth_place: "Antalya".to_string(),
        image: Some("https://img.example/p.png".to_string()),
        team_id: team.map(|t| t.id),
    }
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        name: "Fan".to_string(),
        email: email.to_string(),
        password_hash: "hash".to_string(),
    }
}

#[test]
fn team_round_trip_and_unique_names() {
    let db = LeagueDb::open_in_memory().unwrap();
    let team = db.add_team(&new_team("  Arkas  ", Division::Men)).unwrap();
    assert_eq!(team.name, "Arkas");
    assert_eq!(db.find_team_by_id(team.id).unwrap(), Some(team.clone()));
    assert_eq!(db.find_team_by_name("Arkas").unwrap(), Some(team));
    assert!(db.add_team(&new_team("Arkas", Division::Women)).is_err());
    assert!(db.add_team(&new_team("   ", Division::Women)).is_err());
}

#[test]
fn teams_by_division_and_listing() {
    let db = LeagueDb::open_in_memory().unwrap();
    db.add_team(&new_team("Zeta", Division::Women)).unwrap();
    db.add_team(&new_team("Alpha", Division::Men)).unwrap();
    db.add_team(&new_team("Beta", Division::Women)).unwrap();

    let names: Vec<String> = db.list_teams().unwrap().into_iter().map(|t| t.name).collect();
    assert_eq!(names, vec!["Alpha", "Beta", "Zeta"]);
    let women: Vec<String> = db
        .teams_by_division(Division::Women)
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(women, vec!["Beta", "Zeta"]);
}

#[test]
fn players_search_by_prefix_and_team() {
    let db = LeagueDb::open_in_memory().unwrap();
    let team = db.add_team(&new_team("Arkas", Division::Men)).unwrap();
    let p = db.add_player(&new_player("Ebrar Karakurt", Some(&team))).unwrap();
    db.add_player(&new_player("ebru Yilmaz", None)).unwrap();
    db.add_player(&new_player("Zehra Gunes", Some(&team))).unwrap();
    db.add_player(&new_player("Ebrar Karakurt", None)).unwrap();

    assert_eq!(db.find_player(p.id).unwrap(), Some(p.clone()));
    assert_eq!(db.search_players("eb").unwrap().len(), 3);
    assert_eq!(db.search_players("EBRAR").unwrap().len(), 2);
    assert!(db.search_players("%").unwrap().is_empty());
    assert_eq!(db.players_of_team(team.id).unwrap().len(), 2);
    assert_eq!(db.list_players().unwrap().len(), 4);
}

#[test]
fn player_with_unknown_team_is_rejected() {
    let db = LeagueDb::open_in_memory().unwrap();
    let mut p = new_player("Ghost", None);
    p.team_id = Some(404);
    assert!(db.add_player(&p).is_err());
}

#[test]
fn deleting_a_team_detaches_players_and_keeps_games() {
    let db = LeagueDb::open_in_memory().unwrap();
    let a = db.add_team(&new_team("A", Division::Men)).unwrap();
    let b = db.add_team(&new_team("B", Division::Men)).unwrap();
    let p = db.add_player(&new_player("Kaan", Some(&a))).unwrap();
    db.schedule_game(a.id, b.id, date(2024, 9, 1)).unwrap();

    assert!(db.delete_team(a.id).unwrap());
    assert!(!db.delete_team(a.id).unwrap());
    assert_eq!(db.find_player(p.id).unwrap().unwrap().team_id, None);
    let games = db.list_games().unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].first_team_id, a.id);
}

#[test]
fn schedule_rejects_self_play_and_unknown_teams() {
    let db = LeagueDb::open_in_memory().unwrap();
    let a = db.add_team(&new_team("A", Division::Women)).unwrap();
    let b = db.add_team(&new_team("B", Division::Women)).unwrap();
    assert!(db.schedule_game(a.id, a.id, date(2024, 9, 1)).is_err());
    assert!(db.schedule_game(a.id, 77, date(2024, 9, 1)).is_err());

    let g1 = db.schedule_game(a.id, b.id, date(2024, 9, 2)).unwrap();
    let g2 = db.schedule_game(b.id, a.id, date(2024, 9, 1)).unwrap();
    let g3 = db.schedule_game(a.id, b.id, date(2024, 9, 2)).unwrap();
    let ids: Vec<i64> = db.list_games().unwrap().iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![g1.id, g2.id, g3.id]);
    let on_second: Vec<i64> = db
        .games_on(date(2024, 9, 2))
        .unwrap()
        .iter()
        .map(|g| g.id)
        .collect();
    assert_eq!(on_second, vec![g1.id, g3.id]);
    assert!(db.delete_game(g2.id).unwrap());
    assert_eq!(db.list_games().unwrap().len(), 2);
}

#[test]
fn users_have_unique_case_insensitive_emails() {
    let db = LeagueDb::open_in_memory().unwrap();
    let user = db.add_user(&new_user("Fan@Club.org")).unwrap();
    assert_eq!(user.email, "fan@club.org");
    assert!(db.add_user(&new_user("fan@club.org ")).is_err());
    assert_eq!(db.find_user_by_email("FAN@club.org").unwrap(), Some(user.clone()));
    assert_eq!(db.find_user(user.id).unwrap(), Some(user));
}

#[test]
fn toggle_like_flips_and_counts() {
    let mut db = LeagueDb::open_in_memory().unwrap();
    let p = db.add_player(&new_player("Meliha", None)).unwrap();
    let q = db.add_player(&new_player("Hande", None)).unwrap();
    let u1 = db.add_user(&new_user("a@club.org")).unwrap();
    let u2 = db.add_user(&new_user("b@club.org")).unwrap();

    assert_eq!(db.toggle_like(u1.id, p.id).unwrap(), LikeChange::Liked);
    assert_eq!(db.toggle_like(u2.id, p.id).unwrap(), LikeChange::Liked);
    assert_eq!(db.liker_count_of(p.id).unwrap(), 2);
    assert_eq!(db.toggle_like(u1.id, p.id).unwrap(), LikeChange::Unliked);
    assert_eq!(db.liker_count_of(p.id).unwrap(), 1);
    assert_eq!(db.liker_count_of(q.id).unwrap(), 0);
    assert_eq!(db.liked_player_ids(u2.id).unwrap(), vec![p.id]);
    assert_eq!(db.like_counts().unwrap(), vec![(p.id, 1), (q.id, 0)]);
}

#[test]
fn toggle_like_requires_existing_rows() {
    let mut db = LeagueDb::open_in_memory().unwrap();
    let p = db.add_player(&new_player("Simge", None)).unwrap();
    let u = db.add_user(&new_user("c@club.org")).unwrap();
    assert!(db.toggle_like(999, p.id).is_err());
    assert!(db.toggle_like(u.id, 999).is_err());
    assert_eq!(db.liker_count_of(p.id).unwrap(), 0);
}

#[test]
fn deleting_user_or_player_drops_likes() {
    let mut db = LeagueDb::open_in_memory().unwrap();
    let p = db.add_player(&new_player("Cansu", None)).unwrap();
    let q = db.add_player(&new_player("Gizem", None)).unwrap();
    let u = db.add_user(&new_user("d@club.org")).unwrap();
    let v = db.add_user(&new_user("e@club.org")).unwrap();
    db.toggle_like(u.id, p.id).unwrap();
    db.toggle_like(v.id, p.id).unwrap();
    db.toggle_like(v.id, q.id).unwrap();

    assert!(db.delete_user(u.id).unwrap());
    assert_eq!(db.liker_count_of(p.id).unwrap(), 1);
    assert!(db.delete_player(q.id).unwrap());
    assert_eq!(db.liked_player_ids(v.id).unwrap(), vec![p.id]);
}

#[test]
fn file_database_persists_between_opens() {
    let dir = std::env::temp_dir().join(format!("vleague-store-{}", std::process::id()));
    let path = dir.join("league.sqlite3");
    let _ = std::fs::remove_file(&path);
    {
        let db = LeagueDb::open(&path).unwrap();
        db.add_team(&new_team("Persisted", Division::Women)).unwrap();
    }
    let db = LeagueDb::open(&path).unwrap();
    assert!(db.find_team_by_name("Persisted").unwrap().is_some());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn open_reports_directory_that_cannot_be_created() {
    let blocker = std::env::temp_dir().join(format!("vleague-blocker-{}", std::process::id()));
    std::fs::write(&blocker, "not a directory").unwrap();
    let err = LeagueDb::open(&blocker.join("league.sqlite3")).unwrap_err();
    assert!(format!("{err:#}").starts_with("create "), "{err:#}");
    let _ = std::fs::remove_file(&blocker);
}
