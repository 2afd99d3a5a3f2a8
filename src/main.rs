use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::{info, warn};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use tui_logger::TuiLoggerWidget;

use vleague::config::{AppConfig, load_dotenv};
use vleague::fixtures::Fixture;
use vleague::home::{compose_home, compose_schedule};
use vleague::logging;
use vleague::models::{LikeChange, division_label};
use vleague::session::load_session;
use vleague::state::{AppState, Screen, screen_label};
use vleague::store::LeagueDb;

struct App {
    state: AppState,
    db: LeagueDb,
    config: AppConfig,
    should_quit: bool,
}

impl App {
    fn new(db: LeagueDb, config: AppConfig) -> Self {
        let mut state = AppState::new(config.today());
        state.session = config.session_path.as_deref().and_then(load_session);
        Self {
            state,
            db,
            config,
            should_quit: false,
        }
    }

    fn refresh(&mut self) {
        self.state.reload(&self.db, self.config.top_k);
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.search_active {
            match key.code {
                KeyCode::Esc | KeyCode::Enter => self.state.search_active = false,
                KeyCode::Backspace => self.state.pop_search_char(),
                KeyCode::Char(ch) => self.state.push_search_char(ch),
                _ => {}
            }
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.state.set_screen(Screen::Home),
            KeyCode::Char('2') => self.state.set_screen(Screen::Schedule),
            KeyCode::Char('3') => {
                self.state.set_screen(Screen::Teams);
                self.roster_after_move();
            }
            KeyCode::Char('4') => self.state.set_screen(Screen::Players),
            KeyCode::Char('j') | KeyCode::Down => {
                self.state.select_next();
                self.roster_after_move();
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.state.select_prev();
                self.roster_after_move();
            }
            KeyCode::Char('d') => {
                if matches!(self.state.screen, Screen::Schedule | Screen::Teams) {
                    self.state.cycle_division();
                    self.refresh();
                }
            }
            KeyCode::Char('/') => {
                if self.state.screen == Screen::Players {
                    self.state.search_active = true;
                }
            }
            KeyCode::Char('l') => self.toggle_selected_like(),
            KeyCode::Char('r') => {
                self.refresh();
                info!("refreshed");
            }
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn roster_after_move(&mut self) {
        if self.state.screen != Screen::Teams {
            return;
        }
        if let Err(err) = self.state.reload_roster(&self.db) {
            warn!("roster load failed: {err:#}");
        }
    }

    fn toggle_selected_like(&mut self) {
        if self.state.screen != Screen::Players {
            return;
        }
        let Some(session) = self.state.session.clone() else {
            info!("log in with vleague_admin login to like players");
            return;
        };
        let Some(row) = self.state.selected_player() else {
            return;
        };
        let (player_id, name) = (row.player.id, row.player.name.clone());
        match self.db.toggle_like(session.user_id, player_id) {
            Ok(LikeChange::Liked) => info!("liked {name}"),
            Ok(LikeChange::Unliked) => info!("unliked {name}"),
            Err(err) => warn!("like failed: {err:#}"),
        }
        self.refresh();
    }
}

fn main() -> Result<()> {
    load_dotenv();
    let config = AppConfig::from_env();
    logging::init_tui(config.log_level)?;

    let db = LeagueDb::open(&config.db_path).context("open league database")?;
    let mut app = App::new(db, config);
    app.refresh();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        tui_logger::move_events();
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(6),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Home => render_home(frame, chunks[1], &app.state),
        Screen::Schedule => render_schedule(frame, chunks[1], &app.state),
        Screen::Teams => render_teams(frame, chunks[1], &app.state),
        Screen::Players => render_players(frame, chunks[1], &app.state),
    }

    render_console(frame, chunks[2], &app.state);

    let footer = Paragraph::new(footer_text(&app.state)).style(Style::default().fg(Color::Gray));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let user = state
        .session
        .as_ref()
        .map(|s| s.email.as_str())
        .unwrap_or("guest");
    let mut title = format!(
        "VLEAGUE {} | {} | {}",
        screen_label(state.screen),
        state.today.format("%a %d %b %Y"),
        user
    );
    if matches!(state.screen, Screen::Schedule | Screen::Teams) {
        title.push_str(&format!(" | Division: {}", division_label(state.division)));
    }
    let line1 = format!("   o   {title}");
    let line2 = "  /|\\".to_string();
    let line3 = "  / \\".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn footer_text(state: &AppState) -> String {
    let base = "1 Home | 2 Schedule | 3 Teams | 4 Players | j/k Move | r Refresh | ? Help | q Quit";
    match state.screen {
        Screen::Schedule | Screen::Teams => format!("{base} | d Division"),
        Screen::Players if state.search_active => {
            format!("Search: {}_  (Enter/Esc done)", state.search)
        }
        Screen::Players => format!("{base} | / Search | l Like"),
        Screen::Home => base.to_string(),
    }
}

fn render_home(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(home) = state.home.as_ref() else {
        render_empty(frame, area, "Home unavailable");
        return;
    };
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(columns[0]);

    render_fixture_block(frame, left[0], "Today", &home.today_fixtures, None);
    render_fixture_block(frame, left[1], "Tomorrow", &home.tomorrow_fixtures, None);

    let lines: Vec<Line> = home
        .top_players
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let text = format!(
                "{:>3}  {:<24} #{:<3} {}",
                entry.likes, entry.player.name, entry.player.jersey_number, entry.player.position
            );
            selectable_line(text, idx == state.selected)
        })
        .collect();
    let block = Block::default().title("Most liked").borders(Borders::ALL);
    if lines.is_empty() {
        frame.render_widget(
            Paragraph::new("No liked players yet")
                .style(Style::default().fg(Color::DarkGray))
                .block(block),
            columns[1],
        );
    } else {
        frame.render_widget(Paragraph::new(lines).block(block), columns[1]);
    }
}

fn render_schedule(frame: &mut Frame, area: Rect, state: &AppState) {
    render_fixture_block(
        frame,
        area,
        "Upcoming",
        &state.schedule,
        Some(state.selected),
    );
}

fn render_fixture_block(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    fixtures: &[Fixture],
    selected: Option<usize>,
) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    if fixtures.is_empty() {
        frame.render_widget(
            Paragraph::new("No games")
                .style(Style::default().fg(Color::DarkGray))
                .block(block),
            area,
        );
        return;
    }
    let visible = area.height.saturating_sub(2) as usize;
    let (start, end) = visible_range(selected.unwrap_or(0), fixtures.len(), visible);
    let lines: Vec<Line> = fixtures[start..end]
        .iter()
        .enumerate()
        .map(|(i, f)| {
            let text = format!(
                "{}  [{}] {} - {}",
                f.match_date.format("%d %b"),
                f.first.division,
                f.first.name,
                f.second.name
            );
            selectable_line(text, selected == Some(start + i))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_teams(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let teams = state.visible_teams();
    let visible = columns[0].height.saturating_sub(2) as usize;
    let (start, end) = visible_range(state.selected, teams.len(), visible);
    let lines: Vec<Line> = (start..end)
        .map(|idx| {
            let t = teams[idx];
            let text = format!("[{}] {:<22} {}", t.division, t.name, t.founded);
            selectable_line(text, idx == state.selected)
        })
        .collect();
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().title("Teams").borders(Borders::ALL)),
        columns[0],
    );

    let Some(team) = state.selected_team() else {
        render_empty(frame, columns[1], "No teams");
        return;
    };
    let mut lines = vec![
        Line::from(Span::styled(
            team.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("Stadium: {}", team.stadium)),
        Line::from(format!("Chairman: {}", team.chairman)),
        Line::from(format!("Founded: {}", team.founded)),
        Line::from(""),
    ];
    if state.roster.is_empty() {
        lines.push(Line::from("No players"));
    }
    for p in &state.roster {
        lines.push(Line::from(format!(
            "#{:<3} {:<22} {:<15} {}cm",
            p.jersey_number, p.name, p.position, p.height
        )));
    }
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().title("Roster").borders(Borders::ALL)),
        columns[1],
    );
}

fn render_players(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = state.visible_players();
    let block = Block::default().title("Players").borders(Borders::ALL);
    if rows.is_empty() {
        frame.render_widget(
            Paragraph::new("No players match")
                .style(Style::default().fg(Color::DarkGray))
                .block(block),
            area,
        );
        return;
    }
    let visible = area.height.saturating_sub(2) as usize;
    let (start, end) = visible_range(state.selected, rows.len(), visible);
    let lines: Vec<Line> = (start..end)
        .map(|idx| {
            let row = rows[idx];
            let heart = if row.liked_by_me { "♥" } else { " " };
            let text = format!(
                "{heart} {:>3}  {:<24} {:<16} {:<15} {}",
                row.likes,
                row.player.name,
                row.team_name.as_deref().unwrap_or("-"),
                row.player.position,
                row.player.age
            );
            selectable_line(text, idx == state.selected)
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_console(frame: &mut Frame, area: Rect, state: &AppState) {
    let area = match &state.last_error {
        Some(err) => {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Min(1)])
                .split(area);
            let line = Paragraph::new(format!("[ERROR] {err}")).style(Style::default().fg(Color::Red));
            frame.render_widget(line, rows[0]);
            rows[1]
        }
        None => area,
    };
    let console = TuiLoggerWidget::default()
        .block(Block::default().title("Log").borders(Borders::ALL))
        .output_target(false)
        .output_file(false)
        .output_line(false)
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray));
    frame.render_widget(console, area);
}

fn render_empty(frame: &mut Frame, area: Rect, text: &str) {
    let empty = Paragraph::new(text.to_string()).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(empty, area);
}

fn selectable_line(text: String, selected: bool) -> Line<'static> {
    if selected {
        Line::from(Span::styled(
            text,
            Style::default().fg(Color::White).bg(Color::DarkGray),
        ))
    } else {
        Line::from(text)
    }
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "VLeague - Help",
        "",
        "Screens:",
        "  1  Home (today, tomorrow, most liked)",
        "  2  Schedule",
        "  3  Teams",
        "  4  Players",
        "",
        "  j/k or ↑/↓   Move",
        "  d            Cycle division (schedule, teams)",
        "  /            Search players by name",
        "  l            Like / unlike selected player",
        "  r            Refresh",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
