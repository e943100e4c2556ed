use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::{execute, terminal};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use trendy_nogo::config::{GameConfig, DEFAULT_CONFIG_PATH};
use trendy_nogo::core::{Color, Position};
use trendy_nogo::display::{render, DisplayState};
use trendy_nogo::game::Ticker;
use trendy_nogo::network::AiBridge;
use trendy_nogo::session::{Session, SessionEvent};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = GameConfig::load_or_default(&config_path);

    // The terminal belongs to the board, so logs go to a file.
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .init();
    tracing::info!("starting with {:?}", config);

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen)?;

    let res = run(config).await;

    execute!(io::stdout(), terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    res
}

async fn run(config: GameConfig) -> anyhow::Result<()> {
    let (session_tx, mut session_rx) = mpsc::channel::<SessionEvent>(64);
    let (bridge_tx, mut bridge_rx) = mpsc::channel(32);
    let (key_tx, mut key_rx) = mpsc::unbounded_channel::<KeyEvent>();

    let (bridge, _bridge_task) = AiBridge::new(&config).spawn(bridge_tx);
    let ticker = Ticker::spawn(Duration::from_secs(1), session_tx.clone(), || {
        SessionEvent::Tick
    });

    // Key reads block, so they get their own thread.
    std::thread::spawn(move || loop {
        match event::poll(Duration::from_millis(100)) {
            Ok(true) => {
                if let Ok(Event::Key(key)) = event::read() {
                    if key_tx.send(key).is_err() {
                        break;
                    }
                }
            }
            Ok(false) => {
                if key_tx.is_closed() {
                    break;
                }
            }
            Err(_) => break,
        }
    });

    let mut session = Session::new(&config, Some(bridge), session_tx);
    let mut state = DisplayState::default();
    let last = config.board_size.saturating_sub(1);
    let mut notice: Option<String> = None;

    loop {
        render(&session, &state)?;
        if let Some(msg) = &notice {
            print!("{}\r\n", msg);
        }

        tokio::select! {
            Some(event) = session_rx.recv() => session.handle(event),
            Some(event) = bridge_rx.recv() => session.handle(SessionEvent::Bridge(event)),
            Some(key) = key_rx.recv() => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                notice = None;
                match key.code {
                    KeyCode::Char('q') => break,
                    KeyCode::Up => state.cursor.row = state.cursor.row.saturating_sub(1),
                    KeyCode::Down => state.cursor.row = (state.cursor.row + 1).min(last),
                    KeyCode::Left => state.cursor.col = state.cursor.col.saturating_sub(1),
                    KeyCode::Right => state.cursor.col = (state.cursor.col + 1).min(last),
                    KeyCode::Enter | KeyCode::Char(' ') => {
                        if let Err(e) = session.play(state.cursor) {
                            notice = Some(e.to_string());
                        }
                    }
                    KeyCode::Char('u') => {
                        if let Err(e) = session.undo() {
                            notice = Some(e.to_string());
                        }
                    }
                    KeyCode::Char('s') => {
                        notice = Some(match session.save_record() {
                            Ok(path) => format!("Record saved to {}", path.display()),
                            Err(e) => e.to_string(),
                        });
                    }
                    KeyCode::Char('t') => {
                        let next = session.think_time().next();
                        session.set_think_time(next);
                    }
                    KeyCode::Char('w') => new_game(&mut session, &mut state, Some(Color::White)),
                    KeyCode::Char('b') => new_game(&mut session, &mut state, Some(Color::Black)),
                    KeyCode::Char('h') => new_game(&mut session, &mut state, None),
                    _ => {}
                }
            }
            else => break,
        }
    }

    ticker.stop();
    Ok(())
}

fn new_game(session: &mut Session, state: &mut DisplayState, ai_color: Option<Color>) {
    session.new_game(ai_color);
    let center = session.game().board().size() / 2;
    state.cursor = Position::new(center, center);
}
