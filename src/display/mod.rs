use crate::core::{CellState, Color, Position};
use crate::game::GameStatus;
use crate::session::Session;
use crossterm::{cursor, execute, style::Stylize, terminal};
use std::io::{self, stdout};

/// Front-end state that is not part of the game.
pub struct DisplayState {
    pub cursor: Position,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            cursor: Position::new(4, 4),
        }
    }
}

/// `mm:ss`, whole seconds rounded down.
pub fn format_clock(secs: f64) -> String {
    let total = secs.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Turn, mode, move count and both clocks.
pub fn info_lines(session: &Session) -> [String; 2] {
    let game = session.game();
    let mode = match (session.ai_connected(), game.ai_color()) {
        (true, Some(color)) => format!(
            "AI plays {} | think {}s",
            color,
            session.think_time().secs()
        ),
        (true, None) => "Two players (AI idle)".to_string(),
        (false, _) => "Two players (AI offline)".to_string(),
    };
    let turn = match game.status() {
        GameStatus::InProgress => format!("To move: {}", game.to_move()),
        GameStatus::Terminated { winner, .. } => format!("Game over: {} wins", winner),
    };
    [
        format!("{} | {} | Moves: {}", turn, mode, game.move_count()),
        format!(
            "BLACK {} | WHITE {}",
            format_clock(game.clock().remaining(Color::Black)),
            format_clock(game.clock().remaining(Color::White))
        ),
    ]
}

pub fn render(session: &Session, state: &DisplayState) -> io::Result<()> {
    let game = session.game();
    let board = game.board();
    let size = board.size();
    let last = game.last_move().map(|m| m.pos);

    execute!(
        stdout(),
        terminal::Clear(terminal::ClearType::All),
        cursor::MoveTo(0, 0)
    )?;

    print!("=== Trendy NoGo ===\r\n");
    if let Some(msg) = session.status_msg() {
        print!("{}\r\n", msg.to_string().bold().yellow());
    } else {
        print!("\r\n");
    }
    print!("\r\n");

    print!("    ");
    for col in 0..size {
        print!(" {} ", (b'A' + col as u8) as char);
    }
    print!("\r\n");

    for row in 0..size {
        print!("{:2} |", size - row);
        for col in 0..size {
            let pos = Position::new(row, col);
            let glyph = match board.get(pos) {
                Some(CellState::Black) => "●",
                Some(CellState::White) => "○",
                _ => "+",
            };
            let is_cursor = state.cursor == pos;
            let (prefix, suffix) = if is_cursor { ("[", "]") } else { (" ", " ") };
            let cell_text = format!("{}{}{}", prefix, glyph, suffix);

            if is_cursor {
                print!("{}", cell_text.yellow());
            } else if last == Some(pos) {
                print!("{}", cell_text.red());
            } else {
                print!("{}", cell_text);
            }
        }
        print!("|\r\n");
    }
    print!("\r\n");

    for line in info_lines(session) {
        print!("{}\r\n", line);
    }
    if let Some(seq) = game.move_number_at(state.cursor) {
        print!("Stone under cursor: move {}\r\n", seq);
    }
    print!(
        "[Arrows] Move | [Enter] Play | [u] Undo | [s] Save | [t] Think time\r\n\
         [w] New (AI white) | [b] New (AI black) | [h] New (two players) | [q] Quit\r\n"
    );
    Ok(())
}
