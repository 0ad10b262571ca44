//! Full-screen watch board
//!
//! On a terminal the board takes over the alternate screen and redraws
//! in place; otherwise each frame is simply appended to the output.

use crossterm::{
    ExecutableCommand, QueueableCommand,
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    style::Print,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, IsTerminal, Stdout, Write};
use std::time::Duration;
use termcrypto_runner::{BoardRenderer, PriceBoard};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::board_frame;
use crate::logging::{StderrHold, hold_stderr};

const KEY_POLL: Duration = Duration::from_millis(100);

/// What a frame shows besides the prices
#[derive(Debug, Clone)]
pub struct BoardView {
    pub exchange: String,
    pub interval_secs: u64,
    pub decimals: u32,
}

pub struct TerminalBoard<W: Write = Stdout> {
    out: W,
    view: BoardView,
    interactive: bool,
    previous_line_count: usize,
    /// Released after `Drop` has restored the screen
    _logs: Option<StderrHold>,
}

impl TerminalBoard<Stdout> {
    /// Board on stdout, full-screen when stdout is a terminal
    pub fn stdout(view: BoardView) -> io::Result<Self> {
        let interactive = io::stdout().is_terminal();
        TerminalBoard::new(io::stdout(), view, interactive)
    }
}

impl<W: Write> TerminalBoard<W> {
    pub fn new(mut out: W, view: BoardView, interactive: bool) -> io::Result<Self> {
        let logs = interactive.then(hold_stderr);
        if interactive {
            terminal::enable_raw_mode()?;
            out.execute(EnterAlternateScreen)?;
            out.execute(Hide)?;
            out.execute(Clear(ClearType::All))?;
            out.execute(MoveTo(0, 0))?;
            out.flush()?;
        }

        Ok(TerminalBoard {
            out,
            view,
            interactive,
            previous_line_count: 0,
            _logs: logs,
        })
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn draw(&mut self, frame: &str) -> io::Result<()> {
        if !self.interactive {
            writeln!(self.out, "{}", frame)?;
            return self.out.flush();
        }

        let lines: Vec<&str> = frame.lines().collect();
        for (index, line) in lines.iter().enumerate() {
            let Ok(row) = u16::try_from(index) else {
                break;
            };
            self.out.queue(MoveTo(0, row))?;
            self.out.queue(Clear(ClearType::CurrentLine))?;
            self.out.queue(Print(*line))?;
        }

        // Wipe rows left over from a taller previous frame
        for index in lines.len()..self.previous_line_count {
            let Ok(row) = u16::try_from(index) else {
                break;
            };
            self.out.queue(MoveTo(0, row))?;
            self.out.queue(Clear(ClearType::CurrentLine))?;
        }

        self.out.flush()?;
        self.previous_line_count = lines.len();
        Ok(())
    }
}

impl<W: Write> BoardRenderer for TerminalBoard<W> {
    fn render(&mut self, board: &PriceBoard) -> io::Result<()> {
        let frame = board_frame(
            board,
            &self.view.exchange,
            self.view.interval_secs,
            self.view.decimals,
        );
        self.draw(&frame)
    }
}

impl<W: Write> Drop for TerminalBoard<W> {
    fn drop(&mut self) {
        if !self.interactive {
            return;
        }

        let _ = self.out.execute(Show);
        let _ = self.out.execute(LeaveAlternateScreen);
        let _ = self.out.flush();
        let _ = terminal::disable_raw_mode();
    }
}

/// Whether a key press asks the watch board to quit
pub fn is_quit_key(code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
        KeyCode::Char('c') => modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Cancel `cancel` on `q`, Esc or Ctrl+C
///
/// Raw mode swallows SIGINT, so Ctrl+C arrives here as a key event. The
/// listener exits on its own once `cancel` fires.
pub fn spawn_quit_listener(cancel: CancellationToken) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        while !cancel.is_cancelled() {
            match event::poll(KEY_POLL) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key))
                        if key.kind == KeyEventKind::Press
                            && is_quit_key(key.code, key.modifiers) =>
                    {
                        debug!("quit key pressed");
                        cancel.cancel();
                    }
                    Ok(_) => {}
                    Err(e) => {
                        debug!("terminal event read failed: {}", e);
                        break;
                    }
                },
                Ok(false) => {}
                Err(e) => {
                    debug!("terminal event poll failed: {}", e);
                    break;
                }
            }
        }
    })
}
