//! App: terminal init, main loop, cascade pacing and input handling.

use crate::GameConfig;
use crate::game::Board;
use crate::input::{Action, key_to_action, mouse_to_action};
use crate::theme::Theme;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;
use std::time::{Duration, Instant};
use tachyonfx::Effect;

/// Frame budget for event polling (~60 FPS).
const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Where the current click is in its cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Removing,
    Falling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
}

pub struct App {
    config: GameConfig,
    theme: Theme,
    rng: SmallRng,
    board: Board,
    phase: Phase,
    /// When the last cascade step ran; None means the next step is due now.
    last_step: Option<Instant>,
    outcome: Option<Outcome>,
    /// Keyboard cursor (row, col); hidden until a cursor key is used.
    cursor: (i32, i32),
    cursor_visible: bool,
    /// Board tiles rect from the last frame, for mouse translation.
    board_rect: Rect,
    /// TachyonFX flash for the status line, repeated while the game is over.
    end_effect: Option<Effect>,
    /// Last time we processed the end effect (for delta).
    end_effect_process_time: Option<Instant>,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme) -> Self {
        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let board = deal(&config, &mut rng);
        let mut app = Self {
            config,
            theme,
            rng,
            board,
            phase: Phase::Idle,
            last_step: None,
            outcome: None,
            cursor: (0, 0),
            cursor_visible: false,
            board_rect: Rect::default(),
            end_effect: None,
            end_effect_process_time: None,
        };
        app.evaluate_outcome();
        app
    }

    fn restart(&mut self) {
        self.board = deal(&self.config, &mut self.rng);
        self.phase = Phase::Idle;
        self.last_step = None;
        self.outcome = None;
        self.end_effect = None;
        self.end_effect_process_time = None;
        log::info!("new board");
        self.evaluate_outcome();
    }

    /// Click at board (row, col). Ignored while a cascade is still playing out.
    fn click(&mut self, y: i32, x: i32) {
        if self.phase != Phase::Idle {
            return;
        }
        if self.board.click(y, x) > 0 {
            self.phase = Phase::Removing;
            self.last_step = None;
        }
    }

    /// Run cascade steps that are due. With animation that is at most one state-changing
    /// step per `step_delay`; without, the whole cascade resolves at once.
    fn advance_cascade(&mut self, now: Instant) {
        let animate = !self.config.no_animation;
        if animate
            && self
                .last_step
                .is_some_and(|t| now.saturating_duration_since(t) < self.config.step_delay)
        {
            return;
        }
        loop {
            let progressed = match self.phase {
                Phase::Idle => return,
                Phase::Removing => self.board.simulate_removal(),
                Phase::Falling => self.board.simulate_fall(),
            };
            if progressed {
                if animate {
                    self.last_step = Some(now);
                    return;
                }
                continue;
            }
            if self.phase == Phase::Removing {
                self.phase = Phase::Falling;
                continue;
            }
            self.phase = Phase::Idle;
            self.evaluate_outcome();
            return;
        }
    }

    /// Win/loss check on a settled board.
    fn evaluate_outcome(&mut self) {
        self.outcome = if self.board.check_won() {
            Some(Outcome::Won)
        } else if self.board.check_lost() {
            Some(Outcome::Lost)
        } else {
            None
        };
        if let Some(outcome) = self.outcome {
            log::info!("game over: {outcome:?} with {} points", self.board.points());
        }
    }

    fn move_cursor(&mut self, dy: i32, dx: i32) {
        if !self.cursor_visible {
            self.cursor_visible = true;
            return;
        }
        let (y, x) = self.cursor;
        self.cursor = (
            (y + dy).clamp(0, self.board.height() as i32 - 1),
            (x + dx).clamp(0, self.board.width() as i32 - 1),
        );
    }

    /// Apply one action. Returns false when the app should exit.
    fn handle_action(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return false,
            Action::Restart => self.restart(),
            Action::Click { column, row } => {
                self.cursor_visible = false;
                let (y, x) = crate::ui::screen_to_grid(self.board_rect, column, row);
                log::debug!("mouse ({column}, {row}) -> tile ({y}, {x})");
                self.click(y, x);
            }
            Action::CursorUp => self.move_cursor(-1, 0),
            Action::CursorDown => self.move_cursor(1, 0),
            Action::CursorLeft => self.move_cursor(0, -1),
            Action::CursorRight => self.move_cursor(0, 1),
            Action::Select => {
                if self.cursor_visible {
                    let (y, x) = self.cursor;
                    self.click(y, x);
                } else {
                    self.cursor_visible = true;
                }
            }
            Action::None => {}
        }
        true
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{DisableMouseCapture, EnableMouseCapture},
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let mut terminal = DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;
        terminal.hide_cursor()?;

        let result = self.run_loop(&mut terminal);

        // Restore
        let _ = terminal.show_cursor();
        execute!(std::io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            let cursor = self.cursor_visible.then_some(self.cursor);
            terminal.draw(|f| {
                self.board_rect = crate::ui::board_rect(f.area(), &self.board);
                crate::ui::draw(
                    f,
                    &self.board,
                    &self.theme,
                    self.outcome,
                    cursor,
                    &mut self.end_effect,
                    &mut self.end_effect_process_time,
                    now,
                );
            })?;

            // Finished flashes are dropped; the next frame starts another while the game is over.
            if self.end_effect.as_ref().is_some_and(|e| e.done()) {
                self.end_effect = None;
                self.end_effect_process_time = None;
            }

            let timeout = FRAME_DURATION.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    let action = match event::read()? {
                        Event::Key(key) if key.kind == KeyEventKind::Press => key_to_action(key),
                        Event::Mouse(mouse) => mouse_to_action(mouse),
                        Event::Resize(cols, rows) => {
                            log::debug!("resized to {cols}x{rows}");
                            Action::None
                        }
                        _ => Action::None,
                    };
                    if !self.handle_action(action) {
                        return Ok(());
                    }
                }
            }

            self.advance_cascade(Instant::now());
        }
    }
}

/// Fresh board for a new game: the configured demo layout, or random tiles.
fn deal(config: &GameConfig, rng: &mut SmallRng) -> Board {
    match config.demo {
        Some(demo) => Board::demo(demo, config.height, config.width),
        None => Board::randomized(config.height, config.width, rng),
    }
}
