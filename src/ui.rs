//! Layout and drawing: board, score readout, status and help line.

use crate::app::Outcome;
use crate::game::{Board, TileState};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// Each tile takes two terminal columns (glyph + gap) so the board looks square.
const CELL_WIDTH: u16 = 2;
const CELL_HEIGHT: u16 = 1;
/// Rows below the bordered board: status line and help line.
const FOOTER_ROWS: u16 = 2;

/// Duration of the status-line flash when the game ends.
const END_FLASH_MS: u32 = 600;

const HELP: &str = " click · arrows+enter · r new · esc quit ";

/// Outer size (border included) of the bordered board in terminal cells.
fn board_block_size(board: &Board) -> (u16, u16) {
    (
        board.width() as u16 * CELL_WIDTH + 2,
        board.height() as u16 * CELL_HEIGHT + 2,
    )
}

/// Areas of one frame: bordered board, status line, help line. Centered in `area`.
struct Areas {
    block: Rect,
    status: Rect,
    help: Rect,
}

fn layout(area: Rect, board: &Board) -> Areas {
    let (bw, bh) = board_block_size(board);
    let help_w = HELP.chars().count() as u16;
    let total_w = bw.max(help_w);

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(bh),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);

    let column = vert[1];
    let block = Rect {
        x: column.x + column.width.saturating_sub(bw) / 2,
        width: bw.min(column.width),
        ..column
    };
    let status = Rect {
        x: block.x,
        width: block.width,
        ..vert[2]
    };
    Areas {
        block,
        status,
        help: vert[3],
    }
}

/// Board tiles area (inside the border) for the given terminal area; matches `draw`.
pub fn board_rect(area: Rect, board: &Board) -> Rect {
    let block = layout(area, board).block;
    Rect {
        x: block.x + 1,
        y: block.y + 1,
        width: (board.width() as u16 * CELL_WIDTH).min(block.width.saturating_sub(2)),
        height: (board.height() as u16 * CELL_HEIGHT).min(block.height.saturating_sub(2)),
    }
}

/// Terminal cell to board (row, col). Cells outside the board map to out-of-range
/// coordinates, which the engine clamps and treats as no-ops.
pub fn screen_to_grid(board_rect: Rect, column: u16, row: u16) -> (i32, i32) {
    let y = (i32::from(row) - i32::from(board_rect.y)).div_euclid(i32::from(CELL_HEIGHT));
    let x = (i32::from(column) - i32::from(board_rect.x)).div_euclid(i32::from(CELL_WIDTH));
    (y, x)
}

/// Smallest terminal size that shows the whole board and footer.
pub fn min_terminal_size(board: &Board) -> (u16, u16) {
    let (bw, bh) = board_block_size(board);
    (bw.max(HELP.chars().count() as u16), bh + FOOTER_ROWS)
}

/// Draw one frame. `cursor` is the keyboard cursor (row, col) when it is shown.
/// When `outcome` is set, flashes the status line with a TachyonFX fade kept in `end_effect`.
pub fn draw(
    frame: &mut Frame,
    board: &Board,
    theme: &Theme,
    outcome: Option<Outcome>,
    cursor: Option<(i32, i32)>,
    end_effect: &mut Option<Effect>,
    end_effect_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let area = frame.area();
    let (min_w, min_h) = min_terminal_size(board);
    if area.width < min_w || area.height < min_h {
        draw_too_small(frame, theme, area, min_w, min_h);
        return;
    }

    let areas = layout(area, board);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .style(Style::default().bg(theme.bg))
        .title(Span::styled(" Clumptui ", theme.title));
    block.render(areas.block, frame.buffer_mut());

    draw_tiles(frame, board, theme, board_rect(area, board), cursor);
    draw_status(frame, board, theme, areas.status, outcome);
    Paragraph::new(Line::from(Span::styled(HELP, Style::default().fg(theme.inactive_fg))))
        .alignment(Alignment::Center)
        .render(areas.help, frame.buffer_mut());

    if outcome.is_some() {
        apply_end_effect(frame, theme, areas.status, end_effect, end_effect_process_time, now);
    }
}

fn draw_too_small(frame: &mut Frame, theme: &Theme, area: Rect, min_w: u16, min_h: u16) {
    let lines = vec![
        Line::from(Span::styled("Terminal too small", Style::default().fg(theme.title))),
        Line::from(Span::styled(
            format!("need {min_w}x{min_h}, have {}x{}", area.width, area.height),
            Style::default().fg(theme.main_fg),
        )),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(area, frame.buffer_mut());
}

fn draw_tiles(frame: &mut Frame, board: &Board, theme: &Theme, rect: Rect, cursor: Option<(i32, i32)>) {
    let buf = frame.buffer_mut();
    for (y, x, tile) in board.playfield().tiles() {
        let symbol = match tile.state {
            TileState::Colored => "●",
            TileState::Marked => "o",
            TileState::Removed => "◈",
            TileState::Empty => " ",
        };
        let mut style = Style::default()
            .fg(theme.tile_color(tile.color))
            .bg(theme.bg);
        if cursor == Some((y as i32, x as i32)) {
            style = style.bg(theme.inactive_fg).add_modifier(Modifier::BOLD);
        }
        let rx = rect.x + x as u16 * CELL_WIDTH;
        let ry = rect.y + y as u16 * CELL_HEIGHT;
        if rx < rect.x + rect.width && ry < rect.y + rect.height {
            buf[(rx, ry)].set_symbol(symbol).set_style(style);
        }
    }
}

/// Status on the left ("Won" / "Lost"), score on the right in the last cleared colour.
fn draw_status(frame: &mut Frame, board: &Board, theme: &Theme, area: Rect, outcome: Option<Outcome>) {
    let label = match outcome {
        Some(Outcome::Won) => "Won:",
        Some(Outcome::Lost) => "Lost:",
        None => "",
    };
    let score = format!("{:>4}", board.display_points());
    let gap = (area.width as usize).saturating_sub(label.chars().count() + score.chars().count());
    let line = Line::from(vec![
        Span::styled(label, Style::default().fg(theme.title).add_modifier(Modifier::BOLD)),
        Span::raw(" ".repeat(gap)),
        Span::styled(
            score,
            Style::default()
                .fg(theme.tile_color(board.last_color()))
                .add_modifier(Modifier::BOLD),
        ),
    ]);
    Paragraph::new(line).render(area, frame.buffer_mut());
}

/// Create or update the end-of-game flash and process it (TachyonFX: fade the status line toward the title colour).
fn apply_end_effect(
    frame: &mut Frame,
    theme: &Theme,
    area: Rect,
    end_effect: &mut Option<Effect>,
    end_effect_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let delta = end_effect_process_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    *end_effect_process_time = Some(now);

    if end_effect.is_none() {
        let effect = fx::fade_to(theme.title, theme.div_line, (END_FLASH_MS, Interpolation::Linear))
            .with_area(area);
        *end_effect = Some(effect);
    }

    if let Some(effect) = end_effect {
        frame.render_effect(effect, area, TfxDuration::from_millis(delta_ms));
    }
}
