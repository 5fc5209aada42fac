use std::io::Write;

use anyhow::{Context, Result};
use crossterm::{cursor, QueueableCommand};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use crate::game::{Snapshot, Status};
use crate::playfield::{Coord, Tile};

/// Consumes a snapshot after every tick.
pub trait Presenter {
    /// `changed == false` means the previous frame is still accurate and
    /// nothing needs to be drawn.
    fn present(&mut self, snapshot: &Snapshot, changed: bool) -> Result<()>;
}

// ============================================================================
// ASCII Console
// ============================================================================

const OCCUPIED_CHAR: char = '#';
const EMPTY_CHAR: char = ' ';

/// Text frame: the bordered field with the counters to its right.
pub fn ascii_frame(snapshot: &Snapshot) -> String {
    let field = snapshot.playfield;
    let stats = snapshot.stats;
    let border = "-".repeat(field.width() + 2);

    let mut out = String::new();
    out.push_str(&border);
    out.push('\n');
    for y in 0..field.height() {
        out.push('|');
        out.extend(field.row(y).iter().map(|tile| {
            if tile.occupied {
                OCCUPIED_CHAR
            } else {
                EMPTY_CHAR
            }
        }));
        let side = match y {
            0 => format!("| Tiles: {:>10}", stats.tiles),
            1 => format!("| Rows:  {:>10}", stats.rows),
            2 => format!("| Score: {:>10}", stats.score),
            4 => format!("| Level: {:>10}", stats.level),
            _ if y == field.height() - 1 => {
                let label = match snapshot.status {
                    Status::GameOver => "Game Over",
                    Status::Active => "",
                };
                format!("| {:>17}", label)
            }
            _ => "|".to_string(),
        };
        out.push_str(&side);
        out.push('\n');
    }
    out.push_str(&border);
    out
}

/// Redraws [`ascii_frame`] from the top-left corner of a raw-mode terminal.
pub struct AsciiPresenter<W: Write> {
    out: W,
}

impl<W: Write> AsciiPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Presenter for AsciiPresenter<W> {
    fn present(&mut self, snapshot: &Snapshot, changed: bool) -> Result<()> {
        if !changed {
            return Ok(());
        }
        self.out.queue(cursor::MoveTo(0, 0))?;
        // Raw mode does not translate \n, so return the carriage explicitly
        for line in ascii_frame(snapshot).lines() {
            write!(self.out, "{}\r\n", line)?;
        }
        self.out.flush().context("flushing console frame")?;
        Ok(())
    }
}

// ============================================================================
// Terminal UI
// ============================================================================

const CELL_WIDTH: u16 = 2;
const BLOCK_CHAR: &str = "██";
const EMPTY_CELL: &str = "  ";

fn tile_color(colour: u32) -> Color {
    Color::Rgb((colour >> 16) as u8, (colour >> 8) as u8, colour as u8)
}

pub struct TerminalPresenter<B: Backend> {
    terminal: Terminal<B>,
}

impl<B: Backend> TerminalPresenter<B> {
    pub fn new(backend: B) -> Result<Self> {
        let terminal = Terminal::new(backend).context("creating terminal")?;
        Ok(Self { terminal })
    }

    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }
}

impl<B: Backend> Presenter for TerminalPresenter<B> {
    fn present(&mut self, snapshot: &Snapshot, changed: bool) -> Result<()> {
        if !changed {
            return Ok(());
        }
        self.terminal
            .draw(|frame| draw(frame, snapshot))
            .context("drawing frame")?;
        Ok(())
    }
}

fn draw(frame: &mut Frame, snapshot: &Snapshot) {
    let area = frame.size();
    let field = snapshot.playfield;

    let grid_width = field.width() as u16 * CELL_WIDTH + 2;
    let grid_height = field.height() as u16 + 2;
    let info_width = 16;
    let main_area = centered_rect(grid_width + info_width, grid_height + 2, area);

    let vertical = Layout::vertical([Constraint::Length(grid_height), Constraint::Fill(1)])
        .split(main_area);
    let horizontal = Layout::horizontal([
        Constraint::Length(grid_width),
        Constraint::Length(info_width),
    ])
    .split(vertical[0]);

    draw_grid(frame, snapshot, horizontal[0]);
    draw_info(frame, snapshot, horizontal[1]);

    if vertical[1].height > 0 {
        let hint = match snapshot.status {
            Status::Active => "←→ move | ↓ drop | q quit",
            Status::GameOver => "any key: new game | q quit",
        };
        let controls = Paragraph::new(Line::from(hint))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(controls, vertical[1]);
    }

    if snapshot.status == Status::GameOver {
        draw_game_over(frame, snapshot, area);
    }
}

fn draw_grid(frame: &mut Frame, snapshot: &Snapshot, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Tiles ")
        .title_alignment(Alignment::Center);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let field = snapshot.playfield;
    let lines: Vec<Line> = (0..field.height())
        .map(|y| {
            let spans: Vec<Span> = (0..field.width())
                .map(|x| match field.tile(Coord::new(x, y)) {
                    Tile {
                        occupied: true,
                        colour,
                    } => Span::styled(BLOCK_CHAR, Style::default().fg(tile_color(colour))),
                    _ => Span::raw(EMPTY_CELL),
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_info(frame: &mut Frame, snapshot: &Snapshot, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let stats = snapshot.stats;
    let lines = vec![
        Line::from(format!("Tiles {:>8}", stats.tiles)),
        Line::from(format!("Rows  {:>8}", stats.rows)),
        Line::from(Span::styled(
            format!("Score {:>8}", stats.score),
            Style::default().fg(Color::Yellow),
        )),
        Line::from(Span::styled(
            format!("Level {:>8}", stats.level),
            Style::default().fg(Color::Green),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_game_over(frame: &mut Frame, snapshot: &Snapshot, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("GAME OVER", Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(format!("Score: {}", snapshot.stats.score)),
        Line::from(format!("Level: {}", snapshot.stats.level)),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .style(Style::default().bg(Color::Black)),
    );

    frame.render_widget(paragraph, centered_rect(20, 7, area));
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// LED Matrix
// ============================================================================

/// 0xRRGGBB to the 16-bit RGB565 layout of the LED frame buffer.
pub fn rgb565(colour: u32) -> u16 {
    let r = (colour >> 16) & 0xFF;
    let g = (colour >> 8) & 0xFF;
    let b = colour & 0xFF;
    (((r >> 3) << 11) | ((g >> 2) << 5) | (b >> 3)) as u16
}

/// In-memory RGB565 image of the field, one pixel per tile, row-major.
pub struct LedMatrix {
    width: usize,
    pixels: Vec<u16>,
    frames: u64,
}

impl LedMatrix {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            pixels: vec![0; width * height],
            frames: 0,
        }
    }

    pub fn pixels(&self) -> &[u16] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> u16 {
        self.pixels[y * self.width + x]
    }

    /// Number of frames actually written.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Presenter for LedMatrix {
    fn present(&mut self, snapshot: &Snapshot, changed: bool) -> Result<()> {
        if !changed {
            return Ok(());
        }
        let field = snapshot.playfield;
        for y in 0..field.height() {
            for (x, tile) in field.row(y).iter().enumerate() {
                self.pixels[y * self.width + x] = if tile.occupied {
                    rgb565(tile.colour)
                } else {
                    0
                };
            }
        }
        self.frames += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::{Game, Input, SequenceColours};
    use ratatui::backend::TestBackend;

    fn started_game() -> Game {
        let mut game =
            Game::with_provider(GameConfig::default(), Box::new(SequenceColours::new(vec![0xFF0000])));
        game.tick(Input::Confirm);
        game
    }

    fn buffer_text(presenter: &TerminalPresenter<TestBackend>) -> String {
        presenter
            .terminal()
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn ascii_frame_of_new_game() {
        let game = started_game();
        let expected = [
            "----------",
            "|   #    | Tiles:          1",
            "|        | Rows:           0",
            "|        | Score:          0",
            "|        |",
            "|        | Level:          0",
            "|        |",
            "|        |",
            "|        |                  ",
            "----------",
        ]
        .join("\n");

        assert_eq!(ascii_frame(&game.snapshot()), expected);
    }

    #[test]
    fn ascii_frame_shows_game_over() {
        let game = Game::default();
        let frame = ascii_frame(&game.snapshot());
        let last_row = frame.lines().nth(8).unwrap();
        assert_eq!(last_row, "|        |         Game Over");
    }

    #[test]
    fn ascii_presenter_skips_unchanged_frames() {
        let game = started_game();
        let mut presenter = AsciiPresenter::new(Vec::new());

        presenter.present(&game.snapshot(), false).unwrap();
        assert!(presenter.out.is_empty());

        presenter.present(&game.snapshot(), true).unwrap();
        let written = String::from_utf8(presenter.into_inner()).unwrap();
        assert!(written.contains("|   #    | Tiles:          1\r\n"));
    }

    #[test]
    fn terminal_presenter_draws_stats() {
        let game = started_game();
        let mut presenter = TerminalPresenter::new(TestBackend::new(60, 20)).unwrap();

        presenter.present(&game.snapshot(), true).unwrap();

        let text = buffer_text(&presenter);
        assert!(text.contains("Tiles"));
        assert!(text.contains("██"));
        assert!(!text.contains("GAME OVER"));
    }

    #[test]
    fn terminal_presenter_shows_game_over_popup() {
        let game = Game::default();
        let mut presenter = TerminalPresenter::new(TestBackend::new(60, 20)).unwrap();

        presenter.present(&game.snapshot(), true).unwrap();

        assert!(buffer_text(&presenter).contains("GAME OVER"));
    }

    #[test]
    fn rgb565_conversion() {
        assert_eq!(rgb565(0xFF0000), 0xF800);
        assert_eq!(rgb565(0x00FF00), 0x07E0);
        assert_eq!(rgb565(0x0000FF), 0x001F);
        assert_eq!(rgb565(0x000000), 0);
    }

    #[test]
    fn led_matrix_mirrors_field() {
        let game = started_game();
        let mut matrix = LedMatrix::new(8, 8);

        matrix.present(&game.snapshot(), false).unwrap();
        assert_eq!(matrix.frames(), 0);
        assert!(matrix.pixels().iter().all(|&p| p == 0));

        matrix.present(&game.snapshot(), true).unwrap();
        assert_eq!(matrix.frames(), 1);
        assert_eq!(matrix.pixel(3, 0), 0xF800);
        assert_eq!(matrix.pixels().iter().filter(|&&p| p != 0).count(), 1);
    }
}
