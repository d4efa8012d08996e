use crate::renderer::{Input, Renderer};
use crate::scene::{DrawCmd, Scene};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use std::io::{self, Write};
use std::time::{Duration, Instant};

// Rows reserved under the play area for the info display
const INFO_ROWS: u16 = 3;

/// Terminal backend. Scales canvas-pixel scenes down to character cells and
/// paints them with background colors. It always runs with an empty asset
/// catalog, so only the primitive-shape commands ever reach it.
pub struct CliRenderer {
    last_render: Instant,
    target_frame_time: Duration,
    cols: u16,
    rows: u16,
}

impl CliRenderer {
    pub fn new() -> Self {
        Self {
            last_render: Instant::now(),
            // Target 30 FPS for smooth rendering
            target_frame_time: Duration::from_millis(33),
            cols: 80,
            rows: 24,
        }
    }

    /// Map a CSS color string onto a terminal color. Gradient stops and the
    /// few rgba() fallbacks degrade to their nearest plain color.
    fn terminal_color(css: &str) -> Color {
        let hex = match css.strip_prefix('#') {
            Some(h) => h,
            None => return Color::White,
        };
        let parse = |s: &str| u8::from_str_radix(s, 16).unwrap_or(0);
        match hex.len() {
            6 => Color::Rgb {
                r: parse(&hex[0..2]),
                g: parse(&hex[2..4]),
                b: parse(&hex[4..6]),
            },
            3 => {
                let d = |i: usize| parse(&hex[i..i + 1]) * 17;
                Color::Rgb { r: d(0), g: d(1), b: d(2) }
            }
            _ => Color::White,
        }
    }

    fn paint_cells(
        grid: &mut [Vec<Color>],
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        sx: f64,
        sy: f64,
        color: Color,
    ) {
        let rows = grid.len() as isize;
        if rows == 0 {
            return;
        }
        let cols = grid[0].len() as isize;
        let cx0 = (x0 * sx).floor() as isize;
        let cx1 = (x1 * sx).ceil() as isize;
        let cy0 = (y0 * sy).floor() as isize;
        let cy1 = (y1 * sy).ceil() as isize;
        for cy in cy0.max(0)..cy1.min(rows) {
            for cx in cx0.max(0)..cx1.min(cols) {
                grid[cy as usize][cx as usize] = color;
            }
        }
    }
}

impl Default for CliRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for CliRenderer {
    fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        let (cols, rows) = terminal::size()?;
        self.cols = cols.max(40);
        self.rows = rows.max(12);
        let mut stdout = io::stdout();
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            terminal::Clear(ClearType::All),
            cursor::Hide
        )?;
        Ok(())
    }

    fn render(&mut self, scene: &Scene) -> io::Result<()> {
        // Frame rate limiting: skip rendering if not enough time has passed
        if self.last_render.elapsed() < self.target_frame_time {
            return Ok(());
        }
        self.last_render = Instant::now();

        let cols = self.cols as usize;
        let rows = (self.rows - INFO_ROWS) as usize;
        let sx = cols as f64 / scene.width;
        let sy = rows as f64 / scene.height;

        let mut grid = vec![vec![Color::Black; cols]; rows];
        let mut texts: Vec<(usize, usize, String, Color)> = Vec::new();

        for cmd in &scene.cmds {
            match cmd {
                DrawCmd::Clear => {
                    for row in &mut grid {
                        row.fill(Color::Black);
                    }
                }
                DrawCmd::FillRect { rect, color } => {
                    Self::paint_cells(
                        &mut grid,
                        rect.x,
                        rect.y,
                        rect.right(),
                        rect.bottom(),
                        sx,
                        sy,
                        Self::terminal_color(color.0),
                    );
                }
                DrawCmd::StrokeRect { rect, color, .. } => {
                    let c = Self::terminal_color(color.0);
                    Self::paint_cells(&mut grid, rect.x, rect.y, rect.right(), rect.y + 1.0, sx, sy, c);
                    Self::paint_cells(&mut grid, rect.x, rect.bottom() - 1.0, rect.right(), rect.bottom(), sx, sy, c);
                }
                DrawCmd::FillCircle { cx, cy, r, color } => {
                    Self::paint_cells(
                        &mut grid,
                        cx - r,
                        cy - r,
                        cx + r,
                        cy + r,
                        sx,
                        sy,
                        Self::terminal_color(color.0),
                    );
                }
                DrawCmd::Gradient { rect, stops } => {
                    if let Some((_, css)) = stops.first() {
                        Self::paint_cells(
                            &mut grid,
                            rect.x,
                            rect.y,
                            rect.right(),
                            rect.bottom(),
                            sx,
                            sy,
                            Self::terminal_color(css),
                        );
                    }
                }
                DrawCmd::Sprite { .. } => {
                    // no images on the terminal; fallback shapes cover this
                }
                DrawCmd::Text { text, x, y, color, .. } => {
                    let cx = ((x * sx) as usize).min(cols.saturating_sub(1));
                    let cy = ((y * sy) as usize).min(rows.saturating_sub(1));
                    texts.push((cx, cy, text.clone(), Self::terminal_color(color.0)));
                }
            }
        }

        let mut stdout = io::stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;
        for row in &grid {
            for color in row {
                queue!(stdout, SetBackgroundColor(*color), Print(" "))?;
            }
            queue!(stdout, ResetColor, Print("\r\n"))?;
        }
        for (cx, cy, text, color) in texts {
            queue!(
                stdout,
                cursor::MoveTo(cx as u16, cy as u16),
                SetForegroundColor(color),
                Print(text),
                ResetColor
            )?;
        }

        // Info display
        queue!(
            stdout,
            cursor::MoveTo(0, rows as u16),
            ResetColor,
            terminal::Clear(ClearType::FromCursorDown),
            Print(format!("Score: {}  Best: {}", scene.hud.score, scene.hud.best))
        )?;
        queue!(
            stdout,
            cursor::MoveTo(0, rows as u16 + 1),
            Print("Controls: Space to jump | Q to quit | R to restart")
        )?;
        if scene.hud.over {
            queue!(
                stdout,
                cursor::MoveTo(0, rows as u16 + 2),
                SetForegroundColor(Color::Red),
                Print("GAME OVER! Press R to restart"),
                ResetColor
            )?;
        }

        stdout.flush()?;
        Ok(())
    }

    fn cleanup(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            cursor::Show,
            terminal::LeaveAlternateScreen,
            ResetColor
        )?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    fn poll_input(&mut self) -> io::Result<Option<Input>> {
        if event::poll(Duration::from_millis(5))? {
            if let Event::Key(KeyEvent { code, .. }) = event::read()? {
                match code {
                    KeyCode::Char('q') | KeyCode::Char('Q') => {
                        return Ok(Some(Input::Quit));
                    }
                    KeyCode::Char('r') | KeyCode::Char('R') => {
                        return Ok(Some(Input::Restart));
                    }
                    KeyCode::Char(' ') | KeyCode::Up => return Ok(Some(Input::Flap)),
                    _ => {}
                }
            }
        }
        Ok(None)
    }
}

impl Drop for CliRenderer {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_color_parses_hex() {
        assert_eq!(
            CliRenderer::terminal_color("#228B22"),
            Color::Rgb { r: 0x22, g: 0x8B, b: 0x22 }
        );
        assert_eq!(
            CliRenderer::terminal_color("#ddd"),
            Color::Rgb { r: 0xDD, g: 0xDD, b: 0xDD }
        );
        assert_eq!(
            CliRenderer::terminal_color("rgba(255, 255, 255, 0.8)"),
            Color::White
        );
    }

    #[test]
    fn test_paint_cells_clips_to_grid() {
        let mut grid = vec![vec![Color::Black; 10]; 5];
        // rect hanging off every edge still paints only in-bounds cells
        CliRenderer::paint_cells(&mut grid, -50.0, -50.0, 1000.0, 1000.0, 0.1, 0.1, Color::Blue);
        assert!(grid.iter().flatten().all(|c| *c == Color::Blue));

        let mut grid = vec![vec![Color::Black; 10]; 5];
        CliRenderer::paint_cells(&mut grid, -100.0, -100.0, -50.0, -50.0, 0.1, 0.1, Color::Blue);
        assert!(grid.iter().flatten().all(|c| *c == Color::Black));
    }
}
