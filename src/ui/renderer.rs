/// Presentation layer: terminal renderer.
///
/// Reads the level, never mutates it. Each frame is composed into a cell
/// buffer (tiles first, actors on top), then emitted row by row with
/// `queue!` and flushed once.

use std::io::{self, BufWriter, Stdout, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::actor::{Actor, ActorKind};
use crate::domain::tile::Tile;
use crate::sim::level::{Level, Status};

const STATUS_ROW_GAP: u16 = 1;

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    ch: char,
    fg: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: Color::Reset };

    fn for_tile(tile: Tile) -> Cell {
        match tile {
            Tile::Empty => Cell::BLANK,
            Tile::Wall => Cell { ch: '#', fg: Color::Grey },
            Tile::Lava => Cell { ch: '~', fg: Color::Red },
        }
    }

    fn for_actor(kind: ActorKind) -> Cell {
        match kind {
            ActorKind::Player => Cell { ch: '@', fg: Color::Cyan },
            ActorKind::Coin => Cell { ch: 'o', fg: Color::Yellow },
            ActorKind::HorizontalFireball | ActorKind::VerticalFireball | ActorKind::FireRain => {
                Cell { ch: '*', fg: Color::Rgb { r: 255, g: 140, b: 0 } }
            }
            ActorKind::Generic => Cell { ch: '?', fg: Color::Magenta },
        }
    }
}

/// What the status line shows besides the level itself.
pub struct Hud<'a> {
    pub level_name: &'a str,
    pub level_number: usize,
    pub level_count: usize,
    pub message: &'a str,
}

pub struct Renderer {
    out: BufWriter<Stdout>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer { out: BufWriter::new(io::stdout()) }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(self.out, terminal::EnterAlternateScreen, cursor::Hide, Clear(ClearType::All))
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.out, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    /// Wipe leftovers from a previous, possibly larger, level.
    pub fn clear(&mut self) -> io::Result<()> {
        execute!(self.out, Clear(ClearType::All))
    }

    pub fn render(&mut self, level: &Level, hud: &Hud) -> io::Result<()> {
        let frame = compose(level);

        for (y, row) in frame.iter().enumerate() {
            queue!(self.out, MoveTo(0, y as u16))?;
            let mut fg = None;
            for cell in row {
                if fg != Some(cell.fg) {
                    queue!(self.out, SetForegroundColor(cell.fg))?;
                    fg = Some(cell.fg);
                }
                queue!(self.out, Print(cell.ch))?;
            }
        }

        let status_y = level.height as u16 + STATUS_ROW_GAP;
        let outcome = match level.status {
            None => "",
            Some(Status::Won) => "  LEVEL CLEARED",
            Some(Status::Lost) => "  LOST",
        };
        let coins = level.actors.iter().filter(|a| a.kind == ActorKind::Coin).count();
        queue!(
            self.out,
            MoveTo(0, status_y),
            ResetColor,
            Clear(ClearType::CurrentLine),
            Print(format!(
                "[{}/{}] {}  coins left: {}{}",
                hud.level_number, hud.level_count, hud.level_name, coins, outcome,
            )),
            MoveTo(0, status_y + 1),
            Clear(ClearType::CurrentLine),
            Print(hud.message),
            MoveTo(0, status_y + 2),
            Clear(ClearType::CurrentLine),
            Print("arrows/WASD move   q/Esc quit"),
        )?;

        self.out.flush()
    }
}

/// Tiles, then actors in list order (later actors draw over earlier ones).
fn compose(level: &Level) -> Vec<Vec<Cell>> {
    let mut frame: Vec<Vec<Cell>> = (0..level.height)
        .map(|y| (0..level.width).map(|x| Cell::for_tile(level.tile_at(x, y))).collect())
        .collect();

    for actor in &level.actors {
        let cell = Cell::for_actor(actor.kind);
        for (x, y) in covered_cells(actor, level.width, level.height) {
            frame[y][x] = cell;
        }
    }
    frame
}

/// Grid cells under an actor's box, clipped to the level.
fn covered_cells(actor: &Actor, width: usize, height: usize) -> Vec<(usize, usize)> {
    let x0 = actor.left().floor().max(0.0) as usize;
    let y0 = actor.top().floor().max(0.0) as usize;
    let x1 = (actor.right().ceil().max(0.0) as usize).min(width);
    let y1 = (actor.bottom().ceil().max(0.0) as usize).min(height);

    let mut cells = vec![];
    for y in y0..y1 {
        for x in x0..x1 {
            cells.push((x, y));
        }
    }
    cells
}
