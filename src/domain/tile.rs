/// Static grid tiles and the fixed text symbols that produce them.
/// `Empty` doubles as the "no obstacle" answer of grid queries.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Tile {
    #[default]
    Empty,
    Wall,  // Blocks movers
    Lava,  // Blocks movers, kills the player
}

impl Tile {
    /// Tile for a level text symbol: `x` = wall, `!` = lava, anything else empty.
    pub fn from_symbol(ch: char) -> Tile {
        match ch {
            'x' => Tile::Wall,
            '!' => Tile::Lava,
            _ => Tile::Empty,
        }
    }

    /// Is this an obstacle (anything but empty)?
    pub fn is_obstacle(self) -> bool {
        !matches!(self, Tile::Empty)
    }
}
