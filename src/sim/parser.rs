/// Level parser: text rows -> populated `Level`.
///
/// Two independent symbol tables are applied to every character:
///   - tiles (fixed): `x` = wall, `!` = lava, anything else empty
///   - actors (caller-supplied): symbol -> `ActorKind`
///
/// An actor symbol still yields an empty tile under it; a symbol in
/// neither table yields nothing at all.
///
/// Coin phases come from a `Pcg32` seeded fresh on every `parse`, so the
/// same rows with the same seed always give the same level.

use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::domain::actor::{Actor, ActorId, ActorKind};
use crate::domain::tile::Tile;
use crate::domain::vector::Vector;
use super::level::Level;

#[derive(Clone, Debug)]
pub struct LevelParser {
    actor_symbols: HashMap<char, ActorKind>,
    seed: u64,
}

impl LevelParser {
    pub fn new(actor_symbols: HashMap<char, ActorKind>, seed: u64) -> Self {
        LevelParser { actor_symbols, seed }
    }

    /// The usual table: `@` player, `o` coin, `=` `|` `v` fireballs.
    pub fn default_symbols() -> HashMap<char, ActorKind> {
        HashMap::from([
            ('@', ActorKind::Player),
            ('o', ActorKind::Coin),
            ('=', ActorKind::HorizontalFireball),
            ('|', ActorKind::VerticalFireball),
            ('v', ActorKind::FireRain),
        ])
    }

    pub fn actor_from_symbol(&self, ch: char) -> Option<ActorKind> {
        self.actor_symbols.get(&ch).copied()
    }

    pub fn obstacle_from_symbol(&self, ch: char) -> Tile {
        Tile::from_symbol(ch)
    }

    /// One tile row per text row; rows keep their own lengths.
    pub fn create_grid<S: AsRef<str>>(&self, rows: &[S]) -> Vec<Vec<Tile>> {
        rows.iter()
            .map(|row| row.as_ref().chars().map(|ch| self.obstacle_from_symbol(ch)).collect())
            .collect()
    }

    /// Actors for every mapped symbol, in row-major order, ids from 1.
    pub fn create_actors<S: AsRef<str>, R: Rng>(&self, rows: &[S], rng: &mut R) -> Vec<Actor> {
        let mut actors = vec![];
        let mut next_id = 1;

        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.as_ref().chars().enumerate() {
                let kind = match self.actor_from_symbol(ch) {
                    Some(k) => k,
                    None => continue,
                };
                let cell = Vector::new(x as f64, y as f64);
                actors.push(Actor::spawn(kind, ActorId(next_id), cell, rng));
                next_id += 1;
            }
        }

        actors
    }

    pub fn parse<S: AsRef<str>>(&self, rows: &[S]) -> Level {
        let mut rng = Pcg32::seed_from_u64(self.seed);
        let level = Level::new(self.create_grid(rows), self.create_actors(rows, &mut rng));
        log::debug!(
            "parsed level {}x{} with {} actors",
            level.width, level.height, level.actors.len(),
        );
        level
    }
}

impl Default for LevelParser {
    fn default() -> Self {
        LevelParser::new(LevelParser::default_symbols(), 0)
    }
}
