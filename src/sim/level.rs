/// Level: the static tile grid plus the dynamic actor list.
///
/// ## Grid
///   Rows may be ragged. `width` is the longest row, `height` the row count.
///   Cells past the end of a short row read as `Tile::Empty`.
///
/// ## Outcome state machine
///   `status` starts as `None` and is written only by `player_touched`,
///   exactly once, to `Won` or `Lost`. After that the level keeps animating
///   while `finish_delay` counts down; `is_finished()` turns true once it
///   drops below zero.
///
/// ## Identity
///   Every actor in a level has a distinct `ActorId`. `Level::new` gives
///   duplicates a new id, so two equal copies still count as two actors.
///
/// ## Player
///   `player` is an index into `actors`, never a second owner. It is
///   recomputed whenever the actor list shrinks.

use std::collections::HashSet;

use crate::domain::actor::{Actor, ActorId, ActorKind, Terrain};
use crate::domain::tile::Tile;
use crate::domain::vector::Vector;

pub const FINISH_DELAY: f64 = 1.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Status {
    Won,
    Lost,
}

/// What the player came into contact with.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Touch {
    Tile(Tile),
    Actor(ActorKind),
}

#[derive(Clone, Debug)]
pub struct Level {
    pub grid: Vec<Vec<Tile>>,
    pub width: usize,
    pub height: usize,
    pub actors: Vec<Actor>,
    pub status: Option<Status>,
    pub finish_delay: f64,
    player: Option<usize>,
}

// ── Construction ──

impl Level {
    pub fn new(grid: Vec<Vec<Tile>>, mut actors: Vec<Actor>) -> Self {
        assign_unique_ids(&mut actors);
        let width = grid.iter().map(|row| row.len()).max().unwrap_or(0);
        let height = grid.len();
        let mut level = Level {
            grid,
            width,
            height,
            actors,
            status: None,
            finish_delay: FINISH_DELAY,
            player: None,
        };
        level.refresh_player();
        level
    }

    fn refresh_player(&mut self) {
        self.player = self.actors.iter().position(|a| a.kind == ActorKind::Player);
    }
}

/// Re-id every actor whose id is already taken by an earlier one.
fn assign_unique_ids(actors: &mut [Actor]) {
    let mut taken: HashSet<ActorId> = actors.iter().map(|a| a.id).collect();
    if taken.len() == actors.len() {
        return;
    }
    let mut seen = HashSet::new();
    let mut next = 0u32;
    for actor in actors.iter_mut() {
        if seen.insert(actor.id) {
            continue;
        }
        while taken.contains(&ActorId(next)) {
            next = next.wrapping_add(1);
        }
        log::debug!("duplicate actor id {:?}, reassigned to {next}", actor.id);
        actor.id = ActorId(next);
        taken.insert(actor.id);
        seen.insert(actor.id);
    }
}

// ── Queries ──

impl Level {
    /// The first player actor, if the level has one.
    pub fn player(&self) -> Option<&Actor> {
        self.player.map(|i| &self.actors[i])
    }

    /// Mutable access for the external movement driver.
    pub fn player_mut(&mut self) -> Option<&mut Actor> {
        let idx = self.player?;
        self.actors.get_mut(idx)
    }

    /// Tile at a grid cell. Missing cells (short rows, out of range) are empty.
    pub fn tile_at(&self, x: usize, y: usize) -> Tile {
        self.grid
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(Tile::Empty)
    }

    /// Obstacle a box of `size` would hit at `pos`.
    ///
    /// Off the left, top or right edge is `Wall`; below the bottom is `Lava`.
    /// Otherwise the covered cells are scanned row by row, left to right,
    /// and the first non-empty tile wins.
    pub fn obstacle_at(&self, pos: Vector, size: Vector) -> Tile {
        let right = pos.x + size.x;
        let bottom = pos.y + size.y;

        if pos.x < 0.0 || pos.y < 0.0 || right > self.width as f64 {
            return Tile::Wall;
        }
        if bottom > self.height as f64 {
            return Tile::Lava;
        }

        let x_start = pos.x.floor() as usize;
        let x_end = right.ceil() as usize;
        let y_start = pos.y.floor() as usize;
        let y_end = bottom.ceil() as usize;

        for y in y_start..y_end {
            for x in x_start..x_end {
                let tile = self.tile_at(x, y);
                if tile.is_obstacle() {
                    return tile;
                }
            }
        }
        Tile::Empty
    }

    /// First actor in list order (other than `actor`) that overlaps it.
    pub fn actor_at(&self, actor: &Actor) -> Option<&Actor> {
        self.actors.iter().find(|a| a.is_intersect(actor))
    }

    /// No actor of `kind` remains.
    pub fn no_more_actors(&self, kind: ActorKind) -> bool {
        !self.actors.iter().any(|a| a.kind == kind)
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_some() && self.finish_delay < 0.0
    }
}

impl Terrain for Level {
    fn obstacle_at(&self, pos: Vector, size: Vector) -> Tile {
        Level::obstacle_at(self, pos, size)
    }
}

// ── Mutation ──

impl Level {
    /// Remove the actor with this identity. No-op if absent.
    pub fn remove_actor(&mut self, id: ActorId) {
        if let Some(idx) = self.actors.iter().position(|a| a.id == id) {
            self.actors.remove(idx);
            self.refresh_player();
        }
    }

    /// Win/lose transition. Ignored once an outcome is set.
    ///
    /// Lava or any fireball loses. A coin is consumed (`actor` is its id);
    /// taking the last coin wins. Anything else is ignored.
    pub fn player_touched(&mut self, touch: Touch, actor: Option<ActorId>) {
        if self.status.is_some() {
            return;
        }

        match touch {
            Touch::Tile(Tile::Lava) => self.status = Some(Status::Lost),
            Touch::Actor(kind) if kind.is_fireball() => self.status = Some(Status::Lost),
            Touch::Actor(ActorKind::Coin) => {
                if let Some(id) = actor {
                    self.remove_actor(id);
                }
                if self.no_more_actors(ActorKind::Coin) {
                    self.status = Some(Status::Won);
                }
            }
            Touch::Tile(Tile::Empty | Tile::Wall) => {}
            Touch::Actor(
                ActorKind::Generic
                | ActorKind::Player
                | ActorKind::HorizontalFireball
                | ActorKind::VerticalFireball
                | ActorKind::FireRain,
            ) => {}
        }
    }

    /// One simulation step.
    ///
    /// Order:
    ///   1. Every actor acts, in list order, against the live level
    ///   2. Player vs actors (first overlap in list order)
    ///   3. Player vs lava tiles
    ///   4. Finish delay countdown once an outcome is set
    pub fn tick(&mut self, dt: f64) {
        for idx in 0..self.actors.len() {
            let mut actor = self.actors[idx];
            actor.act(dt, &*self);
            self.actors[idx] = actor;
        }

        if let Some(player) = self.player().copied() {
            if let Some(other) = self.actor_at(&player).copied() {
                self.player_touched(Touch::Actor(other.kind), Some(other.id));
            }
            if self.obstacle_at(player.pos, player.size) == Tile::Lava {
                self.player_touched(Touch::Tile(Tile::Lava), None);
            }
        }

        if self.status.is_some() {
            self.finish_delay -= dt;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::actor::Behavior;

    fn grid_from(rows: &[&str]) -> Vec<Vec<Tile>> {
        rows.iter()
            .map(|row| row.chars().map(Tile::from_symbol).collect())
            .collect()
    }

    fn v(x: f64, y: f64) -> Vector {
        Vector::new(x, y)
    }

    fn still_coin(id: u32, x: f64, y: f64) -> Actor {
        Actor {
            kind: ActorKind::Coin,
            behavior: Behavior::Spring { start: v(x + 0.2, y + 0.1), phase: 0.0 },
            ..Actor::new(ActorId(id), v(x + 0.2, y + 0.1), v(0.6, 0.6), Vector::ZERO)
        }
    }

    // ── Construction ──

    #[test]
    fn ragged_grid_width_is_longest_row() {
        let level = Level::new(grid_from(&["x", "xxx", ""]), vec![]);
        assert_eq!(level.width, 3);
        assert_eq!(level.height, 3);
        assert_eq!(level.tile_at(2, 0), Tile::Empty);
        assert_eq!(level.tile_at(2, 1), Tile::Wall);
        assert_eq!(level.status, None);
        assert_eq!(level.finish_delay, 1.0);
    }

    #[test]
    fn player_is_first_player_actor() {
        let a = Actor::new(ActorId(1), v(0.0, 0.0), v(1.0, 1.0), Vector::ZERO);
        let p1 = Actor::player(ActorId(2), v(1.0, 1.0));
        let p2 = Actor::player(ActorId(3), v(2.0, 1.0));
        let level = Level::new(vec![], vec![a, p1, p2]);
        assert_eq!(level.player().map(|p| p.id), Some(ActorId(2)));
    }

    #[test]
    fn no_player_without_player_actor() {
        let level = Level::new(vec![], vec![Actor::default()]);
        assert!(level.player().is_none());
    }

    // ── obstacle_at ──

    #[test]
    fn outside_left_top_right_is_wall() {
        let level = Level::new(grid_from(&["   ", "   "]), vec![]);
        assert_eq!(level.obstacle_at(v(-0.5, 0.0), v(1.0, 1.0)), Tile::Wall);
        assert_eq!(level.obstacle_at(v(0.0, -0.1), v(1.0, 1.0)), Tile::Wall);
        assert_eq!(level.obstacle_at(v(2.5, 0.0), v(1.0, 1.0)), Tile::Wall);
        assert_eq!(level.obstacle_at(v(10.0, 10.0), v(1.0, 1.0)), Tile::Wall);
    }

    #[test]
    fn below_bottom_is_lava() {
        let level = Level::new(grid_from(&["   ", "   "]), vec![]);
        assert_eq!(level.obstacle_at(v(0.0, 1.5), v(1.0, 1.0)), Tile::Lava);
        assert_eq!(level.obstacle_at(v(1.0, 5.0), v(1.0, 1.0)), Tile::Lava);
    }

    #[test]
    fn empty_interior_is_empty() {
        let level = Level::new(grid_from(&["   ", "   "]), vec![]);
        assert_eq!(level.obstacle_at(v(0.0, 0.0), v(3.0, 2.0)), Tile::Empty);
        assert_eq!(level.obstacle_at(v(0.5, 0.5), v(1.0, 1.0)), Tile::Empty);
    }

    #[test]
    fn partial_overlap_hits_tile() {
        let level = Level::new(grid_from(&["   ", "  x"]), vec![]);
        // Box covers cells x=1..=2, y=0..=1
        assert_eq!(level.obstacle_at(v(1.5, 0.5), v(1.0, 1.0)), Tile::Wall);
        // Exactly touching the wall cell edge does not cover it
        assert_eq!(level.obstacle_at(v(1.0, 1.0), v(1.0, 1.0)), Tile::Empty);
    }

    #[test]
    fn first_hit_in_row_major_order() {
        let level = Level::new(grid_from(&[" !", "x "]), vec![]);
        assert_eq!(level.obstacle_at(v(0.0, 0.0), v(2.0, 2.0)), Tile::Lava);
        let level = Level::new(grid_from(&["!x", "  "]), vec![]);
        assert_eq!(level.obstacle_at(v(0.0, 0.0), v(2.0, 1.0)), Tile::Lava);
    }

    #[test]
    fn short_row_cells_are_empty() {
        let level = Level::new(grid_from(&["xxx", "x"]), vec![]);
        assert_eq!(level.obstacle_at(v(1.0, 1.0), v(2.0, 1.0)), Tile::Empty);
    }

    // ── actor_at / remove_actor / no_more_actors ──

    #[test]
    fn actor_at_skips_self_and_follows_list_order() {
        let p = Actor::player(ActorId(1), v(1.0, 1.0));
        let far = still_coin(2, 5.0, 5.0);
        let c1 = still_coin(3, 1.0, 1.0);
        let c2 = still_coin(4, 1.0, 1.0);
        let level = Level::new(vec![], vec![p, far, c1, c2]);
        assert_eq!(level.actor_at(&p).map(|a| a.id), Some(ActorId(3)));
        assert!(level.actor_at(&far).is_none());
    }

    #[test]
    fn default_actors_are_distinct_in_level() {
        let a = Actor::default();
        let b = Actor::default();
        let mut level = Level::new(vec![], vec![a, b]);
        assert_eq!(level.actor_at(&a).map(|x| x.id), Some(b.id));

        level.remove_actor(a.id);
        assert_eq!(level.actors.len(), 1);
        assert_eq!(level.actors[0].id, b.id);
    }

    #[test]
    fn duplicate_ids_are_reassigned() {
        let a = Actor::default();
        let mut level = Level::new(vec![], vec![a, a, a]);
        let ids: HashSet<_> = level.actors.iter().map(|x| x.id).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(level.actors[0].id, a.id);
        assert_eq!(level.actor_at(&level.actors[0]).map(|x| x.id), Some(level.actors[1].id));

        let second = level.actors[1].id;
        level.remove_actor(second);
        assert_eq!(level.actors.len(), 2);
        assert!(level.actors.iter().all(|x| x.id != second));
    }

    #[test]
    fn remove_actor_by_identity() {
        let p = Actor::player(ActorId(1), v(1.0, 1.0));
        let c = still_coin(2, 3.0, 1.0);
        let mut level = Level::new(vec![], vec![c, p]);
        assert_eq!(level.player().map(|a| a.id), Some(ActorId(1)));

        level.remove_actor(ActorId(9));
        assert_eq!(level.actors.len(), 2);

        level.remove_actor(ActorId(2));
        assert_eq!(level.actors.len(), 1);
        assert!(level.no_more_actors(ActorKind::Coin));
        // Player index shifted from 1 to 0
        assert_eq!(level.player().map(|a| a.id), Some(ActorId(1)));
    }

    #[test]
    fn removing_player_clears_reference() {
        let p = Actor::player(ActorId(1), v(1.0, 1.0));
        let mut level = Level::new(vec![], vec![p]);
        level.remove_actor(ActorId(1));
        assert!(level.player().is_none());
    }

    // ── player_touched ──

    #[test]
    fn coin_touch_removes_coin_and_wins_on_last() {
        let c1 = still_coin(1, 0.0, 0.0);
        let c2 = still_coin(2, 2.0, 0.0);
        let mut level = Level::new(vec![], vec![c1, c2]);

        level.player_touched(Touch::Actor(ActorKind::Coin), Some(ActorId(1)));
        assert_eq!(level.actors.len(), 1);
        assert_eq!(level.status, None);

        level.player_touched(Touch::Actor(ActorKind::Coin), Some(ActorId(2)));
        assert!(level.actors.is_empty());
        assert_eq!(level.status, Some(Status::Won));
    }

    #[test]
    fn status_is_permanent() {
        let c1 = still_coin(1, 0.0, 0.0);
        let c2 = still_coin(2, 2.0, 0.0);
        let mut level = Level::new(vec![], vec![c1, c2]);

        level.player_touched(Touch::Tile(Tile::Lava), None);
        assert_eq!(level.status, Some(Status::Lost));

        level.player_touched(Touch::Actor(ActorKind::Coin), Some(ActorId(1)));
        level.player_touched(Touch::Actor(ActorKind::Coin), Some(ActorId(2)));
        assert_eq!(level.status, Some(Status::Lost));
        assert_eq!(level.actors.len(), 2);
    }

    #[test]
    fn won_is_not_overwritten_by_lava() {
        let c = still_coin(1, 0.0, 0.0);
        let mut level = Level::new(vec![], vec![c]);
        level.player_touched(Touch::Actor(ActorKind::Coin), Some(ActorId(1)));
        level.player_touched(Touch::Tile(Tile::Lava), None);
        assert_eq!(level.status, Some(Status::Won));
    }

    #[test]
    fn any_fireball_loses() {
        for kind in [ActorKind::HorizontalFireball, ActorKind::VerticalFireball, ActorKind::FireRain] {
            let mut level = Level::new(vec![], vec![]);
            level.player_touched(Touch::Actor(kind), None);
            assert_eq!(level.status, Some(Status::Lost));
        }
    }

    #[test]
    fn other_touches_are_ignored() {
        let mut level = Level::new(vec![], vec![still_coin(1, 0.0, 0.0)]);
        level.player_touched(Touch::Tile(Tile::Wall), None);
        level.player_touched(Touch::Tile(Tile::Empty), None);
        level.player_touched(Touch::Actor(ActorKind::Generic), Some(ActorId(1)));
        level.player_touched(Touch::Actor(ActorKind::Player), Some(ActorId(1)));
        assert_eq!(level.status, None);
        assert_eq!(level.actors.len(), 1);
    }

    // ── is_finished / tick ──

    #[test]
    fn finished_needs_status_and_negative_delay() {
        let mut level = Level::new(vec![], vec![]);
        level.finish_delay = -1.0;
        assert!(!level.is_finished());
        level.status = Some(Status::Lost);
        assert!(level.is_finished());
        level.finish_delay = 0.0;
        assert!(!level.is_finished());
    }

    #[test]
    fn single_coin_level_wins_then_finishes() {
        let grid = grid_from(&["    ", "    ", "  ! ", "xxxx"]);
        let player = Actor::player(ActorId(1), v(0.0, 1.0));
        let coin = still_coin(2, 0.0, 1.0);
        let mut level = Level::new(grid, vec![player, coin]);

        level.tick(0.5);
        assert_eq!(level.status, Some(Status::Won));
        assert!(level.no_more_actors(ActorKind::Coin));
        assert!(!level.is_finished());

        level.tick(0.5);
        assert_eq!(level.finish_delay, 0.0);
        assert!(!level.is_finished());

        level.tick(0.5);
        assert!(level.is_finished());
        assert_eq!(level.status, Some(Status::Won));
    }

    #[test]
    fn standing_in_lava_loses() {
        let grid = grid_from(&["   ", " ! ", "xxx"]);
        let player = Actor::player(ActorId(1), v(1.0, 1.0));
        let mut level = Level::new(grid, vec![player]);
        level.tick(0.1);
        assert_eq!(level.status, Some(Status::Lost));
    }

    #[test]
    fn fireball_hitting_player_loses() {
        let grid = grid_from(&["      ", "      ", "xxxxxx"]);
        let player = Actor::player(ActorId(1), v(3.0, 1.0));
        let fire = Actor::horizontal_fireball(ActorId(2), v(1.0, 1.0));
        let mut level = Level::new(grid, vec![player, fire]);

        level.tick(0.25); // fireball x: 1.0 -> 1.5, still clear of player at 3.0
        assert_eq!(level.status, None);
        level.tick(0.5); // fireball x: 1.5 -> 2.5, right edge 3.5 overlaps
        assert_eq!(level.status, Some(Status::Lost));
    }

    #[test]
    fn fireball_bounces_at_level_edge() {
        let grid = grid_from(&["      "]);
        let a = Actor::horizontal_fireball(ActorId(1), v(0.0, 0.0));
        let b = Actor::horizontal_fireball(ActorId(2), v(4.0, 0.0));
        let mut level = Level::new(grid, vec![a, b]);
        level.tick(0.5);
        assert_eq!(level.actors[0].pos, v(1.0, 0.0));
        assert_eq!(level.actors[1].pos, v(5.0, 0.0));
        level.tick(0.5); // b would reach x=6..7, past width 6: bounces
        assert_eq!(level.actors[1].pos, v(5.0, 0.0));
        assert_eq!(level.actors[1].speed, v(-2.0, 0.0));
    }
}
