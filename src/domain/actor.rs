/// Actors: axis-aligned boxes that live on top of the tile grid.
///
/// One `Actor` type covers every kind. What differs per kind is the
/// construction-time geometry and the `Behavior` that `act` dispatches on:
///   - `Still`      — never moves on its own (player, generic actors)
///   - `Projectile` — moves at constant speed, bounces or resets on obstacles
///   - `Spring`     — bobs around a fixed anchor (coins)

use std::sync::atomic::{AtomicU32, Ordering};

use rand::Rng;
use serde::Deserialize;

use super::tile::Tile;
use super::vector::Vector;

pub const COIN_SPRING_SPEED: f64 = 8.0;
pub const COIN_SPRING_DIST: f64 = 0.07;

/// Read-only obstacle query that movers test against before committing a move.
pub trait Terrain {
    fn obstacle_at(&self, pos: Vector, size: Vector) -> Tile;
}

/// Identity of an actor within one level.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ActorId(pub u32);

/// Ids handed out outside the parser start in the upper half of the range,
/// clear of the small row-major ids the parser assigns.
static NEXT_FRESH_ID: AtomicU32 = AtomicU32::new(1 << 31);

impl ActorId {
    /// A process-wide unique id.
    pub fn fresh() -> Self {
        ActorId(NEXT_FRESH_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    Generic,
    Player,
    Coin,
    HorizontalFireball,
    VerticalFireball,
    FireRain,
}

impl ActorKind {
    /// Every projectile counts as a fireball when it touches the player.
    pub fn is_fireball(self) -> bool {
        matches!(
            self,
            ActorKind::HorizontalFireball | ActorKind::VerticalFireball | ActorKind::FireRain
        )
    }
}

/// What a projectile does when its next position is blocked.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ObstaclePolicy {
    /// Reverse velocity.
    Bounce,
    /// Jump back to the recorded spawn position, keeping velocity.
    ResetTo(Vector),
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Behavior {
    Still,
    Projectile { on_obstacle: ObstaclePolicy },
    Spring { start: Vector, phase: f64 },
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Actor {
    pub id: ActorId,
    pub kind: ActorKind,
    pub pos: Vector,
    pub size: Vector,
    pub speed: Vector,
    pub behavior: Behavior,
}

impl Default for Actor {
    fn default() -> Self {
        Actor::new(ActorId::fresh(), Vector::ZERO, Vector::new(1.0, 1.0), Vector::ZERO)
    }
}

// ── Construction ──

impl Actor {
    /// Generic, passive actor.
    pub fn new(id: ActorId, pos: Vector, size: Vector, speed: Vector) -> Self {
        debug_assert!(size.x > 0.0 && size.y > 0.0, "actor size must be positive");
        Actor { id, kind: ActorKind::Generic, pos, size, speed, behavior: Behavior::Still }
    }

    /// Build an actor of `kind` for the grid cell `cell`.
    /// Kinds apply their own offsets, so `cell` is not necessarily the final `pos`.
    pub fn spawn<R: Rng>(kind: ActorKind, id: ActorId, cell: Vector, rng: &mut R) -> Self {
        match kind {
            ActorKind::Generic => Actor::new(id, cell, Vector::new(1.0, 1.0), Vector::ZERO),
            ActorKind::Player => Actor::player(id, cell),
            ActorKind::Coin => Actor::coin(id, cell, rng),
            ActorKind::HorizontalFireball => Actor::horizontal_fireball(id, cell),
            ActorKind::VerticalFireball => Actor::vertical_fireball(id, cell),
            ActorKind::FireRain => Actor::fire_rain(id, cell),
        }
    }

    pub fn player(id: ActorId, cell: Vector) -> Self {
        Actor {
            kind: ActorKind::Player,
            ..Actor::new(id, cell.plus(Vector::new(0.0, -0.5)), Vector::new(0.8, 1.5), Vector::ZERO)
        }
    }

    /// Coin with a random initial spring phase in `[0, 2π)`.
    pub fn coin<R: Rng>(id: ActorId, cell: Vector, rng: &mut R) -> Self {
        let start = cell.plus(Vector::new(0.2, 0.1));
        let phase = std::f64::consts::TAU * rng.random::<f64>();
        Actor {
            kind: ActorKind::Coin,
            behavior: Behavior::Spring { start, phase },
            ..Actor::new(id, start, Vector::new(0.6, 0.6), Vector::ZERO)
        }
    }

    pub fn horizontal_fireball(id: ActorId, cell: Vector) -> Self {
        Actor::fireball(id, ActorKind::HorizontalFireball, cell, Vector::new(2.0, 0.0), ObstaclePolicy::Bounce)
    }

    pub fn vertical_fireball(id: ActorId, cell: Vector) -> Self {
        Actor::fireball(id, ActorKind::VerticalFireball, cell, Vector::new(0.0, 2.0), ObstaclePolicy::Bounce)
    }

    pub fn fire_rain(id: ActorId, cell: Vector) -> Self {
        Actor::fireball(id, ActorKind::FireRain, cell, Vector::new(0.0, 3.0), ObstaclePolicy::ResetTo(cell))
    }

    fn fireball(id: ActorId, kind: ActorKind, cell: Vector, speed: Vector, on_obstacle: ObstaclePolicy) -> Self {
        Actor {
            kind,
            behavior: Behavior::Projectile { on_obstacle },
            ..Actor::new(id, cell, Vector::new(1.0, 1.0), speed)
        }
    }
}

// ── Geometry ──

impl Actor {
    pub fn left(&self) -> f64 { self.pos.x }
    pub fn top(&self) -> f64 { self.pos.y }
    pub fn right(&self) -> f64 { self.pos.x + self.size.x }
    pub fn bottom(&self) -> f64 { self.pos.y + self.size.y }

    /// Strict box overlap. Never true against itself; boxes that only
    /// share an edge do not intersect.
    pub fn is_intersect(&self, other: &Actor) -> bool {
        other.id != self.id
            && other.left() < self.right()
            && other.right() > self.left()
            && other.bottom() > self.top()
            && other.top() < self.bottom()
    }
}

// ── Behavior ──

impl Actor {
    /// Where a projectile would be after `dt` at its current speed.
    pub fn next_position(&self, dt: f64) -> Vector {
        self.pos.plus(self.speed.times(dt))
    }

    /// Current spring displacement from the anchor. Zero for non-springs.
    pub fn spring_vector(&self) -> Vector {
        match self.behavior {
            Behavior::Spring { phase, .. } => Vector::new(0.0, phase.sin() * COIN_SPRING_DIST),
            _ => Vector::ZERO,
        }
    }

    /// Advance this actor by `dt` seconds.
    pub fn act<T: Terrain + ?Sized>(&mut self, dt: f64, terrain: &T) {
        match self.behavior {
            Behavior::Still => {}
            Behavior::Projectile { on_obstacle } => {
                let next = self.next_position(dt);
                if !terrain.obstacle_at(next, self.size).is_obstacle() {
                    self.pos = next;
                } else {
                    match on_obstacle {
                        ObstaclePolicy::Bounce => self.speed = self.speed.times(-1.0),
                        ObstaclePolicy::ResetTo(spawn) => self.pos = spawn,
                    }
                }
            }
            Behavior::Spring { start, phase } => {
                self.behavior = Behavior::Spring { start, phase: phase + dt * COIN_SPRING_SPEED };
                self.pos = start.plus(self.spring_vector());
            }
        }
    }
}
