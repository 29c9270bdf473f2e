/// The step function: advances a level by one frame.
///
/// Processing order:
///   1. Player movement (external input, walls block, lava does not)
///   2. `Level::tick` (actors act, contacts, finish delay)
///   3. Diff before/after into events
///
/// Movement stops once the level has an outcome; actors keep animating
/// until the level reports finished.

use crate::domain::actor::ActorKind;
use crate::domain::tile::Tile;
use crate::domain::vector::Vector;
use super::event::GameEvent;
use super::level::{Level, Status};

/// Movement direction (continuous while key held)
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveDir {
    Left,
    Right,
    Up,
    Down,
}

impl MoveDir {
    fn unit(self) -> Vector {
        match self {
            MoveDir::Left => Vector::new(-1.0, 0.0),
            MoveDir::Right => Vector::new(1.0, 0.0),
            MoveDir::Up => Vector::new(0.0, -1.0),
            MoveDir::Down => Vector::new(0.0, 1.0),
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(level: &mut Level, dt: f64, movement: Option<MoveDir>, player_speed: f64) -> Vec<GameEvent> {
    let mut events = vec![];

    if level.status.is_none() {
        let velocity = movement.map_or(Vector::ZERO, |dir| dir.unit().times(player_speed));
        move_player(level, velocity, dt);
    }

    let status_before = level.status;
    let coins_before: Vec<_> = level.actors.iter()
        .filter(|a| a.kind == ActorKind::Coin)
        .map(|a| (a.id, a.pos))
        .collect();

    level.tick(dt);

    for (id, pos) in coins_before {
        if !level.actors.iter().any(|a| a.id == id) {
            events.push(GameEvent::CoinCollected { x: pos.x, y: pos.y });
        }
    }

    if status_before.is_none() {
        match level.status {
            Some(Status::Won) => events.push(GameEvent::LevelWon),
            Some(Status::Lost) => {
                events.push(if player_in_lava(level) {
                    GameEvent::PlayerBurned
                } else {
                    GameEvent::PlayerHit
                });
                events.push(GameEvent::LevelLost);
            }
            None => {}
        }
    }

    for event in &events {
        log::debug!("{event:?}");
    }
    events
}

// ══════════════════════════════════════════════════════════════
// Player movement
// ══════════════════════════════════════════════════════════════

/// Move the player at `velocity` (cells/s) for `dt` unless the target box
/// hits a wall. `speed` records the velocity actually applied: zero when
/// idle or blocked. Lava is enterable; the tick that follows resolves it.
fn move_player(level: &mut Level, velocity: Vector, dt: f64) {
    let (pos, size) = match level.player() {
        Some(p) => (p.pos, p.size),
        None => return,
    };
    let target = pos.plus(velocity.times(dt));
    let blocked = level.obstacle_at(target, size) == Tile::Wall;
    if let Some(p) = level.player_mut() {
        if blocked {
            p.speed = Vector::ZERO;
        } else {
            p.pos = target;
            p.speed = velocity;
        }
    }
}

fn player_in_lava(level: &Level) -> bool {
    level.player()
        .map(|p| level.obstacle_at(p.pos, p.size) == Tile::Lava)
        .unwrap_or(false)
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
