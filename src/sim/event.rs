/// Events emitted during a simulation step.
/// The presentation layer consumes these for messages and logging.

#[derive(Clone, Copy, PartialEq, Debug)]
#[allow(dead_code)]
pub enum GameEvent {
    CoinCollected { x: f64, y: f64 },
    PlayerBurned,
    PlayerHit,
    LevelWon,
    LevelLost,
}
