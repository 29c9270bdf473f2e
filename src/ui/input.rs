/// Keyboard state tracker.
///
/// Movement is continuous while an arrow/WASD key is held. Terminals that
/// never report key release are handled with a hold timeout: a key counts
/// as held until no Press/Repeat event has arrived for `HOLD_TIMEOUT`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::sim::step::MoveDir;

const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,
    /// Raw key events from the most recent drain.
    raw_events: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            raw_events: Vec::with_capacity(8),
        }
    }

    /// Drain all pending terminal events without blocking.
    /// Call once per frame, before the simulation step.
    pub fn drain_events(&mut self) -> std::io::Result<()> {
        self.raw_events.clear();

        while poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                self.raw_events.push(key);
                match key.kind {
                    KeyEventKind::Release => {
                        self.last_active.remove(&key.code);
                    }
                    _ => {
                        self.last_active.insert(key.code, Instant::now());
                    }
                }
            }
        }

        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
        Ok(())
    }

    fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.last_active.contains_key(c))
    }

    /// Held direction, vertical before horizontal.
    pub fn movement(&self) -> Option<MoveDir> {
        if self.any_held(KEYS_UP) {
            Some(MoveDir::Up)
        } else if self.any_held(KEYS_DOWN) {
            Some(MoveDir::Down)
        } else if self.any_held(KEYS_LEFT) {
            Some(MoveDir::Left)
        } else if self.any_held(KEYS_RIGHT) {
            Some(MoveDir::Right)
        } else {
            None
        }
    }

    /// Esc, q or Ctrl+C pressed this frame.
    pub fn quit_requested(&self) -> bool {
        self.raw_events.iter().any(|k| {
            let ctrl_c = k.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(k.code, KeyCode::Char('c') | KeyCode::Char('C'));
            ctrl_c || (k.kind != KeyEventKind::Release && KEYS_QUIT.contains(&k.code))
        })
    }
}
