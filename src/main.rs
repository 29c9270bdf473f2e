/// Entry point, level sequencing and frame loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use config::GameConfig;
use sim::event::GameEvent;
use sim::level::Status;
use sim::pack::{self, LevelDef, Pack};
use sim::parser::LevelParser;
use sim::step;
use ui::input::InputState;
use ui::renderer::{Hud, Renderer};

const FRAME_SLEEP: Duration = Duration::from_millis(5);
const MESSAGE_FRAMES: u32 = 40;

/// How one attempt at a level ended.
enum LevelResult {
    Finished(Status),
    Quit,
}

enum GameResult {
    Completed,
    Quit,
}

fn main() {
    env_logger::init();

    let config = GameConfig::load();
    let seed = config.seed.unwrap_or_else(rand::random);
    log::info!("coin phase seed: {seed}");

    let pack = pack::load_levels(&config);
    if !pack.author.is_empty() {
        log::info!("pack '{}' by {}", pack.name, pack.author);
    }
    let parser = config.parser(seed);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = run_game(&pack, &parser, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    match result {
        Ok(GameResult::Completed) => {
            println!("All {} levels of {} cleared. Well done!", pack.levels.len(), pack.name);
        }
        Ok(GameResult::Quit) => println!("Thanks for playing Lava Runner!"),
        Err(e) => eprintln!("Game error: {e}"),
    }
}

/// Play every level in order. A lost level is retried; a won level advances.
fn run_game(
    pack: &Pack,
    parser: &LevelParser,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> Result<GameResult, Box<dyn std::error::Error>> {
    let mut input = InputState::new();
    let mut idx = 0;
    let mut attempts = 1;

    while idx < pack.levels.len() {
        let def = &pack.levels[idx];
        log::info!("level {} '{}', attempt {attempts}", idx + 1, def.name);

        let hud_base = (idx + 1, pack.levels.len());
        match run_level(def, hud_base, parser, renderer, &mut input, config)? {
            LevelResult::Finished(Status::Won) => {
                log::info!("level {} won", idx + 1);
                idx += 1;
                attempts = 1;
            }
            LevelResult::Finished(Status::Lost) => {
                log::info!("level {} lost", idx + 1);
                attempts += 1;
            }
            LevelResult::Quit => return Ok(GameResult::Quit),
        }
    }

    Ok(GameResult::Completed)
}

/// Drive one level until it reports finished or the player quits.
fn run_level(
    def: &LevelDef,
    (level_number, level_count): (usize, usize),
    parser: &LevelParser,
    renderer: &mut Renderer,
    input: &mut InputState,
    config: &GameConfig,
) -> Result<LevelResult, Box<dyn std::error::Error>> {
    let mut level = parser.parse(&def.rows);
    if level.player().is_none() {
        log::warn!("level '{}' has no player", def.name);
    }

    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);
    let dt = tick_rate.as_secs_f64();
    let mut last_tick = Instant::now();
    let mut message = String::new();
    let mut message_timer = 0u32;

    renderer.clear()?;

    loop {
        input.drain_events()?;
        if input.quit_requested() {
            return Ok(LevelResult::Quit);
        }

        if last_tick.elapsed() >= tick_rate {
            let events = step::step(&mut level, dt, input.movement(), config.speed.player_speed);
            if let Some(text) = events.iter().rev().find_map(describe) {
                message = text.to_string();
                message_timer = MESSAGE_FRAMES;
            }

            if message_timer > 0 {
                message_timer -= 1;
                if message_timer == 0 { message.clear(); }
            }

            if level.is_finished() {
                if let Some(status) = level.status {
                    return Ok(LevelResult::Finished(status));
                }
            }
            last_tick = Instant::now();
        }

        let hud = Hud {
            level_name: &def.name,
            level_number,
            level_count,
            message: &message,
        };
        renderer.render(&level, &hud)?;
        std::thread::sleep(FRAME_SLEEP);
    }
}

fn describe(event: &GameEvent) -> Option<&'static str> {
    match event {
        GameEvent::CoinCollected { .. } => Some("Coin!"),
        GameEvent::PlayerBurned => Some("Into the lava..."),
        GameEvent::PlayerHit => Some("Scorched by a fireball!"),
        GameEvent::LevelWon => Some("Level cleared!"),
        GameEvent::LevelLost => None,
    }
}
