/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::actor::ActorKind;
use crate::sim::parser::LevelParser;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub levels_file: PathBuf,
    /// Coin phase seed. `None` = draw one at startup.
    pub seed: Option<u64>,
    pub actor_symbols: HashMap<char, ActorKind>,
}

#[derive(Clone, Debug)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
    pub player_speed: f64,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default = "default_actors")]
    actors: HashMap<String, ActorKind>,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_player_speed")]
    player_speed: f64,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_file")]
    levels_file: String,
    #[serde(default)]
    seed: Option<u64>,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 30 }
fn default_player_speed() -> f64 { 7.0 }
fn default_levels_file() -> String { "levels.txt".into() }

fn default_actors() -> HashMap<String, ActorKind> {
    LevelParser::default_symbols()
        .into_iter()
        .map(|(ch, kind)| (ch.to_string(), kind))
        .collect()
}

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            tick_rate_ms: default_tick_rate(),
            player_speed: default_player_speed(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_file: default_levels_file(),
            seed: None,
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        match read_config_text(&candidate_dirs()) {
            Some(text) => GameConfig::from_toml_str(&text),
            None => GameConfig::from_toml(TomlConfig::default_full()),
        }
    }

    /// Parse config text directly. Errors fall back to defaults.
    pub fn from_toml_str(text: &str) -> Self {
        match toml::from_str::<TomlConfig>(text) {
            Ok(cfg) => GameConfig::from_toml(cfg),
            Err(e) => {
                log::warn!("config.toml parse error: {e}; using default settings");
                GameConfig::from_toml(TomlConfig::default_full())
            }
        }
    }

    /// Parser built from this config's symbol table and the given seed.
    pub fn parser(&self, seed: u64) -> LevelParser {
        LevelParser::new(self.actor_symbols.clone(), seed)
    }

    fn from_toml(toml_cfg: TomlConfig) -> Self {
        let mut actor_symbols = HashMap::new();
        for (key, kind) in toml_cfg.actors {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => {
                    actor_symbols.insert(ch, kind);
                }
                _ => log::warn!("ignoring actor symbol {key:?}: must be one character"),
            }
        }

        GameConfig {
            speed: SpeedConfig {
                tick_rate_ms: toml_cfg.speed.tick_rate_ms.max(1),
                player_speed: toml_cfg.speed.player_speed,
            },
            levels_file: PathBuf::from(toml_cfg.general.levels_file),
            seed: toml_cfg.general.seed,
            actor_symbols,
        }
    }
}

impl TomlConfig {
    /// Defaults for every section, including the actor table
    /// (`#[derive(Default)]` would leave it empty).
    fn default_full() -> Self {
        TomlConfig {
            actors: default_actors(),
            ..TomlConfig::default()
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
pub fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Text of the first readable config.toml in the candidate directories.
fn read_config_text(search_dirs: &[PathBuf]) -> Option<String> {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                log::info!("loaded {}", path.display());
                return Some(text);
            }
            Err(e) => {
                log::warn!("could not read {}: {e}", path.display());
            }
        }
    }
    None
}
