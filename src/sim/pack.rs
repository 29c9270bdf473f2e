/// Level pack loader.
///
/// ## Sources (priority order):
///   1. Pack file named by `general.levels_file` (searched like config.toml)
///   2. Built-in embedded levels
///
/// ## Pack format:
///   ```
///   ## Pack Name
///   ## Author: name
///   ---
///   # Level 1 - Name
///   <map rows>
///   ---
///   # Level 2 - Name
///   <map rows>
///   ```
///
/// Levels are separated by a line containing only `---`.
/// Pack metadata lines start with `##` and come before the first `---`.
/// Rows are kept exactly as written (ragged rows stay ragged); only
/// trailing blank rows are dropped.
///
/// ## Tile legend:
///   'x' = Wall      '!' = Lava      anything else = empty
/// Actor symbols come from the `[actors]` config table.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::{candidate_dirs, GameConfig};

/// One level: display name plus raw text rows.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelDef {
    pub name: String,
    pub rows: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct Pack {
    pub name: String,
    pub author: String,
    pub levels: Vec<LevelDef>,
}

#[derive(Debug, Error)]
pub enum PackError {
    #[error("could not read level pack {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("level pack {0:?} contains no levels")]
    Empty(PathBuf),
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Read and parse a pack file.
pub fn load_pack(path: &Path) -> Result<Pack, PackError> {
    let content = std::fs::read_to_string(path).map_err(|source| PackError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut pack = parse_pack(&content);
    if pack.levels.is_empty() {
        return Err(PackError::Empty(path.to_path_buf()));
    }
    if pack.name.is_empty() {
        pack.name = path.file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
    }
    Ok(pack)
}

/// Pack for this run: the configured file if it loads, else the built-ins.
pub fn load_levels(config: &GameConfig) -> Pack {
    let path = match find_pack_file(&config.levels_file) {
        Some(p) => p,
        None => {
            log::info!("no level pack at {:?}, using built-in levels", config.levels_file);
            return embedded_pack();
        }
    };

    match load_pack(&path) {
        Ok(pack) => {
            log::info!("loaded {} levels from {}", pack.levels.len(), path.display());
            pack
        }
        Err(e) => {
            log::warn!("{e}; using built-in levels");
            embedded_pack()
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Pack parsing
// ══════════════════════════════════════════════════════════════

/// Parse a whole pack: metadata header, then `---`-separated levels.
/// A file without any `---` is a single level.
pub fn parse_pack(content: &str) -> Pack {
    let mut name = String::new();
    let mut author = String::new();
    let mut levels = vec![];

    if !content.lines().any(|l| l.trim() == "---") {
        levels.extend(parse_level_block(content, 1));
        return Pack { name, author, levels };
    }

    let mut current_section = String::new();
    let mut in_levels = false;

    for line in content.lines() {
        let trimmed = line.trim();

        if trimmed == "---" {
            if in_levels {
                levels.extend(parse_level_block(&current_section, levels.len() + 1));
            }
            current_section.clear();
            in_levels = true;
            continue;
        }

        if !in_levels {
            if let Some(rest) = trimmed.strip_prefix("## Author:") {
                author = rest.trim().to_string();
            } else if let Some(rest) = trimmed.strip_prefix("##") {
                if name.is_empty() {
                    name = rest.trim().to_string();
                }
            }
            continue;
        }

        current_section.push_str(line);
        current_section.push('\n');
    }

    levels.extend(parse_level_block(&current_section, levels.len() + 1));

    Pack { name, author, levels }
}

/// Parse one level block. `None` if it has no rows.
fn parse_level_block(content: &str, number: usize) -> Option<LevelDef> {
    let mut name = String::new();
    let mut rows = vec![];

    for line in content.lines() {
        let before_map = rows.iter().all(|r: &String| r.trim().is_empty());
        if name.is_empty() && before_map && is_name_line(line) {
            name = line[1..].trim().to_string();
            // Blank lines above the title are not map rows
            rows.clear();
        } else {
            rows.push(line.to_string());
        }
    }

    while rows.last().map_or(false, |r| r.trim().is_empty()) {
        rows.pop();
    }

    if rows.is_empty() {
        return None;
    }

    if name.is_empty() {
        name = format!("Level {number}");
    }

    Some(LevelDef { name, rows })
}

/// Distinguish `# Level Name` from a map row that happens to start with `#`.
/// A name line starts with `#` and contains at least one letter.
fn is_name_line(line: &str) -> bool {
    match line.strip_prefix('#') {
        Some(rest) => rest.chars().any(|c| c.is_alphabetic()),
        None => false,
    }
}

// ══════════════════════════════════════════════════════════════
// File lookup
// ══════════════════════════════════════════════════════════════

fn find_pack_file(levels_file: &Path) -> Option<PathBuf> {
    if levels_file.is_absolute() {
        return levels_file.is_file().then(|| levels_file.to_path_buf());
    }
    candidate_dirs()
        .into_iter()
        .map(|d| d.join(levels_file))
        .find(|p| p.is_file())
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback levels
// ══════════════════════════════════════════════════════════════

pub fn embedded_pack() -> Pack {
    Pack {
        name: "Built-in Levels".to_string(),
        author: "Lava Runner".to_string(),
        levels: embedded_levels(),
    }
}

fn embedded_levels() -> Vec<LevelDef> {
    vec![
        make_embedded("First Steps", &[
            "                      ",
            "                      ",
            "  x              = x  ",
            "  x         o o    x  ",
            "  x @      xxxxx   x  ",
            "  xxxxx            x  ",
            "      x!!!!!!!!!!!!x  ",
            "      xxxxxxxxxxxxxx  ",
            "                      ",
        ]),
        make_embedded("Crossfire", &[
            "    |           |     ",
            "                      ",
            "  o    o   o    o  o  ",
            "                      ",
            " @   =         =      ",
            "xxxxxxxxxxx!!xxxxxxxxx",
        ]),
        make_embedded("Lava Rain", &[
            "  v     v     v     v     ",
            "                          ",
            "                          ",
            "   o      o      o     o  ",
            "                          ",
            "  @    xxx    xxx    xxx  ",
            "xxxxx!!!!!!!!!!!!!!!!!!!xx",
        ]),
        make_embedded("Gauntlet", &[
            "        v         v        ",
            "  x                     x  ",
            "  x  o    |  o  |    o  x  ",
            "  x                     x  ",
            "  x        =            x  ",
            "  x @   xxxxxxxxx   o   x  ",
            "  xxxxx!!!!!!!!!!!!!xxxxx  ",
            "      xxxxxxxxxxxxxxx      ",
        ]),
    ]
}

fn make_embedded(name: &str, map: &[&str]) -> LevelDef {
    LevelDef {
        name: name.to_string(),
        rows: map.iter().map(|s| s.to_string()).collect(),
    }
}
