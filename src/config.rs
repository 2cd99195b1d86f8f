/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to defaults if the file is missing or incomplete.

use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::KeyCode;
use log::warn;
use serde::Deserialize;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub data_dir: PathBuf,
    pub timing: TimingConfig,
    pub unlock_key: KeyCode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimingConfig {
    pub frame: Duration,
    pub found_delay: Duration,    // last treasure found → stage complete screen
    pub correct_delay: Duration,  // correct answer → next question
    pub wrong_delay: Duration,    // wrong answer → fail screen
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            frame: Duration::from_millis(default_frame_ms()),
            found_delay: Duration::from_millis(default_found_delay()),
            correct_delay: Duration::from_millis(default_correct_delay()),
            wrong_delay: Duration::from_millis(default_wrong_delay()),
        }
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    unlock: TomlUnlock,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_data_dir")]
    data_dir: String,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
    #[serde(default = "default_found_delay")]
    found_delay_ms: u64,
    #[serde(default = "default_correct_delay")]
    correct_delay_ms: u64,
    #[serde(default = "default_wrong_delay")]
    wrong_delay_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlUnlock {
    #[serde(default = "default_unlock_key")]
    key: String,
}

// ── Defaults ──

fn default_data_dir() -> String { "data".into() }
fn default_frame_ms() -> u64 { 50 }
fn default_found_delay() -> u64 { 800 }
fn default_correct_delay() -> u64 { 1000 }
fn default_wrong_delay() -> u64 { 1500 }
fn default_unlock_key() -> String { "Esc".into() }

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { data_dir: default_data_dir() }
    }
}

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            frame_ms: default_frame_ms(),
            found_delay_ms: default_found_delay(),
            correct_delay_ms: default_correct_delay(),
            wrong_delay_ms: default_wrong_delay(),
        }
    }
}

impl Default for TomlUnlock {
    fn default() -> Self {
        TomlUnlock { key: default_unlock_key() }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::resolve(toml_cfg, &search_dirs)
    }

    fn resolve(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let data_dir_str = &toml_cfg.general.data_dir;
        let data_dir = if PathBuf::from(data_dir_str).is_absolute() {
            PathBuf::from(data_dir_str)
        } else {
            search_dirs.iter()
                .map(|d| d.join(data_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(data_dir_str))
        };

        let unlock_key = parse_key(&toml_cfg.unlock.key).unwrap_or_else(|| {
            warn!("unknown unlock key {:?}, using Esc", toml_cfg.unlock.key);
            KeyCode::Esc
        });

        let t = &toml_cfg.timing;
        GameConfig {
            data_dir,
            timing: TimingConfig {
                frame: Duration::from_millis(t.frame_ms.max(1)),
                found_delay: Duration::from_millis(t.found_delay_ms),
                correct_delay: Duration::from_millis(t.correct_delay_ms),
                wrong_delay: Duration::from_millis(t.wrong_delay_ms),
            },
            unlock_key,
        }
    }
}

/// Movement letters on the coordinate screen. One press must not both
/// move the cursor and count toward an unlock. Space trims to nothing.
const RESERVED_CHARS: &[char] = &['w', 'a', 's', 'd'];

/// Key names accepted for `[unlock] key`: `Esc`, `Tab`, `Backspace`,
/// `F1`..`F12`, or any single character not in `RESERVED_CHARS`.
fn parse_key(name: &str) -> Option<KeyCode> {
    let trimmed = name.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "esc" | "escape" => return Some(KeyCode::Esc),
        "tab" => return Some(KeyCode::Tab),
        "backspace" => return Some(KeyCode::Backspace),
        _ => {}
    }
    if let Some(n) = trimmed.strip_prefix(['F', 'f']).and_then(|n| n.parse::<u8>().ok()) {
        if (1..=12).contains(&n) {
            return Some(KeyCode::F(n));
        }
    }
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !RESERVED_CHARS.contains(&c.to_ascii_lowercase()) => {
            Some(KeyCode::Char(c))
        }
        _ => None,
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so a linked binary still finds data next to the real one.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

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

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        warn!("config.toml parse error, using defaults: {e}");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
