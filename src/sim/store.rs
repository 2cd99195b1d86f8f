/// Local key-value persistence.
///
/// The history ledger is the only client. `FileStore` writes one
/// `<key>.json` file per key into the save directory:
///   1. the executable's directory, when writable (portable installs)
///   2. `~/.local/share/treasure-quiz`
///   3. the current working directory
///
/// `MemoryStore` keeps values for the lifetime of the process; it is the
/// fallback when no directory is writable.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> io::Result<()>;
}

// ══════════════════════════════════════════════════════════════
// File-backed store
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    /// Write to a sibling temp file, then rename over the target, so a crash
    /// mid-write never leaves a truncated document behind.
    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)
    }
}

/// First writable directory in the search order above.
pub fn save_dir() -> Option<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            if is_writable(parent) {
                return Some(parent.to_path_buf());
            }
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/treasure-quiz");
        if std::fs::create_dir_all(&xdg).is_ok() && is_writable(&xdg) {
            return Some(xdg);
        }
    }

    std::env::current_dir().ok().filter(|d| is_writable(d))
}

fn is_writable(dir: &Path) -> bool {
    let probe = dir.join(".write_test_treasure_quiz");
    if std::fs::write(&probe, "").is_ok() {
        let _ = std::fs::remove_file(&probe);
        true
    } else {
        false
    }
}

// ══════════════════════════════════════════════════════════════
// In-memory store
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Either backend behind one concrete type, chosen at startup.
#[derive(Clone, Debug)]
pub enum Store {
    File(FileStore),
    Memory(MemoryStore),
}

impl KeyValueStore for Store {
    fn get(&self, key: &str) -> Option<String> {
        match self {
            Store::File(s) => s.get(key),
            Store::Memory(s) => s.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        match self {
            Store::File(s) => s.set(key, value),
            Store::Memory(s) => s.set(key, value),
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
