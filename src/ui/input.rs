/// Input collector.
///
/// Drains every pending terminal event once per frame without blocking.
/// Keys are kept as presses only (no hold tracking: every action here is
/// one-shot). Left-button mouse downs are kept as terminal `(col, row)`
/// so the renderer can hit-test them against the grid and overlay.

use std::time::Duration;

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};

pub struct InputState {
    /// Key presses this frame, in arrival order.
    pub keys: Vec<KeyEvent>,

    /// Left clicks this frame as (col, row).
    pub clicks: Vec<(u16, u16)>,

    /// Mouse wheel this frame: negative = up.
    pub scroll: i32,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            keys: Vec::with_capacity(8),
            clicks: Vec::with_capacity(4),
            scroll: 0,
        }
    }

    /// Drain all pending terminal events. Call once per frame.
    pub fn drain_events(&mut self) {
        self.keys.clear();
        self.clicks.clear();
        self.scroll = 0;

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                // Release/Repeat would double-count unlock presses.
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    self.keys.push(key);
                }
                Ok(Event::Mouse(m)) => match m.kind {
                    MouseEventKind::Down(MouseButton::Left) => self.clicks.push((m.column, m.row)),
                    MouseEventKind::ScrollUp => self.scroll -= 1,
                    MouseEventKind::ScrollDown => self.scroll += 1,
                    _ => {}
                },
                _ => {}
            }
        }
    }

    /// Number of presses of `code` this frame. The unlock key can arrive
    /// several times in one frame when the loop stalls.
    pub fn count(&self, code: KeyCode) -> usize {
        self.keys.iter().filter(|k| k.code == code).count()
    }

    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.keys.iter().any(|k| k.code == code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// First digit key 1-9 pressed this frame, as a 0-based index.
    pub fn digit_pressed(&self) -> Option<usize> {
        self.keys.iter().find_map(|k| match k.code {
            KeyCode::Char(c @ '1'..='9') => Some(c as usize - '1' as usize),
            _ => None,
        })
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.keys.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}
