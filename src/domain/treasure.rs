/// Stage one: the coordinate treasure hunt.
///
/// The player reads an arithmetic clue, works out `(x, y)` and picks that
/// cell on a 20×20 first-quadrant grid. Points must be found in order.

pub const GRID_SIZE: i32 = 20;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TreasurePoint {
    pub x: i32,
    pub y: i32,
    pub clue: &'static str,
}

pub const TREASURE_PATH: [TreasurePoint; 5] = [
    TreasurePoint {
        x: 0,
        y: 0,
        clue: "First treasure: x = (8 + 4) ÷ 6 - 2,  y = 5 × (7 - 7)",
    },
    TreasurePoint {
        x: 5,
        y: 3,
        clue: "Next treasure: x = (18 - 6) ÷ 4 + 2,  y = (4 + 8) ÷ 2 - 3",
    },
    TreasurePoint {
        x: 12,
        y: 8,
        clue: "Keep going! x = 3 × (10 - 6),  y = (7 + 5) × 2 ÷ 3",
    },
    TreasurePoint {
        x: 7,
        y: 15,
        clue: "Almost there! x = (25 - 4) ÷ 3,  y = (6 + 9) ÷ 3 × 3",
    },
    TreasurePoint {
        x: 18,
        y: 18,
        clue: "Last one! x = (15 - 9) × 4 - 6,  y = 72 ÷ (12 - 8)",
    },
];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GuessOutcome {
    /// Stage already complete, or the cell was found earlier.
    Ignored,
    /// Correct cell; `index` is the point just found.
    Found { index: usize },
    /// Correct cell and it was the last one.
    StageComplete,
    /// Anything else. The caller applies the freeze penalty.
    Wrong,
}

#[derive(Clone, Debug)]
pub struct TreasureHunt {
    path: &'static [TreasurePoint],
    current: usize,
}

impl TreasureHunt {
    pub fn new() -> Self {
        Self::with_path(&TREASURE_PATH)
    }

    pub fn with_path(path: &'static [TreasurePoint]) -> Self {
        TreasureHunt { path, current: 0 }
    }

    pub fn reset(&mut self) {
        self.current = 0;
    }

    #[inline]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.path.len()
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.current >= self.path.len()
    }

    /// The point being searched for, if any remain.
    #[cfg(test)]
    pub fn target(&self) -> Option<&TreasurePoint> {
        self.path.get(self.current)
    }

    /// Clue for the current target (the last clue once complete).
    pub fn clue(&self) -> &'static str {
        self.path
            .get(self.current.min(self.path.len().saturating_sub(1)))
            .map(|p| p.clue)
            .unwrap_or("")
    }

    /// Points are found strictly in order, so everything before `current` is found.
    pub fn is_found(&self, x: i32, y: i32) -> bool {
        self.path[..self.current].iter().any(|p| p.x == x && p.y == y)
    }

    pub fn submit_guess(&mut self, x: i32, y: i32) -> GuessOutcome {
        if self.is_complete() || self.is_found(x, y) {
            return GuessOutcome::Ignored;
        }

        let target = self.path[self.current];
        if target.x != x || target.y != y {
            return GuessOutcome::Wrong;
        }

        let index = self.current;
        self.current += 1;
        if self.is_complete() {
            GuessOutcome::StageComplete
        } else {
            GuessOutcome::Found { index }
        }
    }
}

impl Default for TreasureHunt {
    fn default() -> Self {
        Self::new()
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(hunt: &mut TreasureHunt, steps: usize) {
        for p in TREASURE_PATH.iter().take(steps) {
            assert_ne!(hunt.submit_guess(p.x, p.y), GuessOutcome::Wrong);
        }
    }

    #[test]
    fn origin_is_first_treasure() {
        let mut h = TreasureHunt::new();
        assert_eq!(h.submit_guess(0, 0), GuessOutcome::Found { index: 0 });
        assert_eq!(h.current_index(), 1);
    }

    #[test]
    fn second_point_first_is_wrong() {
        let mut h = TreasureHunt::new();
        assert_eq!(h.submit_guess(5, 3), GuessOutcome::Wrong);
        assert_eq!(h.current_index(), 0);
    }

    #[test]
    fn wrong_guesses_never_move_the_index() {
        let mut h = TreasureHunt::new();
        walk(&mut h, 2);
        for (x, y) in [(1, 1), (19, 19), (12, 9), (-1, 4), (40, 40)] {
            assert_eq!(h.submit_guess(x, y), GuessOutcome::Wrong);
            assert_eq!(h.current_index(), 2);
        }
    }

    #[test]
    fn found_cell_is_idempotent() {
        let mut h = TreasureHunt::new();
        walk(&mut h, 3);
        for p in TREASURE_PATH.iter().take(3) {
            assert_eq!(h.submit_guess(p.x, p.y), GuessOutcome::Ignored);
        }
        assert_eq!(h.current_index(), 3);
    }

    #[test]
    fn full_path_completes_stage() {
        let mut h = TreasureHunt::new();
        walk(&mut h, 4);
        assert_eq!(h.submit_guess(18, 18), GuessOutcome::StageComplete);
        assert!(h.is_complete());
        assert!(h.target().is_none());
    }

    #[test]
    fn complete_stage_ignores_everything() {
        let mut h = TreasureHunt::new();
        walk(&mut h, 5);
        assert_eq!(h.submit_guess(3, 3), GuessOutcome::Ignored);
        assert_eq!(h.current_index(), 5);
    }

    #[test]
    fn clues_match_their_points() {
        // Each clue's arithmetic, evaluated by hand.
        let expected = [(0, 0), (5, 3), (12, 8), (7, 15), (18, 18)];
        for (p, (x, y)) in TREASURE_PATH.iter().zip(expected) {
            assert_eq!((p.x, p.y), (x, y));
            assert!(p.x < GRID_SIZE && p.y < GRID_SIZE);
        }
    }

    #[test]
    fn reset_starts_over() {
        let mut h = TreasureHunt::new();
        walk(&mut h, 3);
        h.reset();
        assert_eq!(h.current_index(), 0);
        assert!(!h.is_found(0, 0));
    }
}
