/// Choosing which articles a quiz run covers.
///
///   Random   uniform shuffle of the catalog, first 3 articles
///   Manual   the player toggles exactly 7 articles

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::article::{Article, Catalog};
use crate::error::GameError;

pub const RANDOM_ARTICLES: usize = 3;
pub const MANUAL_ARTICLES: usize = 7;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    Random,
    Manual,
}

impl SelectionMode {
    pub fn article_count(self) -> usize {
        match self {
            SelectionMode::Random => RANDOM_ARTICLES,
            SelectionMode::Manual => MANUAL_ARTICLES,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SelectionMode::Random => "Random 3",
            SelectionMode::Manual => "Manual 7",
        }
    }
}

/// Fisher–Yates over a copy of the catalog, then take the head.
/// Catalogs smaller than 3 yield every article.
pub fn pick_random<R: Rng + ?Sized>(articles: &[Article], rng: &mut R) -> Vec<Article> {
    let mut pool = articles.to_vec();
    pool.shuffle(rng);
    pool.truncate(RANDOM_ARTICLES);
    pool
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// Already 7 selected; nothing changed.
    Rejected,
}

/// Ordered set of article ids picked on the selection screen.
#[derive(Clone, Debug, Default)]
pub struct ManualSelection {
    ids: Vec<String>,
}

impl ManualSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|s| s == id)
    }

    pub fn toggle(&mut self, id: &str) -> ToggleOutcome {
        if let Some(pos) = self.ids.iter().position(|s| s == id) {
            self.ids.remove(pos);
            ToggleOutcome::Removed
        } else if self.ids.len() < MANUAL_ARTICLES {
            self.ids.push(id.to_string());
            ToggleOutcome::Added
        } else {
            ToggleOutcome::Rejected
        }
    }

    #[inline]
    pub fn can_confirm(&self) -> bool {
        self.ids.len() == MANUAL_ARTICLES
    }

    /// Full article records in the order they were picked.
    pub fn resolve(&self, catalog: &Catalog) -> Result<Vec<Article>, GameError> {
        self.ids
            .iter()
            .map(|id| {
                catalog
                    .get(id)
                    .cloned()
                    .ok_or_else(|| GameError::MissingArticle(id.clone()))
            })
            .collect()
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
