/// Article and question data, loaded once at startup.
///
/// ## Documents (in the configured data directory):
///   `questions.json`   `{ "articles": [ { id, title, link, questions: [...] } ] }`
///   `articles.json`    `[ { id, content, ... } ]` (markdown bodies)
///
/// Article ids are date-prefixed (`2025-01-03-...`), so sorting by id sorts
/// by publication date. Every article carries exactly five questions with
/// four options each; anything else is rejected at load time.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::DataError;

pub const QUESTIONS_PER_ARTICLE: usize = 5;
pub const OPTIONS_PER_QUESTION: usize = 4;

pub const QUESTIONS_FILE: &str = "questions.json";
pub const ARTICLES_FILE: &str = "articles.json";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    pub options: Vec<String>,
    pub answer: usize,
}

impl Question {
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.answer
    }

    pub fn correct_option(&self) -> &str {
        self.options.get(self.answer).map(String::as_str).unwrap_or("")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub link: String,
    pub questions: Vec<Question>,
}

impl Article {
    /// The `YYYY-MM-DD` prefix of the id.
    pub fn date_label(&self) -> &str {
        match self.id.char_indices().nth(10) {
            Some((end, _)) => &self.id[..end],
            None => &self.id,
        }
    }
}

#[derive(Deserialize, Debug)]
struct QuestionsDoc {
    articles: Vec<Article>,
}

/// One entry of `articles.json`. The preparation script also writes
/// `title`, `date` and `link`; the game only needs the body.
#[derive(Clone, Debug, Deserialize)]
pub struct ArticleContent {
    pub id: String,
    #[serde(default)]
    pub content: String,
}

/// All loaded articles plus their markdown bodies.
#[derive(Clone, Debug)]
pub struct Catalog {
    articles: Vec<Article>,
    contents: HashMap<String, String>,
}

impl Catalog {
    /// Read and validate both documents from `data_dir`.
    pub fn load(data_dir: &Path) -> Result<Self, DataError> {
        let questions: QuestionsDoc = read_json(&data_dir.join(QUESTIONS_FILE))?;
        let contents: Vec<ArticleContent> = read_json(&data_dir.join(ARTICLES_FILE))?;
        Self::from_parts(questions.articles, contents)
    }

    pub fn from_parts(articles: Vec<Article>, contents: Vec<ArticleContent>) -> Result<Self, DataError> {
        validate(&articles)?;
        let contents = contents
            .into_iter()
            .filter(|c| !c.content.trim().is_empty())
            .map(|c| (c.id, c.content))
            .collect();
        Ok(Catalog { articles, contents })
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn get(&self, id: &str) -> Option<&Article> {
        self.articles.iter().find(|a| a.id == id)
    }

    /// Markdown body for an article, if one was supplied.
    pub fn content(&self, id: &str) -> Option<&str> {
        self.contents.get(id).map(String::as_str)
    }

    /// Articles in id order (oldest first), as listed on the selection screen.
    pub fn sorted_by_id(&self) -> Vec<&Article> {
        let mut list: Vec<&Article> = self.articles.iter().collect();
        list.sort_by(|a, b| a.id.cmp(&b.id));
        list
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, DataError> {
    let text = std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: PathBuf::from(path),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| DataError::Parse {
        path: PathBuf::from(path),
        source,
    })
}

fn validate(articles: &[Article]) -> Result<(), DataError> {
    if articles.is_empty() {
        return Err(DataError::Invalid("no articles".into()));
    }

    let mut seen = HashSet::new();
    for a in articles {
        if !seen.insert(a.id.as_str()) {
            return Err(DataError::Invalid(format!("duplicate article id {}", a.id)));
        }
        if a.questions.len() != QUESTIONS_PER_ARTICLE {
            return Err(DataError::Invalid(format!(
                "article {} has {} questions, expected {}",
                a.id, a.questions.len(), QUESTIONS_PER_ARTICLE
            )));
        }
        for (i, q) in a.questions.iter().enumerate() {
            if q.options.len() != OPTIONS_PER_QUESTION {
                return Err(DataError::Invalid(format!(
                    "article {} question {} has {} options",
                    a.id, i + 1, q.options.len()
                )));
            }
            if q.answer >= q.options.len() {
                return Err(DataError::Invalid(format!(
                    "article {} question {} answer index {} out of range",
                    a.id, i + 1, q.answer
                )));
            }
        }
    }
    Ok(())
}

// ══════════════════════════════════════════════════════════════
// Test fixtures (shared with selection/quiz/game tests)
// ══════════════════════════════════════════════════════════════


// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
