/// Stage two: walk the selected articles question by question.
///
/// ## State machine
///   NotStarted → InProgress → Success | Failure
///
/// One wrong answer ends the run. Terminal states are final; a new
/// `QuizSession` (or `start()`) is needed to play again.

use crate::domain::article::{Article, Question, QUESTIONS_PER_ARTICLE};
use crate::domain::selection::SelectionMode;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum QuizStatus {
    NotStarted,
    InProgress,
    Success,
    Failure,
}

/// What the player needs to see after missing a question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailureInfo {
    pub article_title: String,
    pub question: String,
    pub correct_answer: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Session not in progress; nothing changed.
    Ignored,
    /// Right answer, more questions follow. `next_article` is true when the
    /// next question belongs to a new article.
    Correct { next_article: bool },
    /// Right answer to the final question.
    Success,
    Failure(FailureInfo),
}

#[derive(Clone, Debug)]
pub struct QuizSession {
    mode: SelectionMode,
    articles: Vec<Article>,
    article_index: usize,
    question_index: usize,
    total_correct: u32,
    answered: u32,
    status: QuizStatus,
}

impl QuizSession {
    pub fn new(mode: SelectionMode, articles: Vec<Article>) -> Self {
        QuizSession {
            mode,
            articles,
            article_index: 0,
            question_index: 0,
            total_correct: 0,
            answered: 0,
            status: QuizStatus::NotStarted,
        }
    }

    /// Enter InProgress with all counters at zero.
    pub fn start(&mut self) {
        self.article_index = 0;
        self.question_index = 0;
        self.total_correct = 0;
        self.answered = 0;
        self.status = if self.articles.is_empty() {
            QuizStatus::Success
        } else {
            QuizStatus::InProgress
        };
    }

    // ── Queries ──

    pub fn mode(&self) -> SelectionMode { self.mode }
    pub fn status(&self) -> QuizStatus { self.status }
    pub fn articles(&self) -> &[Article] { &self.articles }
    pub fn article_index(&self) -> usize { self.article_index }
    pub fn question_index(&self) -> usize { self.question_index }
    pub fn total_correct(&self) -> u32 { self.total_correct }
    pub fn answered(&self) -> u32 { self.answered }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, QuizStatus::Success | QuizStatus::Failure)
    }

    pub fn total_questions(&self) -> u32 {
        (self.articles.len() * QUESTIONS_PER_ARTICLE) as u32
    }

    /// Article on screen. After success this stays on the last article.
    pub fn current_article(&self) -> Option<&Article> {
        self.articles
            .get(self.article_index)
            .or_else(|| self.articles.last())
    }

    pub fn current_question(&self) -> Option<&Question> {
        if self.status != QuizStatus::InProgress && self.status != QuizStatus::Failure {
            return None;
        }
        self.articles
            .get(self.article_index)?
            .questions
            .get(self.question_index)
    }

    // ── Scoring ──

    pub fn submit_answer(&mut self, option: usize) -> AnswerOutcome {
        if self.status != QuizStatus::InProgress {
            return AnswerOutcome::Ignored;
        }
        let Some(article) = self.articles.get(self.article_index) else {
            return AnswerOutcome::Ignored;
        };
        let Some(question) = article.questions.get(self.question_index) else {
            return AnswerOutcome::Ignored;
        };

        self.answered += 1;

        if !question.is_correct(option) {
            let info = FailureInfo {
                article_title: article.title.clone(),
                question: question.question.clone(),
                correct_answer: question.correct_option().to_string(),
            };
            self.status = QuizStatus::Failure;
            return AnswerOutcome::Failure(info);
        }

        self.total_correct += 1;
        self.question_index += 1;

        if self.question_index < QUESTIONS_PER_ARTICLE {
            return AnswerOutcome::Correct { next_article: false };
        }

        self.question_index = 0;
        self.article_index += 1;
        if self.article_index >= self.articles.len() {
            self.status = QuizStatus::Success;
            AnswerOutcome::Success
        } else {
            AnswerOutcome::Correct { next_article: true }
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
