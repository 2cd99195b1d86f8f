/// Game: the screen controller and owner of all session state.
///
/// ## Screens
///   Start → Coordinate → StageComplete → (Select →) Game → Fail | Success
///
/// Exactly one screen is active. Rules live in the components this struct
/// owns; the controller only routes input to them and moves between screens:
///   - `TreasureHunt`      stage one matching
///   - `Freeze`            wrong-guess lockout + secret unlock
///   - `ManualSelection`   the 7-article picker
///   - `QuizSession`       stage two scoring
///   - `HistoryLedger`     results log
///
/// ## Delayed transitions
/// Feedback stays on screen briefly before the next screen (last treasure
/// found, answer right/wrong). Scoring and history writes happen at once;
/// only the screen change waits. Every screen change cancels whatever is
/// pending, and leaving the coordinate stage cancels the freeze, so no timer
/// outlives the screen that started it.

use std::time::Instant;

use log::{error, info};
use rand::Rng;

use crate::config::TimingConfig;
use crate::domain::article::{Article, Catalog, Question};
use crate::domain::quiz::{AnswerOutcome, FailureInfo, QuizSession};
use crate::domain::selection::{pick_random, ManualSelection, SelectionMode, ToggleOutcome, MANUAL_ARTICLES};
use crate::domain::treasure::{GuessOutcome, TreasureHunt};
use crate::error::GameError;

use super::event::GameEvent;
use super::freeze::{Freeze, FreezeState, FreezeTick};
use super::history::{HistoryLedger, PlayRecord};
use super::store::KeyValueStore;
use super::timer::OneShot;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Screen {
    Start,
    Coordinate,
    StageComplete,
    Select,
    Game,
    Fail,
    Success,
}

/// Screen changes waiting on a feedback delay.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Deferred {
    ShowStageComplete,
    NextQuestion { next_article: bool },
    ShowFail,
    ShowSuccess,
}

/// The answer currently being shown as right/wrong.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Feedback {
    pub article_index: usize,
    pub question_index: usize,
    pub chosen: usize,
    pub correct: bool,
}

/// Cursor and scroll positions. Owned here so they reset with the
/// screens; only the frame loop and renderer read or move them.
#[derive(Clone, Debug, Default)]
pub struct UiState {
    pub grid_cursor: (i32, i32),
    pub list_cursor: usize,
    pub list_scroll: usize,
    pub option_cursor: usize,
    pub article_open: bool,
    pub article_scroll: usize,
}

pub struct Game<S: KeyValueStore> {
    screen: Screen,
    catalog: Catalog,
    timing: TimingConfig,

    // ── Stage one ──
    hunt: TreasureHunt,
    freeze: Freeze,

    // ── Stage two ──
    selection: ManualSelection,
    session: Option<QuizSession>,
    feedback: Option<Feedback>,
    failure: Option<FailureInfo>,

    // ── History ──
    ledger: HistoryLedger<S>,
    history: Vec<PlayRecord>,

    deferred: OneShot<Deferred>,
    events: Vec<GameEvent>,
    message: Option<String>,

    pub ui: UiState,
}

// ── Construction / queries ──

impl<S: KeyValueStore> Game<S> {
    pub fn new(catalog: Catalog, ledger: HistoryLedger<S>, timing: TimingConfig) -> Self {
        let history = ledger.list();
        Game {
            screen: Screen::Start,
            catalog,
            timing,
            hunt: TreasureHunt::new(),
            freeze: Freeze::new(),
            selection: ManualSelection::new(),
            session: None,
            feedback: None,
            failure: None,
            ledger,
            history,
            deferred: OneShot::new(),
            events: Vec::new(),
            message: None,
            ui: UiState::default(),
        }
    }

    pub fn screen(&self) -> Screen { self.screen }
    pub fn catalog(&self) -> &Catalog { &self.catalog }
    pub fn hunt(&self) -> &TreasureHunt { &self.hunt }
    pub fn freeze_state(&self) -> FreezeState { self.freeze.state() }
    pub fn selection(&self) -> &ManualSelection { &self.selection }
    pub fn session(&self) -> Option<&QuizSession> { self.session.as_ref() }
    pub fn feedback(&self) -> Option<Feedback> { self.feedback }
    pub fn failure(&self) -> Option<&FailureInfo> { self.failure.as_ref() }
    pub fn history(&self) -> &[PlayRecord] { &self.history }
    pub fn message(&self) -> Option<&str> { self.message.as_deref() }

    /// True while feedback is on screen and input should be held back.
    pub fn is_waiting(&self) -> bool {
        self.deferred.is_pending()
    }

    /// Drain events emitted since the last call.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// The question to draw: the one being given feedback on, otherwise
    /// the session's current question.
    pub fn displayed_question(&self) -> Option<(&Article, usize, &Question)> {
        let session = self.session.as_ref()?;
        let (ai, qi) = match self.feedback {
            Some(f) => (f.article_index, f.question_index),
            None => (session.article_index(), session.question_index()),
        };
        let article = session.articles().get(ai)?;
        let question = article.questions.get(qi)?;
        Some((article, qi, question))
    }
}

// ── Screen transitions ──

impl<S: KeyValueStore> Game<S> {
    fn set_screen(&mut self, screen: Screen) {
        if screen == self.screen {
            return;
        }
        self.deferred.cancel();
        if self.screen == Screen::Coordinate {
            self.freeze.cancel();
        }
        self.feedback = None;
        self.message = None;
        self.screen = screen;
        self.events.push(GameEvent::ScreenChanged(screen));
    }

    /// Start → Coordinate.
    pub fn start(&mut self) {
        if self.screen != Screen::Start {
            return;
        }
        self.hunt.reset();
        self.freeze.cancel();
        self.ui.grid_cursor = (0, 0);
        self.set_screen(Screen::Coordinate);
    }

    /// Back to the title with stage one reset and the session dropped.
    fn go_to_start(&mut self) {
        self.set_screen(Screen::Start);
        self.hunt.reset();
        self.freeze.cancel();
        self.session = None;
        self.failure = None;
        self.selection.clear();
        self.history = self.ledger.list();
    }

    /// StageComplete → Game with 3 random articles.
    pub fn choose_random<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.screen != Screen::StageComplete {
            return;
        }
        let articles = pick_random(self.catalog.articles(), rng);
        self.start_session(SelectionMode::Random, articles);
    }

    /// StageComplete → Select with an empty selection.
    pub fn open_manual_select(&mut self) {
        if self.screen != Screen::StageComplete {
            return;
        }
        self.selection.clear();
        self.ui.list_cursor = 0;
        self.ui.list_scroll = 0;
        self.set_screen(Screen::Select);
    }

    pub fn toggle_article(&mut self, id: &str) -> ToggleOutcome {
        if self.screen != Screen::Select {
            return ToggleOutcome::Rejected;
        }
        let outcome = self.selection.toggle(id);
        self.message = match outcome {
            ToggleOutcome::Rejected => Some(format!("Pick at most {} articles", MANUAL_ARTICLES)),
            _ => None,
        };
        outcome
    }

    /// Select → Game once exactly 7 articles are picked. A selected id that
    /// is not in the catalog aborts the session and returns to Start.
    pub fn confirm_manual(&mut self) -> Result<(), GameError> {
        if self.screen != Screen::Select || !self.selection.can_confirm() {
            return Ok(());
        }
        match self.selection.resolve(&self.catalog) {
            Ok(articles) => {
                self.start_session(SelectionMode::Manual, articles);
                Ok(())
            }
            Err(e) => {
                error!("manual selection aborted: {e}");
                self.go_to_start();
                self.message = Some(format!("Could not start: {e}"));
                Err(e)
            }
        }
    }

    /// Select → StageComplete.
    pub fn back_to_stage_complete(&mut self) {
        if self.screen == Screen::Select {
            self.set_screen(Screen::StageComplete);
        }
    }

    /// Fail → Start (replay from the treasure hunt).
    pub fn retry(&mut self) {
        if self.screen == Screen::Fail {
            self.go_to_start();
        }
    }

    /// Fail → StageComplete (replay stage two only).
    pub fn retry_stage2(&mut self) {
        if self.screen == Screen::Fail {
            self.session = None;
            self.failure = None;
            self.history = self.ledger.list();
            self.set_screen(Screen::StageComplete);
        }
    }

    /// Success → Start.
    pub fn play_again(&mut self) {
        if self.screen == Screen::Success {
            self.go_to_start();
        }
    }

    fn start_session(&mut self, mode: SelectionMode, articles: Vec<Article>) {
        let count = articles.len();
        let mut session = QuizSession::new(mode, articles);
        session.start();
        self.session = Some(session);
        self.failure = None;
        self.ui.option_cursor = 0;
        self.ui.article_open = false;
        self.ui.article_scroll = 0;
        info!("quiz session started: {:?}, {} articles", mode, count);
        self.events.push(GameEvent::SessionStarted { mode, articles: count });
        self.set_screen(Screen::Game);
    }
}

// ── Stage one input ──

impl<S: KeyValueStore> Game<S> {
    /// A click on grid cell `(x, y)`. Blocked while frozen and while the
    /// stage-complete reveal is pending.
    pub fn submit_guess(&mut self, x: i32, y: i32, now: Instant) {
        if self.screen != Screen::Coordinate || self.freeze.is_active() || self.is_waiting() {
            return;
        }

        match self.hunt.submit_guess(x, y) {
            GuessOutcome::Ignored => {}
            GuessOutcome::Found { index } => {
                self.events.push(GameEvent::TreasureFound { index });
            }
            GuessOutcome::StageComplete => {
                let index = self.hunt.len() - 1;
                self.events.push(GameEvent::TreasureFound { index });
                self.events.push(GameEvent::AllTreasureFound);
                info!("treasure hunt complete");
                self.deferred.schedule(Deferred::ShowStageComplete, self.timing.found_delay, now);
            }
            GuessOutcome::Wrong => {
                info!(
                    "wrong guess ({}, {}) on point {}, freezing",
                    x, y, self.hunt.current_index() + 1
                );
                self.freeze.start(now);
                self.events.push(GameEvent::WrongGuess { x, y });
            }
        }
    }

    /// One press of the configured unlock key.
    pub fn unlock_key(&mut self, now: Instant) {
        if self.screen != Screen::Coordinate {
            return;
        }
        if let Some(channel) = self.freeze.unlock_key(now) {
            self.events.push(GameEvent::Unlocked(channel));
        }
    }

    /// One tap on the freeze overlay (only delivered while it is shown).
    pub fn overlay_tap(&mut self, now: Instant) {
        if self.screen != Screen::Coordinate || !self.freeze.is_active() {
            return;
        }
        if let Some(channel) = self.freeze.overlay_tap(now) {
            self.events.push(GameEvent::Unlocked(channel));
        }
    }
}

// ── Stage two input ──

impl<S: KeyValueStore> Game<S> {
    pub fn submit_answer(&mut self, option: usize, now: Instant) {
        if self.screen != Screen::Game || self.is_waiting() {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let in_range = session
            .current_question()
            .map(|q| option < q.options.len())
            .unwrap_or(false);
        if !in_range {
            return;
        }

        let article_index = session.article_index();
        let question_index = session.question_index();
        let outcome = session.submit_answer(option);
        let (correct, total) = (session.total_correct(), session.total_questions());
        let mode = session.mode();

        let feedback = |correct| Feedback { article_index, question_index, chosen: option, correct };

        match outcome {
            AnswerOutcome::Ignored => {}
            AnswerOutcome::Correct { next_article } => {
                self.feedback = Some(feedback(true));
                self.events.push(GameEvent::AnswerCorrect);
                self.deferred.schedule(
                    Deferred::NextQuestion { next_article },
                    self.timing.correct_delay,
                    now,
                );
            }
            AnswerOutcome::Success => {
                self.feedback = Some(feedback(true));
                self.events.push(GameEvent::AnswerCorrect);
                self.events.push(GameEvent::SessionSucceeded { correct, total });
                self.record_result(mode, true, correct, total);
                self.deferred.schedule(Deferred::ShowSuccess, self.timing.correct_delay, now);
            }
            AnswerOutcome::Failure(info) => {
                self.feedback = Some(feedback(false));
                self.events.push(GameEvent::AnswerWrong);
                self.events.push(GameEvent::SessionFailed { correct, total });
                self.failure = Some(info);
                self.record_result(mode, false, correct, total);
                self.deferred.schedule(Deferred::ShowFail, self.timing.wrong_delay, now);
            }
        }
    }

    /// Show/hide the article body on the quiz screen.
    pub fn toggle_article_view(&mut self) {
        if self.screen == Screen::Game {
            self.ui.article_open = !self.ui.article_open;
            self.ui.article_scroll = 0;
        }
    }

    fn record_result(&mut self, mode: SelectionMode, success: bool, correct: u32, total: u32) {
        info!(
            "quiz session {}: {}/{} ({:?})",
            if success { "passed" } else { "failed" }, correct, total, mode
        );
        self.ledger.append(PlayRecord {
            date: chrono::Utc::now(),
            mode,
            success,
            correct,
            total,
        });
        self.history = self.ledger.list();
    }
}

// ── Clock ──

impl<S: KeyValueStore> Game<S> {
    /// Advance timers to `now`. Call once per frame.
    pub fn tick(&mut self, now: Instant) {
        if self.screen == Screen::Coordinate {
            match self.freeze.tick(now) {
                Some(FreezeTick::Remaining(remaining)) => {
                    self.events.push(GameEvent::FreezeTick { remaining });
                }
                Some(FreezeTick::Expired) => {
                    info!("freeze expired");
                    self.events.push(GameEvent::FreezeExpired);
                }
                None => {}
            }
        }

        if let Some(action) = self.deferred.poll(now) {
            self.apply_deferred(action);
        }
    }

    fn apply_deferred(&mut self, action: Deferred) {
        match action {
            Deferred::ShowStageComplete => self.set_screen(Screen::StageComplete),
            Deferred::NextQuestion { next_article } => {
                self.feedback = None;
                self.ui.option_cursor = 0;
                if next_article {
                    self.ui.article_open = false;
                    self.ui.article_scroll = 0;
                }
            }
            Deferred::ShowFail => self.set_screen(Screen::Fail),
            Deferred::ShowSuccess => self.set_screen(Screen::Success),
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::article::fixtures::{article, catalog};
    use crate::domain::quiz::QuizStatus;
    use crate::domain::treasure::TREASURE_PATH;
    use crate::sim::freeze::UnlockChannel;
    use crate::sim::store::MemoryStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn new_game(articles: usize) -> Game<MemoryStore> {
        Game::new(catalog(articles), HistoryLedger::new(MemoryStore::new()), TimingConfig::default())
    }

    /// Play stage one perfectly and wait out the reveal. Returns the clock.
    fn clear_stage_one(g: &mut Game<MemoryStore>, t0: Instant) -> Instant {
        g.start();
        for p in TREASURE_PATH.iter() {
            g.submit_guess(p.x, p.y, t0);
        }
        let t = t0 + ms(800);
        g.tick(t);
        assert_eq!(g.screen(), Screen::StageComplete);
        t
    }

    fn current_answer(g: &Game<MemoryStore>) -> usize {
        g.session().and_then(|s| s.current_question()).expect("question").answer
    }

    /// Answer the current question and wait out the feedback delay.
    fn answer(g: &mut Game<MemoryStore>, correct: bool, now: Instant) -> Instant {
        let right = current_answer(g);
        let option = if correct { right } else { (right + 1) % 4 };
        g.submit_answer(option, now);
        let later = now + ms(1500);
        g.tick(later);
        later
    }

    // ── Stage one ──

    #[test]
    fn starts_on_start_screen() {
        let g = new_game(3);
        assert_eq!(g.screen(), Screen::Start);
        assert!(g.history().is_empty());
    }

    #[test]
    fn wrong_guess_freezes_for_180_seconds() {
        let t0 = Instant::now();
        let mut g = new_game(3);
        g.start();
        g.submit_guess(5, 3, t0);
        assert_eq!(g.hunt().current_index(), 0);
        assert_eq!(g.freeze_state(), FreezeState { remaining_seconds: 180, active: true });
        assert!(g.take_events().contains(&GameEvent::WrongGuess { x: 5, y: 3 }));
    }

    #[test]
    fn guesses_blocked_while_frozen() {
        let t0 = Instant::now();
        let mut g = new_game(3);
        g.start();
        g.submit_guess(9, 9, t0);
        g.submit_guess(0, 0, t0 + ms(10));
        assert_eq!(g.hunt().current_index(), 0);

        g.tick(t0 + Duration::from_secs(180));
        assert!(!g.freeze_state().active);
        assert!(g.take_events().contains(&GameEvent::FreezeExpired));
        g.submit_guess(0, 0, t0 + Duration::from_secs(181));
        assert_eq!(g.hunt().current_index(), 1);
    }

    #[test]
    fn reclicking_found_cell_never_freezes() {
        let t0 = Instant::now();
        let mut g = new_game(3);
        g.start();
        g.submit_guess(0, 0, t0);
        g.submit_guess(0, 0, t0 + ms(100));
        assert!(!g.freeze_state().active);
        assert_eq!(g.hunt().current_index(), 1);
    }

    #[test]
    fn freeze_ticks_are_reported() {
        let t0 = Instant::now();
        let mut g = new_game(3);
        g.start();
        g.submit_guess(1, 1, t0);
        g.take_events();
        g.tick(t0 + ms(2000));
        assert_eq!(g.take_events(), vec![GameEvent::FreezeTick { remaining: 178 }]);
    }

    #[test]
    fn triple_unlock_key_cancels_freeze() {
        let t0 = Instant::now();
        let mut g = new_game(3);
        g.start();
        g.submit_guess(1, 1, t0);
        g.tick(t0 + Duration::from_secs(42));
        for i in 0..3 {
            g.unlock_key(t0 + Duration::from_secs(42) + ms(i * 200));
        }
        assert!(!g.freeze_state().active);
        assert!(g.take_events().contains(&GameEvent::Unlocked(UnlockChannel::Key)));
        g.submit_guess(0, 0, t0 + Duration::from_secs(43));
        assert_eq!(g.hunt().current_index(), 1);
    }

    #[test]
    fn five_overlay_taps_cancel_freeze() {
        let t0 = Instant::now();
        let mut g = new_game(3);
        g.start();
        g.submit_guess(1, 1, t0);
        for i in 0..5 {
            g.overlay_tap(t0 + ms(i * 300));
        }
        assert!(!g.freeze_state().active);
    }

    #[test]
    fn stage_complete_waits_for_reveal_delay() {
        let t0 = Instant::now();
        let mut g = new_game(3);
        g.start();
        for p in TREASURE_PATH.iter() {
            g.submit_guess(p.x, p.y, t0);
        }
        g.tick(t0 + ms(799));
        assert_eq!(g.screen(), Screen::Coordinate);
        g.tick(t0 + ms(800));
        assert_eq!(g.screen(), Screen::StageComplete);
    }

    // ── Stage two ──

    #[test]
    fn random_all_correct_records_success() {
        let t0 = Instant::now();
        let mut g = new_game(10);
        let mut t = clear_stage_one(&mut g, t0);
        g.choose_random(&mut StdRng::seed_from_u64(3));
        assert_eq!(g.screen(), Screen::Game);
        for _ in 0..15 {
            t = answer(&mut g, true, t);
        }
        assert_eq!(g.screen(), Screen::Success);
        let rec = &g.history()[0];
        assert_eq!(
            (rec.mode, rec.success, rec.correct, rec.total),
            (SelectionMode::Random, true, 15, 15)
        );
    }

    #[test]
    fn manual_failure_records_progress() {
        let t0 = Instant::now();
        let mut g = new_game(9);
        let mut t = clear_stage_one(&mut g, t0);
        g.open_manual_select();
        assert_eq!(g.screen(), Screen::Select);
        for n in 1..=7 {
            g.toggle_article(&article(n).id);
        }
        g.confirm_manual().unwrap();
        assert_eq!(g.screen(), Screen::Game);

        for _ in 0..11 {
            t = answer(&mut g, true, t);
        }
        answer(&mut g, false, t);

        assert_eq!(g.screen(), Screen::Fail);
        let rec = &g.history()[0];
        assert_eq!(
            (rec.mode, rec.success, rec.correct, rec.total),
            (SelectionMode::Manual, false, 11, 35)
        );
        let failure = g.failure().unwrap();
        assert_eq!(failure.article_title, "Article 3");
        assert_eq!(failure.question, "Question 2");
    }

    #[test]
    fn confirm_requires_exactly_seven() {
        let t0 = Instant::now();
        let mut g = new_game(9);
        clear_stage_one(&mut g, t0);
        g.open_manual_select();
        for n in 1..=6 {
            g.toggle_article(&article(n).id);
        }
        g.confirm_manual().unwrap();
        assert_eq!(g.screen(), Screen::Select);
        g.toggle_article(&article(7).id);
        assert_eq!(g.toggle_article(&article(8).id), ToggleOutcome::Rejected);
        assert!(g.message().is_some());
        g.confirm_manual().unwrap();
        assert_eq!(g.screen(), Screen::Game);
        assert!(g.message().is_none());
        assert_eq!(g.session().unwrap().total_questions(), 35);
    }

    #[test]
    fn missing_article_aborts_to_start() {
        let t0 = Instant::now();
        let mut g = new_game(9);
        clear_stage_one(&mut g, t0);
        g.open_manual_select();
        for n in 1..=6 {
            g.toggle_article(&article(n).id);
        }
        g.toggle_article("1999-01-01-gone");
        assert!(matches!(g.confirm_manual(), Err(GameError::MissingArticle(_))));
        assert_eq!(g.screen(), Screen::Start);
        assert!(g.session().is_none());
        assert!(g.message().is_some());
    }

    #[test]
    fn answers_ignored_during_feedback() {
        let t0 = Instant::now();
        let mut g = new_game(3);
        let t = clear_stage_one(&mut g, t0);
        g.choose_random(&mut StdRng::seed_from_u64(1));
        let right = current_answer(&g);
        g.submit_answer(right, t);
        // Same option again before the delay elapses must not score.
        g.submit_answer(0, t + ms(10));
        g.submit_answer(1, t + ms(20));
        let s = g.session().unwrap();
        assert_eq!((s.total_correct(), s.answered()), (1, 1));
        assert!(g.feedback().unwrap().correct);
        // Feedback still shows the question that was answered.
        assert_eq!(g.displayed_question().unwrap().1, 0);
        g.tick(t + ms(1000));
        assert!(g.feedback().is_none());
        assert_eq!(g.displayed_question().unwrap().1, 1);
    }

    #[test]
    fn out_of_range_option_is_ignored() {
        let t0 = Instant::now();
        let mut g = new_game(3);
        let t = clear_stage_one(&mut g, t0);
        g.choose_random(&mut StdRng::seed_from_u64(1));
        g.submit_answer(9, t);
        assert_eq!(g.session().unwrap().answered(), 0);
        assert_eq!(g.session().unwrap().status(), QuizStatus::InProgress);
    }

    #[test]
    fn retry_stage2_skips_treasure_hunt() {
        let t0 = Instant::now();
        let mut g = new_game(3);
        let t = clear_stage_one(&mut g, t0);
        g.choose_random(&mut StdRng::seed_from_u64(5));
        answer(&mut g, false, t);
        assert_eq!(g.screen(), Screen::Fail);
        g.retry_stage2();
        assert_eq!(g.screen(), Screen::StageComplete);
        assert!(g.session().is_none());
    }

    #[test]
    fn retry_returns_to_start_and_resets_hunt() {
        let t0 = Instant::now();
        let mut g = new_game(3);
        let t = clear_stage_one(&mut g, t0);
        g.choose_random(&mut StdRng::seed_from_u64(5));
        answer(&mut g, false, t);
        g.retry();
        assert_eq!(g.screen(), Screen::Start);
        assert_eq!(g.hunt().current_index(), 0);
        assert_eq!(g.history().len(), 1);
    }

    #[test]
    fn back_from_select_returns_to_stage_complete() {
        let t0 = Instant::now();
        let mut g = new_game(3);
        clear_stage_one(&mut g, t0);
        g.open_manual_select();
        g.back_to_stage_complete();
        assert_eq!(g.screen(), Screen::StageComplete);
    }

    #[test]
    fn transitions_from_wrong_screen_are_ignored() {
        let mut g = new_game(3);
        g.open_manual_select();
        g.retry();
        g.play_again();
        g.choose_random(&mut StdRng::seed_from_u64(0));
        assert_eq!(g.screen(), Screen::Start);
        g.start();
        g.start();
        assert_eq!(g.screen(), Screen::Coordinate);
    }

    #[test]
    fn next_article_collapses_article_view() {
        let t0 = Instant::now();
        let mut g = new_game(3);
        let mut t = clear_stage_one(&mut g, t0);
        g.choose_random(&mut StdRng::seed_from_u64(2));
        g.toggle_article_view();
        assert!(g.ui.article_open);
        for _ in 0..4 {
            t = answer(&mut g, true, t);
        }
        assert!(g.ui.article_open);
        answer(&mut g, true, t);
        assert!(!g.ui.article_open);
        assert_eq!(g.session().unwrap().article_index(), 1);
    }

    #[test]
    fn success_screen_play_again_resets() {
        let t0 = Instant::now();
        let mut g = new_game(3);
        let mut t = clear_stage_one(&mut g, t0);
        g.choose_random(&mut StdRng::seed_from_u64(8));
        for _ in 0..15 {
            t = answer(&mut g, true, t);
        }
        g.play_again();
        assert_eq!(g.screen(), Screen::Start);
        assert!(g.session().is_none());
        assert!(g.take_events().contains(&GameEvent::ScreenChanged(Screen::Start)));
    }
}
