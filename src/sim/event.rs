/// Events emitted by the game controller.
/// The presentation layer consumes these for sound and the log.

use crate::domain::selection::SelectionMode;

use super::freeze::UnlockChannel;
use super::game::Screen;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    ScreenChanged(Screen),
    TreasureFound { index: usize },
    AllTreasureFound,
    WrongGuess { x: i32, y: i32 },
    FreezeTick { remaining: u32 },
    FreezeExpired,
    Unlocked(UnlockChannel),
    SessionStarted { mode: SelectionMode, articles: usize },
    AnswerCorrect,
    AnswerWrong,
    SessionSucceeded { correct: u32, total: u32 },
    SessionFailed { correct: u32, total: u32 },
}
