use thiserror::Error;

use crate::model::{ProfileUpdateError, StreakError};
use crate::session::QuizSessionError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Streak(#[from] StreakError),
    #[error(transparent)]
    QuizSession(#[from] QuizSessionError),
    #[error(transparent)]
    ProfileUpdate(#[from] ProfileUpdateError),
}
