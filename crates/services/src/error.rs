//! Shared error types for the services crate.

use thiserror::Error;

use hub_core::model::{ModuleId, ProfileUpdateError};
use hub_core::session::QuizSessionError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `HomeService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HomeServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `StreakService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StreakServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `DailyQuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DailyQuizError {
    #[error(transparent)]
    Session(#[from] QuizSessionError),
    #[error(transparent)]
    Storage(StorageError),
}

/// A store-level `Conflict` on the attempt log means another submission
/// for the same day already landed, so it surfaces as `AlreadyAnswered`
/// rather than as a storage failure.
impl From<StorageError> for DailyQuizError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict => Self::Session(QuizSessionError::AlreadyAnswered),
            other => Self::Storage(other),
        }
    }
}

/// Errors emitted by `ModuleViewerService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModuleViewerError {
    #[error("module {0} not found")]
    ModuleNotFound(ModuleId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProfileService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProfileServiceError {
    #[error("no profile row for this user")]
    ProfileNotFound,
    #[error(transparent)]
    Update(#[from] ProfileUpdateError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
