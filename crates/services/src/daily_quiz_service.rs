use std::sync::Arc;

use hub_core::Clock;
use hub_core::model::{DailyQuiz, QuizAttempt, Streak, UserId};
use hub_core::session::QuizSession;
use storage::repository::{
    AttemptPersistence, NewAttemptRecord, QuizRepository, StorageError, StreakRepository,
};

use crate::error::DailyQuizError;

/// Today's quiz state for one user, as fetched in one batch.
#[derive(Debug, Clone)]
pub struct QuizView {
    pub quiz: Option<DailyQuiz>,
    pub attempt: Option<QuizAttempt>,
    pub streak: Streak,
}

impl QuizView {
    /// The state machine over today's quiz and attempt.
    #[must_use]
    pub fn session(&self) -> QuizSession {
        QuizSession::new(self.quiz.clone(), self.attempt.clone())
    }
}

/// The result of an accepted submission.
#[derive(Debug, Clone)]
pub struct QuizOutcome {
    pub attempt: QuizAttempt,
    pub streak: Streak,
}

/// Orchestrates the daily quiz: loading today's state and recording
/// submissions together with the streak they produce.
#[derive(Clone)]
pub struct DailyQuizService {
    clock: Clock,
    streaks: Arc<dyn StreakRepository>,
    quizzes: Arc<dyn QuizRepository>,
    attempts: Arc<dyn AttemptPersistence>,
}

impl DailyQuizService {
    #[must_use]
    pub fn new(
        clock: Clock,
        streaks: Arc<dyn StreakRepository>,
        quizzes: Arc<dyn QuizRepository>,
        attempts: Arc<dyn AttemptPersistence>,
    ) -> Self {
        Self {
            clock,
            streaks,
            quizzes,
            attempts,
        }
    }

    /// Loads today's quiz, today's attempt and the user's streak. A user
    /// seen without a streak row gets one created, zeroed.
    ///
    /// # Errors
    ///
    /// Returns `DailyQuizError::Storage` if any read in the batch fails.
    pub async fn load(&self, user: UserId) -> Result<QuizView, DailyQuizError> {
        let today = self.clock.today();
        let (quiz, streak, attempt) = tokio::try_join!(
            self.quizzes.active_quiz(today),
            self.streaks.streak(user),
            self.quizzes.attempt_on(user, today),
        )?;

        let streak = match streak {
            Some(streak) => streak,
            None => {
                tracing::debug!(%user, "creating zero streak row on first sight");
                match self.streaks.create_streak(user).await {
                    Ok(streak) => streak,
                    // Lost a race with another session; the row exists now.
                    Err(StorageError::Conflict) => {
                        self.streaks.streak(user).await?.unwrap_or_default()
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        };

        Ok(QuizView {
            quiz,
            attempt,
            streak,
        })
    }

    /// Checks the answer against today's quiz and persists the attempt and
    /// the updated streak as one logical write.
    ///
    /// # Errors
    ///
    /// Returns `DailyQuizError::Session` when no quiz is scheduled or the
    /// user already answered today (including a concurrent double-submit
    /// caught by the store), and `DailyQuizError::Storage` on store
    /// failure.
    pub async fn submit(&self, user: UserId, answer: &str) -> Result<QuizOutcome, DailyQuizError> {
        let view = self.load(user).await?;
        let submission = view.session().evaluate(answer)?;

        let mut streak = view.streak;
        let now = self.clock.now();
        streak.apply(submission.is_correct, now.date_naive());

        let record = NewAttemptRecord {
            user_id: user,
            quiz_id: submission.quiz_id,
            user_answer: submission.user_answer,
            is_correct: submission.is_correct,
            attempted_at: now,
        };
        let id = self.attempts.record_attempt(&record, &streak).await?;
        tracing::info!(
            %user,
            is_correct = record.is_correct,
            current_streak = streak.current_streak(),
            "daily quiz answer recorded"
        );

        Ok(QuizOutcome {
            attempt: record.into_attempt(id),
            streak,
        })
    }
}
