//! Daily-quiz session state machine.
//!
//! Composed per view activation from the day's fetched state: the active
//! quiz for today (if any) and the user's attempt for today (if any). It
//! enforces at most one submission per user per calendar day and keeps
//! redisplay idempotent: once an attempt exists, the stored answer and
//! outcome are shown and further submissions are refused.

use thiserror::Error;

use crate::model::{DailyQuiz, QuizAttempt, QuizId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizSessionError {
    #[error("no active quiz for today")]
    NoActiveQuiz,

    #[error("today's quiz was already answered")]
    AlreadyAnswered,
}

/// The three conditional states the quiz view renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizStatus {
    /// No quiz is scheduled for today.
    NoQuiz,
    /// A quiz is available and the user has not answered yet.
    Open,
    /// The user already answered today; only the stored outcome is shown.
    Answered,
}

/// An accepted answer, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub quiz_id: QuizId,
    pub user_answer: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    quiz: Option<DailyQuiz>,
    attempt: Option<QuizAttempt>,
}

impl QuizSession {
    /// Builds a session from today's active quiz and today's attempt.
    /// Both inputs must already be scoped to the same calendar date.
    #[must_use]
    pub fn new(quiz: Option<DailyQuiz>, attempt: Option<QuizAttempt>) -> Self {
        Self { quiz, attempt }
    }

    #[must_use]
    pub fn status(&self) -> QuizStatus {
        match (&self.quiz, &self.attempt) {
            (None, _) => QuizStatus::NoQuiz,
            (Some(_), Some(_)) => QuizStatus::Answered,
            (Some(_), None) => QuizStatus::Open,
        }
    }

    #[must_use]
    pub fn quiz(&self) -> Option<&DailyQuiz> {
        self.quiz.as_ref()
    }

    /// The stored attempt, when today's quiz was already answered.
    #[must_use]
    pub fn attempt(&self) -> Option<&QuizAttempt> {
        self.attempt.as_ref()
    }

    /// Checks the given answer against today's quiz.
    ///
    /// Correctness is exact string equality with the stored answer; no
    /// trimming or case folding is applied.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveQuiz` when no quiz is scheduled for today and
    /// `AlreadyAnswered` when an attempt for today already exists.
    pub fn evaluate(&self, answer: &str) -> Result<Submission, QuizSessionError> {
        let quiz = self.quiz.as_ref().ok_or(QuizSessionError::NoActiveQuiz)?;
        if self.attempt.is_some() {
            return Err(QuizSessionError::AlreadyAnswered);
        }
        Ok(Submission {
            quiz_id: quiz.id,
            user_answer: answer.to_owned(),
            is_correct: answer == quiz.correct_answer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttemptId, UserId};
    use crate::time::fixed_now;

    fn quiz() -> DailyQuiz {
        DailyQuiz {
            id: QuizId::new(7),
            quiz_date: fixed_now().date_naive(),
            question_text: "Which tense describes a finished past action?".into(),
            options: vec![
                "Past simple".into(),
                "Present perfect".into(),
                "Future continuous".into(),
            ],
            correct_answer: "Past simple".into(),
            explanation: "The past simple marks completed actions.".into(),
            is_active: true,
        }
    }

    fn attempt(answer: &str, is_correct: bool) -> QuizAttempt {
        QuizAttempt {
            id: AttemptId::new(1),
            user_id: UserId::random(),
            quiz_id: QuizId::new(7),
            user_answer: answer.into(),
            is_correct,
            attempted_at: fixed_now(),
        }
    }

    #[test]
    fn status_reflects_fetched_state() {
        assert_eq!(QuizSession::new(None, None).status(), QuizStatus::NoQuiz);
        assert_eq!(
            QuizSession::new(Some(quiz()), None).status(),
            QuizStatus::Open
        );
        assert_eq!(
            QuizSession::new(Some(quiz()), Some(attempt("Past simple", true))).status(),
            QuizStatus::Answered
        );
    }

    #[test]
    fn evaluate_uses_exact_string_equality() {
        let session = QuizSession::new(Some(quiz()), None);

        let correct = session.evaluate("Past simple").unwrap();
        assert!(correct.is_correct);
        assert_eq!(correct.quiz_id, QuizId::new(7));

        let wrong_case = session.evaluate("past simple").unwrap();
        assert!(!wrong_case.is_correct);
    }

    #[test]
    fn evaluate_without_quiz_fails() {
        let session = QuizSession::new(None, None);
        assert_eq!(
            session.evaluate("anything"),
            Err(QuizSessionError::NoActiveQuiz)
        );
    }

    #[test]
    fn second_submission_is_refused() {
        let stored = attempt("Present perfect", false);
        let session = QuizSession::new(Some(quiz()), Some(stored.clone()));

        assert_eq!(
            session.evaluate("Past simple"),
            Err(QuizSessionError::AlreadyAnswered)
        );
        // Redisplay shows the stored outcome unchanged.
        let shown = session.attempt().unwrap();
        assert_eq!(shown.user_answer, stored.user_answer);
        assert!(!shown.is_correct);
    }
}
