mod achievement;
mod curriculum;
mod ids;
mod profile;
mod progress;
mod quiz;
mod streak;

pub use ids::{
    AchievementId, AttemptId, ConceptId, LevelId, ModuleId, ParseIdError, QuizId, SubModuleId,
    UserId,
};

pub use achievement::{Achievement, EarnedAchievement};
pub use curriculum::{Level, MicroConcept, Module, SubModule};
pub use profile::{ProfileUpdate, ProfileUpdateError, UserProfile};
pub use progress::ProgressRow;
pub use quiz::{DailyQuiz, QuizAttempt};
pub use streak::{Streak, StreakError};
