#![forbid(unsafe_code)]

pub mod app_services;
pub mod daily_quiz_service;
pub mod error;
pub mod home_service;
pub mod module_viewer_service;
pub mod profile_service;
pub mod progress_service;
pub mod streak_service;

pub use hub_core::Clock;

pub use app_services::AppServices;
pub use daily_quiz_service::{DailyQuizService, QuizOutcome, QuizView};
pub use error::{
    AppServicesError, DailyQuizError, HomeServiceError, ModuleViewerError, ProfileServiceError,
    ProgressServiceError, StreakServiceError,
};
pub use home_service::{HomeService, HomeView, ModuleCard};
pub use module_viewer_service::{ModuleView, ModuleViewerService, SubModuleEntry};
pub use profile_service::{ProfileService, ProfileView};
pub use progress_service::{
    LevelProgressView, ModuleProgressRow, ProgressOverview, ProgressService,
};
pub use streak_service::{CalendarDay, DayOutcome, StreakService, StreakView};
