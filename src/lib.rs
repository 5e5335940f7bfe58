pub mod analytics;
pub mod chart;
pub mod config;
pub mod dataset;
pub mod quiz;
pub mod session;
pub mod shell;
pub mod store;

pub use chart::{project_chart, ChartView, OverlayFlags, RevealPolicy};
pub use quiz::{grade, Breakdown, Question, UserInput};
pub use session::{QuizError, Session};
