pub mod scoreboard;

pub use scoreboard::{QuestionStatus, Scoreboard};
