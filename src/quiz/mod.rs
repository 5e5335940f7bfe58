pub mod grader;
pub mod labels;
pub mod types;

pub use grader::{grade, score_stop};
pub use types::{
    Answer, BacktestRef, Bar, Breakdown, Dataset, Direction, Drawings, IndicatorSnapshot,
    MoveBucket, Question, StructureMarker, TimeframePayload, TrendGuide, UserInput, UserResponse,
};
