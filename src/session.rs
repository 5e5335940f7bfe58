use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::analytics::Scoreboard;
use crate::chart::{self, ChartView, OverlayFlags, RevealPolicy};
use crate::dataset::LoadedDataset;
use crate::quiz::{grade, Breakdown, Question, UserInput, UserResponse};
use crate::store::{AnswerMap, AnswerStore, StoreError};

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("no question loaded")]
    NoQuestion,

    #[error("question {0} does not exist")]
    OutOfRange(usize),

    #[error("choose a direction and a move bucket before grading")]
    IncompleteInput,

    #[error("timeframe {timeframe} is not available for {question}")]
    UnsupportedTimeframe { question: String, timeframe: String },

    #[error("failed to save answers: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Ema,
    Bollinger,
    Structure,
}

/// Everything a front end needs to redraw the current screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppState {
    pub set: String,
    pub dataset_file: String,
    pub current_index: usize,
    pub active_tf: String,
    pub overlays: OverlayFlags,
    pub answers: AnswerMap,
}

/// Owns the mutable quiz state; every action recomputes from it through the
/// pure grader and projector.
pub struct Session {
    questions: Vec<Question>,
    state: AppState,
    store: AnswerStore,
}

impl Session {
    pub fn new(
        dataset: LoadedDataset,
        store: AnswerStore,
        default_tf: &str,
        overlays: OverlayFlags,
    ) -> Self {
        let answers = store.load();
        let mut session = Self {
            questions: dataset.questions,
            state: AppState {
                set: dataset.set,
                dataset_file: dataset.file_name,
                current_index: 0,
                active_tf: default_tf.to_string(),
                overlays,
                answers,
            },
            store,
        };
        session.normalize_timeframe();
        session
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current(&self) -> Option<&Question> {
        self.questions.get(self.state.current_index)
    }

    pub fn current_response(&self) -> Option<&UserResponse> {
        let question = self.current()?;
        self.state.answers.get(&question.id)
    }

    pub fn is_revealed(&self) -> bool {
        self.current_response().map(|r| r.revealed).unwrap_or(false)
    }

    pub fn next(&mut self) -> bool {
        if self.state.current_index + 1 >= self.questions.len() {
            return false;
        }
        self.state.current_index += 1;
        self.normalize_timeframe();
        true
    }

    pub fn prev(&mut self) -> bool {
        if self.state.current_index == 0 {
            return false;
        }
        self.state.current_index -= 1;
        self.normalize_timeframe();
        true
    }

    pub fn select(&mut self, index: usize) -> Result<(), QuizError> {
        if index >= self.questions.len() {
            return Err(QuizError::OutOfRange(index));
        }
        self.state.current_index = index;
        self.normalize_timeframe();
        Ok(())
    }

    /// Grade the current question and persist the result. Keeps an earlier
    /// reveal. Nothing changes in memory when the save fails.
    pub fn grade_current(&mut self, input: &UserInput) -> Result<Breakdown, QuizError> {
        let question = self.current().ok_or(QuizError::NoQuestion)?;
        if !input.is_complete() {
            return Err(QuizError::IncompleteInput);
        }

        let breakdown = grade(question, input);
        let id = question.id.clone();
        let revealed = self
            .state
            .answers
            .get(&id)
            .map(|prev| prev.revealed)
            .unwrap_or(false);

        info!(
            "📝 Graded {}: direction={} move={} stop={} total={}",
            id, breakdown.direction, breakdown.move_score, breakdown.stop, breakdown.total
        );

        self.commit(
            id,
            UserResponse {
                input: UserInput {
                    stop: input.stop.filter(|s| s.is_finite()),
                    ..input.clone()
                },
                breakdown,
                revealed,
                updated_at: Some(Utc::now()),
            },
        )?;
        Ok(breakdown)
    }

    /// Reveal the answer, grading `pending` first when the question has not
    /// been graded yet. Nothing changes if that grading is rejected.
    pub fn reveal_current(&mut self, pending: &UserInput) -> Result<Breakdown, QuizError> {
        let id = self.current().ok_or(QuizError::NoQuestion)?.id.clone();

        if !self.state.answers.contains_key(&id) {
            debug!("{} not graded yet, grading before reveal", id);
            self.grade_current(pending)?;
        }

        let mut response = self
            .state
            .answers
            .get(&id)
            .cloned()
            .ok_or(QuizError::NoQuestion)?;
        response.revealed = true;
        let breakdown = response.breakdown;

        self.commit(id.clone(), response)?;
        info!("🔓 Revealed {}", id);
        Ok(breakdown)
    }

    /// Persist first, then update memory, so a failed save changes nothing.
    fn commit(&mut self, id: String, response: UserResponse) -> Result<(), QuizError> {
        let mut answers = self.state.answers.clone();
        answers.insert(id, response);
        self.store.save(&answers)?;
        self.state.answers = answers;
        Ok(())
    }

    /// Switch timeframe; only timeframes the current question supports.
    pub fn set_timeframe(&mut self, tf: &str) -> Result<(), QuizError> {
        let question = self.current().ok_or(QuizError::NoQuestion)?;
        if !chart::is_supported(question, tf) {
            return Err(QuizError::UnsupportedTimeframe {
                question: question.id.clone(),
                timeframe: tf.to_string(),
            });
        }
        self.state.active_tf = tf.to_string();
        Ok(())
    }

    /// Flip one overlay group, returning its new state
    pub fn toggle_overlay(&mut self, overlay: Overlay) -> bool {
        let flags = &mut self.state.overlays;
        let slot = match overlay {
            Overlay::Ema => &mut flags.ema,
            Overlay::Bollinger => &mut flags.bb,
            Overlay::Structure => &mut flags.structure,
        };
        *slot = !*slot;
        *slot
    }

    pub fn available_timeframes(&self) -> Vec<String> {
        self.current()
            .map(|q| {
                chart::available_timeframes(q)
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Projected chart for the current question, or `None` with no questions
    pub fn current_view(&self) -> Option<ChartView> {
        let question = self.current()?;
        let tf = chart::resolve_timeframe(question, &self.state.active_tf);
        Some(chart::project_chart(
            question,
            &tf,
            RevealPolicy::from_revealed(self.is_revealed()),
            self.state.overlays,
        ))
    }

    pub fn scoreboard(&self) -> Scoreboard {
        Scoreboard::build(&self.questions, &self.state.answers, self.state.current_index)
    }

    fn normalize_timeframe(&mut self) {
        let Some(question) = self.questions.get(self.state.current_index) else {
            return;
        };
        let resolved = chart::resolve_timeframe(question, &self.state.active_tf);
        if resolved != self.state.active_tf {
            warn!(
                "Timeframe {} not available for {}, using {}",
                self.state.active_tf, question.id, resolved
            );
            self.state.active_tf = resolved;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::{Direction, MoveBucket};
    use tempfile::TempDir;

    fn dataset() -> LoadedDataset {
        let raw = serde_json::json!({
            "questions": [
                {
                    "id": "Q01",
                    "entry_price": 100.0,
                    "series": [ { "t": 1000000, "o": 1, "h": 1, "l": 1, "c": 1 },
                                { "t": 2000000, "o": 1, "h": 1, "l": 1, "c": 1 } ],
                    "reveal_index": 0,
                    "answer": { "direction": "long", "move_bucket": "mid", "recommended_stop_price": 98.0 }
                },
                {
                    "id": "Q02",
                    "entry_price": 50.0,
                    "available_tfs": ["5m", "1h"],
                    "timeframes": {
                        "5m": { "series": [ { "t": 1000000 } ], "reveal_index": 0 },
                        "1h": { "series": [ { "t": 1000000 } ], "reveal_index": 0 }
                    },
                    "answer": { "direction": "short", "move_bucket": "weak", "recommended_stop_price": 51.0 }
                }
            ]
        });
        let dataset: crate::quiz::Dataset = serde_json::from_value(raw).unwrap();
        LoadedDataset {
            set: "10".into(),
            file_name: "questions_10.json".into(),
            questions: dataset.questions,
        }
    }

    fn session(dir: &TempDir) -> Session {
        Session::new(
            dataset(),
            AnswerStore::new(dir.path(), "10"),
            "1h",
            OverlayFlags::default(),
        )
    }

    #[test]
    fn test_incomplete_input_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        let input = UserInput {
            direction: Some(Direction::Long),
            ..Default::default()
        };
        assert!(matches!(s.grade_current(&input), Err(QuizError::IncompleteInput)));
        assert!(s.current_response().is_none());
        assert!(!s.store.path().exists());
    }

    #[test]
    fn test_grade_then_reveal_persists() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        let input = UserInput::new(Direction::Long, MoveBucket::Mid, Some(97.9));

        let b = s.grade_current(&input).unwrap();
        assert_eq!(b.total, 100);
        assert!(!s.is_revealed());

        s.reveal_current(&UserInput::default()).unwrap();
        assert!(s.is_revealed());

        // regrading keeps the reveal
        let b = s.grade_current(&UserInput::new(Direction::Short, MoveBucket::Mid, None)).unwrap();
        assert_eq!(b.total, 25);
        assert!(s.is_revealed());

        let reloaded = session(&dir);
        assert_eq!(reloaded.state().answers["Q01"].breakdown.total, 25);
        assert!(reloaded.state().answers["Q01"].revealed);
    }

    #[test]
    fn test_reveal_auto_grades() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);

        assert!(matches!(
            s.reveal_current(&UserInput::default()),
            Err(QuizError::IncompleteInput)
        ));
        assert!(!s.is_revealed());

        let b = s
            .reveal_current(&UserInput::new(Direction::Long, MoveBucket::Weak, None))
            .unwrap();
        assert_eq!(b.total, 50);
        assert!(s.is_revealed());
        assert_eq!(s.current_view().unwrap().candles.len(), 2);
    }

    #[test]
    fn test_navigation_normalizes_timeframe() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        // Q01 only has the legacy series
        assert_eq!(s.state().active_tf, "15m");
        assert!(!s.prev());
        assert!(s.next());
        assert_eq!(s.state().active_tf, "1h");
        assert!(!s.next());

        s.set_timeframe("5m").unwrap();
        assert!(matches!(
            s.set_timeframe("15m"),
            Err(QuizError::UnsupportedTimeframe { .. })
        ));
        assert_eq!(s.current_view().unwrap().timeframe, "5m");
        assert!(matches!(s.select(5), Err(QuizError::OutOfRange(5))));
    }

    #[test]
    fn test_toggle_overlay() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        assert!(!s.toggle_overlay(Overlay::Ema));
        assert!(!s.state().overlays.ema);
        assert!(s.toggle_overlay(Overlay::Ema));
        assert!(!s.toggle_overlay(Overlay::Structure));
        assert!(s.state().overlays.bb);
    }

    #[test]
    fn test_failed_save_leaves_state_untouched() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        s.grade_current(&UserInput::new(Direction::Long, MoveBucket::Weak, None))
            .unwrap();

        // a directory where the store file should be makes every write fail
        std::fs::remove_file(s.store.path()).unwrap();
        std::fs::create_dir(s.store.path()).unwrap();

        let err = s
            .grade_current(&UserInput::new(Direction::Long, MoveBucket::Mid, Some(97.9)))
            .unwrap_err();
        assert!(matches!(err, QuizError::Store(_)));
        assert_eq!(s.current_response().unwrap().breakdown.total, 50);

        assert!(matches!(
            s.reveal_current(&UserInput::default()),
            Err(QuizError::Store(_))
        ));
        assert!(!s.is_revealed());

        s.next();
        assert!(s
            .grade_current(&UserInput::new(Direction::Short, MoveBucket::Weak, None))
            .is_err());
        assert!(s.current_response().is_none());
    }
}
