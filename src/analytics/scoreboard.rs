use serde::{Deserialize, Serialize};

use crate::quiz::Question;
use crate::store::AnswerMap;

/// Per-question row of the question list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionStatus {
    pub index: usize,
    pub id: String,
    pub symbol: String,
    pub score: Option<u32>,
    pub revealed: bool,
    pub current: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub question_count: usize,
    pub graded: usize,
    pub revealed: usize,
    pub average_total: f64,
    pub entries: Vec<QuestionStatus>,
}

impl Scoreboard {
    /// Graded/revealed counts and the average come from every stored answer
    /// of the set, including ids missing from the loaded questions.
    pub fn build(questions: &[Question], answers: &AnswerMap, current_index: usize) -> Self {
        let graded = answers.len();
        let revealed = answers.values().filter(|r| r.revealed).count();
        let average_total = if graded == 0 {
            0.0
        } else {
            answers.values().map(|r| r.breakdown.total as f64).sum::<f64>() / graded as f64
        };

        let entries = questions
            .iter()
            .enumerate()
            .map(|(index, q)| {
                let response = answers.get(&q.id);
                QuestionStatus {
                    index,
                    id: q.id.clone(),
                    symbol: q.symbol.clone(),
                    score: response.map(|r| r.breakdown.total),
                    revealed: response.map(|r| r.revealed).unwrap_or(false),
                    current: index == current_index,
                }
            })
            .collect();

        Self {
            question_count: questions.len(),
            graded,
            revealed,
            average_total,
            entries,
        }
    }
}
