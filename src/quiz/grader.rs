use super::types::{Breakdown, Direction, Question, UserInput};

pub const DIRECTION_POINTS: u32 = 50;
pub const MOVE_POINTS: u32 = 25;

/// (max distance from the recommended stop in % of entry, points).
/// Inclusive upper bounds, first match wins.
const STOP_BANDS: [(f64, u32); 4] = [(0.2, 25), (0.4, 20), (0.8, 12), (1.2, 6)];

impl Breakdown {
    /// Whether this breakdown could have come out of [`grade`].
    pub fn is_valid(&self) -> bool {
        matches!(self.direction, 0 | DIRECTION_POINTS)
            && matches!(self.move_score, 0 | MOVE_POINTS)
            && (self.stop == 0 || STOP_BANDS.iter().any(|(_, points)| *points == self.stop))
            && self.total == self.direction + self.move_score + self.stop
    }
}

/// Score a submission against the question's precomputed answer.
///
/// Missing direction or move simply fails to match and scores 0; blocking
/// incomplete submissions is left to the caller.
pub fn grade(question: &Question, input: &UserInput) -> Breakdown {
    let answer = &question.answer;

    let direction_score = if input.direction == Some(answer.direction) {
        DIRECTION_POINTS
    } else {
        0
    };
    let move_score = if input.move_bucket == Some(answer.move_bucket) {
        MOVE_POINTS
    } else {
        0
    };
    let stop_score = score_stop(
        input.stop,
        answer.recommended_stop_price,
        answer.direction,
        question.entry_price,
    );

    Breakdown::new(direction_score, move_score, stop_score)
}

/// Stop placement score. The side check uses the answer's direction, not the
/// trader's guess.
pub fn score_stop(stop: Option<f64>, recommended: f64, direction: Direction, entry: f64) -> u32 {
    let stop = match stop {
        Some(s) if s.is_finite() => s,
        _ => return 0,
    };

    match direction {
        Direction::Long if stop >= entry => return 0,
        Direction::Short if stop <= entry => return 0,
        _ => {}
    }

    let dist_pct = (stop - recommended).abs() / entry * 100.0;
    if !dist_pct.is_finite() {
        return 0;
    }

    STOP_BANDS
        .iter()
        .find(|(limit, _)| dist_pct <= *limit)
        .map(|(_, points)| *points)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::types::MoveBucket;

    fn question(direction: Direction, bucket: MoveBucket, entry: f64, stop: f64) -> Question {
        let value = serde_json::json!({
            "id": "Q01",
            "entry_price": entry,
            "answer": {
                "direction": direction.as_str(),
                "move_bucket": bucket.as_str(),
                "recommended_stop_price": stop
            }
        });
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_stop_bands() {
        // entry 100, recommended 98
        let cases = [
            (97.9, 25), // 0.1%
            (98.15, 25),
            (98.35, 20),
            (98.7, 12),
            (99.1, 6),
            (96.5, 0), // 1.5%
        ];
        for (stop, expected) in cases {
            assert_eq!(
                score_stop(Some(stop), 98.0, Direction::Long, 100.0),
                expected,
                "stop {}",
                stop
            );
        }
    }

    #[test]
    fn test_wrong_side_of_entry() {
        assert_eq!(score_stop(Some(101.0), 98.0, Direction::Long, 100.0), 0);
        assert_eq!(score_stop(Some(100.0), 100.0, Direction::Long, 100.0), 0);
        assert_eq!(score_stop(Some(99.0), 102.0, Direction::Short, 100.0), 0);
        assert_eq!(score_stop(Some(100.0), 100.0, Direction::Short, 100.0), 0);
        assert_eq!(score_stop(Some(102.1), 102.0, Direction::Short, 100.0), 25);
    }

    #[test]
    fn test_non_finite_inputs() {
        assert_eq!(score_stop(None, 98.0, Direction::Long, 100.0), 0);
        assert_eq!(score_stop(Some(f64::NAN), 98.0, Direction::Long, 100.0), 0);
        assert_eq!(score_stop(Some(f64::INFINITY), 98.0, Direction::Short, 100.0), 0);
        assert_eq!(score_stop(Some(97.9), f64::NAN, Direction::Long, 100.0), 0);
        assert_eq!(score_stop(Some(-1.0), 98.0, Direction::Long, 0.0), 0);
    }

    #[test]
    fn test_monotonic_in_distance() {
        let mut last = u32::MAX;
        let mut stop = 98.0;
        while stop > 95.0 {
            let score = score_stop(Some(stop), 98.0, Direction::Long, 100.0);
            assert!(score <= last);
            last = score;
            stop -= 0.05;
        }
    }

    #[test]
    fn test_direction_mismatch_keeps_move_points() {
        let q = question(Direction::Long, MoveBucket::Strong, 100.0, 98.0);
        let input = UserInput::new(Direction::Short, MoveBucket::Strong, Some(97.9));
        let b = grade(&q, &input);
        assert_eq!(b.direction, 0);
        assert_eq!(b.move_score, 25);
        assert_eq!(b.stop, 25);
        assert_eq!(b.total, 50);
    }

    #[test]
    fn test_perfect_score() {
        let q = question(Direction::Short, MoveBucket::Weak, 50.0, 51.0);
        let b = grade(&q, &UserInput::new(Direction::Short, MoveBucket::Weak, Some(51.05)));
        assert_eq!(b, Breakdown::new(50, 25, 25));
        assert_eq!(b.total, 100);
    }

    #[test]
    fn test_empty_input_scores_zero() {
        let q = question(Direction::Long, MoveBucket::Mid, 100.0, 98.0);
        let b = grade(&q, &UserInput::default());
        assert_eq!(b, Breakdown::default());
    }

    #[test]
    fn test_breakdown_validity() {
        assert!(Breakdown::new(50, 25, 12).is_valid());
        assert!(Breakdown::new(0, 0, 0).is_valid());
        assert!(!Breakdown::new(50, 25, 13).is_valid());
        assert!(!Breakdown::new(7, 3, 1).is_valid());
        let mut tampered = Breakdown::new(50, 0, 6);
        tampered.total = 999;
        assert!(!tampered.is_valid());
    }
}
