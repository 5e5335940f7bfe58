use manual_trader_quiz::chart::{project_chart, resolve_timeframe, OverlayFlags, RevealPolicy};
use manual_trader_quiz::quiz::{grade, Direction, MoveBucket, Question, UserInput};
use serde_json::json;

fn question() -> Question {
    let series: Vec<_> = (0..12)
        .map(|i| {
            let p = 200.0 - i as f64;
            json!({ "t": 1_700_000_000_000u64 + i * 900_000, "o": p, "h": p + 1.0, "l": p - 1.0, "c": p })
        })
        .collect();
    serde_json::from_value(json!({
        "id": "Q11",
        "symbol": "ETHUSDT",
        "timeframe": "15m",
        "entry_price": 195.0,
        "series": series,
        "reveal_index": 5,
        "drawings": { "prev_high20": 203.0, "guide_trend": { "t1": 1_700_000_000_000u64, "p1": 200.0, "t2": 1_700_009_900_000u64, "p2": 190.0 } },
        "answer": {
            "direction": "short",
            "move_bucket": "strong",
            "recommended_stop_price": 197.0,
            "target_1_price": 192.0,
            "target_2_price": 189.0,
            "flip_price": 198.0
        }
    }))
    .unwrap()
}

#[test]
fn test_grading_rules() {
    let q = question();

    let perfect = grade(&q, &UserInput::new(Direction::Short, MoveBucket::Strong, Some(197.2)));
    assert_eq!((perfect.direction, perfect.move_score, perfect.stop), (50, 25, 25));
    assert_eq!(perfect.total, 100);

    // stop below entry is on the wrong side for a short
    let wrong_side = grade(&q, &UserInput::new(Direction::Short, MoveBucket::Strong, Some(194.0)));
    assert_eq!(wrong_side.stop, 0);

    // stop side follows the answer, not the guessed direction
    let miss = grade(&q, &UserInput::new(Direction::Long, MoveBucket::Strong, Some(197.0)));
    assert_eq!((miss.direction, miss.move_score, miss.stop), (0, 25, 25));

    assert_eq!(grade(&q, &UserInput::default()).total, 0);
}

#[test]
fn test_stop_score_never_improves_with_distance() {
    let q = question();
    let mut last = u32::MAX;
    for step in 0..40 {
        let stop = 197.0 + step as f64 * 0.1;
        let b = grade(&q, &UserInput::new(Direction::Short, MoveBucket::Weak, Some(stop)));
        assert!(b.stop <= last, "stop {} scored {} after {}", stop, b.stop, last);
        last = b.stop;
    }
    assert_eq!(last, 0);
}

#[test]
fn test_hidden_chart_leaks_nothing() {
    let q = question();
    let tf = resolve_timeframe(&q, "1h");
    assert_eq!(tf, "15m");

    let view = project_chart(&q, &tf, RevealPolicy::Hidden, OverlayFlags::default());
    assert_eq!(view.candles.len(), 6);
    let last_visible = view.candles.last().unwrap().time;

    assert!(view.answer_lines().iter().all(|line| line.is_empty()));
    assert!(view.markers.iter().all(|m| m.time <= last_visible));
    assert!(view.markers.iter().all(|m| !m.text.starts_with('T')));
    // guide ends after the reveal bar
    assert!(view.trend_guide.is_empty());
    assert_eq!(view.entry.len(), 2);
}

#[test]
fn test_revealed_chart_shows_everything() {
    let q = question();
    let view = project_chart(&q, "15m", RevealPolicy::Revealed, OverlayFlags::default());
    assert_eq!(view.candles.len(), 12);
    assert!(view.answer_lines().iter().all(|line| line.len() == 2));
    assert_eq!(view.trend_guide.len(), 2);

    let texts: Vec<_> = view.markers.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["Q11 entry", "T1 192.0000", "T2 189.0000"]);
    assert!(view.markers.windows(2).all(|w| w[0].time <= w[1].time));
}

#[test]
fn test_projection_is_pure() {
    let q = question();
    let overlays = OverlayFlags { ema: false, bb: true, structure: false };
    let a = project_chart(&q, "15m", RevealPolicy::Hidden, overlays);
    let b = project_chart(&q, "15m", RevealPolicy::Hidden, overlays);
    assert_eq!(a, b);
    assert!(a.structure_high.is_empty());
}
