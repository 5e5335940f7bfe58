//! Timeframe discovery and fallback for multi-resolution questions.

use crate::quiz::{Bar, Drawings, Question, StructureMarker};

/// Preferred when the previously active timeframe is unsupported.
pub const DEFAULT_TIMEFRAME: &str = "1h";
/// Single-series questions are served under this key.
pub const LEGACY_TIMEFRAME: &str = "15m";

/// Borrowed view of the payload for one timeframe.
#[derive(Debug, Clone, Copy)]
pub struct TimeframeView<'a> {
    pub series: &'a [Bar],
    pub reveal_index: Option<i64>,
    pub drawings: &'a Drawings,
    pub markers: &'a [StructureMarker],
}

impl<'a> TimeframeView<'a> {
    /// Number of bars visible before reveal. Missing or negative reveal index
    /// shows nothing.
    pub fn cutoff(&self) -> usize {
        match self.reveal_index {
            Some(idx) if idx >= 0 => (idx as usize).saturating_add(1).min(self.series.len()),
            _ => 0,
        }
    }

    pub fn reveal_bar(&self) -> Option<&'a Bar> {
        let idx = usize::try_from(self.reveal_index?).ok()?;
        self.series.get(idx)
    }
}

/// Timeframes the question supports, in declared order. Never empty.
pub fn available_timeframes(question: &Question) -> Vec<&str> {
    if !question.available_tfs.is_empty() {
        return question.available_tfs.iter().map(String::as_str).collect();
    }
    if !question.timeframes.is_empty() {
        return question.timeframes.iter().map(|(k, _)| k.as_str()).collect();
    }
    vec![LEGACY_TIMEFRAME]
}

pub fn is_supported(question: &Question, tf: &str) -> bool {
    available_timeframes(question).contains(&tf)
}

/// Keep `previous` when supported, else the default, else the legacy key,
/// else the first declared timeframe.
pub fn resolve_timeframe(question: &Question, previous: &str) -> String {
    let available = available_timeframes(question);
    let resolved = if available.contains(&previous) {
        previous
    } else if available.contains(&DEFAULT_TIMEFRAME) {
        DEFAULT_TIMEFRAME
    } else if available.contains(&LEGACY_TIMEFRAME) {
        LEGACY_TIMEFRAME
    } else {
        available.first().copied().unwrap_or(LEGACY_TIMEFRAME)
    };
    resolved.to_string()
}

pub fn payload_for<'a>(question: &'a Question, tf: &str) -> Option<TimeframeView<'a>> {
    if let Some(payload) = question.timeframe_payload(tf) {
        return Some(TimeframeView {
            series: &payload.series,
            reveal_index: payload.reveal_index,
            drawings: &payload.drawings,
            markers: &payload.markers,
        });
    }
    if tf == LEGACY_TIMEFRAME && !question.series.is_empty() {
        return Some(TimeframeView {
            series: &question.series,
            reveal_index: question.reveal_index,
            drawings: &question.drawings,
            markers: &question.markers,
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question(extra: serde_json::Value) -> Question {
        let mut value = json!({
            "id": "Q1",
            "answer": { "direction": "long", "move_bucket": "mid" }
        });
        if let (Some(base), Some(extra)) = (value.as_object_mut(), extra.as_object()) {
            for (k, v) in extra {
                base.insert(k.clone(), v.clone());
            }
        }
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_available_prefers_declared_list() {
        let q = question(json!({
            "available_tfs": ["5m", "15m"],
            "timeframes": { "1h": { "series": [] } }
        }));
        assert_eq!(available_timeframes(&q), vec!["5m", "15m"]);
    }

    #[test]
    fn test_available_defaults_to_legacy() {
        let q = question(json!({}));
        assert_eq!(available_timeframes(&q), vec!["15m"]);
    }

    #[test]
    fn test_resolve_keeps_supported_previous() {
        let q = question(json!({ "available_tfs": ["1h", "5m"] }));
        assert_eq!(resolve_timeframe(&q, "5m"), "5m");
    }

    #[test]
    fn test_resolve_fallback_order() {
        let q = question(json!({ "available_tfs": ["5m", "15m", "1h"] }));
        assert_eq!(resolve_timeframe(&q, "4h"), "1h");

        let q = question(json!({ "available_tfs": ["5m", "15m"] }));
        assert_eq!(resolve_timeframe(&q, "1h"), "15m");

        let q = question(json!({ "available_tfs": ["30m", "5m"] }));
        assert_eq!(resolve_timeframe(&q, "1h"), "30m");
        assert_eq!(resolve_timeframe(&q, "1h"), resolve_timeframe(&q, "1h"));
    }

    #[test]
    fn test_legacy_payload_from_top_level_series() {
        let q = question(json!({
            "series": [ { "t": 1000, "o": 1, "h": 1, "l": 1, "c": 1 },
                        { "t": 2000, "o": 1, "h": 1, "l": 1, "c": 1 },
                        { "t": 3000, "o": 1, "h": 1, "l": 1, "c": 1 } ],
            "reveal_index": 1
        }));
        let view = payload_for(&q, "15m").unwrap();
        assert_eq!(view.series.len(), 3);
        assert_eq!(view.cutoff(), 2);
        assert_eq!(view.reveal_bar().map(|b| b.t), Some(2000.0));
        assert!(payload_for(&q, "1h").is_none());
    }

    #[test]
    fn test_cutoff_edges() {
        let q = question(json!({
            "series": [ { "t": 1000 }, { "t": 2000 } ],
            "reveal_index": 9
        }));
        let view = payload_for(&q, "15m").unwrap();
        assert_eq!(view.cutoff(), 2);
        assert!(view.reveal_bar().is_none());

        let q = question(json!({ "series": [ { "t": 1000 } ], "reveal_index": -1 }));
        assert_eq!(payload_for(&q, "15m").unwrap().cutoff(), 0);
    }
}
