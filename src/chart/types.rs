use serde::{Deserialize, Serialize};

use crate::quiz::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl From<&Bar> for Candle {
    fn from(bar: &Bar) -> Self {
        Self {
            time: unix_seconds(bar.t),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinePoint {
    pub time: i64,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerPosition {
    AboveBar,
    BelowBar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerShape {
    ArrowUp,
    ArrowDown,
    Circle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub time: i64,
    pub position: MarkerPosition,
    pub color: &'static str,
    pub shape: MarkerShape,
    pub text: String,
}

/// Which optional indicator groups are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayFlags {
    pub ema: bool,
    pub bb: bool,
    pub structure: bool,
}

impl Default for OverlayFlags {
    fn default() -> Self {
        Self {
            ema: true,
            bb: true,
            structure: true,
        }
    }
}

/// Single switch for everything answer-derived: future bars, answer lines,
/// target markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevealPolicy {
    Hidden,
    Revealed,
}

impl RevealPolicy {
    pub fn from_revealed(revealed: bool) -> Self {
        if revealed {
            RevealPolicy::Revealed
        } else {
            RevealPolicy::Hidden
        }
    }

    pub fn is_revealed(&self) -> bool {
        matches!(self, RevealPolicy::Revealed)
    }
}

/// Everything the display layer draws for one question.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartView {
    pub timeframe: String,
    pub revealed: bool,
    pub candles: Vec<Candle>,
    pub ema20: Vec<LinePoint>,
    pub ema50: Vec<LinePoint>,
    pub ema200: Vec<LinePoint>,
    pub bb_upper: Vec<LinePoint>,
    pub bb_lower: Vec<LinePoint>,
    pub entry: Vec<LinePoint>,
    pub stop: Vec<LinePoint>,
    pub target_1: Vec<LinePoint>,
    pub target_2: Vec<LinePoint>,
    pub flip: Vec<LinePoint>,
    pub structure_high: Vec<LinePoint>,
    pub structure_low: Vec<LinePoint>,
    pub structure_vwap: Vec<LinePoint>,
    pub trend_guide: Vec<LinePoint>,
    pub markers: Vec<Marker>,
}

impl ChartView {
    /// "No chart data": every series empty.
    pub fn empty(timeframe: &str, policy: RevealPolicy) -> Self {
        Self {
            timeframe: timeframe.to_string(),
            revealed: policy.is_revealed(),
            ..Default::default()
        }
    }

    pub fn has_data(&self) -> bool {
        !self.candles.is_empty()
    }

    /// The four lines only shown after reveal.
    pub fn answer_lines(&self) -> [&[LinePoint]; 4] {
        [&self.stop, &self.target_1, &self.target_2, &self.flip]
    }
}

/// Millisecond timestamp to whole unix seconds. Non-finite input maps to 0.
pub fn unix_seconds(ms: f64) -> i64 {
    (ms / 1000.0).floor() as i64
}
