use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "long" | "l" => Ok(Direction::Long),
            "short" | "s" => Ok(Direction::Short),
            other => Err(format!("unknown direction '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveBucket {
    Weak,
    Mid,
    Strong,
}

impl MoveBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveBucket::Weak => "weak",
            MoveBucket::Mid => "mid",
            MoveBucket::Strong => "strong",
        }
    }
}

impl FromStr for MoveBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weak" | "w" => Ok(MoveBucket::Weak),
            "mid" | "m" => Ok(MoveBucket::Mid),
            "strong" => Ok(MoveBucket::Strong),
            other => Err(format!("unknown move bucket '{}'", other)),
        }
    }
}

/// One OHLC bar with the indicator values computed offline.
/// `t` is a unix timestamp in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub t: f64,
    #[serde(rename = "o", default = "nan", deserialize_with = "lenient_f64")]
    pub open: f64,
    #[serde(rename = "h", default = "nan", deserialize_with = "lenient_f64")]
    pub high: f64,
    #[serde(rename = "l", default = "nan", deserialize_with = "lenient_f64")]
    pub low: f64,
    #[serde(rename = "c", default = "nan", deserialize_with = "lenient_f64")]
    pub close: f64,
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub ema20: f64,
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub ema50: f64,
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub ema200: f64,
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub bb_u: f64,
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub bb_l: f64,
}

/// Precomputed answer embedded in every question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub direction: Direction,
    pub move_bucket: MoveBucket,
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub move_pct: f64,
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub recommended_stop_price: f64,
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub recommended_stop_pct: f64,
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub flip_price: f64,
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub target_1_price: f64,
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub target_2_price: f64,
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub adverse_pct: f64,
}

/// Historical trade outcome, shown for context only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestRef {
    #[serde(default, deserialize_with = "lenient_default")]
    pub trade_direction: Option<String>,
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub trade_pnl: f64,
    #[serde(default, deserialize_with = "lenient_int")]
    pub bars_held: Option<i64>,
    #[serde(default, deserialize_with = "lenient_default")]
    pub exit_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorSnapshot {
    #[serde(deserialize_with = "lenient_default")]
    pub ema_stack: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub rsi14: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub atr14_pct: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub vol_ratio20: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub range_expansion: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub trap_score: f64,
}

impl Default for IndicatorSnapshot {
    fn default() -> Self {
        Self {
            ema_stack: None,
            rsi14: f64::NAN,
            atr14_pct: f64::NAN,
            vol_ratio20: f64::NAN,
            range_expansion: f64::NAN,
            trap_score: f64::NAN,
        }
    }
}

/// Two-point trend line, timestamps in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendGuide {
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub t1: f64,
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub p1: f64,
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub t2: f64,
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub p2: f64,
}

/// Structural levels drawn over the visible range.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Drawings {
    #[serde(deserialize_with = "lenient_f64")]
    pub prev_high20: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub prev_low20: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub vwap48: f64,
    #[serde(deserialize_with = "lenient_default")]
    pub guide_trend: Option<TrendGuide>,
}

impl Default for Drawings {
    fn default() -> Self {
        Self {
            prev_high20: f64::NAN,
            prev_low20: f64::NAN,
            vwap48: f64::NAN,
            guide_trend: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureMarker {
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub t: f64,
    #[serde(default, deserialize_with = "lenient_default")]
    pub text: Option<String>,
}

/// Alternate-resolution variant of a question.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeframePayload {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub series: Vec<Bar>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub reveal_index: Option<i64>,
    #[serde(default, deserialize_with = "lenient_default")]
    pub drawings: Drawings,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub markers: Vec<StructureMarker>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(default, deserialize_with = "lenient_default")]
    pub symbol: String,
    #[serde(default, deserialize_with = "lenient_default")]
    pub timeframe: String,
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub entry_price: f64,
    #[serde(default, deserialize_with = "lenient_default")]
    pub entry_time_kst: Option<String>,
    #[serde(default, deserialize_with = "lenient_default")]
    pub entry_time_utc: Option<String>,
    #[serde(default, deserialize_with = "lenient_default")]
    pub case_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_default")]
    pub regime: Option<String>,
    #[serde(default, deserialize_with = "lenient_default")]
    pub session: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub series: Vec<Bar>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub reveal_index: Option<i64>,
    pub answer: Answer,
    #[serde(default, deserialize_with = "lenient_default")]
    pub backtest_ref: Option<BacktestRef>,
    #[serde(default, deserialize_with = "lenient_default")]
    pub indicator_snapshot: IndicatorSnapshot,
    #[serde(default, deserialize_with = "lenient_default")]
    pub mindset: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub hints: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub decision_basis: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub available_tfs: Vec<String>,
    /// Keyed payloads in the order the dataset declares them.
    #[serde(default, deserialize_with = "ordered_timeframes")]
    pub timeframes: Vec<(String, TimeframePayload)>,
    #[serde(default, deserialize_with = "lenient_default")]
    pub drawings: Drawings,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub markers: Vec<StructureMarker>,
}

impl Question {
    pub fn timeframe_payload(&self, tf: &str) -> Option<&TimeframePayload> {
        self.timeframes
            .iter()
            .find(|(key, _)| key == tf)
            .map(|(_, payload)| payload)
    }
}

/// Top-level dataset file: `{ "questions": [...] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// What the trader submitted. `None` fields never match the answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInput {
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(rename = "move", default)]
    pub move_bucket: Option<MoveBucket>,
    #[serde(default)]
    pub stop: Option<f64>,
}

impl UserInput {
    pub fn new(direction: Direction, move_bucket: MoveBucket, stop: Option<f64>) -> Self {
        Self {
            direction: Some(direction),
            move_bucket: Some(move_bucket),
            stop: stop.filter(|s| s.is_finite()),
        }
    }

    /// Both categorical choices are made
    pub fn is_complete(&self) -> bool {
        self.direction.is_some() && self.move_bucket.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub direction: u32,
    #[serde(rename = "move")]
    pub move_score: u32,
    pub stop: u32,
    pub total: u32,
}

impl Breakdown {
    pub fn new(direction: u32, move_score: u32, stop: u32) -> Self {
        Self {
            direction,
            move_score,
            stop,
            total: direction + move_score + stop,
        }
    }
}

/// Stored attempt for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub input: UserInput,
    pub breakdown: Breakdown,
    #[serde(default)]
    pub revealed: bool,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn nan() -> f64 {
    f64::NAN
}

/// Accepts numbers and numeric strings, anything else becomes NaN.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    })
}

/// Integer, float or numeric string, truncated toward zero. Anything else is
/// `None`.
fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let truncate = |x: f64| x.is_finite().then(|| x.trunc() as i64);
    Ok(match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate)),
        Value::String(s) => s.trim().parse::<f64>().ok().and_then(truncate),
        _ => None,
    })
}

/// `null` or a value of the wrong shape becomes `T::default()`.
fn lenient_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Non-arrays become empty; elements that do not parse are skipped.
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Keeps the declared key order. Unreadable payloads are skipped and a
/// non-object value yields no timeframes.
fn ordered_timeframes<'de, D>(deserializer: D) -> Result<Vec<(String, TimeframePayload)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedVisitor;

    impl<'de> Visitor<'de> for OrderedVisitor {
        type Value = Vec<(String, TimeframePayload)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of timeframe payloads")
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_bool<E>(self, _: bool) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_i64<E>(self, _: i64) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_u64<E>(self, _: u64) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_f64<E>(self, _: f64) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_str<E>(self, _: &str) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            while seq.next_element::<IgnoredAny>()?.is_some() {}
            Ok(Vec::new())
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut out = Vec::new();
            while let Some((key, raw)) = map.next_entry::<String, Value>()? {
                if let Ok(payload) = serde_json::from_value::<TimeframePayload>(raw) {
                    out.push((key, payload));
                }
            }
            Ok(out)
        }
    }

    deserializer.deserialize_any(OrderedVisitor)
}
