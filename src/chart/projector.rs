use crate::quiz::labels::fmt;
use crate::quiz::{Bar, Direction, Question};

use super::timeframe::payload_for;
use super::types::{
    unix_seconds, Candle, ChartView, LinePoint, Marker, MarkerPosition, MarkerShape, OverlayFlags,
    RevealPolicy,
};

const LONG_COLOR: &str = "#166534";
const SHORT_COLOR: &str = "#b91c1c";
const TARGET_2_COLOR: &str = "#14532d";
const STRUCTURE_COLOR: &str = "#0ea5e9";

/// Derive the drawable view of `question` for one timeframe.
///
/// With `RevealPolicy::Hidden` only bars up to and including the reveal index
/// are produced and nothing derived from the answer (stop, targets, flip,
/// target markers) is emitted. Missing chart data yields `ChartView::empty`.
pub fn project_chart(
    question: &Question,
    timeframe: &str,
    policy: RevealPolicy,
    overlays: OverlayFlags,
) -> ChartView {
    let payload = match payload_for(question, timeframe) {
        Some(p) if !p.series.is_empty() => p,
        _ => return ChartView::empty(timeframe, policy),
    };

    let revealed = policy.is_revealed();
    let visible: &[Bar] = if revealed {
        payload.series
    } else {
        &payload.series[..payload.cutoff()]
    };

    let candles: Vec<Candle> = visible.iter().map(Candle::from).collect();
    let (start, end) = match (candles.first(), candles.last()) {
        (Some(first), Some(last)) if first.time != 0 && last.time != 0 => (first.time, last.time),
        _ => return ChartView::empty(timeframe, policy),
    };

    let all_start = unix_seconds(payload.series[0].t);
    let all_end = unix_seconds(payload.series[payload.series.len() - 1].t);
    let answer = &question.answer;

    let mut view = ChartView::empty(timeframe, policy);
    view.candles = candles;

    if overlays.ema {
        view.ema20 = indicator_line(visible, |b| b.ema20);
        view.ema50 = indicator_line(visible, |b| b.ema50);
        view.ema200 = indicator_line(visible, |b| b.ema200);
    }
    if overlays.bb {
        view.bb_upper = indicator_line(visible, |b| b.bb_u);
        view.bb_lower = indicator_line(visible, |b| b.bb_l);
    }

    view.entry = horizontal_line(start, end, question.entry_price);
    if revealed {
        view.stop = horizontal_line(all_start, all_end, answer.recommended_stop_price);
        view.target_1 = horizontal_line(all_start, all_end, answer.target_1_price);
        view.target_2 = horizontal_line(all_start, all_end, answer.target_2_price);
        view.flip = horizontal_line(all_start, all_end, answer.flip_price);
    }

    let mut markers = Vec::new();

    if overlays.structure {
        let drawings = payload.drawings;
        view.structure_high = horizontal_line(start, end, drawings.prev_high20);
        view.structure_low = horizontal_line(start, end, drawings.prev_low20);
        view.structure_vwap = horizontal_line(start, end, drawings.vwap48);

        if let Some(guide) = drawings
            .guide_trend
            .as_ref()
            .filter(|g| g.t1.is_finite() && g.t2.is_finite())
        {
            let t1 = unix_seconds(guide.t1);
            let t2 = unix_seconds(guide.t2);
            // a guide ending past the visible range would leak the future
            if revealed || t2 <= end {
                view.trend_guide = vec![
                    LinePoint { time: t1, value: guide.p1 },
                    LinePoint { time: t2, value: guide.p2 },
                ];
            }
        }

        for m in payload.markers.iter().filter(|m| m.t.is_finite()) {
            let time = unix_seconds(m.t);
            if time <= end {
                markers.push(Marker {
                    time,
                    position: MarkerPosition::AboveBar,
                    color: STRUCTURE_COLOR,
                    shape: MarkerShape::Circle,
                    text: m
                        .text
                        .clone()
                        .filter(|t| !t.is_empty())
                        .unwrap_or_else(|| "signal".to_string()),
                });
            }
        }
    }

    let is_long = answer.direction == Direction::Long;

    if let Some(bar) = payload.reveal_bar() {
        markers.push(Marker {
            time: unix_seconds(bar.t),
            position: if is_long { MarkerPosition::BelowBar } else { MarkerPosition::AboveBar },
            color: if is_long { LONG_COLOR } else { SHORT_COLOR },
            shape: if is_long { MarkerShape::ArrowUp } else { MarkerShape::ArrowDown },
            text: if revealed {
                format!("{} entry", question.id)
            } else {
                question.id.clone()
            },
        });
    }

    if revealed && all_end != 0 {
        let position = if is_long { MarkerPosition::AboveBar } else { MarkerPosition::BelowBar };
        let shape = if is_long { MarkerShape::ArrowUp } else { MarkerShape::ArrowDown };
        markers.push(Marker {
            time: all_end,
            position,
            color: LONG_COLOR,
            shape,
            text: format!("T1 {}", fmt(answer.target_1_price, 4)),
        });
        markers.push(Marker {
            time: all_end,
            position,
            color: TARGET_2_COLOR,
            shape,
            text: format!("T2 {}", fmt(answer.target_2_price, 4)),
        });
    }

    markers.sort_by_key(|m| m.time);
    view.markers = markers;
    view
}

/// Two-point flat line, empty when `price` is not a finite number.
pub fn horizontal_line(start: i64, end: i64, price: f64) -> Vec<LinePoint> {
    if !price.is_finite() {
        return Vec::new();
    }
    vec![
        LinePoint { time: start, value: price },
        LinePoint { time: end, value: price },
    ]
}

fn indicator_line(bars: &[Bar], value: impl Fn(&Bar) -> f64) -> Vec<LinePoint> {
    bars.iter()
        .map(|b| LinePoint {
            time: unix_seconds(b.t),
            value: value(b),
        })
        .collect()
}
