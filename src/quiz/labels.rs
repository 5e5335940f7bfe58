//! Display helpers shared by the shell output.

use super::types::{Direction, MoveBucket};

/// Fixed-point formatting, `-` for anything non-finite.
pub fn fmt(value: f64, digits: usize) -> String {
    if value.is_finite() {
        format!("{:.*}", digits, value)
    } else {
        "-".to_string()
    }
}

pub fn direction_label(direction: Option<Direction>) -> &'static str {
    match direction {
        Some(Direction::Long) => "Long",
        Some(Direction::Short) => "Short",
        None => "-",
    }
}

/// Backtest references carry the direction as free text.
pub fn trade_direction_label(raw: Option<&str>) -> &'static str {
    direction_label(raw.and_then(|d| d.parse().ok()))
}

pub fn move_label(bucket: Option<MoveBucket>) -> &'static str {
    match bucket {
        Some(MoveBucket::Weak) => "Weak",
        Some(MoveBucket::Mid) => "Mid",
        Some(MoveBucket::Strong) => "Strong",
        None => "-",
    }
}

pub fn case_type_label(value: Option<&str>) -> String {
    match value {
        Some("winner_case") => "Winner case".to_string(),
        Some("trap_case") => "Trap case".to_string(),
        Some(other) if !other.is_empty() => other.to_string(),
        _ => "-".to_string(),
    }
}

pub fn ema_stack_label(value: Option<&str>) -> String {
    match value {
        Some("bull") => "Bullish stack".to_string(),
        Some("bear") => "Bearish stack".to_string(),
        Some("mixed") => "Mixed".to_string(),
        Some(other) if !other.is_empty() => other.to_string(),
        _ => "-".to_string(),
    }
}

pub fn timeframe_label(tf: &str) -> String {
    match tf {
        "1h" => "1 hour".to_string(),
        "15m" => "15 minute".to_string(),
        "5m" => "5 minute".to_string(),
        "" => "-".to_string(),
        other => other.to_string(),
    }
}
