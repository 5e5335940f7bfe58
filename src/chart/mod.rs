pub mod projector;
pub mod timeframe;
pub mod types;

pub use projector::{horizontal_line, project_chart};
pub use timeframe::{
    available_timeframes, is_supported, payload_for, resolve_timeframe, TimeframeView,
    DEFAULT_TIMEFRAME, LEGACY_TIMEFRAME,
};
pub use types::{
    Candle, ChartView, LinePoint, Marker, MarkerPosition, MarkerShape, OverlayFlags, RevealPolicy,
};
