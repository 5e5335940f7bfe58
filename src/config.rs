use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::chart::{OverlayFlags, DEFAULT_TIMEFRAME};
use crate::dataset::resolve_set;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub dataset: DatasetConfig,
    pub session: SessionConfig,
    pub overlays: OverlayFlags,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatasetConfig {
    /// Resolved set key (10, 20 or 30)
    pub set: String,
    pub data_dir: PathBuf,
    /// When set, datasets are fetched over HTTP instead of from `data_dir`
    pub data_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    pub state_dir: PathBuf,
    pub default_timeframe: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let dataset = DatasetConfig {
            set: resolve_set(env::var("QUIZ_SET").ok().as_deref()).to_string(),
            data_dir: env::var("QUIZ_DATA_DIR")
                .unwrap_or_else(|_| "data".to_string())
                .into(),
            data_url: env::var("QUIZ_DATA_URL").ok().filter(|u| !u.trim().is_empty()),
        };

        let session = SessionConfig {
            state_dir: env::var("QUIZ_STATE_DIR")
                .unwrap_or_else(|_| ".quiz-state".to_string())
                .into(),
            default_timeframe: env::var("QUIZ_DEFAULT_TF")
                .unwrap_or_else(|_| DEFAULT_TIMEFRAME.to_string()),
        };

        let overlays = OverlayFlags {
            ema: env::var("QUIZ_SHOW_EMA")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            bb: env::var("QUIZ_SHOW_BB")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            structure: env::var("QUIZ_SHOW_STRUCTURE")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
        };

        Ok(Config {
            dataset,
            session,
            overlays,
        })
    }
}
