//! Daily check-in payloads and weekly / insights summaries

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::types::Timestamp;

/// Lowest accepted mood score
pub const MOOD_SCORE_MIN: i16 = 1;
/// Highest accepted mood score
pub const MOOD_SCORE_MAX: i16 = 5;

/// POST /api/checkin/daily body
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckinRequest {
    #[validate(range(min = 1, max = 5))]
    pub mood_score: i16,
    #[validate(length(min = 1, max = 32), custom(function = "not_blank"))]
    pub emotion: String,
    #[validate(length(max = 2000))]
    pub note: Option<String>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// One stored check-in (one per user per UTC day)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCheckin {
    pub check_date: NaiveDate,
    pub mood_score: i16,
    pub emotion: String,
    pub note: Option<String>,
    pub updated_at: Timestamp,
}

/// Three-bucket direction of the mood score, or not enough data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
    Na,
}

/// GET /api/weekly payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySummary {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub completed_days: usize,
    pub top_emotion: Option<String>,
    pub trend: Trend,
    pub average_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionCount {
    pub emotion: String,
    pub count: usize,
}

/// GET /api/insights query string
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct InsightsQuery {
    #[validate(range(min = 7, max = 90))]
    pub days: Option<u32>,
}

impl InsightsQuery {
    pub const DEFAULT_DAYS: u32 = 30;

    pub fn days(&self) -> u32 {
        self.days.unwrap_or(Self::DEFAULT_DAYS)
    }
}

/// GET /api/insights payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsSummary {
    pub days: u32,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub total_checkins: usize,
    pub average_score: Option<f64>,
    pub trend: Trend,
    pub emotions: Vec<EmotionCount>,
    pub current_streak: u32,
}
