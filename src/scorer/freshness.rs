use crate::ConfigError;
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Matches `/2024/03/15/`, `/2024-03-15-`, `/2024/03/` and similar in a path
fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?:^|[/_-])((?:19|20)\d{2})[/_-](0?[1-9]|1[0-2])(?:[/_-](0?[1-9]|[12]\d|3[01]))?(?:$|[/_.-])",
        )
        .expect("date pattern is valid")
    })
}

/// Scores a URL by the age of the date embedded in its path
///
/// `score = max(0, 1 - decay_per_day * age_days)`, and 0.0 once the age
/// exceeds `max_age_days`. Future dates count as age 0. URLs without a
/// recognisable date get `undated_score`.
#[derive(Debug, Clone)]
pub struct FreshnessScorer {
    max_age_days: u32,
    decay_per_day: f64,
    undated_score: f64,
    reference: Option<DateTime<Utc>>,
}

impl FreshnessScorer {
    /// Neutral score for URLs without a date
    pub const DEFAULT_UNDATED_SCORE: f64 = 0.5;

    /// # Errors
    ///
    /// Fails when `max_age_days` is zero or the decay factor is negative or
    /// not finite.
    pub fn new(max_age_days: u32, decay_per_day: f64) -> Result<Self, ConfigError> {
        if max_age_days == 0 {
            return Err(ConfigError::Validation(
                "freshness max age must be at least one day".to_string(),
            ));
        }
        if !decay_per_day.is_finite() || decay_per_day < 0.0 {
            return Err(ConfigError::Validation(format!(
                "freshness decay must be a non-negative number, got {}",
                decay_per_day
            )));
        }

        Ok(Self {
            max_age_days,
            decay_per_day,
            undated_score: Self::DEFAULT_UNDATED_SCORE,
            reference: None,
        })
    }

    /// Overrides the score given to undated URLs
    pub fn undated_score(mut self, score: f64) -> Self {
        self.undated_score = score;
        self
    }

    /// Measures age against a fixed instant instead of the current time
    pub fn with_reference(mut self, reference: DateTime<Utc>) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn score(&self, url: &Url) -> f64 {
        let Some(date) = extract_date(url) else {
            return self.undated_score;
        };

        let today = self.reference.unwrap_or_else(Utc::now).date_naive();
        let age_days = (today - date).num_days().max(0);

        if age_days > i64::from(self.max_age_days) {
            return 0.0;
        }

        (1.0 - self.decay_per_day * age_days as f64).max(0.0)
    }
}

/// Extracts a publication date from a URL path
///
/// A missing day defaults to the first of the month.
pub fn extract_date(url: &Url) -> Option<NaiveDate> {
    let captures = date_pattern().captures(url.path())?;

    let year = captures.get(1)?.as_str().parse().ok()?;
    let month = captures.get(2)?.as_str().parse().ok()?;
    let day = captures
        .get(3)
        .and_then(|d| d.as_str().parse().ok())
        .unwrap_or(1);

    NaiveDate::from_ymd_opt(year, month, day)
}
