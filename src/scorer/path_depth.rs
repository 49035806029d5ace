use crate::url::path_depth;
use crate::ConfigError;
use url::Url;

/// Scores a URL by how far its path depth is from an optimal depth
///
/// `score = 1 / (1 + penalty * |segments - optimal_depth|)`, so the optimal
/// depth scores 1.0 and every extra or missing segment lowers the score.
/// With `invert` set the raw value is flipped (`1 - score`), preferring URLs
/// far from the optimal depth.
#[derive(Debug, Clone)]
pub struct PathDepthScorer {
    optimal_depth: usize,
    penalty: f64,
    invert: bool,
}

impl PathDepthScorer {
    /// # Errors
    ///
    /// Fails when the penalty factor is negative or not finite.
    pub fn new(optimal_depth: usize, penalty: f64, invert: bool) -> Result<Self, ConfigError> {
        if !penalty.is_finite() || penalty < 0.0 {
            return Err(ConfigError::Validation(format!(
                "path-depth penalty must be a non-negative number, got {}",
                penalty
            )));
        }

        Ok(Self {
            optimal_depth,
            penalty,
            invert,
        })
    }

    /// Whether lower raw values are preferred
    pub fn is_inverted(&self) -> bool {
        self.invert
    }

    pub fn score(&self, url: &Url) -> f64 {
        let distance = path_depth(url).abs_diff(self.optimal_depth) as f64;
        let raw = 1.0 / (1.0 + self.penalty * distance);

        if self.invert {
            1.0 - raw
        } else {
            raw
        }
    }
}
