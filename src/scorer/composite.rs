use crate::scorer::{ScoreContext, Scorer};
use crate::ConfigError;
use url::Url;

/// Weighted sum over child scorers
///
/// Children default to a weight of 1.0 and may themselves be composites. A
/// failing child contributes 0.0 without affecting its siblings. With
/// `normalized` set the sum is divided by the total weight, keeping the
/// result in the children's range.
#[derive(Debug, Clone, Default)]
pub struct CompositeScorer {
    children: Vec<(Scorer, f64)>,
    normalized: bool,
}

impl CompositeScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a composite where every child has weight 1.0
    pub fn equal(children: impl IntoIterator<Item = Scorer>) -> Self {
        Self {
            children: children.into_iter().map(|s| (s, 1.0)).collect(),
            normalized: false,
        }
    }

    /// Adds a child with weight 1.0
    pub fn with(mut self, scorer: impl Into<Scorer>) -> Self {
        self.children.push((scorer.into(), 1.0));
        self
    }

    /// Adds a child with an explicit weight
    ///
    /// # Errors
    ///
    /// Fails when the weight is negative or not finite.
    pub fn with_weight(mut self, scorer: impl Into<Scorer>, weight: f64) -> Result<Self, ConfigError> {
        validate_weight(weight)?;
        self.children.push((scorer.into(), weight));
        Ok(self)
    }

    /// Overrides the weight of the child at `index`
    ///
    /// # Errors
    ///
    /// Fails when the index is out of range or the weight is invalid.
    pub fn set_weight(&mut self, index: usize, weight: f64) -> Result<(), ConfigError> {
        validate_weight(weight)?;
        let child = self.children.get_mut(index).ok_or_else(|| {
            ConfigError::Validation(format!("composite scorer has no child at index {}", index))
        })?;
        child.1 = weight;
        Ok(())
    }

    /// Divides the weighted sum by the total weight
    pub fn normalized(mut self, normalized: bool) -> Self {
        self.normalized = normalized;
        self
    }

    pub fn children(&self) -> &[(Scorer, f64)] {
        &self.children
    }

    pub fn score(&self, url: &Url, ctx: &ScoreContext<'_>) -> f64 {
        let total: f64 = self
            .children
            .iter()
            .map(|(scorer, weight)| weight * scorer.score(url, ctx))
            .sum();

        if self.normalized {
            let weight_sum: f64 = self.children.iter().map(|(_, w)| w).sum();
            if weight_sum > 0.0 {
                return total / weight_sum;
            }
            return 0.0;
        }

        total
    }
}

fn validate_weight(weight: f64) -> Result<(), ConfigError> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(ConfigError::Validation(format!(
            "scorer weight must be a non-negative number, got {}",
            weight
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::{KeywordScorer, PathDepthScorer};

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn keyword(word: &str) -> KeywordScorer {
        KeywordScorer::new(&[word], 1.0, false).unwrap()
    }

    #[test]
    fn test_equal_weights_sum() {
        let composite = CompositeScorer::equal([
            Scorer::from(keyword("rust")),
            Scorer::from(keyword("async")),
        ]);
        let ctx = ScoreContext::default();

        assert_eq!(composite.score(&url("https://x.com/rust/async"), &ctx), 2.0);
        assert_eq!(composite.score(&url("https://x.com/rust"), &ctx), 1.0);
    }

    #[test]
    fn test_custom_weights() {
        let composite = CompositeScorer::new()
            .with_weight(keyword("rust"), 0.7)
            .unwrap()
            .with_weight(keyword("async"), 0.3)
            .unwrap();
        let ctx = ScoreContext::default();

        let score = composite.score(&url("https://x.com/rust"), &ctx);
        assert!((score - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_raising_a_weight_raises_its_influence() {
        let mut composite = CompositeScorer::new()
            .with(keyword("rust"))
            .with(PathDepthScorer::new(5, 1.0, false).unwrap());
        let ctx = ScoreContext::default();
        let link = url("https://x.com/rust");

        let before = composite.score(&link, &ctx);
        composite.set_weight(0, 3.0).unwrap();
        let after = composite.score(&link, &ctx);

        assert!(after > before);
        assert!(composite.set_weight(5, 1.0).is_err());
    }

    #[test]
    fn test_nested_and_normalized() {
        let inner = CompositeScorer::equal([
            Scorer::from(keyword("a")),
            Scorer::from(keyword("b")),
        ])
        .normalized(true);
        let outer = CompositeScorer::new()
            .with(inner)
            .with_weight(keyword("c"), 2.0)
            .unwrap()
            .normalized(true);
        let ctx = ScoreContext::default();

        // inner = (1 + 0) / 2 = 0.5, outer = (0.5 * 1 + 1 * 2) / 3
        let score = outer.score(&url("https://x.com/a/c"), &ctx);
        assert!((score - 2.5 / 3.0).abs() < 1e-9);
        assert_eq!(outer.children().len(), 2);
    }

    #[test]
    fn test_empty_composite_scores_zero() {
        let ctx = ScoreContext::default();
        assert_eq!(CompositeScorer::new().score(&url("https://x.com/"), &ctx), 0.0);
        assert_eq!(
            CompositeScorer::new()
                .normalized(true)
                .score(&url("https://x.com/"), &ctx),
            0.0
        );
    }

    #[test]
    fn test_invalid_weight() {
        assert!(CompositeScorer::new().with_weight(keyword("a"), -1.0).is_err());
    }
}
