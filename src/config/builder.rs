//! Turns a parsed configuration into crawler components

use crate::config::types::{Config, FilterConfig, ScorerConfig};
use crate::crawler::CrawlerBuilder;
use crate::filter::{
    ContentTypeFilter, DomainFilter, ExactUrlFilter, Filter, FilterChain, KeywordRelevance,
    RelevanceFilter, SeoFilter, UrlPatternFilter,
};
use crate::scorer::{
    CompositeScorer, ContentTypeScorer, DomainAuthorityScorer, FreshnessScorer, KeywordScorer,
    PathDepthScorer, Scorer,
};
use crate::ConfigError;
use std::sync::Arc;

impl Config {
    /// Builds a [`CrawlerBuilder`] carrying every setting of this config
    ///
    /// # Errors
    ///
    /// Returns the first invalid budget, filter or scorer setting.
    pub fn to_builder(&self) -> Result<CrawlerBuilder, ConfigError> {
        let crawl = &self.crawl;

        let mut builder = CrawlerBuilder::new(crawl.strategy)
            .include_external(crawl.include_external)
            .concurrency(crawl.concurrency)
            .batch_size(crawl.batch_size)
            .delivery(crawl.delivery)
            .filter_chain(self.filter_chain()?);

        if let Some(max_depth) = &crawl.max_depth {
            builder = builder.depth_limit(max_depth.to_limit("max-depth")?);
        }

        if let Some(max_pages) = &crawl.max_pages {
            builder = builder.page_limit(max_pages.to_limit("max-pages")?);
        }

        if let Some(scorer) = &self.scorer {
            builder = builder.scorer(scorer.build()?);
        }

        Ok(builder)
    }

    /// Builds the filter chain in declaration order
    pub fn filter_chain(&self) -> Result<FilterChain, ConfigError> {
        self.filters.iter().map(FilterConfig::build).collect()
    }
}

impl FilterConfig {
    pub fn build(&self) -> Result<Filter, ConfigError> {
        let filter = match self {
            Self::UrlPattern {
                patterns,
                mode,
                case_sensitive,
            } => UrlPatternFilter::new(patterns, *mode, *case_sensitive)?.into(),

            Self::Domain {
                allowed,
                blocked,
                include_subdomains,
            } => DomainFilter::new(allowed, blocked, *include_subdomains)?.into(),

            Self::ContentType { types, mode } => ContentTypeFilter::new(types, *mode)?.into(),

            Self::ExactUrl { urls, mode } => ExactUrlFilter::new(urls, *mode)?.into(),

            Self::Relevance {
                keywords,
                threshold,
            } => {
                let source = Arc::new(KeywordRelevance::new(keywords)?);
                RelevanceFilter::new(source, *threshold)?.into()
            }

            Self::Seo {
                min_title_length,
                max_url_length,
                max_path_depth,
            } => Filter::Seo(SeoFilter {
                min_title_length: *min_title_length,
                max_url_length: *max_url_length,
                max_path_depth: *max_path_depth,
            }),
        };

        Ok(filter)
    }
}

impl ScorerConfig {
    pub fn build(&self) -> Result<Scorer, ConfigError> {
        let scorer = match self {
            Self::Keyword {
                keywords,
                weight,
                case_sensitive,
            } => KeywordScorer::new(keywords, *weight, *case_sensitive)?.into(),

            Self::PathDepth {
                optimal_depth,
                penalty,
                invert,
            } => PathDepthScorer::new(*optimal_depth, *penalty, *invert)?.into(),

            Self::ContentType {
                weights,
                default_score,
            } => ContentTypeScorer::new(weights, *default_score)?.into(),

            Self::DomainAuthority {
                authorities,
                default_score,
            } => DomainAuthorityScorer::new(
                authorities.iter().map(|(d, v)| (d.clone(), *v)),
                *default_score,
            )?
            .into(),

            Self::Freshness {
                max_age_days,
                decay_per_day,
                undated_score,
            } => {
                let max_age = u32::try_from(*max_age_days)
                    .ok()
                    .filter(|days| *days > 0)
                    .ok_or_else(|| {
                        ConfigError::Validation(format!(
                            "freshness max-age-days must be positive, got {}",
                            max_age_days
                        ))
                    })?;

                let mut scorer = FreshnessScorer::new(max_age, *decay_per_day)?;
                if let Some(score) = undated_score {
                    scorer = scorer.undated_score(*score);
                }
                scorer.into()
            }

            Self::Composite {
                children,
                normalized,
            } => {
                let mut composite = CompositeScorer::new().normalized(*normalized);
                for child in children {
                    composite = composite.with_weight(child.scorer.build()?, child.weight)?;
                }
                composite.into()
            }
        };

        Ok(scorer)
    }
}
