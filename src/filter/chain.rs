use crate::filter::{Filter, PageMeta};
use std::sync::atomic::{AtomicU64, Ordering};
use url::Url;

/// Aggregate counters of a filter chain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    /// Links evaluated by the chain
    pub considered: u64,

    /// Links admitted by every filter
    pub allowed: u64,

    /// Links rejected by at least one filter
    pub blocked: u64,
}

#[derive(Debug, Default)]
struct Counters {
    considered: AtomicU64,
    allowed: AtomicU64,
    blocked: AtomicU64,
}

/// An ordered sequence of filters combined with AND semantics
///
/// Evaluation stops at the first rejecting filter. The chain is read-only once
/// built apart from its counters, which are updated atomically so the chain
/// can be shared between tasks.
#[derive(Debug, Default)]
pub struct FilterChain {
    filters: Vec<Filter>,
    counters: Counters,
}

impl FilterChain {
    /// Creates an empty chain, which admits everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a filter to the end of the chain
    pub fn with_filter(mut self, filter: impl Into<Filter>) -> Self {
        self.filters.push(filter.into());
        self
    }

    /// Appends a filter in place
    pub fn push(&mut self, filter: impl Into<Filter>) {
        self.filters.push(filter.into());
    }

    /// The filters in evaluation order
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Decides whether a discovered link is admitted
    ///
    /// # Arguments
    ///
    /// * `url` - The normalized link
    /// * `page` - Metadata of the page the link was discovered on
    pub fn admit(&self, url: &Url, page: Option<&PageMeta>) -> bool {
        self.counters.considered.fetch_add(1, Ordering::Relaxed);

        let rejected_by = self.filters.iter().find(|filter| !filter.admit(url, page));

        match rejected_by {
            Some(filter) => {
                tracing::trace!("{} rejected by {} filter", url, filter.name());
                self.counters.blocked.fetch_add(1, Ordering::Relaxed);
                false
            }
            None => {
                self.counters.allowed.fetch_add(1, Ordering::Relaxed);
                true
            }
        }
    }

    /// Snapshot of the aggregate counters
    pub fn stats(&self) -> FilterStats {
        FilterStats {
            considered: self.counters.considered.load(Ordering::Relaxed),
            allowed: self.counters.allowed.load(Ordering::Relaxed),
            blocked: self.counters.blocked.load(Ordering::Relaxed),
        }
    }
}

impl Clone for FilterChain {
    /// Clones the filters; the clone starts with fresh counters
    fn clone(&self) -> Self {
        Self {
            filters: self.filters.clone(),
            counters: Counters::default(),
        }
    }
}

impl FromIterator<Filter> for FilterChain {
    fn from_iter<I: IntoIterator<Item = Filter>>(iter: I) -> Self {
        Self {
            filters: iter.into_iter().collect(),
            counters: Counters::default(),
        }
    }
}
