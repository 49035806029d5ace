//! Frontier, visited set and budget accounting for one crawl run
//!
//! The scheduler is owned by the coordinating task, which is the only writer.
//! Fetch tasks never touch it, so each URL is dispatched at most once even
//! when two pages that complete concurrently both link to it.

use crate::crawler::result::Limit;
use crate::strategy::{Candidate, Frontier, Strategy};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use url::Url;

/// Budgets fixed for the lifetime of a run
#[derive(Debug, Clone, Copy)]
pub struct Budgets {
    pub max_depth: Limit,
    pub max_pages: Limit,
}

/// Scheduler manages the frontier and the dispatch budget
pub struct Scheduler {
    frontier: Frontier,

    /// Normalized URLs already dispatched
    visited: HashSet<String>,

    budgets: Budgets,

    /// Pages handed out so far, failed fetches included
    dispatched: u64,

    next_discovery: u64,

    /// Bounds the number of fetches running at once
    permits: Arc<Semaphore>,
}

impl Scheduler {
    pub fn new(strategy: Strategy, budgets: Budgets, concurrency: usize) -> Self {
        Self {
            frontier: strategy.frontier(),
            visited: HashSet::new(),
            budgets,
            dispatched: 0,
            next_discovery: 1,
            permits: Arc::new(Semaphore::new(concurrency)),
        }
    }

    /// Seeds the frontier with the start URL at depth 0
    pub fn seed(&mut self, start: Url) {
        self.frontier.push(Candidate::seed(start));
    }

    /// Whether another page may be dispatched
    pub fn has_budget(&self) -> bool {
        match self.budgets.max_pages {
            Limit::Bounded(max) => self.dispatched < max,
            Limit::Unbounded => true,
        }
    }

    /// Whether a candidate at `depth` may enter the frontier
    pub fn within_depth(&self, depth: u32) -> bool {
        self.budgets.max_depth.allows(u64::from(depth))
    }

    /// Pops the next unvisited candidate and marks it visited
    ///
    /// Returns `None` once the page budget is spent or the frontier holds
    /// nothing new.
    pub fn next_candidate(&mut self) -> Option<Candidate> {
        if !self.has_budget() {
            return None;
        }

        while let Some(candidate) = self.frontier.pop() {
            if !self.visited.insert(candidate.url.as_str().to_string()) {
                tracing::trace!("Skipping already visited {}", candidate.url);
                continue;
            }

            self.dispatched += 1;
            return Some(candidate);
        }

        None
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url.as_str())
    }

    /// Queues the admitted links of `parent` at `parent.depth + 1`
    ///
    /// Links are given discovery numbers in the order supplied. Links beyond
    /// the depth ceiling or already visited are dropped.
    pub fn enqueue_children(&mut self, parent: &Candidate, links: Vec<(Url, f64)>) -> usize {
        let depth = parent.depth + 1;
        if !self.within_depth(depth) {
            return 0;
        }

        let mut children = Vec::with_capacity(links.len());
        for (url, score) in links {
            if self.visited.contains(url.as_str()) {
                continue;
            }

            children.push(Candidate {
                url,
                depth,
                parent_url: Some(parent.url.to_string()),
                discovery_order: self.next_discovery,
                score,
            });
            self.next_discovery += 1;
        }

        let count = children.len();
        self.frontier.extend(children);
        count
    }

    pub fn permits(&self) -> Arc<Semaphore> {
        Arc::clone(&self.permits)
    }

    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }
}
