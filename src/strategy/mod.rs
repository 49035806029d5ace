//! Traversal strategies
//!
//! A strategy decides the order in which discovered URLs are visited. Each
//! variant owns one kind of [`Frontier`]: FIFO for breadth-first, LIFO for
//! depth-first and a score-ordered heap for best-first. The crawler drives
//! the frontier and decides how many candidates are in flight at once.

mod frontier;

pub use frontier::{Candidate, Frontier};

use serde::Deserialize;
use std::fmt;

/// Visit order for a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Level by level, shallow and wide
    #[default]
    Bfs,

    /// One branch to its leaf before the next sibling
    Dfs,

    /// Highest score first, dispatched in concurrent batches
    BestFirst,
}

impl Strategy {
    /// Depth ceiling used when none is configured
    pub fn default_max_depth(self) -> u32 {
        match self {
            Self::Bfs => 1,
            Self::Dfs => 10,
            Self::BestFirst => 3,
        }
    }

    /// Creates an empty frontier with this strategy's ordering
    pub fn frontier(self) -> Frontier {
        match self {
            Self::Bfs => Frontier::fifo(),
            Self::Dfs => Frontier::lifo(),
            Self::BestFirst => Frontier::priority(),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bfs => "bfs",
            Self::Dfs => "dfs",
            Self::BestFirst => "best-first",
        };
        f.write_str(name)
    }
}
