use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use url::Url;

/// A discovered URL waiting to be visited
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Normalized URL
    pub url: Url,

    /// Distance from the start URL
    pub depth: u32,

    /// Page the link was found on, `None` for the start URL
    pub parent_url: Option<String>,

    /// Monotonic counter assigned when the link was admitted
    pub discovery_order: u64,

    /// Priority score, 0.0 when unscored
    pub score: f64,
}

impl Candidate {
    /// The start candidate at depth 0
    pub fn seed(url: Url) -> Self {
        Self {
            url,
            depth: 0,
            parent_url: None,
            discovery_order: 0,
            score: 0.0,
        }
    }
}

// Max-heap order: higher score first, then earlier discovery first
impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.discovery_order.cmp(&self.discovery_order))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

/// Ordered container of candidates
#[derive(Debug)]
pub enum Frontier {
    Fifo(VecDeque<Candidate>),
    Lifo(Vec<Candidate>),
    Priority(BinaryHeap<Candidate>),
}

impl Frontier {
    pub fn fifo() -> Self {
        Self::Fifo(VecDeque::new())
    }

    pub fn lifo() -> Self {
        Self::Lifo(Vec::new())
    }

    pub fn priority() -> Self {
        Self::Priority(BinaryHeap::new())
    }

    pub fn push(&mut self, candidate: Candidate) {
        match self {
            Self::Fifo(queue) => queue.push_back(candidate),
            Self::Lifo(stack) => stack.push(candidate),
            Self::Priority(heap) => heap.push(candidate),
        }
    }

    /// Pushes the children of one page
    ///
    /// A LIFO frontier receives them in reverse so the first link found on
    /// the page is the first one visited.
    pub fn extend(&mut self, children: Vec<Candidate>) {
        match self {
            Self::Fifo(queue) => queue.extend(children),
            Self::Lifo(stack) => stack.extend(children.into_iter().rev()),
            Self::Priority(heap) => heap.extend(children),
        }
    }

    pub fn pop(&mut self) -> Option<Candidate> {
        match self {
            Self::Fifo(queue) => queue.pop_front(),
            Self::Lifo(stack) => stack.pop(),
            Self::Priority(heap) => heap.pop(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Fifo(queue) => queue.len(),
            Self::Lifo(stack) => stack.len(),
            Self::Priority(heap) => heap.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
