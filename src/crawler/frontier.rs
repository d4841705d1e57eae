//! Crawl frontier with visited and scheduled bookkeeping
//!
//! The frontier is owned by the coordinating task alone. Workers never touch
//! it; they report discovered links back and the coordinator merges them
//! between waves.

use crate::url::canonical_url;
use std::collections::{HashSet, VecDeque};

/// A URL awaiting a fetch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// The absolute URL to fetch
    pub url: String,

    /// Link distance from the seed (the seed is depth 1)
    pub depth: u32,
}

/// FIFO queue of URLs plus the Visited and Scheduled sets
///
/// - Scheduled: every URL ever placed on the queue, so two pages linking to
///   the same target only enqueue it once
/// - Visited: every URL claimed for dispatch; a URL is claimed at most once
///
/// Both sets are keyed by [`canonical_url`], so `http://host` and
/// `http://host/` are one page.
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    visited: HashSet<String>,
    scheduled: HashSet<String>,
    max_depth: u32,
}

impl Frontier {
    /// Creates a frontier holding only the seed at depth 1
    pub fn new(seed: impl Into<String>, max_depth: u32) -> Self {
        let seed = seed.into().trim().to_string();
        let mut scheduled = HashSet::new();
        scheduled.insert(canonical_url(&seed));

        Self {
            queue: VecDeque::from([FrontierEntry {
                url: seed,
                depth: 1,
            }]),
            visited: HashSet::new(),
            scheduled,
            max_depth,
        }
    }

    /// Claims up to `budget` entries for the next wave
    ///
    /// Each claimed URL is moved into the Visited set in the same step; an
    /// entry whose URL was already visited is dropped without consuming
    /// budget.
    pub fn next_wave(&mut self, budget: usize) -> Vec<FrontierEntry> {
        let mut wave = Vec::new();

        while wave.len() < budget {
            let entry = match self.queue.pop_front() {
                Some(entry) => entry,
                None => break,
            };

            if self.visited.insert(canonical_url(&entry.url)) {
                wave.push(entry);
            } else {
                tracing::debug!("Skipping already visited {}", entry.url);
            }
        }

        wave
    }

    /// Enqueues a discovered URL
    ///
    /// # Returns
    ///
    /// `true` if the URL was added; `false` if it lies beyond the depth
    /// horizon or was scheduled before.
    pub fn schedule(&mut self, url: impl Into<String>, depth: u32) -> bool {
        if depth > self.max_depth {
            return false;
        }

        let url = url.into();
        if !self.scheduled.insert(canonical_url(&url)) {
            return false;
        }

        self.queue.push_back(FrontierEntry { url, depth });
        true
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
