//! Side-by-side comparison
//!
//! Up to [`MAX_COMPARED`] influencers, picked from the catalogue and the
//! saved shortlist. With more than one influencer in the set, the highest
//! follower count and engagement rate are marked as best.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use super::mock_data::mock_influencers;
use crate::models::{Influencer, Severity};
use crate::state::AppStore;

/// Size limit of the comparison set
pub const MAX_COMPARED: usize = 4;

/// Result of [`CompareService::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyCompared,
    /// The set is full; a warning toast has been raised
    LimitReached,
    /// No selectable influencer has that id
    NotFound,
}

/// Ids holding the best value of each metric.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Highlights {
    pub followers: HashSet<String>,
    pub engagement_rate: HashSet<String>,
}

/// Follower count of a display value such as "1.2M" or "500K"
pub fn parse_followers(display: &str) -> Option<f64> {
    let display = display.trim().to_uppercase();
    let multiplier = if display.contains('M') {
        1_000_000.0
    } else if display.contains('K') {
        1_000.0
    } else {
        1.0
    };
    leading_number(&display).map(|n| n * multiplier)
}

/// Percentage of a display value such as "3.5%"
pub fn parse_engagement_rate(display: &str) -> Option<f64> {
    leading_number(&display.replace('%', ""))
}

fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim();
    let end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && c == '-')))
        .map_or(s.len(), |(i, _)| i);
    s[..end].parse().ok()
}

fn followers_of(influencer: &Influencer) -> Option<f64> {
    influencer
        .numeric_followers
        .filter(|&n| n > 0)
        .map(|n| n as f64)
        .or_else(|| parse_followers(&influencer.followers))
}

fn engagement_of(influencer: &Influencer) -> Option<f64> {
    influencer
        .numeric_engagement_rate
        .filter(|&r| r > 0.0)
        .or_else(|| parse_engagement_rate(&influencer.engagement_rate))
}

/// Ids whose metric equals the maximum. Unknown values never win.
fn best_of(set: &[Influencer], metric: fn(&Influencer) -> Option<f64>) -> HashSet<String> {
    let values: Vec<(&str, f64)> = set
        .iter()
        .filter_map(|i| metric(i).map(|v| (i.id.as_str(), v)))
        .collect();
    let Some(max) = values.iter().map(|&(_, v)| v).reduce(f64::max) else {
        return HashSet::new();
    };
    values
        .into_iter()
        .filter(|&(_, v)| v == max)
        .map(|(id, _)| id.to_string())
        .collect()
}

/// Comparison set for one session.
pub struct CompareService {
    store: Arc<AppStore>,
    catalogue: Vec<Influencer>,
    compared: Vec<Influencer>,
}

impl CompareService {
    pub fn new(store: Arc<AppStore>) -> Self {
        Self {
            store,
            catalogue: mock_influencers(),
            compared: Vec::new(),
        }
    }

    pub fn with_catalogue(mut self, catalogue: Vec<Influencer>) -> Self {
        self.catalogue = catalogue;
        self
    }

    /// Catalogue entries followed by saved influencers, one per id. A saved
    /// profile replaces the catalogue entry with the same id in place.
    pub fn selectable(&self) -> Vec<Influencer> {
        let mut out: Vec<Influencer> = Vec::new();
        for influencer in self.catalogue.iter().cloned().chain(self.store.saved_influencers()) {
            match out.iter_mut().find(|i| i.id == influencer.id) {
                Some(existing) => *existing = influencer,
                None => out.push(influencer),
            }
        }
        out
    }

    pub fn compared(&self) -> &[Influencer] {
        &self.compared
    }

    /// Add the selectable influencer with `id` to the set
    pub fn add(&mut self, id: &str) -> AddOutcome {
        if self.compared.len() >= MAX_COMPARED {
            let message = self.store.translate("compareLimitReached", &[]);
            self.store.add_toast(message, Severity::Warning);
            return AddOutcome::LimitReached;
        }
        if self.compared.iter().any(|i| i.id == id) {
            return AddOutcome::AlreadyCompared;
        }
        match self.selectable().into_iter().find(|i| i.id == id) {
            Some(influencer) => {
                debug!("Comparing {} ({})", influencer.name, influencer.id);
                self.compared.push(influencer);
                AddOutcome::Added
            }
            None => AddOutcome::NotFound,
        }
    }

    /// Drop `id` from the set; returns whether it was there
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.compared.len();
        self.compared.retain(|i| i.id != id);
        self.compared.len() != before
    }

    /// Best values in the set; empty unless more than one is compared
    pub fn highlights(&self) -> Highlights {
        if self.compared.len() < 2 {
            return Highlights::default();
        }
        Highlights {
            followers: best_of(&self.compared, followers_of),
            engagement_rate: best_of(&self.compared, engagement_of),
        }
    }
}
