//! Free-text name resolution
//!
//! Maps a user query to at most one catalog id. Strategies implement
//! [`EntityResolver`] so callers can swap the matching policy without
//! touching the recommendation pipeline.

use crate::catalog::normalize_name;
use crate::EntityCatalog;
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Result of resolving a query against a catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionOutcome {
    Found(usize),
    NotFound,
}

impl ResolutionOutcome {
    #[inline]
    pub fn is_found(&self) -> bool {
        matches!(self, ResolutionOutcome::Found(_))
    }

    #[inline]
    pub fn entity_id(&self) -> Option<usize> {
        match self {
            ResolutionOutcome::Found(id) => Some(*id),
            ResolutionOutcome::NotFound => None,
        }
    }
}

impl From<Option<usize>> for ResolutionOutcome {
    fn from(id: Option<usize>) -> Self {
        id.map_or(ResolutionOutcome::NotFound, ResolutionOutcome::Found)
    }
}

/// A name matching strategy. Implementations must be pure functions of
/// their inputs so that concurrent callers always agree.
pub trait EntityResolver: Send + Sync {
    fn resolve(&self, query: &str, catalog: &EntityCatalog) -> ResolutionOutcome;
}

/// Case-insensitive substring containment; the lowest matching id wins.
///
/// An empty query is contained in every name and therefore resolves to the
/// first catalog entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringResolver;

impl SubstringResolver {
    fn first_match(needle: &str, catalog: &EntityCatalog) -> Option<usize> {
        catalog
            .iter()
            .find(|entity| entity.normalized_name.contains(needle))
            .map(|entity| entity.id)
    }
}

impl EntityResolver for SubstringResolver {
    fn resolve(&self, query: &str, catalog: &EntityCatalog) -> ResolutionOutcome {
        let needle = normalize_name(query);
        let outcome = ResolutionOutcome::from(Self::first_match(&needle, catalog));
        debug!(query = %needle, ?outcome, "substring resolution");
        outcome
    }
}

/// Resolve with the default substring strategy
#[inline]
pub fn resolve(query: &str, catalog: &EntityCatalog) -> ResolutionOutcome {
    SubstringResolver.resolve(query, catalog)
}

pub const DEFAULT_MIN_TRIGRAM_SIMILARITY: f64 = 0.3;

/// Substring containment first, then character-trigram similarity.
///
/// Tolerates typos ("cofee hous"). When no name contains the query, the
/// entity with the highest trigram Jaccard score is chosen if that score
/// reaches `min_similarity`. Equal scores keep the lowest id.
#[derive(Debug, Clone, Copy)]
pub struct TrigramResolver {
    pub min_similarity: f64,
}

impl Default for TrigramResolver {
    fn default() -> Self {
        Self {
            min_similarity: DEFAULT_MIN_TRIGRAM_SIMILARITY,
        }
    }
}

impl TrigramResolver {
    pub fn new(min_similarity: f64) -> Self {
        Self { min_similarity }
    }
}

impl EntityResolver for TrigramResolver {
    fn resolve(&self, query: &str, catalog: &EntityCatalog) -> ResolutionOutcome {
        let needle = normalize_name(query);
        if let Some(id) = SubstringResolver::first_match(&needle, catalog) {
            return ResolutionOutcome::Found(id);
        }

        let query_trigrams = trigrams(&needle);
        let mut best: Option<(usize, f64)> = None;
        for entity in catalog.iter() {
            let score = jaccard(&query_trigrams, &trigrams(&entity.normalized_name));
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((entity.id, score));
            }
        }

        let outcome = match best {
            Some((id, score)) if score >= self.min_similarity => ResolutionOutcome::Found(id),
            _ => ResolutionOutcome::NotFound,
        };
        debug!(
            query = %needle,
            ?outcome,
            best_score = ?best.map(|(_, s)| s),
            "trigram resolution"
        );
        outcome
    }
}

/// Character trigrams of a space-padded string
fn trigrams(s: &str) -> AHashSet<String> {
    let padded = format!("  {}  ", s);
    let chars: Vec<char> = padded.chars().collect();

    chars
        .windows(3)
        .map(|w| w.iter().collect::<String>())
        .collect()
}

fn jaccard(a: &AHashSet<String>, b: &AHashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}
