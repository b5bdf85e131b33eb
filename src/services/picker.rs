use std::sync::Arc;

use rand::{seq::SliceRandom, Rng};

use crate::{
    error::{AppError, AppResult},
    models::{Candidate, Decade, DiscoverFilters, MovieSummary, SortOrder},
    services::providers::DiscoverySearch,
};

/// Deepest result page a pick may land on
pub const MAX_RANDOM_PAGE: u32 = 10;

/// Free-form keywords accepted per pick
pub const MAX_KEYWORDS: usize = 2;

/// What the caller wants a random movie to match.
///
/// Assumes at least one field is set. Rejecting an empty query is the
/// caller's job: unconstrained queries are answered with any movie.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PickQuery {
    pub keywords: Vec<String>,
    pub genre_id: Option<u32>,
    pub decade: Option<Decade>,
}

impl PickQuery {
    pub fn is_unconstrained(&self) -> bool {
        self.keywords.is_empty() && self.genre_id.is_none() && self.decade.is_none()
    }
}

/// Result of a pick: one movie, or a definite "nothing matched"
#[derive(Debug, Clone, PartialEq)]
pub enum PickOutcome {
    Found(MovieSummary),
    NotFound,
}

/// Which constraints one attempt keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AttemptShape {
    keywords: bool,
    genre: bool,
    decade: bool,
}

impl AttemptShape {
    const fn new(keywords: bool, genre: bool, decade: bool) -> Self {
        Self {
            keywords,
            genre,
            decade,
        }
    }
}

/// Relaxation order, most constrained first. The decade is dropped last
/// among pairs, so era is preferred over genre and keyword matches.
const RELAXATION_ORDER: [AttemptShape; 7] = [
    AttemptShape::new(true, true, true),
    AttemptShape::new(true, false, true),
    AttemptShape::new(false, true, true),
    AttemptShape::new(true, true, false),
    AttemptShape::new(false, false, true),
    AttemptShape::new(true, false, false),
    AttemptShape::new(false, true, false),
];

/// Finds one random movie for loosely specified criteria.
///
/// Tries a fixed sequence of progressively looser discovery queries and
/// stops at the first that has hits, then falls back to a free-text search
/// on the raw keywords. Randomness comes from the caller's generator so
/// repeated calls vary while tests stay reproducible.
#[derive(Clone)]
pub struct Picker {
    discovery: Arc<dyn DiscoverySearch>,
    image_base: String,
}

impl Picker {
    pub fn new(discovery: Arc<dyn DiscoverySearch>, image_base: impl Into<String>) -> Self {
        Self {
            discovery,
            image_base: image_base.into(),
        }
    }

    pub async fn pick<R: Rng + Send>(
        &self,
        query: &PickQuery,
        rng: &mut R,
    ) -> AppResult<PickOutcome> {
        let keywords: Vec<&str> = query
            .keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .collect();

        if keywords.len() > MAX_KEYWORDS {
            return Err(AppError::InvalidInput(format!(
                "At most {} keywords are supported",
                MAX_KEYWORDS
            )));
        }

        let keyword_ids = self.resolve_keywords(&keywords).await?;
        let mut attempts = build_attempts(&keyword_ids, query.genre_id, query.decade);
        if query.is_unconstrained() {
            attempts.push(DiscoverFilters::default());
        }

        tracing::info!(
            keywords = keywords.len(),
            resolved_keywords = keyword_ids.len(),
            genre_id = ?query.genre_id,
            decade = ?query.decade.map(|d| d.start_year),
            attempts = attempts.len(),
            "Picking random movie"
        );

        for (index, filters) in attempts.iter().enumerate() {
            if let Some(candidate) = self.try_attempt(filters, rng).await? {
                tracing::info!(
                    attempt = index + 1,
                    constraints = filters.constraint_count(),
                    movie_id = candidate.id,
                    "Random pick found"
                );
                return Ok(self.found(&candidate));
            }

            tracing::debug!(
                attempt = index + 1,
                constraints = filters.constraint_count(),
                "Attempt had no hits, relaxing constraints"
            );
        }

        if !keywords.is_empty() {
            if let Some(candidate) = self.fallback_search(&keywords, query.decade, rng).await? {
                tracing::info!(movie_id = candidate.id, "Random pick found by free-text fallback");
                return Ok(self.found(&candidate));
            }
        }

        tracing::info!("No movie matched any relaxation");
        Ok(PickOutcome::NotFound)
    }

    fn found(&self, candidate: &Candidate) -> PickOutcome {
        PickOutcome::Found(MovieSummary::from_candidate(candidate, &self.image_base))
    }

    /// Resolves keywords concurrently. Keywords without a match are dropped;
    /// upstream failures are not.
    async fn resolve_keywords(&self, keywords: &[&str]) -> AppResult<Vec<u64>> {
        let resolved = match keywords {
            [] => vec![],
            [only] => vec![self.discovery.resolve_keyword(only).await?],
            [first, second, ..] => {
                let (a, b) = tokio::join!(
                    self.discovery.resolve_keyword(first),
                    self.discovery.resolve_keyword(second)
                );
                vec![a?, b?]
            }
        };

        for (keyword, id) in keywords.iter().zip(&resolved) {
            if id.is_none() {
                tracing::debug!(keyword = %keyword, "Keyword did not resolve, dropping it");
            }
        }

        let mut ids: Vec<u64> = resolved.into_iter().flatten().collect();
        ids.dedup();
        Ok(ids)
    }

    /// One discovery attempt: at most two upstream calls.
    ///
    /// `Ok(None)` means the attempt had no hits and the caller should relax.
    async fn try_attempt<R: Rng + Send>(
        &self,
        filters: &DiscoverFilters,
        rng: &mut R,
    ) -> AppResult<Option<Candidate>> {
        let first = self.discovery.discover(filters, 1).await?;
        if first.total_results == 0 {
            return Ok(None);
        }

        let max_pages = first.total_pages.clamp(1, MAX_RANDOM_PAGE);
        let page_number = rng.gen_range(1..=max_pages);

        let results = if page_number == 1 {
            first.results
        } else {
            self.discovery.discover(filters, page_number).await?.results
        };

        if results.is_empty() {
            tracing::debug!(page = page_number, "Chosen page was empty");
        }

        Ok(results.choose(rng).cloned())
    }

    /// Free-text search on the raw keywords, limited to the decade if one
    /// was requested. Results with an unparseable date are kept.
    async fn fallback_search<R: Rng + Send>(
        &self,
        keywords: &[&str],
        decade: Option<Decade>,
        rng: &mut R,
    ) -> AppResult<Option<Candidate>> {
        if decade.is_some_and(|d| d.date_range().is_none()) {
            tracing::debug!("Decade outside the calendar, skipping fallback search");
            return Ok(None);
        }

        let text = keywords.join(" ");
        let page = self.discovery.free_text_search(&text, 1).await?;

        let matching: Vec<Candidate> = page
            .results
            .into_iter()
            .filter(|candidate| match (decade, candidate.release_year()) {
                (Some(decade), Some(year)) => decade.contains_year(year),
                _ => true,
            })
            .collect();

        tracing::debug!(query = %text, remaining = matching.len(), "Fallback search finished");

        Ok(matching.choose(rng).cloned())
    }
}

/// Expands the requested constraints into the ordered, duplicate-free list
/// of discovery queries to try.
///
/// Only shapes whose every component is available are kept, so the number
/// of constraints never increases along the list and the last attempt keeps
/// a single constraint. A decade chrono cannot represent matches nothing,
/// and attempts using it are skipped. Empty when nothing is constrained.
fn build_attempts(
    keyword_ids: &[u64],
    genre_id: Option<u32>,
    decade: Option<Decade>,
) -> Vec<DiscoverFilters> {
    let have_keywords = !keyword_ids.is_empty();
    let release_dates = decade.and_then(|d| d.date_range());

    let mut attempts: Vec<DiscoverFilters> = Vec::new();
    for shape in RELAXATION_ORDER {
        if (shape.keywords && !have_keywords)
            || (shape.genre && genre_id.is_none())
            || (shape.decade && release_dates.is_none())
        {
            continue;
        }

        let filters = DiscoverFilters {
            keyword_ids: if shape.keywords {
                keyword_ids.to_vec()
            } else {
                vec![]
            },
            genre_id: genre_id.filter(|_| shape.genre),
            release_dates: release_dates.filter(|_| shape.decade),
            sort: SortOrder::PopularityDesc,
        };

        if !attempts.contains(&filters) {
            attempts.push(filters);
        }
    }

    attempts
}
