use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::{Candidate, Decade, DiscoverFilters, MovieSummary, SortOrder},
    services::{dedupe::dedupe, providers::DiscoverySearch, ranking},
};

pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 100;
pub const MAX_PAGES: u32 = 10;

/// Kinds of curated movie lists
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CuratedList {
    /// Ordered by Bayesian weighted rating
    #[default]
    TopRated,
    Popular,
    Newest,
}

impl CuratedList {
    /// Upstream order the candidate pages are fetched in
    fn upstream_sort(&self) -> SortOrder {
        match self {
            CuratedList::TopRated => SortOrder::VoteCountDesc,
            CuratedList::Popular => SortOrder::PopularityDesc,
            CuratedList::Newest => SortOrder::ReleaseDateDesc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CuratedRequest {
    pub list: CuratedList,
    pub genre_id: Option<u32>,
    pub decade: Option<Decade>,
    pub limit: usize,
    pub min_votes: u32,
    pub pages: u32,
}

impl CuratedRequest {
    fn validate(&self) -> AppResult<()> {
        if self.limit == 0 || self.limit > MAX_LIMIT {
            return Err(AppError::InvalidInput(format!(
                "limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }
        if self.pages == 0 || self.pages > MAX_PAGES {
            return Err(AppError::InvalidInput(format!(
                "pages must be between 1 and {}",
                MAX_PAGES
            )));
        }
        Ok(())
    }

    fn filters(&self) -> DiscoverFilters {
        DiscoverFilters {
            keyword_ids: vec![],
            genre_id: self.genre_id,
            release_dates: self.decade.and_then(|d| d.date_range()),
            sort: self.list.upstream_sort(),
        }
    }
}

/// A curated list entry; `score` is set for rating-ranked lists
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CuratedMovie {
    #[serde(flatten)]
    pub movie: MovieSummary,
    pub vote_count: u64,
    pub popularity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CuratedResponse {
    pub list: CuratedList,
    pub candidates_considered: usize,
    pub movies: Vec<CuratedMovie>,
}

/// Builds a curated list from several upstream discovery pages.
///
/// Page 1 is fetched first to learn how many pages exist; the remaining
/// pages are fetched concurrently and joined in page order, so duplicates
/// across pages always resolve to the earliest page.
pub async fn curated_list(
    discovery: Arc<dyn DiscoverySearch>,
    image_base: &str,
    request: &CuratedRequest,
) -> AppResult<CuratedResponse> {
    request.validate()?;

    if request.decade.is_some_and(|d| d.date_range().is_none()) {
        // Outside any representable calendar: nothing can match
        return Ok(CuratedResponse {
            list: request.list,
            candidates_considered: 0,
            movies: vec![],
        });
    }

    let filters = request.filters();
    let pages = fetch_pages(discovery, &filters, request.pages).await?;
    let candidates = dedupe(&pages);

    tracing::info!(
        list = ?request.list,
        pages = pages.len(),
        candidates = candidates.len(),
        "Curated candidates collected"
    );

    let movies: Vec<CuratedMovie> = match request.list {
        CuratedList::TopRated => ranking::rank_scored(&candidates, request.min_votes)
            .into_iter()
            .take(request.limit)
            .map(|scored| curated_movie(&scored.candidate, image_base, Some(scored.score)))
            .collect(),
        CuratedList::Popular => ranking::by_popularity(&candidates)
            .iter()
            .take(request.limit)
            .map(|candidate| curated_movie(candidate, image_base, None))
            .collect(),
        CuratedList::Newest => ranking::by_release_date(&candidates)
            .iter()
            .take(request.limit)
            .map(|candidate| curated_movie(candidate, image_base, None))
            .collect(),
    };

    Ok(CuratedResponse {
        list: request.list,
        candidates_considered: candidates.len(),
        movies,
    })
}

fn curated_movie(candidate: &Candidate, image_base: &str, score: Option<f64>) -> CuratedMovie {
    CuratedMovie {
        movie: MovieSummary::from_candidate(candidate, image_base),
        vote_count: candidate.vote_count,
        popularity: candidate.popularity_score(),
        score,
    }
}

/// Fetches pages `1..=wanted` (capped by what upstream reports), in order.
/// Any failing page fails the whole list.
async fn fetch_pages(
    discovery: Arc<dyn DiscoverySearch>,
    filters: &DiscoverFilters,
    wanted: u32,
) -> AppResult<Vec<Vec<Candidate>>> {
    let first = discovery.discover(filters, 1).await?;
    let last_page = wanted.min(first.total_pages);

    let mut tasks = Vec::new();
    for page in 2..=last_page {
        let provider = discovery.clone();
        let filters = filters.clone();
        let task = tokio::spawn(async move { provider.discover(&filters, page).await });
        tasks.push((page, task));
    }

    let mut pages = vec![first.results];
    for (page, task) in tasks {
        match task.await {
            Ok(Ok(result)) => pages.push(result.results),
            Ok(Err(e)) => {
                tracing::error!(page, error = %e, "Curated page fetch failed");
                return Err(e);
            }
            Err(e) => {
                tracing::error!(page, error = %e, "Task join error");
                return Err(AppError::Internal(e.to_string()));
            }
        }
    }

    Ok(pages)
}
