/// Movie metadata provider abstraction
///
/// Curation and picking only ever talk to these traits. The concrete binding
/// is TMDB; tests substitute mocks or stubs.
use crate::{
    error::AppResult,
    models::{DiscoverFilters, Genre, MovieCredits, Page, TmdbMovieDetails},
};

pub mod retry;
pub mod tmdb;

pub use retry::RetryPolicy;
pub use tmdb::TmdbProvider;

/// Paginated movie discovery and search
///
/// Every method must be idempotent and free of side effects. An `Ok` answer
/// with no results means "reachable but empty"; an `Err` means the upstream
/// could not answer, and callers must not read it as an empty result.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DiscoverySearch: Send + Sync {
    /// Fetch one page of movies matching `filters`
    async fn discover(&self, filters: &DiscoverFilters, page: u32) -> AppResult<Page>;

    /// Resolve free text to a keyword id, first match wins
    async fn resolve_keyword(&self, text: &str) -> AppResult<Option<u64>>;

    /// Full-text title search
    async fn free_text_search(&self, query: &str, page: u32) -> AppResult<Page>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Per-movie lookups backing the detail page
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieCatalog: Send + Sync {
    async fn movie_details(&self, id: u64) -> AppResult<TmdbMovieDetails>;

    async fn movie_credits(&self, id: u64) -> AppResult<MovieCredits>;

    async fn genres(&self) -> AppResult<Vec<Genre>>;
}
