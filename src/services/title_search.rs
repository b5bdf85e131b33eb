use std::sync::Arc;

use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::MovieSummary,
    services::providers::DiscoverySearch,
};

/// Highest result page TMDB serves for search endpoints
pub const MAX_SEARCH_PAGE: u32 = 500;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchResponse {
    pub page: u32,
    pub total_pages: u32,
    pub total_results: u64,
    pub results: Vec<MovieSummary>,
}

/// Service function for title search
///
/// Validates the query, delegates to the discovery provider and normalizes
/// the results for clients.
pub async fn search_titles(
    provider: Arc<dyn DiscoverySearch>,
    image_base: &str,
    query: &str,
    page: u32,
) -> AppResult<SearchResponse> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::InvalidInput(
            "Search query cannot be empty".to_string(),
        ));
    }
    if page == 0 || page > MAX_SEARCH_PAGE {
        return Err(AppError::InvalidInput(format!(
            "page must be between 1 and {}",
            MAX_SEARCH_PAGE
        )));
    }

    let result = provider.free_text_search(query, page).await?;

    Ok(SearchResponse {
        page: result.page,
        total_pages: result.total_pages,
        total_results: result.total_results,
        results: result
            .results
            .iter()
            .map(|candidate| MovieSummary::from_candidate(candidate, image_base))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::candidate;
    use crate::models::Page;
    use crate::services::providers::MockDiscoverySearch;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn test_search_trims_and_normalizes() {
        let mut mock = MockDiscoverySearch::new();
        mock.expect_free_text_search()
            .with(eq("alien"), eq(2))
            .times(1)
            .returning(|_, page| {
                Ok(Page {
                    page,
                    results: vec![candidate(348, 8.1, 14000, 60.0)],
                    total_pages: 4,
                    total_results: 70,
                })
            });

        let response = search_titles(Arc::new(mock), "https://img", "  alien ", 2)
            .await
            .unwrap();

        assert_eq!(response.page, 2);
        assert_eq!(response.total_results, 70);
        assert_eq!(response.results[0].title, "Movie 348");
    }

    #[tokio::test]
    async fn test_blank_query_is_rejected() {
        let mock = MockDiscoverySearch::new();
        let result = search_titles(Arc::new(mock), "https://img", "   ", 1).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_page_out_of_range_is_rejected() {
        let mock = MockDiscoverySearch::new();
        let result = search_titles(Arc::new(mock), "https://img", "alien", 0).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }
}
