/// TMDB (The Movie Database) v3 provider
///
/// Implements discovery, keyword resolution and free-text search for the
/// curation and picking services, plus the per-movie lookups behind the
/// detail page.
///
/// API Flow:
/// 1. Discovery: /discover/movie with keyword/genre/date filters
/// 2. Keywords: /search/keyword → first matching keyword id
/// 3. Fallback search: /search/movie
/// 4. Details: /movie/{id} and /movie/{id}/credits
use std::time::Duration;

use reqwest::{Client as HttpClient, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{DiscoverFilters, Genre, MovieCredits, Page, TmdbMovieDetails},
    services::providers::{DiscoverySearch, MovieCatalog, RetryPolicy},
};

const KEYWORD_CACHE_TTL: u64 = 86400; // 1 day
const GENRE_CACHE_TTL: u64 = 86400; // 1 day
const DETAILS_CACHE_TTL: u64 = 3600; // 1 hour

#[derive(Debug, Deserialize)]
struct KeywordSearchResponse {
    #[serde(default)]
    results: Vec<KeywordResult>,
}

#[derive(Debug, Deserialize)]
struct KeywordResult {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct GenreListResponse {
    #[serde(default)]
    genres: Vec<Genre>,
}

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    language: String,
    cache: Option<Cache>,
    retry: RetryPolicy,
}

impl TmdbProvider {
    /// Creates a provider with its own HTTP client and request timeout
    pub fn new(
        api_key: String,
        api_url: String,
        language: String,
        timeout: Duration,
        retry: RetryPolicy,
        cache: Option<Cache>,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            language,
            cache,
            retry,
        })
    }

    /// GET `path` with the standard auth/language parameters, retrying
    /// transient failures according to the retry policy
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> AppResult<T> {
        self.retry
            .run(path, || self.get_json_once(path, params))
            .await
    }

    async fn get_json_once<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.language.as_str()),
            ])
            .query(params)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, path, &body));
        }

        let body = response.text().await.map_err(classify_transport_error)?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(path = %path, error = %e, "Failed to deserialize TMDB response");
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })
    }
}

/// Connectivity problems mean the upstream is unavailable, not that it is empty.
/// A connection dropped mid-body counts as one too.
fn classify_transport_error(e: reqwest::Error) -> AppError {
    if e.is_connect() || e.is_timeout() || e.is_request() || e.is_body() || e.is_decode() {
        AppError::UpstreamUnavailable(format!("TMDB unreachable: {}", e))
    } else {
        AppError::HttpClient(e)
    }
}

fn classify_status(status: StatusCode, path: &str, body: &str) -> AppError {
    tracing::warn!(path = %path, status = %status, body = %body, "TMDB request failed");

    if status.is_server_error() {
        AppError::UpstreamUnavailable(format!("TMDB returned status {}", status))
    } else if status == StatusCode::NOT_FOUND {
        AppError::NotFound(format!("TMDB resource {} not found", path))
    } else {
        AppError::ExternalApi(format!("TMDB returned status {}: {}", status, body))
    }
}

#[async_trait::async_trait]
impl DiscoverySearch for TmdbProvider {
    async fn discover(&self, filters: &DiscoverFilters, page: u32) -> AppResult<Page> {
        let mut params = filters.to_query();
        params.push(("page", page.to_string()));
        params.push(("include_adult", "false".to_string()));

        let result: Page = self.get_json("/discover/movie", &params).await?;

        tracing::debug!(
            page,
            results = result.results.len(),
            total_results = result.total_results,
            total_pages = result.total_pages,
            provider = "tmdb",
            "Discover page fetched"
        );

        Ok(result)
    }

    async fn resolve_keyword(&self, text: &str) -> AppResult<Option<u64>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        cached!(
            self.cache,
            CacheKey::Keyword(text.to_string()),
            KEYWORD_CACHE_TTL,
            async move {
                let response: KeywordSearchResponse = self
                    .get_json("/search/keyword", &[("query", text.to_string())])
                    .await?;

                let id = response.results.first().map(|k| k.id);
                tracing::debug!(keyword = %text, id = ?id, provider = "tmdb", "Keyword resolved");

                Ok::<_, AppError>(id)
            }
        )
    }

    async fn free_text_search(&self, query: &str, page: u32) -> AppResult<Page> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let params = [
            ("query", query.to_string()),
            ("page", page.to_string()),
            ("include_adult", "false".to_string()),
        ];
        let result: Page = self.get_json("/search/movie", &params).await?;

        tracing::info!(
            query = %query,
            results = result.results.len(),
            provider = "tmdb",
            "Title search completed"
        );

        Ok(result)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

#[async_trait::async_trait]
impl MovieCatalog for TmdbProvider {
    async fn movie_details(&self, id: u64) -> AppResult<TmdbMovieDetails> {
        cached!(
            self.cache,
            CacheKey::MovieDetails(id),
            DETAILS_CACHE_TTL,
            async move {
                self.get_json::<TmdbMovieDetails>(&format!("/movie/{}", id), &[])
                    .await
            }
        )
    }

    async fn movie_credits(&self, id: u64) -> AppResult<MovieCredits> {
        cached!(
            self.cache,
            CacheKey::MovieCredits(id),
            DETAILS_CACHE_TTL,
            async move {
                self.get_json::<MovieCredits>(&format!("/movie/{}/credits", id), &[])
                    .await
            }
        )
    }

    async fn genres(&self) -> AppResult<Vec<Genre>> {
        cached!(
            self.cache,
            CacheKey::Genres(self.language.clone()),
            GENRE_CACHE_TTL,
            async move {
                let response: GenreListResponse = self.get_json("/genre/movie/list", &[]).await?;
                Ok::<_, AppError>(response.genres)
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_provider(api_url: &str) -> TmdbProvider {
        TmdbProvider::new(
            "test_key".to_string(),
            api_url.to_string(),
            "en-US".to_string(),
            Duration::from_millis(500),
            RetryPolicy::new(2, Duration::from_millis(1)),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let provider = create_test_provider("https://api.themoviedb.org/3/");
        assert_eq!(provider.api_url, "https://api.themoviedb.org/3");
    }

    #[test]
    fn test_server_errors_are_unavailable() {
        let error = classify_status(StatusCode::BAD_GATEWAY, "/discover/movie", "");
        assert!(matches!(error, AppError::UpstreamUnavailable(_)));
        assert!(error.is_retryable());
    }

    #[test]
    fn test_client_errors_are_not_retryable() {
        let error = classify_status(StatusCode::UNAUTHORIZED, "/discover/movie", "bad key");
        assert!(matches!(error, AppError::ExternalApi(_)));
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_missing_resource_is_not_found() {
        let error = classify_status(StatusCode::NOT_FOUND, "/movie/0", "");
        assert!(matches!(error, AppError::NotFound(_)));
    }

    #[test]
    fn test_keyword_response_deserialization() {
        let json = r#"{"page": 1, "results": [{"id": 10051, "name": "heist"}, {"id": 9715, "name": "heist movie"}], "total_pages": 1, "total_results": 2}"#;
        let response: KeywordSearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.results.first().map(|k| k.id), Some(10051));
    }

    #[test]
    fn test_genre_list_deserialization() {
        let json = r#"{"genres": [{"id": 28, "name": "Action"}, {"id": 35, "name": "Comedy"}]}"#;
        let response: GenreListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.genres.len(), 2);
        assert_eq!(response.genres[0].name, "Action");
    }

    #[tokio::test]
    async fn test_blank_keyword_resolves_to_none_without_a_request() {
        let provider = create_test_provider("http://127.0.0.1:1");
        assert_eq!(provider.resolve_keyword("   ").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unreachable_upstream_surfaces_as_unavailable() {
        // Nothing listens on port 1, so the connection is refused
        let provider = create_test_provider("http://127.0.0.1:1");
        let result = provider.discover(&DiscoverFilters::default(), 1).await;
        assert!(matches!(result, Err(AppError::UpstreamUnavailable(_))));
    }

    #[tokio::test]
    async fn test_truncated_body_is_retried_as_unavailable() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        // Promises 200 bytes, sends a few, then hangs up
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let connections = Arc::new(AtomicUsize::new(0));
        let counter = connections.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(
                        b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 200\r\n\r\n{\"page\":1",
                    )
                    .await;
                let _ = socket.shutdown().await;
            }
        });

        let provider = create_test_provider(&format!("http://{}", address));
        let result = provider.discover(&DiscoverFilters::default(), 1).await;

        assert!(matches!(result, Err(AppError::UpstreamUnavailable(_))));
        assert!(connections.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_empty_search_query_is_rejected() {
        let provider = create_test_provider("http://127.0.0.1:1");
        let result = provider.free_text_search(" ", 1).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }
}
