use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use rand::{rngs::StdRng, SeedableRng};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{Decade, Genre, MovieDetail, MovieSummary},
    services::{
        curated::{self, CuratedList, CuratedRequest, CuratedResponse},
        details,
        picker::{PickOutcome, PickQuery, MAX_KEYWORDS},
        title_search::{self, SearchResponse},
    },
};

use super::AppState;

// Request types

#[derive(Debug, Deserialize)]
pub struct CuratedParams {
    pub list: Option<CuratedList>,
    pub genre: Option<u32>,
    pub decade: Option<i32>,
    pub limit: Option<usize>,
    pub min_votes: Option<u32>,
    pub pages: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct RandomParams {
    /// Comma separated free-form keywords
    pub keywords: Option<String>,
    pub genre: Option<u32>,
    pub decade: Option<i32>,
}

impl RandomParams {
    fn into_query(self) -> AppResult<PickQuery> {
        let keywords: Vec<String> = self
            .keywords
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();

        if keywords.len() > MAX_KEYWORDS {
            return Err(AppError::InvalidInput(format!(
                "At most {} keywords are supported",
                MAX_KEYWORDS
            )));
        }

        let query = PickQuery {
            keywords,
            genre_id: self.genre,
            decade: self.decade.map(Decade::new),
        };

        if query.is_unconstrained() {
            return Err(AppError::InvalidInput(
                "Provide at least one of keywords, genre or decade".to_string(),
            ));
        }

        Ok(query)
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub page: Option<u32>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Curated list ranked in-process from several discovery pages
pub async fn curated_movies(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<CuratedParams>,
) -> AppResult<Json<CuratedResponse>> {
    let request = CuratedRequest {
        list: params.list.unwrap_or_default(),
        genre_id: params.genre,
        decade: params.decade.map(Decade::new),
        limit: params.limit.unwrap_or(curated::DEFAULT_LIMIT),
        min_votes: params.min_votes.unwrap_or(state.default_min_votes),
        pages: params.pages.unwrap_or(state.curated_pages),
    };

    tracing::info!(
        request_id = %request_id,
        list = ?request.list,
        limit = request.limit,
        min_votes = request.min_votes,
        "Processing curated list request"
    );

    let response = curated::curated_list(state.discovery.clone(), &state.image_base, &request).await?;
    Ok(Json(response))
}

/// One random movie matching keywords, genre and/or decade
pub async fn random_movie(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<RandomParams>,
) -> AppResult<Json<MovieSummary>> {
    let query = params.into_query()?;

    tracing::info!(
        request_id = %request_id,
        keywords = ?query.keywords,
        genre_id = ?query.genre_id,
        "Processing random pick request"
    );

    let mut rng = StdRng::from_entropy();
    match state.picker.pick(&query, &mut rng).await? {
        PickOutcome::Found(movie) => Ok(Json(movie)),
        PickOutcome::NotFound => Err(AppError::NotFound(
            "No movie matched the requested criteria".to_string(),
        )),
    }
}

/// Free-text title search
pub async fn search_movies(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<SearchResponse>> {
    let response = title_search::search_titles(
        state.discovery.clone(),
        &state.image_base,
        &params.q,
        params.page.unwrap_or(1),
    )
    .await?;
    Ok(Json(response))
}

/// Movie details with credits
pub async fn movie_detail(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> AppResult<Json<MovieDetail>> {
    let detail = details::movie_detail(state.catalog.clone(), &state.image_base, id).await?;
    Ok(Json(detail))
}

/// Genre list, for building genre filters
pub async fn genres(State(state): State<AppState>) -> AppResult<Json<Vec<Genre>>> {
    Ok(Json(state.catalog.genres().await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(keywords: Option<&str>, genre: Option<u32>, decade: Option<i32>) -> RandomParams {
        RandomParams {
            keywords: keywords.map(str::to_string),
            genre,
            decade,
        }
    }

    #[test]
    fn test_keywords_are_split_and_trimmed() {
        let query = params(Some(" heist , ,bank "), None, None).into_query().unwrap();
        assert_eq!(query.keywords, vec!["heist", "bank"]);
    }

    #[test]
    fn test_empty_query_is_rejected() {
        let result = params(Some(" , "), None, None).into_query();
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_three_keywords_are_rejected() {
        let result = params(Some("a,b,c"), None, None).into_query();
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_decade_only_is_enough() {
        let query = params(None, None, Some(1960)).into_query().unwrap();
        assert_eq!(query.decade, Some(Decade::new(1960)));
        assert!(query.keywords.is_empty());
    }
}
