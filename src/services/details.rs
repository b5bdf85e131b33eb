use std::sync::Arc;

use crate::{error::AppResult, models::MovieDetail, services::providers::MovieCatalog};

/// Fetches a movie's details and credits concurrently and merges them
pub async fn movie_detail(
    catalog: Arc<dyn MovieCatalog>,
    image_base: &str,
    id: u64,
) -> AppResult<MovieDetail> {
    let (details, credits) = tokio::try_join!(catalog.movie_details(id), catalog.movie_credits(id))?;

    tracing::info!(
        movie_id = id,
        cast = credits.cast.len(),
        crew = credits.crew.len(),
        "Movie detail fetched"
    );

    Ok(MovieDetail::new(details, credits, image_base))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{CastMember, MovieCredits, TmdbMovieDetails};
    use crate::services::providers::MockMovieCatalog;
    use mockall::predicate::eq;

    fn details(id: u64) -> TmdbMovieDetails {
        TmdbMovieDetails {
            id,
            title: "Heat".to_string(),
            overview: Some("Obsessive master thief...".to_string()),
            release_date: Some("1995-12-15".to_string()),
            runtime: Some(170),
            tagline: Some("A Los Angeles crime saga".to_string()),
            genres: vec![],
            vote_average: Some(7.9),
            vote_count: Some(7000),
            poster_path: Some("/heat.jpg".to_string()),
        }
    }

    #[tokio::test]
    async fn test_merges_details_and_credits() {
        let mut mock = MockMovieCatalog::new();
        mock.expect_movie_details()
            .with(eq(949))
            .times(1)
            .returning(|id| Ok(details(id)));
        mock.expect_movie_credits()
            .with(eq(949))
            .times(1)
            .returning(|_| {
                Ok(MovieCredits {
                    cast: vec![CastMember {
                        id: 1158,
                        name: "Al Pacino".to_string(),
                        character: Some("Vincent Hanna".to_string()),
                        order: 0,
                    }],
                    crew: vec![],
                })
            });

        let detail = movie_detail(Arc::new(mock), "https://img/", 949).await.unwrap();

        assert_eq!(detail.summary.title, "Heat");
        assert_eq!(detail.summary.poster_url.as_deref(), Some("https://img/heat.jpg"));
        assert_eq!(detail.cast.len(), 1);
        assert_eq!(detail.runtime, Some(170));
    }

    #[tokio::test]
    async fn test_missing_movie_is_not_found() {
        let mut mock = MockMovieCatalog::new();
        mock.expect_movie_details()
            .returning(|id| Err(AppError::NotFound(format!("movie {}", id))));
        mock.expect_movie_credits()
            .returning(|_| Ok(MovieCredits::default()));

        let result = movie_detail(Arc::new(mock), "https://img", 0).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
