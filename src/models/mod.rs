use serde::{Deserialize, Deserializer, Serialize};

pub mod details;
pub mod discover;

pub use details::{CastMember, CrewMember, Genre, MovieCredits, MovieDetail, TmdbMovieDetails};
pub use discover::{DateRange, Decade, DiscoverFilters, SortOrder};

// ============================================================================
// TMDB list results
// ============================================================================

/// A single movie (or TV show) record as returned by TMDB list endpoints.
///
/// Candidates are only ever read: ranking and picking derive new orderings
/// and summaries from them, they never rewrite a fetched record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    pub id: u64,
    /// Movie title
    #[serde(default)]
    pub title: Option<String>,
    /// TV show title, present instead of `title` for non-movie media
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub popularity: f64,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl Candidate {
    /// Average rating, with non-finite values coerced to 0
    pub fn rating(&self) -> f64 {
        finite_or_zero(self.vote_average)
    }

    /// Popularity, with non-finite values coerced to 0
    pub fn popularity_score(&self) -> f64 {
        finite_or_zero(self.popularity)
    }

    /// Display title, preferring the movie title over the TV name
    pub fn display_title(&self) -> Option<&str> {
        non_empty(self.title.as_deref()).or_else(|| non_empty(self.name.as_deref()))
    }

    /// Release date, preferring the movie release over the first air date
    pub fn display_date(&self) -> Option<&str> {
        non_empty(self.release_date.as_deref()).or_else(|| non_empty(self.first_air_date.as_deref()))
    }

    /// Release year parsed from the leading `YYYY` of the display date
    pub fn release_year(&self) -> Option<i32> {
        self.display_date()
            .and_then(|date| date.get(..4))
            .and_then(|year| year.parse().ok())
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// TMDB sends `null` for numeric fields it has no data for.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One page of a paginated TMDB list endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Page {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<Candidate>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u64,
}

fn first_page() -> u32 {
    1
}

// ============================================================================
// Normalized output
// ============================================================================

/// A movie as returned to clients: titles, dates and poster resolved
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieSummary {
    pub id: u64,
    pub title: String,
    pub overview: String,
    pub release_date: Option<String>,
    pub poster_url: Option<String>,
    pub rating: f64,
}

impl MovieSummary {
    /// Normalizes a raw candidate, joining `image_base` onto its poster path
    pub fn from_candidate(candidate: &Candidate, image_base: &str) -> Self {
        let poster_url = candidate
            .poster_path
            .as_deref()
            .filter(|path| !path.is_empty())
            .map(|path| poster_url(image_base, path));

        Self {
            id: candidate.id,
            title: candidate.display_title().unwrap_or_default().to_string(),
            overview: candidate.overview.clone().unwrap_or_default(),
            release_date: candidate.display_date().map(str::to_string),
            poster_url,
            rating: candidate.rating(),
        }
    }
}

/// Joins an image host prefix and a relative TMDB poster path
pub fn poster_url(image_base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        image_base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}


#[cfg(test)]
mod tests {
    use super::fixtures::candidate;
    use super::*;

    #[test]
    fn test_candidate_deserialization_with_nulls() {
        let json = r#"{
            "id": 27205,
            "title": "Inception",
            "release_date": "2010-07-15",
            "vote_average": null,
            "vote_count": null,
            "popularity": 83.9,
            "poster_path": "/oYuLEt3zVCKq57qu2F8dT7NIa6f.jpg"
        }"#;

        let movie: Candidate = serde_json::from_str(json).unwrap();
        assert_eq!(movie.id, 27205);
        assert_eq!(movie.vote_average, 0.0);
        assert_eq!(movie.vote_count, 0);
        assert_eq!(movie.release_year(), Some(2010));
    }

    #[test]
    fn test_tv_result_falls_back_to_name_and_air_date() {
        let json = r#"{
            "id": 1396,
            "name": "Breaking Bad",
            "first_air_date": "2008-01-20",
            "vote_average": 8.9,
            "vote_count": 15000,
            "popularity": 300.1
        }"#;

        let show: Candidate = serde_json::from_str(json).unwrap();
        assert_eq!(show.display_title(), Some("Breaking Bad"));
        assert_eq!(show.display_date(), Some("2008-01-20"));
    }

    #[test]
    fn test_empty_release_date_falls_back() {
        let mut movie = candidate(1, 7.0, 10, 1.0);
        movie.release_date = Some(String::new());
        movie.first_air_date = Some("1999-03-31".to_string());
        assert_eq!(movie.display_date(), Some("1999-03-31"));
        assert_eq!(movie.release_year(), Some(1999));
    }

    #[test]
    fn test_non_finite_numbers_are_sanitized() {
        let movie = candidate(1, f64::NAN, 10, f64::INFINITY);
        assert_eq!(movie.rating(), 0.0);
        assert_eq!(movie.popularity_score(), 0.0);
    }

    #[test]
    fn test_summary_builds_poster_url() {
        let mut movie = candidate(603, 8.2, 20000, 50.0);
        movie.title = Some("The Matrix".to_string());
        movie.poster_path = Some("/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg".to_string());
        movie.release_date = Some("1999-03-31".to_string());

        let summary = MovieSummary::from_candidate(&movie, "https://image.tmdb.org/t/p/w500/");
        assert_eq!(summary.title, "The Matrix");
        assert_eq!(
            summary.poster_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg")
        );
        assert_eq!(summary.release_date.as_deref(), Some("1999-03-31"));
        assert_eq!(summary.rating, 8.2);
    }

    #[test]
    fn test_summary_without_poster() {
        let movie = candidate(1, 5.0, 3, 0.5);
        let summary = MovieSummary::from_candidate(&movie, "https://image.tmdb.org/t/p/w500");
        assert_eq!(summary.poster_url, None);
        assert_eq!(summary.overview, "");
    }

    #[test]
    fn test_page_defaults() {
        let page: Page = serde_json::from_str(r#"{"results": []}"#).unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.total_results, 0);
    }
}
