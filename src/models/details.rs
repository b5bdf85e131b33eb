use serde::{Deserialize, Serialize};

use super::{poster_url, MovieSummary};

/// Genre entry from `/genre/movie/list`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

/// Raw `/movie/{id}` response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TmdbMovieDetails {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<u64>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

/// Raw `/movie/{id}/credits` response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MovieCredits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrewMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub job: Option<String>,
}

/// Movie detail page returned to clients
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MovieDetail {
    #[serde(flatten)]
    pub summary: MovieSummary,
    pub runtime: Option<u32>,
    pub tagline: Option<String>,
    pub genres: Vec<Genre>,
    pub directors: Vec<String>,
    pub cast: Vec<CastMember>,
}

/// Billed cast members kept on a detail page
pub const TOP_CAST: usize = 10;

impl MovieDetail {
    pub fn new(details: TmdbMovieDetails, credits: MovieCredits, image_base: &str) -> Self {
        let mut cast = credits.cast;
        cast.sort_by_key(|member| member.order);
        cast.truncate(TOP_CAST);

        let directors = credits
            .crew
            .into_iter()
            .filter(|member| member.job.as_deref() == Some("Director"))
            .map(|member| member.name)
            .collect();

        let rating = details.vote_average.filter(|r| r.is_finite()).unwrap_or(0.0);

        let summary = MovieSummary {
            id: details.id,
            title: details.title,
            overview: details.overview.unwrap_or_default(),
            release_date: details.release_date.filter(|d| !d.is_empty()),
            poster_url: details
                .poster_path
                .as_deref()
                .filter(|path| !path.is_empty())
                .map(|path| poster_url(image_base, path)),
            rating,
        };

        Self {
            summary,
            runtime: details.runtime,
            tagline: details.tagline.filter(|t| !t.is_empty()),
            genres: details.genres,
            directors,
            cast,
        }
    }
}
