use std::cmp::Ordering;

use crate::models::Candidate;

/// Vote count at which an item's own rating and the list mean weigh equally
pub const DEFAULT_MIN_VOTES: u32 = 1000;

/// A candidate paired with its weighted rating
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub score: f64,
}

/// Arithmetic mean of the candidates' ratings, 0 for an empty set
pub fn global_mean(candidates: &[Candidate]) -> f64 {
    let total: f64 = candidates.iter().map(Candidate::rating).sum();
    total / candidates.len().max(1) as f64
}

/// Bayesian weighted rating `(v/(v+m))·R + (m/(v+m))·C`.
///
/// Shrinks `rating` towards `mean` the fewer votes it has. With no votes
/// and no threshold there is nothing to weigh, and the mean is returned.
pub fn weighted_score(rating: f64, votes: u64, mean: f64, min_votes: u32) -> f64 {
    let rating = sanitize(rating);
    let mean = sanitize(mean);
    let v = votes as f64;
    let m = f64::from(min_votes);

    if v + m == 0.0 {
        return mean;
    }

    (v / (v + m)) * rating + (m / (v + m)) * mean
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Scores every candidate and orders them best first.
///
/// Ties on score are broken by popularity, then by input position, so the
/// same input always yields the same order.
pub fn rank_scored(candidates: &[Candidate], min_votes: u32) -> Vec<ScoredCandidate> {
    let mean = global_mean(candidates);

    let mut scored: Vec<ScoredCandidate> = candidates
        .iter()
        .map(|candidate| ScoredCandidate {
            score: weighted_score(candidate.rating(), candidate.vote_count, mean, min_votes),
            candidate: candidate.clone(),
        })
        .collect();

    // sort_by is stable: equal elements keep their input order
    scored.sort_by(|a, b| {
        b.score.total_cmp(&a.score).then_with(|| {
            b.candidate
                .popularity_score()
                .total_cmp(&a.candidate.popularity_score())
        })
    });

    scored
}

/// Orders candidates by descending weighted rating
pub fn rank(candidates: &[Candidate], min_votes: u32) -> Vec<Candidate> {
    rank_scored(candidates, min_votes)
        .into_iter()
        .map(|scored| scored.candidate)
        .collect()
}

/// Orders candidates by descending popularity, keeping input order on ties
pub fn by_popularity(candidates: &[Candidate]) -> Vec<Candidate> {
    let mut ordered = candidates.to_vec();
    ordered.sort_by(|a, b| b.popularity_score().total_cmp(&a.popularity_score()));
    ordered
}

/// Orders candidates newest first; undated candidates go last
pub fn by_release_date(candidates: &[Candidate]) -> Vec<Candidate> {
    let mut ordered = candidates.to_vec();
    ordered.sort_by(|a, b| match (a.display_date(), b.display_date()) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    ordered
}
