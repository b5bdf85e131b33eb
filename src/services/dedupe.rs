use std::collections::HashSet;

use crate::models::Candidate;

/// Flattens result pages into a list unique by id.
///
/// Pages are read in the order given and the first occurrence of an id wins,
/// so overlapping pages (upstream ordering drifting between requests) never
/// produce duplicates and the output order is fixed by the fetch order.
pub fn dedupe<P>(pages: &[P]) -> Vec<Candidate>
where
    P: AsRef<[Candidate]>,
{
    let mut seen = HashSet::new();
    pages
        .iter()
        .flat_map(|page| page.as_ref().iter())
        .filter(|candidate| seen.insert(candidate.id))
        .cloned()
        .collect()
}
