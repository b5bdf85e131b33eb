use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Upstream sort order for discovery queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    PopularityDesc,
    VoteCountDesc,
    ReleaseDateDesc,
}

impl SortOrder {
    /// Value of TMDB's `sort_by` parameter
    pub fn as_tmdb(&self) -> &'static str {
        match self {
            SortOrder::PopularityDesc => "popularity.desc",
            SortOrder::VoteCountDesc => "vote_count.desc",
            SortOrder::ReleaseDateDesc => "primary_release_date.desc",
        }
    }
}

/// Inclusive ten-year window starting at `start_year`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Decade {
    pub start_year: i32,
}

impl Decade {
    pub fn new(start_year: i32) -> Self {
        Self { start_year }
    }

    /// Saturates at `i32::MAX`
    pub fn end_year(&self) -> i32 {
        self.start_year.saturating_add(9)
    }

    /// A decade chrono cannot represent contains no year at all
    pub fn contains_year(&self, year: i32) -> bool {
        self.date_range().is_some() && (self.start_year..=self.end_year()).contains(&year)
    }

    /// First and last calendar day of the window.
    ///
    /// Years chrono cannot represent produce `None`; such a decade simply
    /// matches nothing upstream.
    pub fn date_range(&self) -> Option<DateRange> {
        let from = NaiveDate::from_ymd_opt(self.start_year, 1, 1)?;
        let to = NaiveDate::from_ymd_opt(self.end_year(), 12, 31)?;
        Some(DateRange { from, to })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Constraints for one discovery query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoverFilters {
    pub keyword_ids: Vec<u64>,
    pub genre_id: Option<u32>,
    pub release_dates: Option<DateRange>,
    pub sort: SortOrder,
}

impl DiscoverFilters {
    /// Number of narrowing constraints (keywords, genre, date window)
    pub fn constraint_count(&self) -> usize {
        usize::from(!self.keyword_ids.is_empty())
            + usize::from(self.genre_id.is_some())
            + usize::from(self.release_dates.is_some())
    }

    /// Query parameters understood by TMDB's `/discover/movie`
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("sort_by", self.sort.as_tmdb().to_string())];

        if !self.keyword_ids.is_empty() {
            let ids: Vec<String> = self.keyword_ids.iter().map(u64::to_string).collect();
            params.push(("with_keywords", ids.join("|")));
        }
        if let Some(genre_id) = self.genre_id {
            params.push(("with_genres", genre_id.to_string()));
        }
        if let Some(range) = self.release_dates {
            params.push(("primary_release_date.gte", range.from.format("%Y-%m-%d").to_string()));
            params.push(("primary_release_date.lte", range.to.format("%Y-%m-%d").to_string()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decade_window() {
        let decade = Decade::new(1990);
        assert_eq!(decade.end_year(), 1999);
        assert!(decade.contains_year(1990));
        assert!(decade.contains_year(1999));
        assert!(!decade.contains_year(2000));

        let range = decade.date_range().unwrap();
        assert_eq!(range.from, NaiveDate::from_ymd_opt(1990, 1, 1).unwrap());
        assert_eq!(range.to, NaiveDate::from_ymd_opt(1999, 12, 31).unwrap());
    }

    #[test]
    fn test_unrepresentable_decade_has_no_range() {
        assert_eq!(Decade::new(i32::MAX - 5).date_range(), None);
    }

    #[test]
    fn test_decade_at_i32_max_contains_nothing() {
        let decade = Decade::new(i32::MAX);
        assert_eq!(decade.end_year(), i32::MAX);
        assert!(!decade.contains_year(i32::MAX));
        assert!(!decade.contains_year(1979));
    }

    #[test]
    fn test_constraint_count() {
        let mut filters = DiscoverFilters::default();
        assert_eq!(filters.constraint_count(), 0);

        filters.keyword_ids = vec![1, 2];
        filters.genre_id = Some(28);
        assert_eq!(filters.constraint_count(), 2);

        filters.release_dates = Decade::new(2010).date_range();
        assert_eq!(filters.constraint_count(), 3);
    }

    #[test]
    fn test_to_query() {
        let filters = DiscoverFilters {
            keyword_ids: vec![10051, 9715],
            genre_id: Some(28),
            release_dates: Decade::new(2010).date_range(),
            sort: SortOrder::VoteCountDesc,
        };

        let params = filters.to_query();
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("sort_by"), Some("vote_count.desc"));
        assert_eq!(get("with_keywords"), Some("10051|9715"));
        assert_eq!(get("with_genres"), Some("28"));
        assert_eq!(get("primary_release_date.gte"), Some("2010-01-01"));
        assert_eq!(get("primary_release_date.lte"), Some("2019-12-31"));
    }

    #[test]
    fn test_to_query_without_constraints() {
        let params = DiscoverFilters::default().to_query();
        assert_eq!(params, vec![("sort_by", "popularity.desc".to_string())]);
    }
}
