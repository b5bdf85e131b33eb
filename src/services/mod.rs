pub mod curated;
pub mod dedupe;
pub mod details;
pub mod picker;
pub mod providers;
pub mod ranking;
pub mod title_search;

pub use curated::{curated_list, CuratedList, CuratedRequest, CuratedResponse};
pub use picker::{PickOutcome, PickQuery, Picker};
