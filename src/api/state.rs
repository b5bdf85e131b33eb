use std::sync::Arc;

use crate::services::{
    providers::{DiscoverySearch, MovieCatalog},
    Picker,
};

/// Shared application state
///
/// Holds the upstream collaborators behind their traits so tests can swap
/// in stubs, plus the defaults request parameters fall back to.
#[derive(Clone)]
pub struct AppState {
    pub discovery: Arc<dyn DiscoverySearch>,
    pub catalog: Arc<dyn MovieCatalog>,
    pub picker: Picker,
    pub image_base: String,
    pub default_min_votes: u32,
    pub curated_pages: u32,
}

impl AppState {
    pub fn new(
        discovery: Arc<dyn DiscoverySearch>,
        catalog: Arc<dyn MovieCatalog>,
        image_base: String,
        default_min_votes: u32,
        curated_pages: u32,
    ) -> Self {
        Self {
            picker: Picker::new(discovery.clone(), image_base.clone()),
            discovery,
            catalog,
            image_base,
            default_min_votes,
            curated_pages,
        }
    }
}
