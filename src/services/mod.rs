//! Business logic services
//!
//! Services are unguarded: callers check access first (see [`crate::api`]).

pub mod availability;
pub mod catalog;
pub mod renewal;

use std::sync::Arc;

use crate::repository::CatalogStore;

/// Shared handle to the persistence collaborator
pub type Store = Arc<dyn CatalogStore>;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub availability: availability::AvailabilityService,
    pub renewal: renewal::RenewalService,
}

impl Services {
    /// Create all services on top of the given store
    pub fn new(store: Store) -> Self {
        Self {
            catalog: catalog::CatalogService::new(store.clone()),
            availability: availability::AvailabilityService::new(store.clone()),
            renewal: renewal::RenewalService::new(store),
        }
    }
}
